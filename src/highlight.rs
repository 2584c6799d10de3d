//! Minimal shell syntax highlighting for the script preview.
//!
//! Only ANSI styling is added; the visible text is identical to the input.

use colored::Colorize;

const KEYWORDS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "for", "while", "until", "do", "done", "case", "esac",
    "in", "function", "select", "return", "local", "export",
];

/// Keywords after which the next word is a command again.
const COMMAND_PREFIX_KEYWORDS: &[&str] = &["if", "then", "else", "elif", "while", "until", "do"];

fn is_operator(c: char) -> bool {
    matches!(c, ';' | '|' | '&' | '(' | ')' | '<' | '>' | '{' | '}')
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !is_operator(c) && !matches!(c, '\'' | '"' | '$' | '#' | '`')
}

/// Returns `script` with shell syntax coloured for terminal display.
pub fn highlight_shell(script: &str) -> String {
    let mut out = String::with_capacity(script.len() * 2);
    for line in script.split_inclusive('\n') {
        highlight_line(line, &mut out);
    }
    out
}

fn highlight_line(line: &str, out: &mut String) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut command_start = true;
    let mut prev_is_space = true;

    while i < chars.len() {
        let c = chars[i];

        if c == '#' && prev_is_space {
            let end = chars.iter().position(|&c| c == '\n').unwrap_or(chars.len());
            let comment: String = chars[i..end].iter().collect();
            out.push_str(&comment.dimmed().to_string());
            i = end;
            continue;
        }

        if c == '\'' || c == '"' {
            let end = quoted_end(&chars, i, c);
            let quoted: String = chars[i..end].iter().collect();
            out.push_str(&quoted.green().to_string());
            i = end;
            prev_is_space = false;
            command_start = false;
            continue;
        }

        if c == '$' {
            let end = variable_end(&chars, i);
            let variable: String = chars[i..end].iter().collect();
            out.push_str(&variable.cyan().to_string());
            i = end;
            prev_is_space = false;
            command_start = false;
            continue;
        }

        if is_word_char(c) {
            let mut end = i;
            while end < chars.len() && is_word_char(chars[end]) {
                end += 1;
            }
            let word: String = chars[i..end].iter().collect();
            if KEYWORDS.contains(&word.as_str()) {
                out.push_str(&word.magenta().bold().to_string());
                command_start = COMMAND_PREFIX_KEYWORDS.contains(&word.as_str());
            } else if command_start && !word.contains('=') {
                out.push_str(&word.yellow().to_string());
                command_start = false;
            } else {
                out.push_str(&word);
            }
            i = end;
            prev_is_space = false;
            continue;
        }

        if is_operator(c) && c != '<' && c != '>' {
            command_start = true;
        }
        out.push(c);
        prev_is_space = c.is_whitespace() || is_operator(c);
        i += 1;
    }
}

/// Index one past the closing quote, or the end of the line.
fn quoted_end(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == '\\' && quote == '"' {
            i += 2;
            continue;
        }
        if chars[i] == quote {
            return i + 1;
        }
        if chars[i] == '\n' {
            return i;
        }
        i += 1;
    }
    chars.len()
}

fn variable_end(chars: &[char], start: usize) -> usize {
    let next = start + 1;
    match chars.get(next).copied() {
        Some('{') => chars[next..]
            .iter()
            .position(|&c| c == '}')
            .map(|offset| next + offset + 1)
            .unwrap_or(chars.len()),
        Some(c) if c.is_ascii_digit() || matches!(c, '@' | '*' | '#' | '?' | '$' | '!' | '-') => {
            next + 1
        }
        Some(c) if c.is_alphanumeric() || c == '_' => {
            let mut end = next;
            while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            end
        }
        _ => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Removes ANSI escape sequences so assertions do not depend on whether
    /// colour output is enabled.
    fn strip_ansi(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' && chars.peek() == Some(&'[') {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_visible_text_is_preserved() {
        let script = "#!/bin/sh\n# make dirs\nfor d in a b; do\n  mkdir -p \"$d\" && echo 'made' ${d}\ndone\nX=1 ls $1 | wc -l\n";

        assert_eq!(strip_ansi(&highlight_shell(script)), script);
    }

    #[test]
    fn test_unterminated_quote_is_preserved() {
        let script = "echo \"oops\nls";

        assert_eq!(strip_ansi(&highlight_shell(script)), script);
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(highlight_shell(""), "");
    }

    #[test]
    fn test_variable_end() {
        let chars: Vec<char> = "$HOME/x".chars().collect();
        assert_eq!(variable_end(&chars, 0), 5);

        let chars: Vec<char> = "${A:-b}c".chars().collect();
        assert_eq!(variable_end(&chars, 0), 7);

        let chars: Vec<char> = "$?".chars().collect();
        assert_eq!(variable_end(&chars, 0), 2);
    }

    #[test]
    fn test_quoted_end_skips_escaped_quote() {
        let chars: Vec<char> = r#""a\"b" c"#.chars().collect();
        assert_eq!(quoted_end(&chars, 0, '"'), 6);
    }
}
