//! Startup helpers shared by the `cai` and `cai-api` binaries.

use crate::config::{Config, CONFIG_ERROR_EXIT_CODE};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

pub const QUIET_FLAGS: [&str; 2] = ["-q", "--quiet"];

/// Installs the tracing subscriber. Logs go to stderr and are filtered by
/// `RUST_LOG` (errors only by default).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration or terminates the process with
/// [`CONFIG_ERROR_EXIT_CODE`].
pub fn load_config_or_exit() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("{:#}", e).red());
            if let Ok(path) = Config::config_path() {
                eprintln!(
                    "Settings are read from {} and CAI_* environment variables.",
                    path.display()
                );
            }
            std::process::exit(CONFIG_ERROR_EXIT_CODE);
        }
    }
}

/// Removes quiet flags from `words` and joins the rest into the request text.
/// Returns whether a quiet flag was present.
pub fn split_quiet_flag(words: &[String]) -> (bool, String) {
    let quiet = words.iter().any(|w| QUIET_FLAGS.contains(&w.as_str()));
    let request = words
        .iter()
        .filter(|w| !QUIET_FLAGS.contains(&w.as_str()))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    (quiet, request)
}

/// Prints a failed request the same way in both binaries.
pub fn report_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red(), err);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_words_are_joined_with_spaces() {
        assert_eq!(
            split_quiet_flag(&words(&["list", "big", "files"])),
            (false, "list big files".to_string())
        );
    }

    #[test]
    fn test_quiet_flags_are_removed_anywhere() {
        assert_eq!(
            split_quiet_flag(&words(&["list", "-q", "files", "--quiet"])),
            (true, "list files".to_string())
        );
    }

    #[test]
    fn test_other_dashes_are_kept() {
        assert_eq!(
            split_quiet_flag(&words(&["run", "ls", "-la"])),
            (false, "run ls -la".to_string())
        );
    }
}
