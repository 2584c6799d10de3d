//! Script preview and run confirmation.
//!
//! Shows the generated script with syntax highlighting and asks the user
//! whether to run it. Only `y` or `yes` (any case) counts as consent.

use crate::highlight::highlight_shell;
use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};
use tracing::info;

pub const CONFIRM_PROMPT: &str = "Do you want to run the script? [y/N] › ";

/// Handles the preview-and-confirm step before a script is executed.
///
/// # Example
///
/// ```
/// use cai::confirm_ui::ConfirmUI;
/// use std::io::Cursor;
///
/// let ui = ConfirmUI::new();
/// let mut output = Vec::new();
/// let accepted = ui.confirm_with_io("echo hello", &mut Cursor::new(b"y\n"), &mut output)?;
/// assert!(accepted);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ConfirmUI;

impl ConfirmUI {
    pub fn new() -> Self {
        Self
    }

    /// Returns true when `answer` is an affirmative reply.
    pub fn is_affirmative(answer: &str) -> bool {
        let answer = answer.trim();
        answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
    }

    /// Renders the script preview to `output`.
    pub fn render_script_with_io<W: Write>(&self, script: &str, output: &mut W) -> Result<()> {
        writeln!(output, "{}", "Generated script:".bold().underline())?;
        writeln!(output, "{}", highlight_shell(script))?;
        writeln!(output)?;
        Ok(())
    }

    /// Shows the preview and reads one line of confirmation from `input`.
    ///
    /// End of input and replies that are not valid UTF-8 are treated as a
    /// refusal.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the prompt or reading the answer fails.
    pub fn confirm_with_io<R: BufRead, W: Write>(
        &self,
        script: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        self.render_script_with_io(script, output)?;

        write!(output, "{}", CONFIRM_PROMPT.bright_yellow())?;
        output.flush()?;

        // Raw bytes: a reply that is not UTF-8 is a refusal, not an error.
        let mut reply = Vec::new();
        input.read_until(b'\n', &mut reply)?;

        let accepted = Self::is_affirmative(&String::from_utf8_lossy(&reply));
        info!("User {} script execution", if accepted { "accepted" } else { "declined" });
        Ok(accepted)
    }
}
