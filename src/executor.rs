//! Execution of generated shell scripts.
//!
//! The script text is handed verbatim to a shell interpreter with the child's
//! standard streams connected to ours. No sanitisation is applied; the
//! confirmation prompt is the only gate.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// Trait for running child processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` with `args`, inheriting stdin/stdout/stderr, and waits
    /// for it. Returns the exit code, or `None` if the child was terminated
    /// without one (e.g. by a signal).
    fn run_inherited(&self, program: &str, args: &[&str]) -> Result<Option<i32>>;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run_inherited(&self, program: &str, args: &[&str]) -> Result<Option<i32>> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("failed to start {}", program))?;
        Ok(status.code())
    }
}

// =============================================================================
// Shell selection
// =============================================================================

/// Interpreter used to run a script: program plus the arguments that precede
/// the script text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ShellCommand {
    /// Windows always runs scripts through PowerShell (`pwsh` if installed).
    /// Other hosts use `/bin/sh -c`.
    pub fn for_host() -> Self {
        if cfg!(windows) {
            let program = if which::which("pwsh").is_ok() {
                "pwsh"
            } else {
                "powershell.exe"
            };
            Self::powershell(program)
        } else {
            Self::posix()
        }
    }

    pub fn posix() -> Self {
        Self {
            program: "/bin/sh".to_string(),
            args: vec!["-c".to_string()],
        }
    }

    pub fn powershell(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: vec!["-NoProfile".to_string(), "-Command".to_string()],
        }
    }
}

// =============================================================================
// Executor Implementation
// =============================================================================

/// Runs scripts through the host shell and reports the child's exit code.
pub struct Executor {
    shell: ShellCommand,
}

impl Executor {
    pub fn new() -> Self {
        Self::with_shell(ShellCommand::for_host())
    }

    pub fn with_shell(shell: ShellCommand) -> Self {
        Self { shell }
    }

    /// Runs `script` with an injected runner (for testing).
    ///
    /// Returns the child's exit code, or 0 when it has none.
    ///
    /// # Errors
    ///
    /// Returns an error only if the shell cannot be started.
    pub fn execute_script_with_runner<P: ProcessRunner>(&self, script: &str, runner: &P) -> Result<i32> {
        info!("Executing script with {}", self.shell.program);
        debug!("Script:\n{}", script);

        let mut args: Vec<&str> = self.shell.args.iter().map(String::as_str).collect();
        args.push(script);

        let code = match runner.run_inherited(&self.shell.program, &args)? {
            Some(code) => code,
            None => {
                warn!("Script terminated without an exit code");
                0
            }
        };

        info!("Script exited with code {}", code);
        Ok(code)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    // =========================================================================
    // Mock implementations
    // =========================================================================

    /// Mock process runner that records invocations.
    pub struct MockProcessRunner {
        code: std::result::Result<Option<i32>, String>,
        pub calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl MockProcessRunner {
        pub fn exiting_with(code: Option<i32>) -> Self {
            Self {
                code: Ok(code),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn unstartable(message: &str) -> Self {
            Self {
                code: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ProcessRunner for MockProcessRunner {
        fn run_inherited(&self, program: &str, args: &[&str]) -> Result<Option<i32>> {
            self.calls.lock().unwrap().push((
                program.to_string(),
                args.iter().map(|s| s.to_string()).collect(),
            ));
            self.code.clone().map_err(|message| anyhow!(message))
        }
    }

    #[test]
    fn test_script_is_passed_as_last_shell_argument() {
        let executor = Executor::with_shell(ShellCommand::posix());
        let runner = MockProcessRunner::exiting_with(Some(0));

        executor
            .execute_script_with_runner("echo hi && ls", &runner)
            .unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/bin/sh");
        assert_eq!(calls[0].1, vec!["-c".to_string(), "echo hi && ls".to_string()]);
    }

    #[test]
    fn test_child_exit_code_is_returned() {
        let executor = Executor::with_shell(ShellCommand::posix());
        let runner = MockProcessRunner::exiting_with(Some(42));

        assert_eq!(executor.execute_script_with_runner("exit 42", &runner).unwrap(), 42);
    }

    #[test]
    fn test_missing_exit_code_maps_to_zero() {
        let executor = Executor::with_shell(ShellCommand::posix());
        let runner = MockProcessRunner::exiting_with(None);

        assert_eq!(executor.execute_script_with_runner("kill $$", &runner).unwrap(), 0);
    }

    #[test]
    fn test_start_failure_is_an_error() {
        let executor = Executor::with_shell(ShellCommand::posix());
        let runner = MockProcessRunner::unstartable("no such file");

        let err = executor.execute_script_with_runner("ls", &runner).unwrap_err();
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_powershell_arguments() {
        let executor = Executor::with_shell(ShellCommand::powershell("pwsh"));
        let runner = MockProcessRunner::exiting_with(Some(0));

        executor.execute_script_with_runner("Get-ChildItem", &runner).unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].0, "pwsh");
        assert_eq!(calls[0].1, vec!["-NoProfile", "-Command", "Get-ChildItem"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_host_shell_is_posix_on_unix() {
        assert_eq!(ShellCommand::for_host(), ShellCommand::posix());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let code = SystemProcessRunner
            .run_inherited("/bin/sh", &["-c", "exit 3"])
            .unwrap();
        assert_eq!(code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_signal_has_no_code() {
        let code = SystemProcessRunner
            .run_inherited("/bin/sh", &["-c", "kill -9 $$"])
            .unwrap();
        assert_eq!(code, None);
    }
}
