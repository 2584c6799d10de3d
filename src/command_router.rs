use crate::{
    confirm_ui::ConfirmUI,
    executor::{Executor, ProcessRunner, SystemProcessRunner},
    llm_client::{LlmClient, Message},
    scaffold::{self, WriteReport},
    script::strip_code_fence,
};
use anyhow::{anyhow, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{info, warn};

/// Drives one request through generation, post-processing and output.
pub struct CommandRouter {
    client: LlmClient,
    confirm_ui: ConfirmUI,
    executor: Executor,
}

impl CommandRouter {
    pub fn new(client: LlmClient) -> Self {
        Self::with_executor(client, Executor::new())
    }

    pub fn with_executor(client: LlmClient, executor: Executor) -> Self {
        Self {
            client,
            confirm_ui: ConfirmUI::new(),
            executor,
        }
    }

    async fn generate(&self, request: &str) -> Result<String> {
        let response = self.client.message(&[Message::user(request)]).await;
        if !response.is_ok() {
            return Err(anyhow!("{}", response.data));
        }
        Ok(response.data)
    }

    /// Script mode using stdin, stdout and real processes.
    ///
    /// Returns the exit code the process should terminate with.
    pub async fn process_script_request(&mut self, request: &str, quiet: bool) -> Result<i32> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.process_script_request_with_io(request, quiet, &mut input, &mut output, &SystemProcessRunner)
            .await
    }

    /// Script mode with injected I/O and process runner.
    ///
    /// In quiet mode `input` is never read. A declined confirmation returns 0
    /// without running anything; otherwise the script's exit code is returned.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure description when generation fails, or an
    /// I/O error from the prompt or process start.
    pub async fn process_script_request_with_io<R, W, P>(
        &mut self,
        request: &str,
        quiet: bool,
        input: &mut R,
        output: &mut W,
        runner: &P,
    ) -> Result<i32>
    where
        R: BufRead,
        W: Write,
        P: ProcessRunner,
    {
        info!("Processing script request: {}", request);
        let raw = self.generate(request).await?;
        let script = strip_code_fence(&raw);

        if !quiet && !self.confirm_ui.confirm_with_io(&script, input, output)? {
            info!("Script execution declined");
            return Ok(0);
        }

        self.executor.execute_script_with_runner(&script, runner)
    }

    /// Multi-file mode: generates files from `specification` and writes them
    /// below `root`.
    pub async fn process_scaffold_request(&mut self, specification: &str, root: &Path) -> Result<WriteReport> {
        info!("Processing scaffold request: {}", specification);
        let raw = self.generate(specification).await?;

        let files = scaffold::split_files(&raw);
        if files.is_empty() {
            warn!("Response contained no files");
        }
        Ok(scaffold::write_files(root, &files))
    }
}
