//! cai - natural-language requests turned into shell scripts.
//!
//! The library backs two binaries:
//!
//! - **`cai`** sends a request to a language model, shows the generated shell
//!   script, asks for confirmation and runs it, exiting with the script's
//!   exit code.
//! - **`cai-api`** sends a REST API specification and writes the returned
//!   files below a fixed output directory.
//!
//! # Architecture
//!
//! Each run is a single linear pipeline:
//! configuration → client → context priming → one message → post-processing
//! → execution or file output.
//!
//! - [`config`] - Loads and validates settings (`~/.cai.json`, `CAI_*` variables)
//! - [`llm_client`] - Backend-agnostic client, messages and normalised responses
//! - [`openai_backend`] / [`genai_backend`] - The two supported remote APIs
//! - [`http_client`] - HTTP client abstraction
//! - [`script`] - Extracts a script from fenced or plain model output
//! - [`scaffold`] - Splits multi-file output and writes the files
//! - [`confirm_ui`] / [`highlight`] - Script preview and confirmation prompt
//! - [`executor`] - Runs scripts through the host shell
//! - [`command_router`] - Wires the stages together
//! - [`prompts`] / [`system_info`] - Instruction text and host OS description
//! - [`cli`] - Startup helpers shared by the binaries
//!
//! # Example
//!
//! ```ignore
//! use cai::{command_router::CommandRouter, config::Config, llm_client::LlmClient, prompts};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let mut client = LlmClient::from_config(&config);
//!     client.context(prompts::script_instructions("Linux"));
//!
//!     let mut router = CommandRouter::new(client);
//!     let code = router.process_script_request("list the five largest files", false).await?;
//!     std::process::exit(code);
//! }
//! ```
//!
//! # Safety
//!
//! Generated scripts and file paths are used exactly as the model returns
//! them. The confirmation prompt is the only safeguard; `--quiet` skips it.

pub mod cli;
pub mod command_router;
pub mod config;
pub mod confirm_ui;
pub mod executor;
pub mod genai_backend;
pub mod highlight;
pub mod http_client;
pub mod llm_client;
pub mod openai_backend;
pub mod prompts;
pub mod scaffold;
pub mod script;
pub mod system_info;
