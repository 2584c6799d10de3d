//! Backend-agnostic client for the text-generation services.
//!
//! [`LlmClient`] owns the persistent context messages and forwards them,
//! followed by the active turn, to an [`LlmBackend`]. Backends normalise every
//! failure into an [`LlmResponse`] so callers only ever branch on a status.

use crate::config::Config;
use crate::genai_backend::GenAiBackend;
use crate::http_client::{HttpClient, HttpStatusError, ReqwestHttpClient};
use crate::openai_backend::OpenAiBackend;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmResponseStatus {
    Ok,
    ConnectionFailed,
    UnexpectedError,
}

/// Outcome of one round trip. `data` is generated text only when `status`
/// is [`LlmResponseStatus::Ok`]; otherwise it describes the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    pub status: LlmResponseStatus,
    pub data: String,
}

impl LlmResponse {
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            status: LlmResponseStatus::Ok,
            data: data.into(),
        }
    }

    /// Converts a transport or backend error into a `ConnectionFailed`
    /// response of the form `<ErrorName>: <message>`.
    pub fn connection_failed(err: &anyhow::Error) -> Self {
        Self {
            status: LlmResponseStatus::ConnectionFailed,
            data: format!("{}: {}", error_name(err), err),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            status: LlmResponseStatus::UnexpectedError,
            data: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == LlmResponseStatus::Ok
    }
}

fn error_name(err: &anyhow::Error) -> &'static str {
    if err.downcast_ref::<HttpStatusError>().is_some() {
        return "HttpStatusError";
    }
    match err.downcast_ref::<reqwest::Error>() {
        Some(e) if e.is_timeout() => "TimeoutError",
        Some(e) if e.is_connect() => "ConnectError",
        Some(e) if e.is_decode() => "DecodeError",
        Some(e) if e.is_builder() => "RequestBuildError",
        Some(_) => "RequestError",
        None => "Error",
    }
}

/// Sampling parameters applied to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub model: String,
    pub temperature: f64,
    pub seed: i64,
}

/// Connection parameters for a backend.
#[derive(Clone)]
pub struct BackendOptions {
    pub base_url: String,
    pub token: String,
}

/// One remote text-generation API.
///
/// Implementations map the role/text messages onto their request shape and
/// pull the generated text out of the reply. `contexts` must be sent before
/// `turns`, in order.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn send(&self, contexts: &[Message], turns: &[Message]) -> LlmResponse;
}

/// Supported backends, selected by the `llm_service` configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    OpenAi,
    GenAi,
}

impl BackendKind {
    pub const NAMES: [&'static str; 2] = ["openai", "genai"];

    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::GenAi => "genai",
        }
    }

    pub fn build(
        &self,
        options: BackendOptions,
        params: SamplingParams,
        http: Arc<dyn HttpClient>,
    ) -> Box<dyn LlmBackend> {
        match self {
            BackendKind::OpenAi => Box::new(OpenAiBackend::new(options, params, http)),
            BackendKind::GenAi => Box::new(GenAiBackend::new(options, params, http)),
        }
    }
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "openai" => Ok(BackendKind::OpenAi),
            "genai" => Ok(BackendKind::GenAi),
            other => Err(anyhow::anyhow!("unknown backend '{}'", other)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Client holding the append-only list of context messages.
pub struct LlmClient {
    backend: Box<dyn LlmBackend>,
    contexts: Vec<Message>,
}

impl LlmClient {
    pub fn new(backend: Box<dyn LlmBackend>) -> Self {
        Self {
            backend,
            contexts: Vec::new(),
        }
    }

    /// Builds the backend named by the configuration over a real HTTP client.
    pub fn from_config(config: &Config) -> Self {
        info!("Using '{}' backend with model '{}'", config.backend, config.model);
        let options = BackendOptions {
            base_url: config.api.base_url.clone(),
            token: config.api.token.clone(),
        };
        let backend = config.backend.build(
            options,
            config.sampling_params(),
            Arc::new(ReqwestHttpClient::new()),
        );
        Self::new(backend)
    }

    /// Appends a persistent instruction sent ahead of every later message.
    pub fn context(&mut self, text: impl Into<String>) -> &mut Self {
        self.contexts.push(Message::system(text));
        self
    }

    /// Sends all contexts followed by `turns` and returns the normalised reply.
    pub async fn message(&self, turns: &[Message]) -> LlmResponse {
        if turns.is_empty() {
            warn!("Refusing to send an empty message turn");
            return LlmResponse::unexpected("No message to send");
        }

        debug!(
            "Sending {} context message(s) and {} turn(s)",
            self.contexts.len(),
            turns.len()
        );
        let response = self.backend.send(&self.contexts, turns).await;
        if !response.is_ok() {
            warn!("Backend call failed: {:?}: {}", response.status, response.data);
        }
        response
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Backend that records what it was asked to send and replies with a
    /// fixed response.
    pub struct RecordingBackend {
        pub sent: Arc<Mutex<Vec<Vec<Message>>>>,
        reply: LlmResponse,
    }

    impl RecordingBackend {
        pub fn new(reply: LlmResponse) -> (Self, Arc<Mutex<Vec<Vec<Message>>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    sent: Arc::clone(&sent),
                    reply,
                },
                sent,
            )
        }
    }

    #[async_trait]
    impl LlmBackend for RecordingBackend {
        async fn send(&self, contexts: &[Message], turns: &[Message]) -> LlmResponse {
            let mut all = contexts.to_vec();
            all.extend_from_slice(turns);
            self.sent.lock().unwrap().push(all);
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn test_message_forwards_contexts_then_turn() {
        let (backend, sent) = RecordingBackend::new(LlmResponse::ok("done"));
        let mut client = LlmClient::new(Box::new(backend));

        client.context("first").context("second").context("third");
        let response = client.message(&[Message::user("do it")]).await;

        assert!(response.is_ok());
        assert_eq!(response.data, "done");

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            vec![
                Message::system("first"),
                Message::system("second"),
                Message::system("third"),
                Message::user("do it"),
            ]
        );
    }

    #[tokio::test]
    async fn test_contexts_persist_across_messages() {
        let (backend, sent) = RecordingBackend::new(LlmResponse::ok(""));
        let mut client = LlmClient::new(Box::new(backend));

        client.context("rules");
        client.message(&[Message::user("one")]).await;
        client.message(&[Message::user("two")]).await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].len(), 2);
        assert_eq!(sent[1], vec![Message::system("rules"), Message::user("two")]);
    }

    #[tokio::test]
    async fn test_empty_turns_never_reach_backend() {
        let (backend, sent) = RecordingBackend::new(LlmResponse::ok("x"));
        let client = LlmClient::new(Box::new(backend));

        let response = client.message(&[]).await;

        assert_eq!(response.status, LlmResponseStatus::UnexpectedError);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_connection_failed_names_the_error() {
        let err = anyhow::Error::from(HttpStatusError {
            status: 503,
            body: "overloaded".to_string(),
        });
        let response = LlmResponse::connection_failed(&err);

        assert_eq!(response.status, LlmResponseStatus::ConnectionFailed);
        assert_eq!(response.data, "HttpStatusError: 503 overloaded");
    }

    #[test]
    fn test_connection_failed_generic_error() {
        let err = anyhow::anyhow!("socket closed");
        let response = LlmResponse::connection_failed(&err);

        assert_eq!(response.data, "Error: socket closed");
    }

    #[test]
    fn test_backend_kind_parses_known_names() {
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert_eq!("genai".parse::<BackendKind>().unwrap(), BackendKind::GenAi);
        assert!("OpenAI".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_backend_kind_names_round_trip() {
        for name in BackendKind::NAMES {
            assert_eq!(name.parse::<BackendKind>().unwrap().name(), name);
        }
    }
}
