//! OpenAI-compatible chat completions backend.

use crate::http_client::HttpClient;
use crate::llm_client::{BackendOptions, LlmBackend, LlmResponse, Message, SamplingParams};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiBackend {
    options: BackendOptions,
    params: SamplingParams,
    http: Arc<dyn HttpClient>,
}

impl OpenAiBackend {
    pub fn new(options: BackendOptions, params: SamplingParams, http: Arc<dyn HttpClient>) -> Self {
        Self {
            options,
            params,
            http,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.options.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, contexts: &[Message], turns: &[Message]) -> Value {
        let messages: Vec<Value> = contexts
            .iter()
            .chain(turns)
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.text,
                    "name": msg.role.as_str(),
                })
            })
            .collect();

        json!({
            "model": self.params.model,
            "messages": messages,
            "temperature": self.params.temperature,
            "seed": self.params.seed,
            "n": 1,
        })
    }

    fn extract_text(raw: &str) -> LlmResponse {
        let completion: ChatCompletion = match serde_json::from_str(raw) {
            Ok(completion) => completion,
            Err(e) => {
                return LlmResponse::unexpected(format!(
                    "Unrecognised chat completion response: {}",
                    e
                ));
            }
        };

        match completion.choices.into_iter().next() {
            Some(choice) => LlmResponse::ok(choice.message.content.unwrap_or_default()),
            None => LlmResponse::unexpected("Chat completion response contained no choices"),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn send(&self, contexts: &[Message], turns: &[Message]) -> LlmResponse {
        let body = self.request_body(contexts, turns);
        let authorization = format!("Bearer {}", self.options.token);
        let headers = [
            ("Authorization", authorization.as_str()),
            ("Content-Type", "application/json"),
        ];

        info!("Requesting chat completion from {}", self.endpoint());
        match self.http.post_json(&self.endpoint(), &headers, &body).await {
            Ok(raw) => {
                debug!("Chat completion response: {}", raw);
                Self::extract_text(&raw)
            }
            Err(e) => LlmResponse::connection_failed(&e),
        }
    }
}
