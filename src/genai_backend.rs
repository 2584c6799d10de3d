//! Google Generative Language (`generateContent`) backend.
//!
//! Context messages become the chat history and the active turns are sent
//! as the parts of one final `user` content.

use crate::http_client::HttpClient;
use crate::llm_client::{BackendOptions, LlmBackend, LlmResponse, Message, Role, SamplingParams};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

pub struct GenAiBackend {
    options: BackendOptions,
    params: SamplingParams,
    http: Arc<dyn HttpClient>,
}

impl GenAiBackend {
    pub fn new(options: BackendOptions, params: SamplingParams, http: Arc<dyn HttpClient>) -> Self {
        Self {
            options,
            params,
            http,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.options.base_url.trim_end_matches('/'),
            self.params.model
        )
    }

    /// Contexts are replayed as `model` turns, so the history always opens
    /// with a model turn ahead of the user's request.
    fn history_role(role: Role) -> &'static str {
        match role {
            Role::System => "model",
            Role::User => "user",
        }
    }

    fn request_body(&self, contexts: &[Message], turns: &[Message]) -> Value {
        let mut contents: Vec<Value> = contexts
            .iter()
            .map(|msg| {
                json!({
                    "role": Self::history_role(msg.role),
                    "parts": [{ "text": msg.text }],
                })
            })
            .collect();

        let parts: Vec<Value> = turns.iter().map(|msg| json!({ "text": msg.text })).collect();
        contents.push(json!({ "role": "user", "parts": parts }));

        json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.params.temperature,
                "seed": self.params.seed,
            },
        })
    }

    fn extract_text(raw: &str) -> LlmResponse {
        let response: GenerateContentResponse = match serde_json::from_str(raw) {
            Ok(response) => response,
            Err(e) => {
                return LlmResponse::unexpected(format!(
                    "Unrecognised generateContent response: {}",
                    e
                ));
            }
        };

        let Some(candidate) = response.candidates.into_iter().next() else {
            return LlmResponse::unexpected("generateContent response contained no candidates");
        };

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        LlmResponse::ok(text)
    }
}

#[async_trait]
impl LlmBackend for GenAiBackend {
    async fn send(&self, contexts: &[Message], turns: &[Message]) -> LlmResponse {
        let body = self.request_body(contexts, turns);
        let headers = [
            ("x-goog-api-key", self.options.token.as_str()),
            ("Content-Type", "application/json"),
        ];

        info!("Requesting content generation from {}", self.endpoint());
        match self.http.post_json(&self.endpoint(), &headers, &body).await {
            Ok(raw) => {
                debug!("generateContent response: {}", raw);
                Self::extract_text(&raw)
            }
            Err(e) => LlmResponse::connection_failed(&e),
        }
    }
}
