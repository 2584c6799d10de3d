//! HTTP client abstraction for the text-generation backends.
//!
//! Backends talk to the network only through [`HttpClient`], so tests can
//! inject a recording client instead of making real requests.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;

/// A non-2xx reply from a backend, carrying the body the server sent.
#[derive(Debug)]
pub struct HttpStatusError {
    pub status: u16,
    pub body: String,
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.trim().is_empty() {
            write!(f, "{} status code (no body)", self.status)
        } else {
            write!(f, "{} {}", self.status, self.body.trim())
        }
    }
}

impl std::error::Error for HttpStatusError {}

/// Trait for HTTP communication with external APIs.
///
/// # Example
///
/// ```ignore
/// use cai::http_client::{HttpClient, ReqwestHttpClient};
///
/// let client = ReqwestHttpClient::new();
/// let response = client.post_json(
///     "https://api.example.com/endpoint",
///     &[("Authorization", "Bearer token")],
///     &serde_json::json!({"key": "value"}),
/// ).await?;
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with a JSON body and returns the response text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, the body cannot be
    /// read, or the server answers with a non-success status
    /// ([`HttpStatusError`]).
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String>;
}

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(HttpStatusError {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    /// A request captured by [`MockHttpClient`].
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: serde_json::Value,
    }

    /// Mock HTTP client for testing.
    ///
    /// Returns a predetermined response (or error) and records every request.
    pub struct MockHttpClient {
        response: std::result::Result<String, String>,
        pub requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockHttpClient {
        pub fn new(response: &str) -> Self {
            Self {
                response: Ok(response.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn last_request(&self) -> RecordedRequest {
            self.requests.lock().unwrap().last().cloned().expect("no request recorded")
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            headers: &[(&str, &str)],
            body: &serde_json::Value,
        ) -> Result<String> {
            self.requests.lock().unwrap().push(RecordedRequest {
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.clone(),
            });

            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(anyhow!("{}", message)),
            }
        }
    }

    #[tokio::test]
    async fn test_mock_http_client_records_request() {
        let client = MockHttpClient::new("test response");
        let response = client
            .post_json("http://x/y", &[("k", "v")], &serde_json::json!({"a": 1}))
            .await
            .unwrap();

        assert_eq!(response, "test response");
        let request = client.last_request();
        assert_eq!(request.url, "http://x/y");
        assert_eq!(request.headers, vec![("k".to_string(), "v".to_string())]);
        assert_eq!(request.body["a"], 1);
    }

    #[test]
    fn test_status_error_display_includes_body() {
        let err = HttpStatusError {
            status: 401,
            body: "{\"error\":\"bad key\"}\n".to_string(),
        };
        assert_eq!(err.to_string(), "401 {\"error\":\"bad key\"}");
    }

    #[test]
    fn test_status_error_display_without_body() {
        let err = HttpStatusError {
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "500 status code (no body)");
    }
}
