//! HTTP client for the language-model collaborator.

use adjutant_core::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// `prompt -> text` against a black-box language model.
///
/// Failures distinguish an unreachable backend
/// (`CollaboratorUnavailable`) from a backend that answered with
/// something unusable (`CollaboratorUnusable`); callers surface both as
/// Failed results with the reason text.
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> Result<String, CoreError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client.
///
/// One request per call, no retries: every action in this system is
/// at-most-once and the collaborator call is no exception.
#[derive(Clone)]
pub struct HttpLlmClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url,
            api_key,
            client,
        }
    }
}

#[async_trait]
impl Collaborator for HttpLlmClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> Result<String, CoreError> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        debug!("collaborator call: url={} model={}", url, model);

        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream: false,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                CoreError::CollaboratorUnavailable(e.to_string())
            } else {
                CoreError::CollaboratorUnavailable(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(CoreError::CollaboratorUnavailable(format!(
                "backend returned {}",
                status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::CollaboratorUnusable(format!(
                "backend returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CoreError::CollaboratorUnusable(format!("bad response body: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(CoreError::CollaboratorUnusable(
                "backend returned empty content".to_string(),
            ));
        }

        Ok(content)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_backend_is_unavailable() {
        // Port 1 is never an LLM endpoint; connection is refused fast.
        let client = HttpLlmClient::new("http://127.0.0.1:1".to_string(), None);
        let err = client.complete("sys", "user", "model").await.unwrap_err();
        assert!(matches!(err, CoreError::CollaboratorUnavailable(_)));
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn request_serializes_to_openai_shape() {
        let request = ChatRequest {
            model: "qwen2.5-coder",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "qwen2.5-coder");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn response_with_content_parses() {
        let body = r#"{"choices":[{"message":{"content":"print(1)"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("print(1)")
        );
    }
}
