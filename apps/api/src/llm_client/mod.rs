//! Client for the rewrite service (Anthropic Messages API).
//!
//! One call sends a system prompt and a single user turn and expects a JSON object in
//! the first text block of the reply. Transport failures, 429 and 5xx are retried with
//! doubling backoff. The whole call, retries and backoff included, has to finish
//! within the budget the client was built with.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
/// A rewritten bullet plus two short lists fits comfortably.
const MAX_TOKENS: u32 = 1024;
const ATTEMPTS: u32 = 3;
const FIRST_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered {status}: {message}")]
    Api { status: u16, message: String },

    #[error("reply is not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("reply carried no text")]
    EmptyContent,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Turn<'a>; 1],
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesReply {
    #[serde(default)]
    content: Vec<ReplyBlock>,
}

#[derive(Deserialize)]
struct ReplyBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorReply {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Outcome of one HTTP attempt.
enum Attempt {
    Done(String),
    Retry(LlmError),
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    budget: Duration,
}

impl LlmClient {
    /// `budget` bounds each call end to end, retries included.
    pub fn new(api_key: String, budget: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            endpoint: MESSAGES_URL.to_string(),
            budget,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sends `prompt` and parses the reply text as `T`, tolerating a markdown fence
    /// around the JSON.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let text = tokio::time::timeout(self.budget, self.complete(prompt, system))
            .await
            .map_err(|_| LlmError::Timeout(self.budget))??;
        Ok(serde_json::from_str(strip_json_fences(&text))?)
    }

    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: [Turn {
                role: "user",
                content: prompt,
            }],
        };

        let mut backoff = FIRST_BACKOFF;
        let mut attempt = 1;
        loop {
            match self.attempt(&body).await? {
                Attempt::Done(text) => {
                    debug!("Rewrite service replied on attempt {attempt}");
                    return Ok(text);
                }
                Attempt::Retry(err) if attempt < ATTEMPTS => {
                    warn!(
                        "Rewrite service attempt {attempt} failed ({err}); retrying in {backoff:?}"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Attempt::Retry(err) => return Err(err),
            }
        }
    }

    /// One POST. Errors worth retrying come back as `Attempt::Retry`.
    async fn attempt(&self, body: &MessagesRequest<'_>) -> Result<Attempt, LlmError> {
        let response = match self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(Attempt::Retry(LlmError::Http(e))),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Ok(Attempt::Retry(LlmError::Api {
                status: status.as_u16(),
                message,
            }));
        }
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorReply>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: MessagesReply = response.json().await?;
        reply
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .map(Attempt::Done)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Drops a surrounding ```json / ``` fence.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{http::StatusCode as HttpStatus, routing::post, Json, Router};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Serves `router` on a local port and returns the messages URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/messages")
    }

    /// A messages endpoint that always replies with `text` as its only text block.
    pub(crate) async fn replying(text: &'static str) -> String {
        serve(Router::new().route(
            "/v1/messages",
            post(move || async move {
                Json(serde_json::json!({
                    "content": [{"type": "text", "text": text}],
                }))
            }),
        ))
        .await
    }

    fn client(endpoint: String, budget: Duration) -> LlmClient {
        LlmClient::new("test-key".to_string(), budget)
            .unwrap()
            .with_endpoint(endpoint)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        value: u32,
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        assert_eq!(strip_json_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        assert_eq!(strip_json_fences("```\n{\"a\": 1}\n```  "), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_json_fences_unterminated_and_bare() {
        assert_eq!(strip_json_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_json_fences(" {\"a\": 1} "), "{\"a\": 1}");
    }

    #[tokio::test]
    async fn test_fenced_reply_is_parsed() {
        let url = replying("```json\n{\"value\": 7}\n```").await;
        let answer: Answer = client(url, Duration::from_secs(5))
            .complete_json("p", "s")
            .await
            .unwrap();
        assert_eq!(answer, Answer { value: 7 });
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let url = serve(Router::new().route(
            "/v1/messages",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (
                        HttpStatus::UNAUTHORIZED,
                        Json(serde_json::json!({"error": {"message": "bad key"}})),
                    )
                }
            }),
        ))
        .await;

        let err = client(url, Duration::from_secs(5))
            .complete_json::<Answer>("p", "s")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 401, ref message } if message == "bad key"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_reported() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let url = serve(Router::new().route(
            "/v1/messages",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    HttpStatus::SERVICE_UNAVAILABLE
                }
            }),
        ))
        .await;

        let err = client(url, Duration::from_secs(10))
            .complete_json::<Answer>("p", "s")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), ATTEMPTS);
    }

    #[tokio::test]
    async fn test_budget_covers_retries() {
        let url = serve(Router::new().route(
            "/v1/messages",
            post(|| async { HttpStatus::BAD_GATEWAY }),
        ))
        .await;
        // The first backoff alone outlasts the budget.
        let err = client(url, Duration::from_millis(200))
            .complete_json::<Answer>("p", "s")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout(_)));
    }
}
