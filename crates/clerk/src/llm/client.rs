//! HTTP client for the Groq chat-completions endpoint.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::ClerkConfig;

use super::error::{ApiErrorResponse, LlmError};
use super::types::{ChatCompletion, ChatRequest};
use super::ChatModel;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Chat-completion client for Groq's OpenAI-compatible API.
///
/// The model is chosen per request, so one client serves both the primary
/// and the fallback model.
#[derive(Clone)]
pub struct GroqClient {
    inner: Arc<GroqClientInner>,
}

struct GroqClientInner {
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a new client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &ClerkConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .expect("Invalid API key for header");
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(GroqClientInner { client }),
        }
    }

    /// Send a chat request and get the complete response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error
    /// response. A 400 mentioning tools maps to
    /// [`LlmError::ToolsUnsupported`] so the caller can retry without them.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatCompletion, LlmError> {
        let response = self
            .inner
            .client
            .post(GROQ_API_URL)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| LlmError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(handle_error_status(status, response).await)
        }
    }
}

impl ChatModel for GroqClient {
    fn chat(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatCompletion, LlmError>> + Send {
        Self::chat(self, request)
    }
}

async fn handle_error_status(status: reqwest::StatusCode, response: reqwest::Response) -> LlmError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return LlmError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return LlmError::Unauthorized("Invalid API key".to_string());
    }

    match response.text().await {
        Ok(body) => {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                let message = api_error.error.message;
                if status == reqwest::StatusCode::BAD_REQUEST
                    && message.to_lowercase().contains("tool")
                {
                    return LlmError::ToolsUnsupported(message);
                }
                LlmError::Api {
                    error_type: api_error
                        .error
                        .error_type
                        .unwrap_or_else(|| "unknown".to_string()),
                    message,
                }
            } else {
                LlmError::Api {
                    error_type: "unknown".to_string(),
                    message: body,
                }
            }
        }
        Err(e) => LlmError::Http(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<GroqClient>();
    }

    #[test]
    fn test_groq_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GroqClient>();
    }
}
