//! Direct REST client for OpenAI-compatible chat completion endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::CompletionBackend;
use crate::config::ApiConfig;
use crate::error::{BanterError, Result};
use crate::message::Message;

/// Cap on generated tokens per completion.
pub const MAX_COMPLETION_TOKENS: u32 = 500;

/// Fixed sampling temperature for every completion.
pub const SAMPLING_TEMPERATURE: f32 = 0.7;

/// Requests that exceed this surface as an `Api` error instead of hanging.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Backend implementation that talks to an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiClient {
    /// Creates a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| BanterError::config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: SAMPLING_TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| BanterError::api(format!("failed to parse completion response: {err}")))?;

        extract_text_response(parsed)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| BanterError::api("completion response contained no content"))
}

fn map_http_error(status: StatusCode, body: String) -> BanterError {
    // Providers wrap errors as {"error": {"message": ...}}; fall back to the
    // raw body when the shape differs.
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    BanterError::Api {
        message,
        status_code: Some(status.as_u16()),
        timed_out: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn request_wire_shape_matches_provider_contract() {
        let messages = vec![
            Message::system("be terse"),
            Message::user("hello"),
            Message::assistant("hi"),
        ];
        let request = ChatCompletionRequest {
            model: "openai/gpt-4o",
            messages: &messages,
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: SAMPLING_TEMPERATURE,
        };

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "openai/gpt-4o");
        assert_eq!(value["max_tokens"], 500);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][2]["role"], "assistant");
        assert_eq!(value["messages"][1]["content"], "hello");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn empty_choice_list_is_api_error() {
        let response = ChatCompletionResponse { choices: vec![] };

        let err = extract_text_response(response).unwrap_err();
        assert!(err.is_api());
    }

    #[test]
    fn missing_content_is_api_error() {
        let response = ChatCompletionResponse {
            choices: vec![Choice {
                message: ResponseMessage { content: None },
            }],
        };

        assert!(extract_text_response(response).is_err());
    }

    #[test]
    fn http_error_uses_provider_message_when_parseable() {
        let body = r#"{"error": {"message": "rate limit exceeded"}}"#.to_string();

        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body);

        assert_eq!(err.to_string(), "Completion API error: rate limit exceeded");
        assert!(matches!(
            err,
            BanterError::Api {
                status_code: Some(429),
                ..
            }
        ));
    }

    #[test]
    fn http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());

        assert!(err.to_string().contains("upstream down"));
    }
}
