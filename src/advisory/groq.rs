//! Groq chat completions client.
//!
//! Groq exposes an OpenAI-compatible endpoint:
//!   POST {base_url}/chat/completions
//! with a Bearer API key and `{model, messages}` as the JSON body. The answer
//! is `choices[0].message.content`.
//!
//! API Documentation: https://console.groq.com/docs/api-reference#chat-create

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{AdvisoryError, ChatMessage, CompletionClient};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "groq/compound";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Groq API Request/Response Structures
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

pub struct GroqClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl GroqClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, AdvisoryError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionClient for GroqClient {
    fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, AdvisoryError> {
        let request = ChatCompletionRequest { model: &self.model, messages };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AdvisoryError::Status { code: status.as_u16(), body });
        }

        let body = response.text()?;
        parse_completion(&body)
    }
}

/// Pull the top completion text out of a response body.
pub fn parse_completion(body: &str) -> Result<String, AdvisoryError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AdvisoryError::MalformedResponse("no choices in response".to_string()))?
        .message
        .content
        .ok_or_else(|| AdvisoryError::MalformedResponse("top choice has no content".to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_returns_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": " Water is SAFE. "}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "second"}, "finish_reason": "stop"}
            ]
        }"#;
        assert_eq!(parse_completion(body).unwrap(), " Water is SAFE. ");
    }

    #[test]
    fn test_parse_completion_rejects_empty_choices() {
        let result = parse_completion(r#"{"choices": []}"#);
        assert!(matches!(result, Err(AdvisoryError::MalformedResponse(_))), "got {:?}", result);
    }

    #[test]
    fn test_parse_completion_rejects_null_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        assert!(matches!(parse_completion(body), Err(AdvisoryError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_completion_rejects_non_json() {
        let result = parse_completion("<html>Bad Gateway</html>");
        assert!(matches!(result, Err(AdvisoryError::MalformedResponse(_))));
    }

    #[test]
    fn test_request_serializes_openai_shape() {
        let messages = [ChatMessage::system("persona"), ChatMessage::user("question")];
        let request = ChatCompletionRequest { model: DEFAULT_MODEL, messages: &messages };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "groq/compound");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "question");
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = GroqClient::new("https://api.groq.com/openai/v1/", DEFAULT_MODEL, 5).unwrap();
        assert_eq!(client.endpoint(), "https://api.groq.com/openai/v1/chat/completions");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        // Nothing listens on port 9 locally; the connect fails fast.
        let client = GroqClient::new("http://127.0.0.1:9/openai/v1", DEFAULT_MODEL, 2).unwrap();
        let result = client.complete("gsk_test", &[ChatMessage::user("hi")]);
        assert!(result.is_err(), "got {:?}", result);
    }

    #[test]
    #[ignore] // Don't run in CI - calls the live Groq API
    fn groq_api_answers_simple_question() {
        dotenv::dotenv().ok();
        let api_key = std::env::var("GROQ_API_KEY").expect("GROQ_API_KEY must be set");
        let client = GroqClient::new(GROQ_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS).unwrap();
        let answer = client
            .complete(&api_key, &[ChatMessage::user("Reply with the single word: pond")])
            .expect("live Groq request failed");
        assert!(!answer.trim().is_empty());
    }
}
