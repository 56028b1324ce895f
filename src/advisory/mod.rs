//! Advisory generator: answers pond questions with a language model.
//!
//! The advisor summarizes recent readings, merges that context with the
//! user's question into a prompt, and makes one blocking call through a
//! `CompletionClient`. A missing API key or a failed call never surfaces as
//! an error: the caller gets `Advisory::Unavailable` or `Advisory::Failed`,
//! each with a fixed message. Only store failures propagate.

pub mod groq;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::summary::{DEFAULT_WINDOW, prepare_context};
use crate::logging;
use crate::store::{ReadingStore, StoreError};

pub use groq::GroqClient;

pub const UNAVAILABLE_MESSAGE: &str = "⚠️ Groq API key not configured. AI response unavailable.";
pub const FAILED_MESSAGE: &str = "⚠️ Unable to generate AI response.";

pub const SYSTEM_PERSONA: &str = "You are AquaTrack, an expert aquaculture AI assistant.";

// ---------------------------------------------------------------------------
// Chat types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self { role: "system".to_string(), content: content.to_string() }
    }

    pub fn user(content: &str) -> Self {
        Self { role: "user".to_string(), content: content.to_string() }
    }
}

/// Transport to a chat-completion service.
///
/// Returns the raw text of the top completion; trimming is the advisor's job.
pub trait CompletionClient {
    fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, AdvisoryError>;
}

impl<C: CompletionClient + ?Sized> CompletionClient for &C {
    fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, AdvisoryError> {
        (**self).complete(api_key, messages)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from a completion request. Logged by the advisor, never returned.
#[derive(Debug)]
pub enum AdvisoryError {
    /// Connection, TLS, timeout, or body-read failure.
    Http(reqwest::Error),
    /// Non-2xx response from the API.
    Status { code: u16, body: String },
    /// The response parsed but had no usable completion text.
    MalformedResponse(String),
}

impl fmt::Display for AdvisoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryError::Http(e) => write!(f, "HTTP request failed: {}", e),
            AdvisoryError::Status { code, body } => write!(f, "HTTP error: {}: {}", code, body),
            AdvisoryError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for AdvisoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdvisoryError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AdvisoryError {
    fn from(e: reqwest::Error) -> Self {
        AdvisoryError::Http(e)
    }
}

// ---------------------------------------------------------------------------
// Advisory outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// Trimmed text of the model's top completion.
    Answered(String),
    /// No API key was configured; no request was made.
    Unavailable,
    /// The request was made and failed; the cause has been logged.
    Failed,
}

impl Advisory {
    /// Text shown to the user for this outcome.
    pub fn into_text(self) -> String {
        match self {
            Advisory::Answered(text) => text,
            Advisory::Unavailable => UNAVAILABLE_MESSAGE.to_string(),
            Advisory::Failed => FAILED_MESSAGE.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// User message sent alongside the system persona.
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "\nYou are AquaTrack AI — an intelligent aquaculture assistant.\n\
         Use the following live sensor context to answer user questions clearly.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         User question:\n\
         {query}\n\
         \n\
         Check if the water is SAFE or UNSAFE for fish based on temperature, pH, and dissolved oxygen.\n\
         Provide a concise, helpful answer and recommend actions if needed.\n"
    )
}

// ---------------------------------------------------------------------------
// Advisor
// ---------------------------------------------------------------------------

pub struct Advisor<'a, C> {
    store: &'a dyn ReadingStore,
    api_key: Option<String>,
    client: C,
    window: u32,
}

impl<'a, C: CompletionClient> Advisor<'a, C> {
    /// `api_key` of `None` (or blank) puts the advisor in degraded mode.
    pub fn new(store: &'a dyn ReadingStore, api_key: Option<String>, client: C) -> Self {
        Self {
            store,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
            window: DEFAULT_WINDOW,
        }
    }

    /// Number of recent readings summarized into the prompt context.
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Answer `query` against the current sensor context.
    pub fn advise(&self, query: &str) -> Result<Advisory, StoreError> {
        let Some(api_key) = self.api_key.as_deref() else {
            logging::debug(logging::Component::Advisory, "no API key configured, skipping request");
            return Ok(Advisory::Unavailable);
        };

        let context = prepare_context(self.store, self.window)?;
        let messages = [
            ChatMessage::system(SYSTEM_PERSONA),
            ChatMessage::user(&build_prompt(&context, query)),
        ];

        match self.client.complete(api_key, &messages) {
            Ok(text) => Ok(Advisory::Answered(text.trim().to_string())),
            Err(e) => {
                logging::log_advisory_failure("chat completion", &e);
                Ok(Advisory::Failed)
            }
        }
    }

    /// Like `advise`, flattened to the text shown to the user.
    pub fn ask_groq(&self, query: &str) -> Result<String, StoreError> {
        Ok(self.advise(query)?.into_text())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
