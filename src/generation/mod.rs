//! Text generation backends for the assistant.
//!
//! `TextGenerator` is synchronous, like the HTTP client behind it. Async
//! callers run it on the blocking pool.

pub mod ollama;

pub use ollama::OllamaGenerator;

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation service not reachable at {0}")]
    Connection(String),

    #[error("Generation request timed out after {0}s")]
    Timeout(u64),

    #[error("Generation service returned status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Unexpected response format: {0}")]
    ResponseParsing(String),

    #[error("Generation service returned an empty response")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Sampling parameters for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: crate::config::DEFAULT_LLM_TEMPERATURE,
            max_tokens: 1000,
        }
    }
}

/// Abstraction over chat-style text generation.
pub trait TextGenerator: Send + Sync {
    /// Model identifier recorded next to stored exchanges.
    fn model(&self) -> &str;

    fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;
}

/// Test generator. Returns a fixed reply (or error) and remembers what it
/// was asked.
pub struct MockGenerator {
    reply: Result<String, u16>,
    delay: Option<std::time::Duration>,
    calls: Mutex<Vec<(Vec<ChatMessage>, GenerationOptions)>>,
}

impl MockGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a service error carrying `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before replying. Used to exercise timeouts.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(Vec<ChatMessage>, GenerationOptions)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl TextGenerator for MockGenerator {
    fn model(&self) -> &str {
        "mock"
    }

    fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((messages.to_vec(), options.clone()));
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(GenerationError::Service {
                status: *status,
                body: "mock failure".into(),
            }),
        }
    }
}
