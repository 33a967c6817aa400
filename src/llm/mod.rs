//! Local LLM integration via Ollama.
//!
//! Everything model-facing goes through the [`LlmClient`] trait so the OCR
//! and explanation features can be tested against a mock without a running
//! Ollama instance.

pub mod explain;
pub mod ocr;
pub mod ollama;

pub use ollama::OllamaClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot connect to Ollama at {0}. Is Ollama running?")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Ollama returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Failed to parse model response: {0}")]
    ResponseParsing(String),
}

/// Blocking LLM inference client. Implementations must be shareable across
/// request handlers (callers wrap invocations in `spawn_blocking`).
pub trait LlmClient: Send + Sync {
    /// Text-only generation.
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, LlmError>;

    /// Generation with one base64-encoded image attached (vision models).
    fn generate_with_image(
        &self,
        model: &str,
        prompt: &str,
        image_base64: &str,
        system: &str,
    ) -> Result<String, LlmError>;
}

/// Canned-response client for tests.
pub struct MockLlmClient {
    response: String,
    fail: bool,
}

impl MockLlmClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            fail: false,
        }
    }

    /// A client whose every call fails with a connection error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            fail: true,
        }
    }

    fn respond(&self) -> Result<String, LlmError> {
        if self.fail {
            Err(LlmError::Connection("http://mock:11434".into()))
        } else {
            Ok(self.response.clone())
        }
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _model: &str, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.respond()
    }

    fn generate_with_image(
        &self,
        _model: &str,
        _prompt: &str,
        _image_base64: &str,
        _system: &str,
    ) -> Result<String, LlmError> {
        self.respond()
    }
}
