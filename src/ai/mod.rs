/// Generation backends for Cebola
///
/// This module is the boundary to the external model service. A backend
/// streams chat replies and, optionally, generates images. The session
/// manager only ever talks to the [`GenerationBackend`] trait.
///
/// # Architecture
///
/// - `sse` - byte-stream line splitting and server-sent-event decoding
/// - `gemini` - Google Gemini (streaming chat + Imagen image generation)
/// - `openai` - any OpenAI-compatible chat completions endpoint
/// - `ollama` - local Ollama server
///
/// The backend is picked from [`ProviderConfig`], which is read from the
/// environment at start-up.
mod gemini;
mod ollama;
mod openai;
pub mod sse;

pub use gemini::{GeminiBackend, parse_gemini_event};
pub use ollama::{OllamaBackend, parse_ollama_stream_line};
pub use openai::{OpenAiBackend, parse_openai_sse_data};

use crate::config::ProviderConfig;
use crate::types::{Attachment, Message, Role};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

// ============================================
// Error Types
// ============================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{provider} error {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{0}")]
    NotConfigured(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

// ============================================
// Request history
// ============================================

/// One entry of the history sent to a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            attachment,
        }
    }
}

impl From<&Message> for ChatTurn {
    /// The backend sees the whole reply: an extracted code block is fenced
    /// back onto the displayed text.
    fn from(msg: &Message) -> Self {
        let mut text = msg.text.clone();
        if let Some(code) = &msg.code {
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(&format!("```{}\n{}\n```", code.language, code.content));
        }
        Self {
            role: msg.role,
            text,
            attachment: msg.attachment.clone(),
        }
    }
}

// ============================================
// Streaming
// ============================================

/// Sending half of a reply stream. Backends push text fragments through it
/// in arrival order; the stream ends when the backend's `stream` call
/// returns and every handle is dropped.
#[derive(Clone)]
pub struct StreamHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl StreamHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn append(&self, piece: &str) {
        if piece.is_empty() {
            return;
        }
        // Receiver gone means nobody is listening anymore; nothing to do.
        let _ = self.tx.send(piece.to_string());
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Stream a reply to `history`, pushing fragments through `handle`.
    async fn stream(&self, history: &[ChatTurn], handle: StreamHandle) -> ChatResult<()>;

    /// Generate an image, returning a URL (or data URL). `None` when the
    /// backend produced nothing or cannot generate images at all.
    async fn generate_image(&self, _prompt: &str) -> ChatResult<Option<String>> {
        Ok(None)
    }
}

const NOT_CONFIGURED: &str = "No AI provider configured. Set GEMINI_API_KEY, OPENAI_API_KEY, or LLM_USE_OLLAMA=true";

/// Stand-in used when no provider is configured; every request fails with a
/// message telling the user what to set.
pub struct UnconfiguredBackend;

#[async_trait]
impl GenerationBackend for UnconfiguredBackend {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn stream(&self, _history: &[ChatTurn], _handle: StreamHandle) -> ChatResult<()> {
        Err(ChatError::NotConfigured(NOT_CONFIGURED.to_string()))
    }

    async fn generate_image(&self, _prompt: &str) -> ChatResult<Option<String>> {
        Err(ChatError::NotConfigured(NOT_CONFIGURED.to_string()))
    }
}

pub fn backend_from_config(config: &ProviderConfig) -> Arc<dyn GenerationBackend> {
    match config {
        ProviderConfig::Gemini {
            api_key,
            model,
            image_model,
        } => Arc::new(GeminiBackend::new(
            api_key.clone(),
            model.clone(),
            image_model.clone(),
        )),
        ProviderConfig::OpenAi {
            api_key,
            base_url,
            model,
            image_model,
        } => Arc::new(OpenAiBackend::new(
            base_url.clone(),
            api_key.clone(),
            model.clone(),
            image_model.clone(),
        )),
        ProviderConfig::Ollama { host, model } => {
            Arc::new(OllamaBackend::new(host, model.clone()))
        }
        ProviderConfig::Unconfigured => Arc::new(UnconfiguredBackend),
    }
}
