use super::sse::for_each_line;
use super::{ChatError, ChatResult, ChatTurn, GenerationBackend, StreamHandle};
use crate::attachment::split_data_url;
use crate::types::Role;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub struct OllamaBackend {
    client: Client,
    model: String,
    endpoint: String,
}

impl OllamaBackend {
    pub fn new(host: &str, model: String) -> Self {
        Self {
            client: Client::new(),
            model,
            endpoint: format!("{}/api/chat", host.trim_end_matches('/')),
        }
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<&'a str>,
}

fn to_messages(history: &[ChatTurn]) -> Vec<OllamaMessage<'_>> {
    history
        .iter()
        .map(|turn| OllamaMessage {
            role: match turn.role {
                Role::User => "user",
                Role::Model => "assistant",
            },
            content: &turn.text,
            images: turn
                .attachment
                .as_ref()
                .and_then(|attachment| split_data_url(&attachment.data))
                .map(|(_, payload)| vec![payload])
                .unwrap_or_default(),
        })
        .collect()
}

#[derive(Deserialize, Debug)]
pub struct StreamChunkMessage {
    pub content: String,
}

#[derive(Deserialize, Debug)]
pub struct StreamChunk {
    pub message: Option<StreamChunkMessage>,
    pub done: Option<bool>,
}

pub fn parse_ollama_stream_line(line_with_ws: &str) -> Option<(String, bool)> {
    let line = line_with_ws.trim();
    if line.is_empty() {
        return None;
    }
    if let Ok(parsed) = serde_json::from_str::<StreamChunk>(line) {
        let piece = parsed.message.map(|msg| msg.content).unwrap_or_default();
        let done = parsed.done.unwrap_or(false);
        return Some((piece, done));
    }
    None
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn stream(&self, history: &[ChatTurn], handle: StreamHandle) -> ChatResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&OllamaChatRequest {
                model: &self.model,
                messages: to_messages(history),
                stream: true,
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                provider: "Ollama",
                status,
                body,
            });
        }

        for_each_line(response, |line| match parse_ollama_stream_line(line) {
            Some((piece, done)) => {
                handle.append(&piece);
                done
            }
            None => {
                if !line.trim().is_empty() {
                    warn!("skipping unparseable Ollama line");
                }
                false
            }
        })
        .await
    }
}
