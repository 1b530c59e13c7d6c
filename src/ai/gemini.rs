use super::sse::for_each_event;
use super::{ChatError, ChatResult, ChatTurn, GenerationBackend, StreamHandle};
use crate::attachment::split_data_url;
use crate::types::Role;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    model: String,
    image_model: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, model: String, image_model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            image_model,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

fn to_contents(history: &[ChatTurn]) -> Vec<Content<'_>> {
    history
        .iter()
        .filter_map(|turn| {
            let mut parts = Vec::new();
            if let Some((mime_type, data)) = turn
                .attachment
                .as_ref()
                .and_then(|attachment| split_data_url(&attachment.data))
            {
                parts.push(Part::Inline {
                    inline_data: InlineData { mime_type, data },
                });
            }
            if !turn.text.is_empty() {
                parts.push(Part::Text { text: &turn.text });
            }
            if parts.is_empty() {
                return None;
            }
            let role = match turn.role {
                Role::User => "user",
                Role::Model => "model",
            };
            Some(Content { role, parts })
        })
        .collect()
}

#[derive(Deserialize)]
struct StreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Text carried by one `streamGenerateContent` SSE event; `None` if the
/// payload is not a Gemini response.
pub fn parse_gemini_event(data: &str) -> Option<String> {
    let parsed: StreamResponse = serde_json::from_str(data.trim()).ok()?;
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Some(text)
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn stream(&self, history: &[ChatTurn], handle: StreamHandle) -> ChatResult<()> {
        let url = format!(
            "{API_BASE}/models/{}:streamGenerateContent?alt=sse",
            self.model
        );
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                contents: to_contents(history),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                provider: "Gemini",
                status,
                body,
            });
        }

        for_each_event(response, |data| {
            match parse_gemini_event(data) {
                Some(piece) => handle.append(&piece),
                None => warn!("skipping unrecognised Gemini event"),
            }
            false
        })
        .await
    }

    async fn generate_image(&self, prompt: &str) -> ChatResult<Option<String>> {
        let url = format!("{API_BASE}/models/{}:predict", self.image_model);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "instances": [{ "prompt": prompt }],
                "parameters": { "sampleCount": 1 },
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Status {
                provider: "Gemini",
                status,
                body,
            });
        }

        let parsed: PredictResponse = serde_json::from_str(&body)?;
        let image = parsed.predictions.into_iter().find_map(|prediction| {
            let bytes = prediction.bytes_base64_encoded?;
            let mime = prediction.mime_type.unwrap_or_else(|| "image/png".to_string());
            Some(format!("data:{mime};base64,{bytes}"))
        });
        debug!(found = image.is_some(), "gemini image prediction");
        Ok(image)
    }
}
