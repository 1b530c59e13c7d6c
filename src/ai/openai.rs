use super::sse::for_each_event;
use super::{ChatError, ChatResult, ChatTurn, GenerationBackend, StreamHandle};
use crate::types::Role;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

/// Any endpoint speaking the OpenAI chat completions protocol.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    image_model: Option<String>,
}

impl OpenAiBackend {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        image_model: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            image_model,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

fn to_messages(history: &[ChatTurn]) -> Vec<Value> {
    history
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::User => "user",
                Role::Model => "assistant",
            };
            let content = match &turn.attachment {
                Some(attachment) => json!([
                    { "type": "text", "text": turn.text },
                    { "type": "image_url", "image_url": { "url": attachment.data } },
                ]),
                None => json!(turn.text),
            };
            json!({ "role": role, "content": content })
        })
        .collect()
}

#[derive(Deserialize)]
pub struct OAIMessage {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct OAIDelta {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct OAIChoice {
    #[serde(default)]
    pub message: Option<OAIMessage>,
    #[serde(default)]
    pub delta: Option<OAIDelta>,
}

#[derive(Deserialize)]
pub struct OAIChunk {
    pub choices: Vec<OAIChoice>,
}

#[derive(Deserialize)]
pub struct ContentOnly {
    pub content: String,
}

/// Decode one SSE `data` payload into `(fragment, done)`.
pub fn parse_openai_sse_data(data: &str) -> Option<(String, bool)> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed == "[DONE]" {
        return Some((String::new(), true));
    }

    if let Ok(parsed) = serde_json::from_str::<OAIChunk>(trimmed) {
        if let Some(first) = parsed.choices.into_iter().next() {
            if let Some(piece) = first.delta.and_then(|delta| delta.content) {
                return Some((piece, false));
            }
            if let Some(piece) = first.message.and_then(|msg| msg.content) {
                return Some((piece, false));
            }
        }
        return Some((String::new(), false));
    }

    if let Ok(parsed) = serde_json::from_str::<ContentOnly>(trimmed) {
        return Some((parsed.content, false));
    }

    None
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn stream(&self, history: &[ChatTurn], handle: StreamHandle) -> ChatResult<()> {
        let response = self
            .post("/chat/completions")
            .header("accept", "text/event-stream")
            .json(&json!({
                "model": self.model,
                "messages": to_messages(history),
                "stream": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                provider: "OpenAI",
                status,
                body,
            });
        }

        for_each_event(response, |data| match parse_openai_sse_data(data) {
            Some((piece, done)) => {
                handle.append(&piece);
                done
            }
            None => false,
        })
        .await
    }

    async fn generate_image(&self, prompt: &str) -> ChatResult<Option<String>> {
        let Some(model) = &self.image_model else {
            return Ok(None);
        };

        let response = self
            .post("/images/generations")
            .json(&json!({ "model": model, "prompt": prompt, "n": 1 }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Status {
                provider: "OpenAI",
                status,
                body,
            });
        }

        let parsed: ImageResponse = serde_json::from_str(&body)?;
        Ok(parsed.data.into_iter().find_map(|image| {
            image
                .url
                .or_else(|| image.b64_json.map(|b64| format!("data:image/png;base64,{b64}")))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attachment, AttachmentKind};

    #[test]
    fn parses_sse_data() {
        assert!(parse_openai_sse_data("").is_none());
        assert_eq!(
            parse_openai_sse_data("[DONE]"),
            Some((String::new(), true))
        );
        assert_eq!(
            parse_openai_sse_data(r#"{"choices":[{"delta":{"content":"hello"}}]}"#),
            Some(("hello".to_string(), false))
        );
        assert_eq!(
            parse_openai_sse_data(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#),
            Some((String::new(), false))
        );
        assert_eq!(
            parse_openai_sse_data(r#"{"content":"hi"}"#),
            Some(("hi".to_string(), false))
        );
    }

    #[test]
    fn attachments_become_image_parts() {
        let history = vec![
            ChatTurn::user(
                "what is this?",
                Some(Attachment {
                    kind: AttachmentKind::Image,
                    name: "x.jpg".to_string(),
                    data: "data:image/jpeg;base64,AA==".to_string(),
                }),
            ),
            ChatTurn {
                role: Role::Model,
                text: "a dog".to_string(),
                attachment: None,
            },
        ];
        let messages = to_messages(&history);
        assert_eq!(messages[0]["content"][1]["image_url"]["url"], "data:image/jpeg;base64,AA==");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "a dog");
    }
}
