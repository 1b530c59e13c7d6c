use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Title every chat starts with until its first exchange completes.
pub const PLACEHOLDER_TITLE: &str = "New Chat";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    #[default]
    Image,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type", default)]
    pub kind: AttachmentKind,
    pub name: String,
    /// Inline `data:<mime>;base64,<payload>` URL.
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_generating: bool,
}

impl Message {
    pub fn user(text: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self {
            id: new_id(),
            role: Role::User,
            text: text.into(),
            image_url: None,
            code: None,
            attachment,
            is_generating: false,
        }
    }

    /// An in-flight model reply; text is filled in as the response arrives.
    pub fn pending_model(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role: Role::Model,
            text: text.into(),
            image_url: None,
            code: None,
            attachment: None,
            is_generating: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl Chat {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            title: PLACEHOLDER_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now_millis(),
        }
    }

    pub fn has_placeholder_title(&self) -> bool {
        self.title == PLACEHOLDER_TITLE
    }

    pub fn message_mut(&mut self, message_id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|msg| msg.id == message_id)
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Html,
    Document,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreviewContent {
    #[serde(rename = "type")]
    pub kind: PreviewKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl PreviewContent {
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            kind: PreviewKind::Html,
            content: content.into(),
            language: None,
        }
    }

    pub fn document(content: impl Into<String>) -> Self {
        Self {
            kind: PreviewKind::Document,
            content: content.into(),
            language: Some("markdown".to_string()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            PreviewKind::Html => "Website Preview",
            PreviewKind::Document => "Document Preview",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Chat,
    Website,
    Image,
    Document,
}

impl InteractionMode {
    pub const ALL: [InteractionMode; 4] = [
        InteractionMode::Chat,
        InteractionMode::Website,
        InteractionMode::Image,
        InteractionMode::Document,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InteractionMode::Chat => "Chat",
            InteractionMode::Website => "Website",
            InteractionMode::Image => "Image",
            InteractionMode::Document => "Document",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            InteractionMode::Chat => "Talk to Cebola...",
            InteractionMode::Website => "Describe the website you want to build...",
            InteractionMode::Image => "Describe the image you want to generate...",
            InteractionMode::Document => "Describe the document or text you want to write...",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            InteractionMode::Chat => "Send",
            _ => "Generate",
        }
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
