use crate::types::{Attachment, AttachmentKind};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("'{0}' is not an image")]
    NotAnImage(String),
}

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("heic", "image/heic"),
];

/// Image MIME type for a file name, judged by its extension.
pub fn image_mime_type(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Split `data:<mime>;base64,<payload>` into `(mime, payload)`.
pub fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    Some((mime, payload))
}

impl Attachment {
    /// Inline an image file as a base64 data URL. Anything that is not an
    /// image is rejected.
    pub fn from_image_bytes(name: &str, bytes: &[u8]) -> Result<Self, AttachmentError> {
        let mime = image_mime_type(name).ok_or_else(|| AttachmentError::NotAnImage(name.to_string()))?;
        Ok(Self {
            kind: AttachmentKind::Image,
            name: name.to_string(),
            data: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
        })
    }
}
