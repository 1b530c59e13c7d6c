//! Saving generated artifacts to files.

use crate::types::{CodeBlock, Message, PreviewContent, PreviewKind, Role};
use std::path::{Path, PathBuf};
use tracing::info;

/// Replies longer than this (without code) offer a plain-text download.
const LONG_REPLY_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no writable export directory")]
    NoDirectory,

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub contents: String,
    pub label: &'static str,
}

pub fn preview_download(preview: &PreviewContent) -> Download {
    match preview.kind {
        PreviewKind::Html => Download {
            file_name: "site.html".to_string(),
            contents: preview.content.clone(),
            label: "Download HTML",
        },
        PreviewKind::Document => Download {
            file_name: "document.txt".to_string(),
            contents: preview.content.clone(),
            label: "Download TXT",
        },
    }
}

pub fn code_download(code: &CodeBlock) -> Download {
    Download {
        file_name: format!("code.{}", code.language),
        contents: code.content.clone(),
        label: "Download Code",
    }
}

/// What a finished model reply offers for download: its code block if it has
/// one, otherwise the text when it is long.
pub fn message_download(msg: &Message) -> Option<Download> {
    if msg.role != Role::Model || msg.is_generating {
        return None;
    }
    if let Some(code) = &msg.code {
        return Some(code_download(code));
    }
    if msg.text.chars().count() > LONG_REPLY_CHARS {
        return Some(Download {
            file_name: "document.txt".to_string(),
            contents: msg.text.clone(),
            label: "Download Document (.txt)",
        });
    }
    None
}

/// The user's downloads folder, or the app data folder when there is none.
pub fn default_export_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(|| dirs::data_local_dir().map(|dir| dir.join("cebola").join("exports")))
}

/// Write `download` into `dir`, never overwriting: an existing name gets a
/// ` (n)` suffix.
pub fn save_download(dir: &Path, download: &Download) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = unique_path(dir, &download.file_name);
    std::fs::write(&path, &download.contents).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "exported file");
    Ok(path)
}

pub fn save_to_default_dir(download: &Download) -> Result<PathBuf, ExportError> {
    let dir = default_export_dir().ok_or(ExportError::NoDirectory)?;
    save_download(&dir, download)
}

fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_reply(text: &str) -> Message {
        let mut msg = Message::pending_model(text);
        msg.is_generating = false;
        msg
    }

    #[test]
    fn preview_file_names() {
        assert_eq!(preview_download(&PreviewContent::html("<p/>")).file_name, "site.html");
        assert_eq!(
            preview_download(&PreviewContent::document("# a")).file_name,
            "document.txt"
        );
    }

    #[test]
    fn code_wins_over_long_text() {
        let mut msg = finished_reply(&"x".repeat(500));
        msg.code = Some(CodeBlock {
            language: "py".to_string(),
            content: "print(1)".to_string(),
        });
        let download = message_download(&msg).unwrap();
        assert_eq!(download.file_name, "code.py");
        assert_eq!(download.contents, "print(1)");
    }

    #[test]
    fn short_or_streaming_replies_offer_nothing() {
        assert!(message_download(&finished_reply("short")).is_none());
        assert!(message_download(&Message::pending_model("y".repeat(300))).is_none());
        assert!(message_download(&Message::user("z".repeat(300), None)).is_none());
        assert!(message_download(&finished_reply(&"w".repeat(201))).is_some());
    }

    #[test]
    fn never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let download = preview_download(&PreviewContent::html("<h1>v1</h1>"));

        let first = save_download(dir.path(), &download).unwrap();
        let second = save_download(dir.path(), &download).unwrap();

        assert_eq!(first, dir.path().join("site.html"));
        assert_eq!(second, dir.path().join("site (1).html"));
        assert_eq!(std::fs::read_to_string(first).unwrap(), "<h1>v1</h1>");
    }
}
