use crate::export::{Download, message_download};
use crate::types::{AttachmentKind, CodeBlock, Message, PreviewContent, Role};
use crate::ui::use_manager;
use crate::views::shared::{copy_to_clipboard, deliver_download, markdown_to_html};
use dioxus::prelude::*;

/// Languages that need a server to run, so they get no live preview.
const SERVER_LANGUAGES: &[&str] = &["php", "rb", "py"];

#[component]
pub fn MessageBubble(message: Message) -> Element {
    let is_user = message.role == Role::User;
    let role_class = if is_user { "user" } else { "model" };
    let download = message_download(&message);

    rsx! {
        div { class: "message-row {role_class}",
            if !is_user {
                div { class: "avatar model", "C" }
            }
            div { class: "message-stack",
                div { class: "bubble {role_class}",
                    if message.is_generating && message.text.is_empty() {
                        div { class: "shimmer-text", "Thinking..." }
                    }
                    if let Some(attachment) = message.attachment.as_ref().filter(|a| a.kind == AttachmentKind::Image) {
                        img { class: "attachment-image", src: "{attachment.data}", alt: "{attachment.name}" }
                    }
                    if !message.text.is_empty() {
                        if is_user {
                            "{message.text}"
                        } else {
                            div { class: "md", dangerous_inner_html: markdown_to_html(&message.text) }
                        }
                    }
                    if let Some(url) = message.image_url.as_ref() {
                        img { src: "{url}", alt: "Generated image" }
                    }
                    if let Some(code) = message.code.clone() {
                        CodeRenderer { code }
                    }
                }
                if let Some(download) = download {
                    DownloadAction { download }
                }
            }
            if is_user {
                div { class: "avatar", "U" }
            }
        }
    }
}

#[component]
fn DownloadAction(download: Download) -> Element {
    let mut export_status = use_signal(|| Option::<String>::None);
    let label = download.label;

    rsx! {
        div { class: "message-actions",
            button {
                class: "btn-ghost",
                onclick: move |_| export_status.set(deliver_download(&download)),
                "{label}"
            }
        }
        if let Some(status) = export_status() {
            div { class: "message-status", "{status}" }
        }
    }
}

#[component]
pub fn CodeRenderer(code: CodeBlock) -> Element {
    let manager = use_manager();
    let language = code.language.to_lowercase();
    let server_only = SERVER_LANGUAGES.contains(&language.as_str());
    let is_html = language == "html";
    let highlighted = markdown_to_html(&format!("```{}\n{}\n```", code.language, code.content));

    let copy_payload = code.content.clone();
    let preview_payload = code.content.clone();

    rsx! {
        div { class: "code-block",
            div { class: "code-header",
                span { "{code.language.to_uppercase()}" }
                div { class: "preview-actions",
                    if is_html {
                        button {
                            class: "btn-ghost",
                            onclick: move |_| manager.set_preview(Some(PreviewContent::html(preview_payload.clone()))),
                            "Preview"
                        }
                    }
                    button {
                        class: "btn-ghost",
                        onclick: move |_| copy_to_clipboard(copy_payload.clone()),
                        "Copy Code"
                    }
                }
            }
            div { class: "code-body md", dangerous_inner_html: highlighted }
            if server_only {
                div { class: "code-warning",
                    strong { "Note: " }
                    "{code.language.to_uppercase()} is a server-side language. A live preview cannot be shown here."
                }
            }
        }
    }
}
