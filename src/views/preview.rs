use crate::export::preview_download;
use crate::types::{PreviewContent, PreviewKind};
use crate::ui::use_manager;
use crate::views::shared::{deliver_download, markdown_to_html, print_document};
use dioxus::prelude::*;

#[component]
pub fn PreviewPanel(content: PreviewContent) -> Element {
    let manager = use_manager();
    let mut export_status = use_signal(|| Option::<String>::None);
    let download = preview_download(&content);
    let download_label = download.label;
    let title = content.title();

    rsx! {
        section { class: "preview-panel",
            header { class: "preview-header",
                h3 { "{title}" }
                div { class: "preview-actions",
                    if let Some(status) = export_status() {
                        span { class: "export-status", "{status}" }
                    }
                    button {
                        class: "btn-ghost",
                        onclick: move |_| export_status.set(deliver_download(&download)),
                        "{download_label}"
                    }
                    if content.kind == PreviewKind::Document {
                        button {
                            class: "btn-ghost",
                            onclick: move |_| async move { print_document().await },
                            "Download PDF"
                        }
                    }
                    button {
                        class: "btn-ghost",
                        aria_label: "Close preview",
                        onclick: move |_| manager.close_preview(),
                        "✕"
                    }
                }
            }
            div { class: "preview-body",
                match content.kind {
                    PreviewKind::Html => rsx! {
                        iframe {
                            title: "{title}",
                            "srcdoc": "{content.content}",
                            "sandbox": "allow-scripts allow-modals allow-forms",
                        }
                    },
                    PreviewKind::Document => rsx! {
                        div {
                            class: "preview-document md",
                            dangerous_inner_html: markdown_to_html(&content.content),
                        }
                    },
                }
            }
        }
    }
}
