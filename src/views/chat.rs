use crate::session::SessionState;
use crate::types::{Attachment, InteractionMode, Role};
use crate::ui::use_manager;
use crate::views::MessageBubble;
use crate::views::shared::show_alert;
use dioxus::events::Key;
use dioxus::prelude::*;
use tracing::warn;

#[component]
pub fn ChatView(session: Signal<SessionState>) -> Element {
    let manager = use_manager();
    let mut input = use_signal(String::new);
    let mut mode = use_signal(InteractionMode::default);
    let mut attachment = use_signal(|| Option::<Attachment>::None);

    let state = session.read();
    let is_loading = state.is_loading;
    let active_chat = state.active_chat().cloned();
    drop(state);

    let send_message = use_callback(move |_: ()| {
        let text = input();
        if session.read().is_loading || (text.trim().is_empty() && attachment.read().is_none()) {
            return;
        }
        let manager = manager.clone();
        let mode = mode();
        let attached = attachment.take();
        input.set(String::new());
        spawn(async move {
            manager.send_message(&text, mode, attached).await;
        });
    });

    let on_file = move |evt: FormEvent| async move {
        let mut attachment = attachment;
        let Some(engine) = evt.files() else {
            return;
        };
        let Some(name) = engine.files().into_iter().next() else {
            return;
        };
        let Some(bytes) = engine.read_file(&name).await else {
            warn!(%name, "could not read attached file");
            return;
        };
        let file_name = std::path::Path::new(&name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&name)
            .to_string();
        match Attachment::from_image_bytes(&file_name, &bytes) {
            Ok(image) => attachment.set(Some(image)),
            Err(err) => {
                warn!("attachment rejected: {err}");
                show_alert(&err.to_string());
            }
        }
    };

    let current_mode = mode();
    let waiting_for_reply = is_loading
        && active_chat
            .as_ref()
            .and_then(|chat| chat.messages.last())
            .is_some_and(|msg| msg.role != Role::Model);

    rsx! {
        div { class: "chat-view",
            div { class: "chat-list",
                match active_chat.as_ref().filter(|chat| !chat.messages.is_empty()) {
                    Some(chat) => rsx! {
                        div { class: "chat-inner",
                            for msg in chat.messages.iter() {
                                MessageBubble { key: "{msg.id}", message: msg.clone() }
                            }
                            if waiting_for_reply {
                                div { class: "shimmer-text", "Working..." }
                            }
                        }
                    },
                    None => rsx! { StartScreen {} },
                }
            }

            div { class: "composer",
                div { class: "composer-inner",
                    div { class: "mode-buttons",
                        for option in InteractionMode::ALL {
                            button {
                                class: if option == current_mode { "mode-button active" } else { "mode-button" },
                                r#type: "button",
                                onclick: move |_| mode.set(option),
                                "{option.label()}"
                            }
                        }
                    }
                    if let Some(attached) = attachment() {
                        div { class: "attachment-chip",
                            img { src: "{attached.data}", alt: "{attached.name}" }
                            span { class: "sidebar-item-title", "{attached.name}" }
                            button {
                                class: "btn-ghost",
                                aria_label: "Remove attachment",
                                onclick: move |_| attachment.set(None),
                                "✕"
                            }
                        }
                    }
                    div { class: "composer-row",
                        label { class: "attach-label", aria_label: "Attach image",
                            "📎"
                            input { r#type: "file", accept: "image/*", multiple: false, onchange: on_file }
                        }
                        textarea {
                            rows: "1",
                            placeholder: "{current_mode.placeholder()}",
                            value: "{input}",
                            oninput: move |ev| input.set(ev.value()),
                            onkeydown: move |ev| {
                                if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                    ev.prevent_default();
                                    send_message(());
                                }
                            },
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            disabled: is_loading || (input().trim().is_empty() && attachment.read().is_none()),
                            onclick: move |_| send_message(()),
                            if is_loading { "..." } else { "{current_mode.button_label()}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn StartScreen() -> Element {
    rsx! {
        div { class: "start-screen",
            div { class: "avatar model", "C" }
            h2 { "How can I help you today?" }
            p {
                "Pick a mode below (Chat, Website, Image or Document) and tell me what you need. "
                "You can attach an image to get started."
            }
            div { class: "start-examples",
                h3 { "Try these:" }
                ul {
                    li { "Chat about the latest trends in AI." }
                    li { "Build a dark-themed portfolio website." }
                    li { "Generate an image of an astronaut riding a horse." }
                    li { "Write a professional email to a client." }
                }
            }
        }
    }
}
