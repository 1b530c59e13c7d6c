use crate::session::SessionState;
use crate::ui::use_manager;
use crate::views::shared::format_chat_date;
use dioxus::prelude::*;

#[component]
pub fn Sidebar(session: Signal<SessionState>) -> Element {
    let manager = use_manager();
    let state = session.read();
    let active_id = state.active_chat_id.clone();

    let on_new_chat = {
        let manager = manager.clone();
        move |_| {
            manager.start_new_chat();
        }
    };

    rsx! {
        aside { class: "sidebar",
            div { class: "sidebar-brand",
                div { class: "avatar model", "C" }
                span { "Cebola" }
            }
            button { class: "btn btn-primary", onclick: on_new_chat, "+ New Chat" }
            nav { class: "sidebar-list",
                for chat in state.sorted_chats() {
                    SidebarItem {
                        key: "{chat.id}",
                        chat_id: chat.id.clone(),
                        title: chat.title.clone(),
                        created_at: chat.created_at,
                        is_active: active_id.as_deref() == Some(chat.id.as_str()),
                    }
                }
            }
            div { class: "sidebar-footer", "Chat history is saved on this device." }
        }
    }
}

#[component]
fn SidebarItem(chat_id: String, title: String, created_at: i64, is_active: bool) -> Element {
    let manager = use_manager();
    let class = if is_active {
        "sidebar-item active"
    } else {
        "sidebar-item"
    };

    let on_select = {
        let manager = manager.clone();
        let chat_id = chat_id.clone();
        move |_| manager.set_active_chat_id(Some(chat_id.clone()))
    };
    let on_delete = move |evt: MouseEvent| {
        evt.stop_propagation();
        manager.delete_chat(&chat_id);
    };

    rsx! {
        div { class: "{class}", onclick: on_select,
            div { class: "sidebar-item-text",
                span { class: "sidebar-item-title", "{title}" }
                if let Some(date) = format_chat_date(created_at) {
                    span { class: "sidebar-item-date", "{date}" }
                }
            }
            button {
                class: "sidebar-delete",
                aria_label: "Delete chat",
                onclick: on_delete,
                "✕"
            }
        }
    }
}
