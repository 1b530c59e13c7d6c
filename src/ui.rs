use crate::session::{ChatSessionManager, SessionState};
use crate::theme::APP_CSS;
use crate::views::{ChatView, PreviewPanel, Sidebar};
use dioxus::prelude::*;
use std::sync::Arc;

/// The shared manager, provided as root context by `main`.
pub fn use_manager() -> Arc<ChatSessionManager> {
    use_context::<Arc<ChatSessionManager>>()
}

#[component]
pub fn App() -> Element {
    let session = use_session();
    let preview = session.read().preview.clone();

    rsx! {
        style { dangerous_inner_html: "{APP_CSS}" }
        div { class: "app",
            Sidebar { session }
            ChatView { session }
            if let Some(content) = preview {
                PreviewPanel { content }
            }
        }
    }
}

/// Mirror the manager's state into a signal, refreshed on every change the
/// manager reports (including chunks streamed into chats not on screen).
fn use_session() -> Signal<SessionState> {
    let manager = use_manager();
    let session = use_signal({
        let manager = manager.clone();
        move || manager.snapshot()
    });

    use_future(move || {
        let manager = manager.clone();
        let mut session = session;
        async move {
            let mut changes = manager.subscribe();
            session.set(manager.snapshot());
            while changes.changed().await.is_ok() {
                session.set(manager.snapshot());
            }
        }
    });

    session
}
