//! Integration tests for the chat session manager
//!
//! Drives full exchanges against scripted backends and checks what ends up in
//! the session state and in storage.

use async_trait::async_trait;
use cebola::ai::{ChatError, ChatResult, ChatTurn, GenerationBackend, StreamHandle};
use cebola::storage::{CHATS_KEY, ChatStore, MemoryStore};
use cebola::types::{Attachment, AttachmentKind, InteractionMode, PLACEHOLDER_TITLE, PreviewKind, Role};
use cebola::{ChatSessionManager, SessionState};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
struct ScriptedBackend {
    chunks: Vec<&'static str>,
    stream_error: Option<&'static str>,
    image_url: Option<&'static str>,
    image_error: bool,
    histories: Mutex<Vec<Vec<ChatTurn>>>,
    image_prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn replying(chunks: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.to_vec(),
            ..Self::default()
        })
    }

    fn last_history(&self) -> Vec<ChatTurn> {
        self.histories.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn stream(&self, history: &[ChatTurn], handle: StreamHandle) -> ChatResult<()> {
        self.histories.lock().unwrap().push(history.to_vec());
        for chunk in &self.chunks {
            handle.append(chunk);
            tokio::task::yield_now().await;
        }
        match self.stream_error {
            Some(msg) => Err(ChatError::NotConfigured(msg.to_string())),
            None => Ok(()),
        }
    }

    async fn generate_image(&self, prompt: &str) -> ChatResult<Option<String>> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());
        if self.image_error {
            return Err(ChatError::NotConfigured("image quota exceeded".to_string()));
        }
        Ok(self.image_url.map(str::to_string))
    }
}

/// Streams one chunk, then waits for the test to release it before the rest.
struct GatedBackend {
    gate: Arc<Notify>,
}

#[async_trait]
impl GenerationBackend for GatedBackend {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn stream(&self, _history: &[ChatTurn], handle: StreamHandle) -> ChatResult<()> {
        handle.append("first half, ");
        self.gate.notified().await;
        handle.append("second half");
        Ok(())
    }
}

fn manager(backend: Arc<dyn GenerationBackend>) -> ChatSessionManager {
    ChatSessionManager::new(backend, ChatStore::in_memory())
}

fn active(state: &SessionState) -> &cebola::types::Chat {
    state.active_chat().expect("an active chat")
}

fn cat_picture() -> Attachment {
    Attachment {
        kind: AttachmentKind::Image,
        name: "cat.png".to_string(),
        data: "data:image/png;base64,iVBORw0KGgo=".to_string(),
    }
}

mod chat_mode {
    use super::*;

    #[tokio::test]
    async fn test_streamed_reply_is_accumulated() {
        let backend = ScriptedBackend::replying(&["Hel", "lo, ", "world"]);
        let manager = manager(backend.clone());

        manager.send_message("Say hello", InteractionMode::Chat, None).await;

        let state = manager.snapshot();
        let chat = active(&state);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, Role::User);
        assert_eq!(chat.messages[0].text, "Say hello");
        assert_eq!(chat.messages[1].role, Role::Model);
        assert_eq!(chat.messages[1].text, "Hello, world");
        assert!(!chat.messages[1].is_generating);
        assert!(chat.messages[1].code.is_none());
        assert_eq!(chat.title, "Say hello");
        assert!(!state.is_loading);
        assert!(state.preview.is_none());
    }

    #[tokio::test]
    async fn test_code_block_is_split_out_without_preview() {
        let backend = ScriptedBackend::replying(&["Here:\n```rust\nfn main() {}\n```\nDone"]);
        let manager = manager(backend);

        manager.send_message("write main", InteractionMode::Chat, None).await;

        let state = manager.snapshot();
        let reply = &active(&state).messages[1];
        assert_eq!(reply.text, "Here:\n\nDone");
        let code = reply.code.as_ref().unwrap();
        assert_eq!(code.language, "rust");
        assert_eq!(code.content, "fn main() {}");
        assert!(state.preview.is_none());
    }

    #[tokio::test]
    async fn test_history_includes_earlier_turns() {
        let backend = ScriptedBackend::replying(&["ok"]);
        let manager = manager(backend.clone());

        manager.send_message("first", InteractionMode::Chat, None).await;
        manager.send_message("second", InteractionMode::Chat, None).await;

        let history = backend.last_history();
        let texts: Vec<&str> = history.iter().map(|turn| turn.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "ok", "second"]);
        assert_eq!(history[1].role, Role::Model);

        let state = manager.snapshot();
        assert_eq!(state.chats.len(), 1);
        assert_eq!(active(&state).messages.len(), 4);
        assert_eq!(active(&state).title, "first");
    }

    #[tokio::test]
    async fn test_long_first_message_title_is_truncated() {
        let backend = ScriptedBackend::replying(&["sure"]);
        let manager = manager(backend);

        manager
            .send_message("Explain recursion please in great detail", InteractionMode::Chat, None)
            .await;

        let state = manager.snapshot();
        assert_eq!(active(&state).title, "Explain recursion please in gr...");
    }

    #[tokio::test]
    async fn test_attachment_only_message() {
        let backend = ScriptedBackend::replying(&["A cat."]);
        let manager = manager(backend.clone());

        manager
            .send_message("", InteractionMode::Chat, Some(cat_picture()))
            .await;

        let state = manager.snapshot();
        let chat = active(&state);
        assert_eq!(chat.title, "Image: cat.png");
        assert_eq!(chat.messages[0].attachment, Some(cat_picture()));
        assert_eq!(backend.last_history()[0].attachment, Some(cat_picture()));
    }

    #[tokio::test]
    async fn test_stream_failure_keeps_partial_text() {
        let backend = Arc::new(ScriptedBackend {
            chunks: vec!["Partial answer"],
            stream_error: Some("connection reset"),
            ..ScriptedBackend::default()
        });
        let manager = manager(backend);

        manager.send_message("question", InteractionMode::Chat, None).await;

        let state = manager.snapshot();
        let reply = &active(&state).messages[1];
        assert!(reply.text.starts_with("Partial answer\n\n"));
        assert!(reply.text.contains("connection reset"));
        assert!(!reply.is_generating);
        assert!(!state.is_loading);
        assert_eq!(active(&state).title, "question");
    }
}

mod generation_modes {
    use super::*;

    #[tokio::test]
    async fn test_website_html_opens_preview() {
        let backend = ScriptedBackend::replying(&["Your site:\n```html\n<h1>Hi</h1>\n```"]);
        let manager = manager(backend.clone());

        manager
            .send_message("a landing page", InteractionMode::Website, None)
            .await;

        let state = manager.snapshot();
        let preview = state.preview.as_ref().expect("preview opened");
        assert_eq!(preview.kind, PreviewKind::Html);
        assert_eq!(preview.content, "<h1>Hi</h1>");

        // The chat shows the raw text; the backend got the wrapped prompt.
        assert_eq!(active(&state).messages[0].text, "a landing page");
        let sent = &backend.last_history()[0].text;
        assert!(sent.ends_with("Description: \"a landing page\""));
        assert_ne!(sent, "a landing page");
    }

    #[tokio::test]
    async fn test_follow_up_sees_generated_site() {
        let backend = ScriptedBackend::replying(&["```html\n<h1>Bakery</h1>\n```"]);
        let manager = manager(backend.clone());

        manager.send_message("a bakery site", InteractionMode::Website, None).await;
        manager
            .send_message("make the header blue", InteractionMode::Chat, None)
            .await;

        let state = manager.snapshot();
        assert_eq!(active(&state).messages[1].text, "");

        let history = backend.last_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::Model);
        assert!(history[1].text.contains("<h1>Bakery</h1>"));
        assert!(history[1].text.starts_with("```html"));
        assert_eq!(history[2].text, "make the header blue");
    }

    #[tokio::test]
    async fn test_website_without_html_leaves_preview_closed() {
        let backend = ScriptedBackend::replying(&["```css\nbody { color: red; }\n```"]);
        let manager = manager(backend);

        manager.send_message("styles", InteractionMode::Website, None).await;

        let state = manager.snapshot();
        assert!(state.preview.is_none());
        let reply = &active(&state).messages[1];
        assert_eq!(reply.code.as_ref().unwrap().language, "css");
        assert_eq!(reply.text, "");
    }

    #[tokio::test]
    async fn test_document_always_opens_preview() {
        let full = "# Report\n\nSome findings.";
        let backend = ScriptedBackend::replying(&["# Report\n\n", "Some findings."]);
        let manager = manager(backend.clone());

        manager.send_message("a report", InteractionMode::Document, None).await;

        let state = manager.snapshot();
        let preview = state.preview.as_ref().expect("preview opened");
        assert_eq!(preview.kind, PreviewKind::Document);
        assert_eq!(preview.content, full);
        assert_eq!(preview.language.as_deref(), Some("markdown"));
        assert_eq!(active(&state).messages[1].text, full);
        assert!(backend.last_history()[0].text.contains("Description: \"a report\""));
    }

    #[tokio::test]
    async fn test_image_success() {
        let backend = Arc::new(ScriptedBackend {
            image_url: Some("data:image/png;base64,AAAA"),
            ..ScriptedBackend::default()
        });
        let manager = manager(backend.clone());

        manager.send_message("a red fox", InteractionMode::Image, None).await;

        let state = manager.snapshot();
        let chat = active(&state);
        let reply = &chat.messages[1];
        assert_eq!(reply.image_url.as_deref(), Some("data:image/png;base64,AAAA"));
        assert!(!reply.text.is_empty());
        assert!(!reply.is_generating);
        assert_eq!(chat.title, PLACEHOLDER_TITLE);
        assert!(!state.is_loading);
        assert!(backend.histories.lock().unwrap().is_empty());
        assert_eq!(*backend.image_prompts.lock().unwrap(), vec!["a red fox".to_string()]);
    }

    #[tokio::test]
    async fn test_image_failure_apologizes() {
        for backend in [
            Arc::new(ScriptedBackend::default()),
            Arc::new(ScriptedBackend {
                image_error: true,
                ..ScriptedBackend::default()
            }),
        ] {
            let manager = manager(backend);
            manager.send_message("a red fox", InteractionMode::Image, None).await;

            let state = manager.snapshot();
            let reply = &active(&state).messages[1];
            assert!(reply.image_url.is_none());
            assert!(reply.text.starts_with("Sorry"));
            assert!(!reply.is_generating);
            assert!(!state.is_loading);
        }
    }
}

mod switching {
    use super::*;

    #[tokio::test]
    async fn test_chunks_land_in_original_chat() {
        let gate = Arc::new(Notify::new());
        let manager = manager(Arc::new(GatedBackend { gate: gate.clone() }));
        let mut changes = manager.subscribe();

        let send = manager.send_message("long question", InteractionMode::Chat, None);
        let switch = async {
            // Wait for the first half to land, then move to a new chat.
            loop {
                changes.changed().await.unwrap();
                let state = manager.snapshot();
                let first_half_arrived = state
                    .active_chat()
                    .and_then(|chat| chat.messages.get(1))
                    .is_some_and(|msg| msg.text == "first half, ");
                if first_half_arrived {
                    break;
                }
            }
            let original = manager.snapshot().active_chat_id.unwrap();
            let fresh = manager.start_new_chat();
            gate.notify_one();
            (original, fresh)
        };
        let ((), (original, fresh)) = tokio::join!(send, switch);

        let state = manager.snapshot();
        assert_eq!(state.active_chat_id.as_deref(), Some(fresh.as_str()));
        assert!(state.chat(&fresh).unwrap().messages.is_empty());
        assert!(state.preview.is_none());

        let original = state.chat(&original).unwrap();
        assert_eq!(original.messages[1].text, "first half, second half");
        assert!(!original.messages[1].is_generating);
        assert_eq!(original.title, "long question");
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_send_without_chat_creates_one() {
        let manager = manager(ScriptedBackend::replying(&["hi"]));
        assert!(manager.snapshot().chats.is_empty());

        manager.send_message("hello", InteractionMode::Chat, None).await;

        let state = manager.snapshot();
        assert_eq!(state.chats.len(), 1);
        assert_eq!(state.active_chat_id.as_deref(), Some(state.chats[0].id.as_str()));
    }
}

mod persistence {
    use super::*;

    #[tokio::test]
    async fn test_chats_survive_restart() {
        let storage = Arc::new(MemoryStore::new());
        let backend = ScriptedBackend::replying(&["pong"]);

        let first = ChatSessionManager::new(backend.clone(), ChatStore::new(Box::new(storage.clone())));
        first.send_message("ping", InteractionMode::Chat, None).await;
        let saved = first.snapshot();

        let second = ChatSessionManager::new(backend, ChatStore::new(Box::new(storage.clone())));
        let restored = second.snapshot();
        assert_eq!(restored.chats, saved.chats);
        assert_eq!(restored.active_chat_id, saved.active_chat_id);
        assert!(restored.preview.is_none());
        assert!(!restored.is_loading);
    }

    #[tokio::test]
    async fn test_deleting_last_chat_clears_storage() {
        let storage = Arc::new(MemoryStore::new());
        let manager = ChatSessionManager::new(
            ScriptedBackend::replying(&["pong"]),
            ChatStore::new(Box::new(storage.clone())),
        );

        manager.send_message("ping", InteractionMode::Chat, None).await;
        assert!(storage.contains(CHATS_KEY));

        let chat_id = manager.snapshot().active_chat_id.unwrap();
        manager.delete_chat(&chat_id);

        assert!(!storage.contains(CHATS_KEY));
        let state = manager.snapshot();
        assert!(state.chats.is_empty());
        assert!(state.active_chat_id.is_none());
    }
}
