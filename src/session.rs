//! Chat session manager.
//!
//! Owns the chat list, the active chat pointer, the global loading flag and the
//! preview panel content, and runs the send protocol against a
//! [`GenerationBackend`]. Every operation takes `&self`; the manager is meant
//! to be shared behind an `Arc` between the UI and in-flight sends.

use crate::ai::{ChatError, ChatTurn, GenerationBackend, StreamHandle};
use crate::extract::extract_code_block;
use crate::prompts::effective_prompt;
use crate::storage::ChatStore;
use crate::types::{Attachment, Chat, InteractionMode, Message, PreviewContent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const TITLE_MAX_CHARS: usize = 30;
const IMAGE_CAPTION: &str = "Here is the image you asked for:";
const IMAGE_APOLOGY: &str = "Sorry, I couldn't generate the image.";

/// Everything the UI renders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub chats: Vec<Chat>,
    pub active_chat_id: Option<String>,
    /// Global: true while any exchange is in flight, whichever chat it targets.
    pub is_loading: bool,
    pub preview: Option<PreviewContent>,
}

impl SessionState {
    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.id == chat_id)
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.chat(self.active_chat_id.as_deref()?)
    }

    /// Newest first, the order the sidebar lists them in.
    pub fn sorted_chats(&self) -> Vec<&Chat> {
        let mut sorted: Vec<&Chat> = self.chats.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }

    fn chat_mut(&mut self, chat_id: &str) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|chat| chat.id == chat_id)
    }

    fn message_mut(&mut self, chat_id: &str, message_id: &str) -> Option<&mut Message> {
        self.chat_mut(chat_id)?.message_mut(message_id)
    }

    /// Id of the chat with the greatest `created_at`; the earliest in list
    /// order wins a tie.
    fn most_recent_chat_id(&self) -> Option<String> {
        let mut newest: Option<&Chat> = None;
        for chat in &self.chats {
            if newest.is_none_or(|best| chat.created_at > best.created_at) {
                newest = Some(chat);
            }
        }
        newest.map(|chat| chat.id.clone())
    }

    fn select(&mut self, chat_id: Option<String>) {
        self.active_chat_id = chat_id;
        self.preview = None;
    }

    fn insert_new_chat(&mut self) -> String {
        let chat = Chat::new();
        let chat_id = chat.id.clone();
        self.chats.insert(0, chat);
        self.select(Some(chat_id.clone()));
        chat_id
    }

    /// The active chat, creating (and activating) one when there is none.
    fn ensure_active_chat(&mut self) -> &mut Chat {
        let existing = self
            .active_chat_id
            .as_deref()
            .and_then(|id| self.chats.iter().position(|chat| chat.id == id));
        let index = match existing {
            Some(index) => index,
            None => {
                self.insert_new_chat();
                0
            }
        };
        &mut self.chats[index]
    }
}

pub struct ChatSessionManager {
    state: Mutex<SessionState>,
    backend: Arc<dyn GenerationBackend>,
    store: ChatStore,
    revision: watch::Sender<u64>,
}

impl ChatSessionManager {
    /// Load persisted chats and activate the most recently created one.
    pub fn new(backend: Arc<dyn GenerationBackend>, store: ChatStore) -> Self {
        let chats = store.load();
        let mut state = SessionState {
            chats,
            ..SessionState::default()
        };
        state.active_chat_id = state.most_recent_chat_id();
        info!(
            chats = state.chats.len(),
            backend = backend.name(),
            "session manager ready"
        );

        let (revision, _) = watch::channel(0);
        Self {
            state: Mutex::new(state),
            backend,
            store,
            revision,
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    /// Ticks after every state change, including streaming chunks for chats
    /// that are not on screen.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn active_chat(&self) -> Option<Chat> {
        self.lock().active_chat().cloned()
    }

    pub fn start_new_chat(&self) -> String {
        let chat_id = self.update(true, SessionState::insert_new_chat);
        info!(%chat_id, "started new chat");
        chat_id
    }

    /// Switch chats. The preview always closes: it belongs to the chat it was
    /// generated in.
    pub fn set_active_chat_id(&self, chat_id: Option<String>) {
        self.update(false, |state| state.select(chat_id));
    }

    pub fn delete_chat(&self, chat_id: &str) {
        self.update(true, |state| {
            let before = state.chats.len();
            state.chats.retain(|chat| chat.id != chat_id);
            if state.chats.len() == before {
                debug!(%chat_id, "delete ignored, no such chat");
                return;
            }
            info!(%chat_id, "deleted chat");

            if state.active_chat_id.as_deref() == Some(chat_id) {
                let next = state.most_recent_chat_id();
                state.select(next);
            }
        });
    }

    pub fn set_preview(&self, preview: Option<PreviewContent>) {
        self.update(false, |state| state.preview = preview);
    }

    pub fn close_preview(&self) {
        self.set_preview(None);
    }

    /// Run one exchange: record the user's message, then either generate an
    /// image or stream a reply into a placeholder model message.
    ///
    /// All updates are addressed by the chat and message ids captured here,
    /// so the exchange completes correctly even if the user switches chats
    /// while it is in flight.
    pub async fn send_message(
        &self,
        text: &str,
        mode: InteractionMode,
        attachment: Option<Attachment>,
    ) {
        let backend_turn = ChatTurn::user(effective_prompt(mode, text), attachment.clone());
        let user_message = Message::user(text, attachment);

        let (chat_id, mut history) = self.update(true, |state| {
            state.is_loading = true;
            let chat = state.ensure_active_chat();
            let history: Vec<ChatTurn> = chat.messages.iter().map(ChatTurn::from).collect();
            chat.messages.push(user_message);
            (chat.id.clone(), history)
        });
        debug!(%chat_id, ?mode, "sending message");

        if mode == InteractionMode::Image {
            self.run_image_exchange(&chat_id, text).await;
            return;
        }

        history.push(backend_turn);
        let reply = Message::pending_model("");
        let message_id = reply.id.clone();
        self.push_message(&chat_id, reply);

        let (handle, mut chunks) = StreamHandle::channel();
        let request = self.backend.stream(&history, handle);
        let relay = async {
            let mut received = String::new();
            while let Some(piece) = chunks.recv().await {
                received.push_str(&piece);
                self.append_chunk(&chat_id, &message_id, &piece);
            }
            received
        };
        let (outcome, received) = tokio::join!(request, relay);

        let full_text = match outcome {
            Ok(()) => received,
            Err(err) => {
                error!(%chat_id, backend = self.backend.name(), "stream failed: {err}");
                with_failure_notice(received, &err)
            }
        };
        self.complete_reply(&chat_id, &message_id, mode, &full_text);
    }

    async fn run_image_exchange(&self, chat_id: &str, prompt: &str) {
        let placeholder = Message::pending_model(format!("Generating an image of: \"{prompt}\"..."));
        let message_id = placeholder.id.clone();
        self.push_message(chat_id, placeholder);

        let image_url = match self.backend.generate_image(prompt).await {
            Ok(url) => url,
            Err(err) => {
                warn!(%chat_id, "image generation failed: {err}");
                None
            }
        };

        self.update(true, |state| {
            if let Some(msg) = state.message_mut(chat_id, &message_id) {
                match image_url {
                    Some(url) => {
                        msg.text = IMAGE_CAPTION.to_string();
                        msg.image_url = Some(url);
                    }
                    None => msg.text = IMAGE_APOLOGY.to_string(),
                }
                msg.is_generating = false;
            }
            state.is_loading = false;
        });
    }

    fn push_message(&self, chat_id: &str, message: Message) {
        self.update(true, |state| {
            if let Some(chat) = state.chat_mut(chat_id) {
                chat.messages.push(message);
            }
        });
    }

    /// Chunks only touch memory; the reply is written out once it completes.
    /// A reply cut short by a crash reloads as whatever was saved before it
    /// started streaming.
    fn append_chunk(&self, chat_id: &str, message_id: &str, piece: &str) {
        self.update(false, |state| match state.message_mut(chat_id, message_id) {
            Some(msg) => msg.text.push_str(piece),
            None => debug!(%chat_id, "chunk for a deleted chat dropped"),
        });
    }

    /// Finalize a streamed reply: split out the code block, open the preview
    /// the mode calls for and give the chat its title.
    fn complete_reply(&self, chat_id: &str, message_id: &str, mode: InteractionMode, full_text: &str) {
        let extraction = extract_code_block(full_text);

        self.update(true, |state| {
            if let Some(msg) = state.message_mut(chat_id, message_id) {
                match &extraction {
                    Some(found) => {
                        msg.text = found.cleaned_text.clone();
                        msg.code = Some(found.code_block());
                    }
                    None => {
                        msg.text = full_text.to_string();
                        msg.code = None;
                    }
                }
                msg.is_generating = false;
            }
            state.is_loading = false;

            match (mode, &extraction) {
                (InteractionMode::Website, Some(found)) if found.language == "html" => {
                    state.preview = Some(PreviewContent::html(found.content.clone()));
                }
                (InteractionMode::Document, _) => {
                    state.preview = Some(PreviewContent::document(full_text));
                }
                _ => {}
            }

            // Re-read the chat as it is now; another exchange may have titled it.
            if let Some(chat) = state.chat_mut(chat_id) {
                if let Some(title) = derive_title(chat) {
                    debug!(%chat_id, %title, "titled chat");
                    chat.title = title;
                }
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f`, persist the chat list when asked to, then notify
    /// subscribers. The lock is never held across an await.
    fn update<R>(&self, persist: bool, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let out = {
            let mut state = self.lock();
            let out = f(&mut state);
            if persist {
                self.store.save(&state.chats);
            }
            out
        };
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
        out
    }
}

fn with_failure_notice(received: String, err: &ChatError) -> String {
    let notice = format!("Sorry, the response could not be completed: {err}");
    if received.is_empty() {
        notice
    } else {
        format!("{received}\n\n{notice}")
    }
}

/// A title for a chat whose first exchange just completed, or `None` if the
/// chat already has one (or is not there yet).
pub fn derive_title(chat: &Chat) -> Option<String> {
    if !chat.has_placeholder_title() || chat.messages.len() < 2 {
        return None;
    }
    let first = chat.messages.first()?;
    let source = if first.text.is_empty() {
        format!("Image: {}", first.attachment.as_ref()?.name)
    } else {
        first.text.clone()
    };
    Some(truncate_title(&source))
}

fn truncate_title(source: &str) -> String {
    let mut chars = source.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
