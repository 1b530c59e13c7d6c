//! Local persistence for the chat history.
//!
//! This module provides:
//! - A `KeyValueStore` abstraction standing in for browser local storage
//! - A file-backed store for native platforms and an in-memory one for WASM
//! - `ChatStore`, which keeps the whole chat list under a single key

use crate::types::Chat;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, warn};

/// Key under which the full chat list is stored.
pub const CHATS_KEY: &str = "cebola_chats";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored chats are not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================
// Key-value backends
// ============================================

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// One JSON file per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write to a sibling then rename so a crash never leaves half a file.
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value)?;
        std::fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Sanitize a storage key for filesystem use
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}

/// Directory for native storage: `<data_dir>/storage` when a data directory
/// is configured, otherwise under the platform's local data directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn default_storage_dir(data_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = data_dir {
        return dir.join("storage");
    }

    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("cebola").join("storage");
    }

    PathBuf::from("cache").join("storage")
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store(data_dir: Option<&Path>) -> Box<dyn KeyValueStore> {
    Box::new(FileStore::new(default_storage_dir(data_dir)))
}

#[cfg(target_arch = "wasm32")]
pub fn default_store(_data_dir: Option<&Path>) -> Box<dyn KeyValueStore> {
    Box::new(MemoryStore::new())
}

// ============================================
// Chat list adapter
// ============================================

/// Persists the whole chat list as one JSON array under [`CHATS_KEY`].
///
/// Failures never propagate: they are logged and the caller carries on with
/// an empty or unsaved list.
pub struct ChatStore {
    backend: Box<dyn KeyValueStore>,
}

impl ChatStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn load(&self) -> Vec<Chat> {
        match self.try_load() {
            Ok(mut chats) => {
                settle_interrupted(&mut chats);
                debug!(count = chats.len(), "loaded chats");
                chats
            }
            Err(err) => {
                error!("failed to load chats from storage: {err}");
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> StorageResult<Vec<Chat>> {
        match self.backend.get(CHATS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Write the list, or drop the key entirely once the list is empty.
    pub fn save(&self, chats: &[Chat]) {
        if let Err(err) = self.try_save(chats) {
            error!("failed to save chats to storage: {err}");
        }
    }

    fn try_save(&self, chats: &[Chat]) -> StorageResult<()> {
        if chats.is_empty() {
            return self.backend.remove(CHATS_KEY);
        }
        let json = serde_json::to_string(chats)?;
        self.backend.set(CHATS_KEY, &json)
    }
}

/// Replies that were still streaming when the app last closed will never
/// finish; clear their flag so they render as ordinary messages.
fn settle_interrupted(chats: &mut [Chat]) {
    for chat in chats.iter_mut() {
        for msg in chat.messages.iter_mut().filter(|msg| msg.is_generating) {
            warn!(chat_id = %chat.id, message_id = %msg.id, "settling interrupted reply");
            msg.is_generating = false;
        }
    }
}
