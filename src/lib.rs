//! Cebola: a chat session manager for a conversational assistant.
//!
//! The core (sessions, persistence, code extraction, generation backends) is
//! plain Rust and builds without any UI. The Dioxus front end lives behind
//! the `web`, `desktop` and `mobile` features.

pub mod ai;
pub mod attachment;
pub mod config;
pub mod export;
pub mod extract;
pub mod prompts;
pub mod session;
pub mod storage;
pub mod theme;
pub mod types;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;

pub use session::{ChatSessionManager, SessionState};
