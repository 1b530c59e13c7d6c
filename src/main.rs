use anyhow::Context;
use cebola::ChatSessionManager;
use cebola::ai::backend_from_config;
use cebola::config::AppConfig;
use cebola::storage::{ChatStore, default_store};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Bundled config for mobile builds (iOS/Android)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

#[cfg(not(target_arch = "wasm32"))]
fn load_dotenv() {
    // First try to load from .env file (desktop dev)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    // Fall back to bundled config (mobile builds)
    load_bundled_config();
}

#[cfg(target_arch = "wasm32")]
fn load_dotenv() {
    load_bundled_config();
}

fn load_bundled_config() {
    for item in dotenvy::from_read_iter(BUNDLED_CONFIG.as_bytes()) {
        let Ok((key, value)) = item else {
            continue;
        };
        // Only set if not already set (allow env override)
        if std::env::var(&key).is_err() {
            // SAFETY: We're setting env vars at startup before any threads are spawned
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to install the log subscriber")
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing()?;

    let config = AppConfig::from_env();
    let backend = backend_from_config(&config.provider);
    let store = ChatStore::new(default_store(config.data_dir.as_deref()));
    let manager = Arc::new(ChatSessionManager::new(backend, store));

    dioxus::LaunchBuilder::new()
        .with_context(manager)
        .launch(cebola::ui::App);
    Ok(())
}
