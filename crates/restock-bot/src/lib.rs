//! Bot wiring: shared state, the command loop, and the health endpoint.

pub mod commands;
pub mod config;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use restock_notion::NotionClient;
use restock_store::DbPool;
use restock_telegram::TelegramClient;

/// Settings for the command interface.
#[derive(Debug, Clone)]
pub struct CommandSettings {
    /// Group buttons offered on the reply keyboard.
    pub groups: Vec<String>,
    /// Label of the show-everything button.
    pub all_label: String,
    /// Seconds the `getUpdates` long poll is held open server-side.
    pub poll_timeout_seconds: u64,
}

/// Application state shared by the command loop and request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Notion client, shared with the watch loop.
    pub notion: Arc<NotionClient>,
    /// Telegram client, shared with the watch loop.
    pub telegram: Arc<TelegramClient>,
    /// Command interface settings.
    pub commands: Arc<CommandSettings>,
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}
