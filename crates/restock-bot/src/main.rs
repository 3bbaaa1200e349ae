//! Restock bot binary.
//!
//! Starts the watch loop, the Telegram command loop, and an axum health
//! endpoint, with structured logging, database initialization, and graceful
//! shutdown on SIGTERM/SIGINT.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use restock_bot::{app, commands, config, AppState, CommandSettings};
use restock_notion::{NotionClient, NotionConfig, RecordSchema};
use restock_store::DbRuntimeSettings;
use restock_telegram::TelegramClient;
use restock_watcher::{WatchSettings, Watcher};

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("RESTOCK_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the bot cannot start without valid config");
    config
        .validate()
        .expect("incomplete configuration — notion.token, notion.database_id and telegram.token are required");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Initialize database
    let pool = restock_store::create_pool(
        &config.database.path,
        DbRuntimeSettings {
            busy_timeout_ms: config.database.busy_timeout_ms,
            pool_max_size: config.database.pool_max_size,
        },
    )
    .expect("failed to create database pool — check database.path in config");

    {
        let conn = pool
            .get()
            .expect("failed to get database connection for migrations");
        let applied =
            restock_store::run_migrations(&conn).expect("failed to run database migrations");
        if applied > 0 {
            tracing::info!(count = applied, "applied database migrations");
        }
    }

    // Build clients shared by the watch loop and the command interface
    let notion = Arc::new(NotionClient::new(NotionConfig {
        api_url: config.notion.api_url.clone(),
        token: config.notion.token.clone(),
        database_id: config.notion.database_id.clone(),
        schema: RecordSchema {
            title_candidates: config.notion.title_candidates.clone(),
            group_property: config.notion.group_property.clone(),
            status_property: config.notion.status_property.clone(),
        },
    }));
    let telegram = Arc::new(TelegramClient::new(
        config.telegram.api_url.clone(),
        config.telegram.token.clone(),
    ));

    let state = AppState {
        pool: pool.clone(),
        notion: notion.clone(),
        telegram: telegram.clone(),
        commands: Arc::new(CommandSettings {
            groups: config.telegram.groups.clone(),
            all_label: config.telegram.all_label.clone(),
            poll_timeout_seconds: config.telegram.poll_timeout_seconds,
        }),
    };

    // Background tasks
    let watcher = Watcher::new(
        pool.clone(),
        notion.clone(),
        telegram.clone(),
        WatchSettings {
            poll_interval_seconds: config.watch.poll_interval_seconds,
            startup_delay_seconds: config.watch.startup_delay_seconds,
            window_margin_seconds: config.watch.window_margin_seconds,
            triggers: config.watch.trigger_statuses.clone(),
        },
    );
    let watch_task = tokio::spawn(watcher.run());
    let command_task = tokio::spawn(commands::run_command_loop(state.clone()));

    // Serve the health endpoint with graceful shutdown
    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting restock bot");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address — is another process using this port?");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    watch_task.abort();
    command_task.abort();
    tracing::info!("restock bot shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
