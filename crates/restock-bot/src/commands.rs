//! The Telegram command interface.
//!
//! Long-polls `getUpdates` and answers two kinds of messages: `/start`
//! registers the chat for alerts and offers the group keyboard, any other
//! text is an on-demand query listing the records of that group (or the
//! whole database for the all-button). Queries go straight to the fetcher;
//! they never touch the watch loop's checkpoint or remembered statuses.

use std::time::Duration;

use tokio::time::sleep;

use restock_store::StoreError;
use restock_telegram::{Message, ReplyKeyboardMarkup};
use restock_types::{ChatId, RecordSnapshot};

use crate::AppState;

/// Seconds to wait after a failed `getUpdates` poll before retrying.
const POLL_BACKOFF_SECONDS: u64 = 5;

/// Runs the update loop forever. Per-message failures are logged and never
/// stop the loop.
pub async fn run_command_loop(state: AppState) {
    tracing::info!("starting telegram command loop");
    let mut offset = 0i64;

    loop {
        match state
            .telegram
            .get_updates(offset, state.commands.poll_timeout_seconds)
            .await
        {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if let Some(message) = update.message {
                        handle_message(&state, message).await;
                    }
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "getUpdates poll failed, backing off");
                sleep(Duration::from_secs(POLL_BACKOFF_SECONDS)).await;
            }
        }
    }
}

async fn handle_message(state: &AppState, message: Message) {
    let chat = ChatId(message.chat.id);
    let text = match message.text.as_deref() {
        Some(text) => text.trim(),
        None => return,
    };

    if text == "/start" || text.starts_with("/start@") {
        handle_start(state, chat).await;
    } else {
        handle_query(state, chat, text).await;
    }
}

/// `/start`: register the chat and offer the group keyboard.
async fn handle_start(state: &AppState, chat: ChatId) {
    let pool = state.pool.clone();
    let registered = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(StoreError::from)?;
        restock_store::register_recipient(&conn, chat)
    })
    .await;

    match registered {
        Ok(Ok(newly_added)) => {
            if newly_added {
                tracing::info!(chat = %chat, "registered new recipient");
            }
        }
        Ok(Err(err)) => {
            tracing::error!(chat = %chat, error = %err, "failed to register recipient");
            return;
        }
        Err(err) => {
            tracing::error!(error = %err, "registration task failed");
            return;
        }
    }

    let buttons = state
        .commands
        .groups
        .iter()
        .cloned()
        .chain(std::iter::once(state.commands.all_label.clone()));
    let keyboard = ReplyKeyboardMarkup::single_row(buttons);
    let text = format!(
        "✅ You are subscribed to alerts!\nPick a group or '{}':",
        state.commands.all_label
    );

    if let Err(err) = state
        .telegram
        .send_message_with_keyboard(chat, &text, &keyboard)
        .await
    {
        tracing::warn!(chat = %chat, error = %err, "failed to send subscription reply");
    }
}

/// Any other text: list the matching records.
async fn handle_query(state: &AppState, chat: ChatId, text: &str) {
    let result = if text == state.commands.all_label {
        state.notion.query_all().await
    } else {
        state.notion.query_group(text).await
    };

    let reply = match result {
        Ok(records) => format_records(&records),
        Err(err) => {
            tracing::error!(chat = %chat, error = %err, "on-demand query failed");
            "Could not reach the database, try again later.".to_string()
        }
    };

    if let Err(err) = state.telegram.send_message(chat, &reply).await {
        tracing::warn!(chat = %chat, error = %err, "failed to send query reply");
    }
}

/// Renders a record list for chat, one block per record.
pub fn format_records(records: &[RecordSnapshot]) -> String {
    if records.is_empty() {
        return "Nothing found.".to_string();
    }

    records
        .iter()
        .map(|record| {
            format!(
                "🔹 {}\n   Group: {}\n   Status: {}",
                record.title,
                record.group.as_deref().unwrap_or("No group"),
                record.status.as_deref().unwrap_or("No status"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(title: &str, group: Option<&str>, status: Option<&str>) -> RecordSnapshot {
        RecordSnapshot {
            id: title.to_lowercase(),
            title: title.to_string(),
            group: group.map(str::to_string),
            status: status.map(str::to_string),
            url: format!("https://notion.example/{}", title.to_lowercase()),
            last_edited: Utc::now(),
        }
    }

    #[test]
    fn formats_records_as_blocks() {
        let text = format_records(&[
            record("Vitamin D", Some("Health"), Some("Expiring")),
            record("Paper", None, None),
        ]);

        assert_eq!(
            text,
            "🔹 Vitamin D\n   Group: Health\n   Status: Expiring\n\n\
             🔹 Paper\n   Group: No group\n   Status: No status"
        );
    }

    #[test]
    fn empty_list_reads_as_nothing_found() {
        assert_eq!(format_records(&[]), "Nothing found.");
    }
}
