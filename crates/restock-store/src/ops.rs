//! Store operations shared by the poll loop and the command handlers.
//!
//! Every operation is a single SQL statement over a borrowed connection, so
//! each call is atomic without explicit transactions. Callers run these from
//! async tasks via `spawn_blocking`.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use restock_types::ChatId;

use crate::error::StoreError;

/// Registers a chat as an alert recipient.
///
/// Registration is idempotent: the recipient set has set semantics, and
/// re-registering an existing chat is not an error. Returns `true` when the
/// chat was newly added, `false` when it was already registered.
pub fn register_recipient(conn: &Connection, chat: ChatId) -> Result<bool, StoreError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO recipients (chat_id) VALUES (?1)",
        params![chat.0],
    )?;
    Ok(inserted > 0)
}

/// Returns a point-in-time snapshot of all registered recipients.
pub fn list_recipients(conn: &Connection) -> Result<Vec<ChatId>, StoreError> {
    let mut stmt = conn.prepare("SELECT chat_id FROM recipients ORDER BY chat_id")?;
    let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;

    let mut recipients = Vec::new();
    for row in rows {
        recipients.push(ChatId(row?));
    }
    Ok(recipients)
}

/// Returns the last observed status for a record.
///
/// `None` covers both "never observed" and "observed with no status": the
/// trigger rule only needs to know whether the new status differs from a
/// previously present one, so the two cases are deliberately collapsed.
pub fn last_status(conn: &Connection, record_id: &str) -> Result<Option<String>, StoreError> {
    let stored: Option<Option<String>> = conn
        .query_row(
            "SELECT last_status FROM record_status WHERE record_id = ?1",
            params![record_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(stored.flatten())
}

/// Upserts the last observed status for a record.
///
/// Called for every fetched record every cycle, whether or not an alert
/// fired. An absent status is persisted as NULL.
pub fn set_last_status(
    conn: &Connection,
    record_id: &str,
    status: Option<&str>,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO record_status (record_id, last_status) VALUES (?1, ?2)
         ON CONFLICT(record_id) DO UPDATE SET
             last_status = excluded.last_status,
             updated_at = datetime('now')",
        params![record_id, status],
    )?;
    Ok(())
}

/// Returns the poll checkpoint, or `None` before the first successful cycle.
///
/// # Errors
///
/// Returns `StoreError::InvalidTimestamp` if the stored text is not valid
/// RFC 3339. That only happens when the database was edited by hand; the
/// caller treats it like any other store failure and aborts the cycle.
pub fn checkpoint(conn: &Connection) -> Result<Option<DateTime<Utc>>, StoreError> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT last_checked FROM watch_state WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match stored {
        Some(text) => {
            let parsed = DateTime::parse_from_rfc3339(&text)
                .map_err(|source| StoreError::InvalidTimestamp { value: text, source })?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}

/// Persists the poll checkpoint as RFC 3339 UTC text.
pub fn set_checkpoint(conn: &Connection, at: DateTime<Utc>) -> Result<(), StoreError> {
    let text = at.to_rfc3339_opts(SecondsFormat::Millis, true);
    conn.execute(
        "INSERT INTO watch_state (id, last_checked) VALUES (1, ?1)
         ON CONFLICT(id) DO UPDATE SET
             last_checked = excluded.last_checked,
             updated_at = datetime('now')",
        params![text],
    )?;
    Ok(())
}
