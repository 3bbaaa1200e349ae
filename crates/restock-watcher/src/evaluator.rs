//! The diff rule: which fetched records become alerts.

use rusqlite::Connection;

use restock_store::{last_status, set_last_status, StoreError};
use restock_types::{RecordSnapshot, TriggerEvent, TriggerSet};

/// Diffs every fetched record against its remembered status and returns the
/// alerts to send, in fetch order.
///
/// The new status is persisted for every record whether or not it fires, so
/// the next cycle diffs against what was seen this cycle. A record fires
/// when its status is present, is in the trigger set, and differs from the
/// remembered one. A record never seen before counts as a transition, so a
/// first observation already in a trigger status fires.
pub fn evaluate_records(
    conn: &Connection,
    records: &[RecordSnapshot],
    triggers: &TriggerSet,
) -> Result<Vec<TriggerEvent>, StoreError> {
    let mut events = Vec::new();

    for record in records {
        let previous = last_status(conn, &record.id)?;
        set_last_status(conn, &record.id, record.status.as_deref())?;

        let status = match record.status.as_deref() {
            Some(status) => status,
            None => continue,
        };
        if !triggers.contains(status) {
            continue;
        }
        if previous.as_deref() == Some(status) {
            continue;
        }

        events.push(TriggerEvent {
            title: record.title.clone(),
            status: status.to_string(),
            url: record.url.clone(),
        });
    }

    Ok(events)
}
