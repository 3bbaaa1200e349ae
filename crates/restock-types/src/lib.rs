//! Shared domain types for the restock watcher.
//!
//! This crate defines the types that cross crate boundaries: recipient
//! identifiers, fetched record snapshots, trigger events, and the set of
//! statuses that fire alerts.
//!
//! No crate in the workspace depends on anything *except* `restock-types`
//! for cross-cutting type definitions. This keeps the dependency graph
//! clean and prevents circular dependencies.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Telegram chat registered to receive alerts.
///
/// Wraps the Bot API chat id, which is a signed 64-bit integer (negative
/// for group chats). Serializes as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One record as observed in the remote database during a fetch.
///
/// Snapshots are ephemeral: they exist for the duration of a poll cycle or
/// an on-demand query and are never persisted wholesale. Only the status
/// survives the cycle, in the store's `record_status` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    /// Stable remote identifier of the record.
    pub id: String,
    /// Human-readable title, `"Untitled"` when the remote has none.
    pub title: String,
    /// Group/category name, absent when the property is unset.
    pub group: Option<String>,
    /// Current status value, absent when the property is unset.
    pub status: Option<String>,
    /// Link back to the record in the remote UI.
    pub url: String,
    /// Remote last-modification timestamp.
    pub last_edited: DateTime<Utc>,
}

/// An alert produced by the evaluator when a record transitions into a
/// trigger status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub title: String,
    pub status: String,
    pub url: String,
}

/// The set of status values that fire alerts.
///
/// Membership is exact string match: trimming, case folding, and locale
/// rules are deliberately out of scope. Deserializes from a plain array of
/// strings, so it can sit directly in a TOML config value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerSet(BTreeSet<String>);

impl TriggerSet {
    pub fn new<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(statuses.into_iter().map(Into::into).collect())
    }

    /// Whether `status` fires an alert.
    pub fn contains(&self, status: &str) -> bool {
        self.0.contains(status)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
