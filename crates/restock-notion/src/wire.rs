//! Wire types for the Notion database query endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/databases/{id}/query`.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    pub page_size: u32,
}

/// One page of query results.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// A page object as returned inside `results`.
///
/// Properties stay as raw JSON; [`RecordSchema`](crate::RecordSchema) digs
/// the interesting values out of them.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    pub url: String,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}
