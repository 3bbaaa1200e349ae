//! Notion database client for the restock watcher.
//!
//! Wraps the Notion `POST /v1/databases/{id}/query` endpoint behind three
//! read paths: everything changed since a watermark, the whole database, and
//! a single group. All three share one cursor-walking primitive, so
//! pagination, page caps, and protocol violations are handled in exactly one
//! place.
//!
//! Property interpretation is driven by a [`RecordSchema`], since the page
//! payload is schemaless JSON and the interesting property names vary per
//! database.

mod client;
mod error;
mod schema;
mod wire;

pub use client::{NotionClient, NotionConfig, MAX_PAGES, NOTION_VERSION, PAGE_SIZE};
pub use error::FetchError;
pub use schema::RecordSchema;
pub use wire::{Page, QueryRequest, QueryResponse};
