//! The Notion API client and its shared cursor walk.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;

use restock_types::RecordSnapshot;

use crate::error::FetchError;
use crate::schema::RecordSchema;
use crate::wire::{QueryRequest, QueryResponse};

/// API version pinned in the `Notion-Version` header.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Results requested per page, the maximum the API allows.
pub const PAGE_SIZE: u32 = 100;

/// Upper bound on pages walked per query. A database larger than
/// `MAX_PAGES * PAGE_SIZE` records (or a remote that keeps reporting
/// `has_more`) fails the query instead of looping.
pub const MAX_PAGES: usize = 50;

/// Connection settings for [`NotionClient`].
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Base URL, `https://api.notion.com` in production.
    pub api_url: String,
    pub token: String,
    pub database_id: String,
    pub schema: RecordSchema,
}

/// Client for one Notion database.
pub struct NotionClient {
    client: reqwest::Client,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetches every record edited at or after `since`.
    pub async fn query_changed_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<RecordSnapshot>, FetchError> {
        let filter = json!({
            "timestamp": "last_edited_time",
            "last_edited_time": {
                "on_or_after": since.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        });
        self.collect_pages(Some(filter)).await
    }

    /// Fetches the whole database.
    pub async fn query_all(&self) -> Result<Vec<RecordSnapshot>, FetchError> {
        self.collect_pages(None).await
    }

    /// Fetches the records whose group select equals `group`.
    pub async fn query_group(&self, group: &str) -> Result<Vec<RecordSnapshot>, FetchError> {
        let filter = json!({
            "property": self.config.schema.group_property,
            "select": { "equals": group },
        });
        self.collect_pages(Some(filter)).await
    }

    /// Walks the cursor chain for one query and maps every page through the
    /// schema. Results keep the remote's order.
    async fn collect_pages(
        &self,
        filter: Option<serde_json::Value>,
    ) -> Result<Vec<RecordSnapshot>, FetchError> {
        let url = format!(
            "{}/v1/databases/{}/query",
            self.config.api_url, self.config.database_id
        );

        let mut snapshots = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if pages == MAX_PAGES {
                return Err(FetchError::PageLimitExceeded { limit: MAX_PAGES });
            }

            let request = QueryRequest {
                filter: filter.as_ref(),
                start_cursor: cursor.take(),
                page_size: PAGE_SIZE,
            };

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.config.token)
                .header("Notion-Version", NOTION_VERSION)
                .json(&request)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(FetchError::UnexpectedStatus {
                    status: response.status().as_u16(),
                });
            }

            let page: QueryResponse = response.json().await?;
            pages += 1;

            snapshots.extend(page.results.iter().map(|p| self.config.schema.snapshot(p)));

            if !page.has_more {
                break;
            }
            cursor = Some(page.next_cursor.ok_or(FetchError::MissingCursor)?);
        }

        tracing::debug!(pages, records = snapshots.len(), "database query complete");
        Ok(snapshots)
    }
}
