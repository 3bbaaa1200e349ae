use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;

use restock_notion::{FetchError, NotionClient};
use restock_types::RecordSnapshot;

/// Fetches the records edited at or after a watermark.
///
/// This trait exists so the poll loop can be tested against deterministic
/// scripted responses without live network access.
pub trait RecordSource: Send + Sync {
    fn changed_since<'a>(
        &'a self,
        watermark: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<RecordSnapshot>, FetchError>>;
}

impl<T> RecordSource for Arc<T>
where
    T: RecordSource + ?Sized,
{
    fn changed_since<'a>(
        &'a self,
        watermark: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<RecordSnapshot>, FetchError>> {
        (**self).changed_since(watermark)
    }
}

impl RecordSource for NotionClient {
    fn changed_since<'a>(
        &'a self,
        watermark: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<RecordSnapshot>, FetchError>> {
        Box::pin(self.query_changed_since(watermark))
    }
}
