use thiserror::Error;

/// Errors surfaced by the fetch paths.
///
/// Any of these aborts the caller's current unit of work: the poll loop
/// abandons the cycle without advancing its checkpoint and retries on the
/// next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request failed in transit or the response body did not decode.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("unexpected HTTP status {status} from database query")]
    UnexpectedStatus { status: u16 },

    /// The remote reported more pages but did not provide a cursor.
    #[error("remote reported more pages without a next cursor")]
    MissingCursor,

    /// The cursor walk exceeded the page cap without terminating.
    #[error("query exceeded the page limit of {limit} pages")]
    PageLimitExceeded { limit: usize },
}
