use thiserror::Error;

/// Errors surfaced by Bot API calls.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The request failed in transit or the response body did not decode.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("unexpected HTTP status {status} from bot api")]
    UnexpectedStatus { status: u16 },

    /// The API answered `ok: false`.
    #[error("bot api rejected the call: {description}")]
    Api { description: String },
}
