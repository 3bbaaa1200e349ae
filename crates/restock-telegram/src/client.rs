//! The Bot API client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use restock_types::ChatId;

use crate::error::TelegramError;
use crate::wire::{
    ApiResponse, GetUpdatesRequest, Message, ReplyKeyboardMarkup, SendMessageRequest, Update,
};

/// Production Bot API base URL.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Client for one bot token.
pub struct TelegramClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            token: token.into(),
        }
    }

    /// Sends a plain text message.
    pub async fn send_message(&self, chat: ChatId, text: &str) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id: chat.0,
            text,
            reply_markup: None,
        };
        let _: Message = self.call("sendMessage", &request, None).await?;
        Ok(())
    }

    /// Sends a text message with a reply keyboard attached.
    pub async fn send_message_with_keyboard(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: &ReplyKeyboardMarkup,
    ) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id: chat.0,
            text,
            reply_markup: Some(keyboard),
        };
        let _: Message = self.call("sendMessage", &request, None).await?;
        Ok(())
    }

    /// Long-polls for updates at or after `offset`.
    ///
    /// The server holds the request open for up to `timeout_seconds`; the
    /// client-side timeout is padded above that so a quiet period is not
    /// mistaken for a network failure.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_seconds: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_seconds,
        };
        let timeout = Duration::from_secs(timeout_seconds + 10);
        self.call("getUpdates", &request, Some(timeout)).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError> {
        let url = format!("{}/bot{}/{}", self.api_url, self.token, method);

        let mut request = self.client.post(&url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            // API errors come back as non-2xx with an `ok: false` JSON body.
            // Surface the description when the body decodes as one.
            if let Ok(api) = response.json::<ApiResponse<serde_json::Value>>().await {
                if let Some(description) = api.description {
                    return Err(TelegramError::Api { description });
                }
            }
            return Err(TelegramError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let api: ApiResponse<T> = response.json().await?;
        if !api.ok {
            return Err(TelegramError::Api {
                description: api
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        api.result.ok_or(TelegramError::Api {
            description: "response had ok: true but no result".to_string(),
        })
    }
}
