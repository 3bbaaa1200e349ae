use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

use restock_telegram::{TelegramClient, TelegramError};
use restock_types::ChatId;

/// A failed delivery to one recipient.
///
/// Deliberately opaque: the dispatcher logs it and moves on, it never
/// branches on the cause. Whatever produced it, the failed recipient simply
/// misses this alert.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DeliveryError {
    message: String,
}

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<TelegramError> for DeliveryError {
    fn from(err: TelegramError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Delivers one rendered alert to one recipient.
pub trait Notifier: Send + Sync {
    fn send<'a>(&'a self, chat: ChatId, text: &'a str) -> BoxFuture<'a, Result<(), DeliveryError>>;
}

impl<T> Notifier for Arc<T>
where
    T: Notifier + ?Sized,
{
    fn send<'a>(&'a self, chat: ChatId, text: &'a str) -> BoxFuture<'a, Result<(), DeliveryError>> {
        (**self).send(chat, text)
    }
}

impl Notifier for TelegramClient {
    fn send<'a>(&'a self, chat: ChatId, text: &'a str) -> BoxFuture<'a, Result<(), DeliveryError>> {
        Box::pin(async move {
            self.send_message(chat, text).await?;
            Ok(())
        })
    }
}
