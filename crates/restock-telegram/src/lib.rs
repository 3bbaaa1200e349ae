//! Telegram Bot API transport.
//!
//! A thin client over the HTTP Bot API: `sendMessage` for outgoing alerts
//! and replies, `getUpdates` for long-polled incoming messages. Delivery
//! policy (fan-out, failure isolation) lives with the caller; this crate
//! only speaks the protocol.

mod client;
mod error;
mod wire;

pub use client::{TelegramClient, TELEGRAM_API_URL};
pub use error::TelegramError;
pub use wire::{Chat, Message, ReplyKeyboardMarkup, Update};
