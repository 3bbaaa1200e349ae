//! Fan-out of one alert to every registered recipient.

use restock_types::{ChatId, TriggerEvent};

use crate::notify::Notifier;

/// Per-recipient outcome of dispatching one alert.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: Vec<ChatId>,
    pub failed: Vec<DeliveryFailure>,
}

#[derive(Debug)]
pub struct DeliveryFailure {
    pub chat: ChatId,
    pub reason: String,
}

/// Renders the alert text shown to recipients.
pub fn render_alert(event: &TriggerEvent) -> String {
    format!(
        "⚠️ Status update!\n\n{}\nStatus: {}\n{}",
        event.title, event.status, event.url
    )
}

/// Delivers one alert to each recipient independently.
///
/// A failed recipient is logged and recorded in the report; it never stops
/// delivery to the remaining recipients. There is no retry: a recipient that
/// fails simply misses this alert.
pub async fn dispatch<N: Notifier>(
    notifier: &N,
    event: &TriggerEvent,
    recipients: &[ChatId],
) -> DeliveryReport {
    let text = render_alert(event);
    let mut report = DeliveryReport::default();

    for &chat in recipients {
        match notifier.send(chat, &text).await {
            Ok(()) => report.delivered.push(chat),
            Err(err) => {
                tracing::warn!(chat = %chat, error = %err, "alert delivery failed");
                report.failed.push(DeliveryFailure {
                    chat,
                    reason: err.to_string(),
                });
            }
        }
    }

    report
}
