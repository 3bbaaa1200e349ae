//! The poll loop and its per-cycle pipeline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::time::sleep;

use restock_notion::FetchError;
use restock_store::{DbPool, StoreError};
use restock_types::TriggerSet;

use crate::dispatcher::dispatch;
use crate::evaluator::evaluate_records;
use crate::notify::Notifier;
use crate::source::RecordSource;

/// Tunables for the watch loop.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    /// Seconds between cycles. Zero disables the loop.
    pub poll_interval_seconds: u64,
    /// Seconds to wait before the first cycle, letting startup settle.
    pub startup_delay_seconds: u64,
    /// Seconds subtracted from the watermark at fetch time. Widens the
    /// window against clock skew between this process and the remote; the
    /// diff rule suppresses re-observed statuses, so overlap never causes
    /// duplicate alerts.
    pub window_margin_seconds: u64,
    /// Statuses that fire alerts.
    pub triggers: TriggerSet,
}

/// What one successful cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle_start: DateTime<Utc>,
    /// Checkpoint persisted at the end of the cycle.
    pub checkpoint: DateTime<Utc>,
    pub fetched: usize,
    pub triggered: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Errors that abort a cycle.
///
/// None of these escape [`Watcher::run`]; the loop logs them and retries on
/// the next tick. The checkpoint is untouched, so the failed window is
/// re-fetched.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The watch loop: fetch, diff, dispatch, advance the checkpoint.
pub struct Watcher<S, N> {
    pool: DbPool,
    source: S,
    notifier: N,
    settings: WatchSettings,
}

impl<S, N> Watcher<S, N>
where
    S: RecordSource,
    N: Notifier,
{
    pub fn new(pool: DbPool, source: S, notifier: N, settings: WatchSettings) -> Self {
        Self {
            pool,
            source,
            notifier,
            settings,
        }
    }

    /// Runs cycles forever. Errors are logged and never escape.
    pub async fn run(self) {
        if self.settings.poll_interval_seconds == 0 {
            tracing::warn!("watch loop disabled (poll_interval_seconds=0)");
            return;
        }

        let interval = Duration::from_secs(self.settings.poll_interval_seconds);
        tracing::info!(
            poll_interval_seconds = self.settings.poll_interval_seconds,
            startup_delay_seconds = self.settings.startup_delay_seconds,
            "starting watch loop"
        );

        sleep(Duration::from_secs(self.settings.startup_delay_seconds)).await;

        loop {
            match self.run_cycle().await {
                Ok(summary) => {
                    if summary.triggered > 0 {
                        tracing::info!(
                            fetched = summary.fetched,
                            triggered = summary.triggered,
                            delivered = summary.delivered,
                            failed = summary.failed,
                            "watch cycle complete"
                        );
                    } else {
                        tracing::debug!(fetched = summary.fetched, "watch cycle quiet");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "watch cycle aborted, checkpoint not advanced");
                }
            }

            sleep(interval).await;
        }
    }

    /// Runs one cycle.
    ///
    /// A record fetched this cycle is fully evaluated before dispatch
    /// starts, and the checkpoint only advances after every alert of the
    /// cycle has been attempted. On the first run ever (no stored
    /// checkpoint) the watermark is one day before the cycle start.
    pub async fn run_cycle(&self) -> Result<CycleSummary, CycleError> {
        let cycle_start = Utc::now();

        let pool = self.pool.clone();
        let stored = tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(StoreError::from)?;
            restock_store::checkpoint(&conn)
        })
        .await??;

        let watermark = stored.unwrap_or_else(|| cycle_start - chrono::Duration::days(1));
        let window_start =
            watermark - chrono::Duration::seconds(self.settings.window_margin_seconds as i64);

        let records = self.source.changed_since(window_start).await?;

        let pool = self.pool.clone();
        let triggers = self.settings.triggers.clone();
        let fetched = records.clone();
        let (events, recipients) = tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(StoreError::from)?;
            let events = evaluate_records(&conn, &fetched, &triggers)?;
            let recipients = restock_store::list_recipients(&conn)?;
            Ok::<_, StoreError>((events, recipients))
        })
        .await??;

        let mut delivered = 0;
        let mut failed = 0;
        for event in &events {
            let report = dispatch(&self.notifier, event, &recipients).await;
            delivered += report.delivered.len();
            failed += report.failed.len();
        }

        // Monotonic even if the wall clock stepped backwards between cycles.
        let next_checkpoint = match stored {
            Some(previous) => previous.max(cycle_start),
            None => cycle_start,
        };

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(StoreError::from)?;
            restock_store::set_checkpoint(&conn, next_checkpoint)
        })
        .await??;

        Ok(CycleSummary {
            cycle_start,
            checkpoint: next_checkpoint,
            fetched: records.len(),
            triggered: events.len(),
            delivered,
            failed,
        })
    }
}
