//! The watch engine: change detection, alert dispatch, and the poll loop.
//!
//! A cycle fetches every record edited since the stored checkpoint, diffs
//! each one against its remembered status, fans alerts out to all registered
//! recipients, and only then advances the checkpoint. Fetch and store errors
//! abort the cycle with the checkpoint untouched, so the next cycle re-covers
//! the same window; delivery failures are recorded per recipient and never
//! abort anything.
//!
//! The engine talks to its collaborators through the [`RecordSource`] and
//! [`Notifier`] seams so the loop can be driven against scripted fakes in
//! tests.

mod dispatcher;
mod evaluator;
mod notify;
mod poller;
mod source;

pub use dispatcher::{dispatch, render_alert, DeliveryFailure, DeliveryReport};
pub use evaluator::evaluate_records;
pub use notify::{DeliveryError, Notifier};
pub use poller::{CycleError, CycleSummary, WatchSettings, Watcher};
pub use source::RecordSource;
