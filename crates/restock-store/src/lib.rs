//! Storage layer for the restock watcher.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! embedded SQL migrations, and the store operations the watcher and the
//! command loop share: recipient registration, per-record status memory, and
//! the poll checkpoint.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: a single-process watcher needs no external
//!   database. WAL allows the poll loop and command handlers to read
//!   concurrently while one of them writes.
//! - **`r2d2` connection pool**: bounded connection reuse without manual
//!   lifetime management.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, ensuring migrations ship with the binary and cannot
//!   drift from the code that depends on them.
//! - **Single-statement operations**: every store operation is one SQL
//!   statement, so each call is atomic without explicit transactions.

mod error;
mod migrations;
mod ops;
mod pool;

pub use error::StoreError;
pub use migrations::run_migrations;
pub use ops::{
    checkpoint, last_status, list_recipients, register_recipient, set_checkpoint,
    set_last_status,
};
pub use pool::{create_pool, DbPool, DbRuntimeSettings};
