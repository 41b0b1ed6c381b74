//! Persistence layer: PostgreSQL storage for fixtures, events and the
//! change log.
//!
//! The in-memory registry stays authoritative while the process runs;
//! PostgreSQL is written through on every mutation and read back at
//! startup. The concrete implementation uses `sqlx::PgPool` for async
//! PostgreSQL access.

pub mod change_log;
pub mod models;
pub mod postgres;

pub use change_log::run_change_log;
pub use postgres::{PostgresPersistence, RestoredState};
