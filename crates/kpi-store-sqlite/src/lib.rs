//! SQLite backend for the KPI store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every mutation runs inside one
//! `IMMEDIATE` transaction, so validation and the write it guards see the
//! same committed state.

mod encode;
mod ops;
mod schema;
mod store;

pub mod error;
pub mod roster;

pub use error::{Error, Result};
pub use roster::SqliteRosterSource;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
