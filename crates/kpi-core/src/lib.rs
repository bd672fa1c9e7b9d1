//! Core types and rules of the KPI evaluation and hierarchy engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod error;
pub mod hierarchy;
pub mod period;
pub mod reassign;
pub mod roster;
pub mod scope;
pub mod store;
pub mod threshold;

pub use error::{DomainError, Error, Result};
