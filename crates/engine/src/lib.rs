//! Expense lifecycle engine (application-level orchestration).
//!
//! The engine owns the process-wide expense table and wraps the pure domain
//! operations of `splitledger-expenses` with the concurrency discipline the
//! core guarantees: table-level locking for insertion/lookup, one lock per
//! expense for mutation, and event publication for notification consumers.

pub mod engine;
pub mod snapshot;
pub mod store;

pub use engine::LifecycleEngine;
pub use snapshot::{ExpenseSnapshot, ShareView};
pub use store::ExpenseStore;
