//! Expense domain module (lifecycle state machine and settlement accounting).
//!
//! This crate contains the business rules for shared expenses — status
//! lifecycle, bifurcation (per-member share assignment), contribution
//! accounting, and settlement evaluation — implemented purely as
//! deterministic domain logic (no IO, no locking, no storage).

pub mod event;
pub mod expense;
pub mod group;
pub mod share;
pub mod status;

pub use event::{
    ContributionRecorded, ExpenseEvent, MemberAdded, ShareAssigned, StatusAdvanced,
};
pub use expense::{Expense, NewExpense};
pub use group::ExpenseGroup;
pub use share::{Contribution, UserShare};
pub use status::ExpenseStatus;
