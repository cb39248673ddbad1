use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{AggregateRoot, ExpenseId, UserId};
use splitledger_expenses::{Expense, ExpenseStatus};

/// One member's share as seen from outside the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareView {
    pub share: u64,
    pub contributed: u64,
    pub remaining: u64,
}

/// Point-in-time view of one expense's status and group.
///
/// Cloned out under the per-expense lock, so the status and the share totals
/// are mutually consistent — but the expense may move on the moment the lock
/// is released. Snapshots are for reading, never for writing back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSnapshot {
    pub id: ExpenseId,
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
    pub total_amount: u64,
    pub owner: UserId,
    pub status: ExpenseStatus,
    pub members: Vec<UserId>,
    pub shares: HashMap<UserId, ShareView>,
    pub version: u64,
}

impl ExpenseSnapshot {
    pub(crate) fn of(expense: &Expense) -> Self {
        let mut members: Vec<UserId> = expense.group().members().cloned().collect();
        members.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        let shares = expense
            .group()
            .shares()
            .map(|(member, share)| {
                (
                    member.clone(),
                    ShareView {
                        share: share.share(),
                        contributed: share.contributed(),
                        remaining: share.remaining(),
                    },
                )
            })
            .collect();

        Self {
            id: expense.id_typed(),
            title: expense.title().to_string(),
            scheduled_at: expense.scheduled_at(),
            total_amount: expense.total_amount(),
            owner: expense.owner().clone(),
            status: expense.status(),
            members,
            shares,
            version: expense.version(),
        }
    }

    /// Sum of accepted contributions across the whole group.
    pub fn contributed_total(&self) -> u64 {
        self.shares.values().map(|s| s.contributed).sum()
    }
}
