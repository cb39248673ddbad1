use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{ExpenseId, UserId};
use splitledger_events::Event;

use crate::status::ExpenseStatus;

/// Event: MemberAdded.
///
/// The notification hook for the added member: subscribers deliver "you were
/// added to this expense".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAdded {
    pub expense_id: ExpenseId,
    pub member: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ShareAssigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareAssigned {
    pub expense_id: ExpenseId,
    pub member: UserId,
    pub share: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ContributionRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecorded {
    pub expense_id: ExpenseId,
    pub member: UserId,
    pub amount: u64,
    /// The member's accumulated total after this contribution.
    pub new_total: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusAdvanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAdvanced {
    pub expense_id: ExpenseId,
    pub from: ExpenseStatus,
    pub to: ExpenseStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseEvent {
    MemberAdded(MemberAdded),
    ShareAssigned(ShareAssigned),
    ContributionRecorded(ContributionRecorded),
    StatusAdvanced(StatusAdvanced),
}

impl ExpenseEvent {
    /// The expense this event belongs to.
    pub fn expense_id(&self) -> ExpenseId {
        match self {
            ExpenseEvent::MemberAdded(e) => e.expense_id,
            ExpenseEvent::ShareAssigned(e) => e.expense_id,
            ExpenseEvent::ContributionRecorded(e) => e.expense_id,
            ExpenseEvent::StatusAdvanced(e) => e.expense_id,
        }
    }

    /// The member a notification for this event would address, if any.
    pub fn member(&self) -> Option<&UserId> {
        match self {
            ExpenseEvent::MemberAdded(e) => Some(&e.member),
            ExpenseEvent::ShareAssigned(e) => Some(&e.member),
            ExpenseEvent::ContributionRecorded(e) => Some(&e.member),
            ExpenseEvent::StatusAdvanced(_) => None,
        }
    }
}

impl Event for ExpenseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ExpenseEvent::MemberAdded(_) => "expenses.expense.member_added",
            ExpenseEvent::ShareAssigned(_) => "expenses.expense.share_assigned",
            ExpenseEvent::ContributionRecorded(_) => "expenses.expense.contribution_recorded",
            ExpenseEvent::StatusAdvanced(_) => "expenses.expense.status_advanced",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ExpenseEvent::MemberAdded(e) => e.occurred_at,
            ExpenseEvent::ShareAssigned(e) => e.occurred_at,
            ExpenseEvent::ContributionRecorded(e) => e.occurred_at,
            ExpenseEvent::StatusAdvanced(e) => e.occurred_at,
        }
    }
}
