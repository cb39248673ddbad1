use serde::{Deserialize, Serialize};

/// Expense status lifecycle.
///
/// The ordering is the lifecycle: `Created → Pending → Settled`. Status on a
/// given expense is monotonically non-decreasing; backward moves are rejected
/// wherever a transition is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Created,
    Pending,
    Settled,
}

impl ExpenseStatus {
    /// Whether moving to `next` keeps the lifecycle monotonic.
    pub fn can_advance_to(self, next: ExpenseStatus) -> bool {
        next >= self
    }

    /// Settled is terminal: membership, shares and contributions are frozen.
    pub fn is_terminal(self) -> bool {
        self == ExpenseStatus::Settled
    }
}

impl core::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ExpenseStatus::Created => "created",
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Settled => "settled",
        };
        f.write_str(s)
    }
}
