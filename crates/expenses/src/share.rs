use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, ValueObject};

/// One recorded payment event by a member toward their assigned share.
///
/// Contributions are additive and never retracted; multiple partial
/// contributions from the same member are permitted and summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount: u64,
    pub contributed_at: DateTime<Utc>,
    /// Opaque transaction identifier from whatever moved the money.
    pub transaction_id: String,
    pub description: String,
}

impl ValueObject for Contribution {}

/// One member's assigned share plus their running total of accepted
/// contributions.
///
/// Invariant: `contributed <= share` at all times. [`UserShare::record`] is
/// the only accumulation point and enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserShare {
    share: u64,
    contributed: u64,
    history: Vec<Contribution>,
}

impl ValueObject for UserShare {}

impl UserShare {
    pub fn new(share: u64) -> Self {
        Self {
            share,
            contributed: 0,
            history: Vec::new(),
        }
    }

    /// Assigned share amount in smallest currency unit.
    pub fn share(&self) -> u64 {
        self.share
    }

    /// Accumulated total of accepted contributions.
    pub fn contributed(&self) -> u64 {
        self.contributed
    }

    /// What is still owed on this share.
    pub fn remaining(&self) -> u64 {
        self.share.saturating_sub(self.contributed)
    }

    /// Whether the accumulated contribution meets or exceeds the share.
    pub fn is_covered(&self) -> bool {
        self.contributed >= self.share
    }

    /// Accepted contributions, insertion order.
    pub fn history(&self) -> &[Contribution] {
        &self.history
    }

    /// Overwrite the assigned share (re-bifurcation before settlement).
    ///
    /// A new share below the already-accumulated contribution would orphan the
    /// excess, so it is rejected and the share is unchanged.
    pub(crate) fn reassign(&mut self, share: u64) -> DomainResult<()> {
        if share < self.contributed {
            return Err(DomainError::invalid_state(format!(
                "share {share} below accumulated contribution {}",
                self.contributed
            )));
        }
        self.share = share;
        Ok(())
    }

    /// Accept a contribution, returning the new accumulated total.
    ///
    /// Rejects any contribution that would push the total strictly above the
    /// assigned share; on rejection the accumulated total and history are
    /// unchanged.
    pub(crate) fn record(&mut self, contribution: Contribution) -> DomainResult<u64> {
        let new_total = self
            .contributed
            .checked_add(contribution.amount)
            .ok_or_else(|| DomainError::internal("contribution total overflow"))?;

        if new_total > self.share {
            return Err(DomainError::ContributionExceeded {
                share: self.share,
                contributed: self.contributed,
                attempted: contribution.amount,
            });
        }

        self.contributed = new_total;
        self.history.push(contribution);
        Ok(new_total)
    }
}
