use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, UserId};

use crate::share::{Contribution, UserShare};

/// The members of one expense and their assigned shares.
///
/// Owned exclusively by one [`crate::Expense`]. Invariants: every key in the
/// share map is also a group member; a member may exist before a share is
/// assigned (bifurcation is incremental).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseGroup {
    members: HashSet<UserId>,
    shares: HashMap<UserId, UserShare>,
}

impl ExpenseGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> impl Iterator<Item = &UserId> {
        self.members.iter()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, member: &UserId) -> bool {
        self.members.contains(member)
    }

    pub fn share_of(&self, member: &UserId) -> Option<&UserShare> {
        self.shares.get(member)
    }

    pub fn shares(&self) -> impl Iterator<Item = (&UserId, &UserShare)> {
        self.shares.iter()
    }

    /// Whether bifurcation has started (at least one share assigned).
    pub fn has_assigned_shares(&self) -> bool {
        !self.shares.is_empty()
    }

    /// Add a member; returns false when already present (idempotent).
    pub(crate) fn add_member(&mut self, member: UserId) -> bool {
        self.members.insert(member)
    }

    /// Set or overwrite a member's share.
    ///
    /// The member must already be in the group; share keys are a subset of
    /// the membership set.
    pub(crate) fn assign_share(&mut self, member: &UserId, share: u64) -> DomainResult<()> {
        if !self.members.contains(member) {
            return Err(DomainError::member_not_in_group(member.as_str()));
        }

        match self.shares.get_mut(member) {
            Some(existing) => existing.reassign(share),
            None => {
                self.shares.insert(member.clone(), UserShare::new(share));
                Ok(())
            }
        }
    }

    /// Accept a contribution against a member's share, returning the new
    /// accumulated total.
    ///
    /// A member without a share entry cannot contribute yet — their slice of
    /// the bifurcation does not exist.
    pub(crate) fn record_contribution(
        &mut self,
        member: &UserId,
        contribution: Contribution,
    ) -> DomainResult<u64> {
        let share = self
            .shares
            .get_mut(member)
            .ok_or_else(|| DomainError::member_not_in_group(member.as_str()))?;
        share.record(contribution)
    }

    /// Settlement evaluation: every assigned share covered, and at least one
    /// share assigned. Pure function of the share map, O(members), never
    /// cached.
    pub fn is_settled(&self) -> bool {
        self.has_assigned_shares() && self.shares.values().all(UserShare::is_covered)
    }
}
