use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{AggregateRoot, DomainError, DomainResult, ExpenseId, UserId};

use crate::event::{
    ContributionRecorded, ExpenseEvent, MemberAdded, ShareAssigned, StatusAdvanced,
};
use crate::group::ExpenseGroup;
use crate::share::Contribution;
use crate::status::ExpenseStatus;

/// Input for creating an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub description: String,
    pub scheduled_at: DateTime<Utc>,
    /// Total amount in smallest currency unit; must be positive.
    pub total_amount: u64,
    pub owner: UserId,
}

/// Aggregate root: Expense.
///
/// One shareable obligation: a total amount, an owner, a lifecycle status and
/// an exclusively-owned group of members with assigned shares. All mutations
/// are deterministic domain logic returning the events they produced; the
/// engine layers locking and publication on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    id: ExpenseId,
    title: String,
    description: String,
    scheduled_at: DateTime<Utc>,
    total_amount: u64,
    owner: UserId,
    status: ExpenseStatus,
    group: ExpenseGroup,
    created_at: DateTime<Utc>,
    version: u64,
}

impl Expense {
    /// Construct a new expense in `Created` status with an empty group.
    ///
    /// Creation has no side effects beyond the record itself — nobody is
    /// notified, and the owner is not implicitly a group member; they are
    /// added and assigned a share like anyone else.
    pub fn create(
        id: ExpenseId,
        spec: NewExpense,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if spec.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if spec.total_amount == 0 {
            return Err(DomainError::validation("total amount must be positive"));
        }

        Ok(Self {
            id,
            title: spec.title,
            description: spec.description,
            scheduled_at: spec.scheduled_at,
            total_amount: spec.total_amount,
            owner: spec.owner,
            status: ExpenseStatus::Created,
            group: ExpenseGroup::new(),
            created_at: occurred_at,
            version: 1,
        })
    }

    pub fn id_typed(&self) -> ExpenseId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn status(&self) -> ExpenseStatus {
        self.status
    }

    pub fn group(&self) -> &ExpenseGroup {
        &self.group
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Settlement evaluation (read-only, never cached).
    ///
    /// True iff at least one share has been assigned and every assigned
    /// member's accumulated contribution meets or exceeds their share.
    /// Independent of `status`; the status transition is derived from this.
    pub fn is_settled(&self) -> bool {
        self.group.is_settled()
    }

    /// Add a member to the group.
    ///
    /// Idempotent: re-adding an existing member changes nothing and emits
    /// nothing. Membership may change while `Created` or `Pending`
    /// (bifurcation is incremental), never after settlement.
    pub fn add_member(
        &mut self,
        member: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<ExpenseEvent>> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(
                "membership cannot change after settlement",
            ));
        }

        if !self.group.add_member(member.clone()) {
            return Ok(vec![]);
        }

        self.version += 1;
        Ok(vec![ExpenseEvent::MemberAdded(MemberAdded {
            expense_id: self.id,
            member,
            occurred_at,
        })])
    }

    /// Set or overwrite a member's share of the total.
    ///
    /// The first successful assignment while `Created` advances the status to
    /// `Pending` — bifurcation in progress means the expense is no longer
    /// merely created.
    pub fn assign_share(
        &mut self,
        member: &UserId,
        share: u64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<ExpenseEvent>> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(
                "shares cannot change after settlement",
            ));
        }

        self.group.assign_share(member, share)?;

        let mut events = vec![ExpenseEvent::ShareAssigned(ShareAssigned {
            expense_id: self.id,
            member: member.clone(),
            share,
            occurred_at,
        })];

        if self.status == ExpenseStatus::Created {
            self.status = ExpenseStatus::Pending;
            events.push(ExpenseEvent::StatusAdvanced(StatusAdvanced {
                expense_id: self.id,
                from: ExpenseStatus::Created,
                to: ExpenseStatus::Pending,
                occurred_at,
            }));
        }

        self.version += 1;
        Ok(events)
    }

    /// Accept a member's contribution and re-evaluate settlement.
    ///
    /// The accumulation, the settlement check and the status advance are one
    /// state change; callers serialize invocations per expense.
    pub fn record_contribution(
        &mut self,
        member: &UserId,
        contribution: Contribution,
    ) -> DomainResult<Vec<ExpenseEvent>> {
        if self.status.is_terminal() {
            return Err(DomainError::ExpenseSettled);
        }
        if contribution.amount == 0 {
            return Err(DomainError::validation(
                "contribution amount must be positive",
            ));
        }

        let occurred_at = contribution.contributed_at;
        let amount = contribution.amount;
        let new_total = self.group.record_contribution(member, contribution)?;

        let mut events = vec![ExpenseEvent::ContributionRecorded(ContributionRecorded {
            expense_id: self.id,
            member: member.clone(),
            amount,
            new_total,
            occurred_at,
        })];

        if self.group.is_settled() {
            let from = self.status;
            self.status = ExpenseStatus::Settled;
            events.push(ExpenseEvent::StatusAdvanced(StatusAdvanced {
                expense_id: self.id,
                from,
                to: ExpenseStatus::Settled,
                occurred_at,
            }));
        }

        self.version += 1;
        Ok(events)
    }

    /// Explicit status override.
    ///
    /// Setting the current status again is a no-op; any backward move is
    /// rejected. The lifecycle only runs forward.
    pub fn set_status(
        &mut self,
        status: ExpenseStatus,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<ExpenseEvent>> {
        if status == self.status {
            return Ok(vec![]);
        }
        if !self.status.can_advance_to(status) {
            return Err(DomainError::invalid_state(format!(
                "cannot move {} expense back to {status}",
                self.status
            )));
        }

        let from = self.status;
        self.status = status;
        self.version += 1;
        Ok(vec![ExpenseEvent::StatusAdvanced(StatusAdvanced {
            expense_id: self.id,
            from,
            to: status,
            occurred_at,
        })])
    }
}

impl AggregateRoot for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_member(value: &str) -> UserId {
        UserId::new(value).unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_contribution(amount: u64) -> Contribution {
        Contribution {
            amount,
            contributed_at: test_time(),
            transaction_id: format!("T{amount}"),
            description: "Transferred from UPI".to_string(),
        }
    }

    fn lunch_expense(total_amount: u64) -> Expense {
        let spec = NewExpense {
            title: "Team Lunch".to_string(),
            description: "Friday lunch in Briyani zone".to_string(),
            scheduled_at: test_time(),
            total_amount,
            owner: test_member("vishnu@example.com"),
        };
        Expense::create(ExpenseId::new(), spec, test_time()).unwrap()
    }

    /// Expense with `members` added and each assigned an equal `share`.
    fn bifurcated(members: &[UserId], share: u64) -> Expense {
        let mut expense = lunch_expense(share * members.len() as u64);
        for member in members {
            expense.add_member(member.clone(), test_time()).unwrap();
        }
        for member in members {
            expense.assign_share(member, share, test_time()).unwrap();
        }
        expense
    }

    #[test]
    fn create_starts_in_created_with_empty_group() {
        let spec = NewExpense {
            title: "Team Lunch".to_string(),
            description: String::new(),
            scheduled_at: test_time(),
            total_amount: 200_000,
            owner: test_member("vishnu@example.com"),
        };
        let expense = Expense::create(ExpenseId::new(), spec, test_time()).unwrap();

        assert_eq!(expense.status(), ExpenseStatus::Created);
        assert_eq!(expense.group().member_count(), 0);
        assert_eq!(expense.total_amount(), 200_000);
        assert!(!expense.is_settled());
    }

    #[test]
    fn create_rejects_zero_amount_and_blank_title() {
        let owner = test_member("vishnu@example.com");
        let zero = NewExpense {
            title: "Lunch".to_string(),
            description: String::new(),
            scheduled_at: test_time(),
            total_amount: 0,
            owner: owner.clone(),
        };
        assert!(matches!(
            Expense::create(ExpenseId::new(), zero, test_time()),
            Err(DomainError::Validation(_))
        ));

        let blank = NewExpense {
            title: "   ".to_string(),
            description: String::new(),
            scheduled_at: test_time(),
            total_amount: 100,
            owner,
        };
        assert!(matches!(
            Expense::create(ExpenseId::new(), blank, test_time()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn adding_a_member_twice_is_a_no_op() {
        let mut expense = lunch_expense(200_000);
        let member = test_member("bagesh@example.com");

        let events = expense.add_member(member.clone(), test_time()).unwrap();
        assert_eq!(events.len(), 1);

        let events = expense.add_member(member.clone(), test_time()).unwrap();
        assert!(events.is_empty());
        assert_eq!(expense.group().member_count(), 1);
    }

    #[test]
    fn first_share_assignment_advances_to_pending() {
        let mut expense = lunch_expense(200_000);
        let member = test_member("bagesh@example.com");
        expense.add_member(member.clone(), test_time()).unwrap();

        let events = expense.assign_share(&member, 40_000, test_time()).unwrap();

        assert_eq!(expense.status(), ExpenseStatus::Pending);
        assert!(matches!(events[0], ExpenseEvent::ShareAssigned(_)));
        match &events[1] {
            ExpenseEvent::StatusAdvanced(e) => {
                assert_eq!(e.from, ExpenseStatus::Created);
                assert_eq!(e.to, ExpenseStatus::Pending);
            }
            other => panic!("expected StatusAdvanced, got {other:?}"),
        }

        // Later assignments leave the status alone.
        let member2 = test_member("neha@example.com");
        expense.add_member(member2.clone(), test_time()).unwrap();
        let events = expense.assign_share(&member2, 40_000, test_time()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(expense.status(), ExpenseStatus::Pending);
    }

    #[test]
    fn share_assignment_requires_membership() {
        let mut expense = lunch_expense(200_000);
        let err = expense
            .assign_share(&test_member("ghost@example.com"), 40_000, test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::MemberNotInGroup(_)));
        assert_eq!(expense.status(), ExpenseStatus::Created);
    }

    #[test]
    fn reassignment_below_accumulated_contribution_is_rejected() {
        let member = test_member("divya@example.com");
        let mut expense = bifurcated(std::slice::from_ref(&member), 40_000);

        expense
            .record_contribution(&member, test_contribution(30_000))
            .unwrap();

        let err = expense
            .assign_share(&member, 20_000, test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidExpenseState(_)));
        assert_eq!(expense.group().share_of(&member).unwrap().share(), 40_000);

        // Raising the share is still allowed before settlement.
        expense.assign_share(&member, 50_000, test_time()).unwrap();
        assert_eq!(expense.group().share_of(&member).unwrap().share(), 50_000);
    }

    #[test]
    fn over_contribution_is_rejected_and_leaves_totals_unchanged() {
        let member = test_member("palani@example.com");
        let mut expense = bifurcated(std::slice::from_ref(&member), 40_000);

        let err = expense
            .record_contribution(&member, test_contribution(50_000))
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::ContributionExceeded {
                share: 40_000,
                contributed: 0,
                attempted: 50_000,
            }
        );
        assert_eq!(expense.group().share_of(&member).unwrap().contributed(), 0);
        assert_eq!(expense.status(), ExpenseStatus::Pending);
    }

    #[test]
    fn zero_contribution_is_rejected() {
        let member = test_member("palani@example.com");
        let mut expense = bifurcated(std::slice::from_ref(&member), 40_000);

        let err = expense
            .record_contribution(&member, test_contribution(0))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn contribution_without_share_entry_is_rejected() {
        let mut expense = lunch_expense(200_000);
        let member = test_member("ajay@example.com");
        expense.add_member(member.clone(), test_time()).unwrap();
        // Move off Created so the share map is in play.
        let assigned = test_member("bagesh@example.com");
        expense.add_member(assigned.clone(), test_time()).unwrap();
        expense.assign_share(&assigned, 40_000, test_time()).unwrap();

        let err = expense
            .record_contribution(&member, test_contribution(100))
            .unwrap_err();
        assert!(matches!(err, DomainError::MemberNotInGroup(_)));
    }

    #[test]
    fn settling_contribution_advances_to_settled_exactly_once() {
        let a = test_member("a@example.com");
        let b = test_member("b@example.com");
        let mut expense = bifurcated(&[a.clone(), b.clone()], 40_000);

        let events = expense
            .record_contribution(&a, test_contribution(40_000))
            .unwrap();
        assert_eq!(events.len(), 1);
        assert!(!expense.is_settled());

        let events = expense
            .record_contribution(&b, test_contribution(40_000))
            .unwrap();
        assert_eq!(events.len(), 2);
        match &events[1] {
            ExpenseEvent::StatusAdvanced(e) => {
                assert_eq!(e.from, ExpenseStatus::Pending);
                assert_eq!(e.to, ExpenseStatus::Settled);
            }
            other => panic!("expected StatusAdvanced, got {other:?}"),
        }

        // Idempotent read: the evaluation holds before and after observing it.
        assert!(expense.is_settled());
        assert!(expense.is_settled());
        assert_eq!(expense.status(), ExpenseStatus::Settled);
    }

    #[test]
    fn settled_expense_rejects_contributions_members_and_shares() {
        let member = test_member("kamal@example.com");
        let mut expense = bifurcated(std::slice::from_ref(&member), 40_000);
        expense
            .record_contribution(&member, test_contribution(40_000))
            .unwrap();
        assert_eq!(expense.status(), ExpenseStatus::Settled);

        assert_eq!(
            expense
                .record_contribution(&member, test_contribution(1))
                .unwrap_err(),
            DomainError::ExpenseSettled
        );
        assert!(matches!(
            expense
                .add_member(test_member("late@example.com"), test_time())
                .unwrap_err(),
            DomainError::InvalidExpenseState(_)
        ));
        assert!(matches!(
            expense.assign_share(&member, 50_000, test_time()).unwrap_err(),
            DomainError::InvalidExpenseState(_)
        ));
    }

    #[test]
    fn backward_status_moves_are_rejected() {
        let member = test_member("kamal@example.com");
        let mut expense = bifurcated(std::slice::from_ref(&member), 40_000);
        expense
            .record_contribution(&member, test_contribution(40_000))
            .unwrap();

        let err = expense
            .set_status(ExpenseStatus::Pending, test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidExpenseState(_)));
        assert_eq!(expense.status(), ExpenseStatus::Settled);

        // Same-status set is a no-op.
        let events = expense
            .set_status(ExpenseStatus::Settled, test_time())
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn explicit_forward_override_is_allowed() {
        let mut expense = lunch_expense(200_000);
        let events = expense
            .set_status(ExpenseStatus::Settled, test_time())
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(expense.status(), ExpenseStatus::Settled);
    }

    #[test]
    fn five_member_lunch_settles_after_everyone_pays_their_share() {
        // 2000.00 split five ways at 400.00 each, owner included.
        let members: Vec<UserId> = [
            "vishnu@example.com",
            "bagesh@example.com",
            "divya@example.com",
            "palani@example.com",
            "neha@example.com",
        ]
        .iter()
        .map(|m| test_member(m))
        .collect();

        let mut expense = bifurcated(&members, 40_000);
        assert_eq!(expense.total_amount(), 200_000);

        for (i, member) in members.iter().enumerate() {
            assert!(!expense.is_settled());
            expense
                .record_contribution(member, test_contribution(40_000))
                .unwrap();
            if i + 1 < members.len() {
                assert_eq!(expense.status(), ExpenseStatus::Pending);
            }
        }

        assert!(expense.is_settled());
        assert_eq!(expense.status(), ExpenseStatus::Settled);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: under any contribution sequence, a member's accumulated
        /// total never exceeds their share, rejected contributions leave the
        /// total untouched, and the status never moves backward.
        #[test]
        fn contributions_never_exceed_share_and_status_is_monotonic(
            share in 1u64..50_000,
            amounts in prop::collection::vec(1u64..20_000, 1..12)
        ) {
            let member = test_member("prop@example.com");
            let mut expense = bifurcated(std::slice::from_ref(&member), share);
            let mut last_status = expense.status();

            for amount in amounts {
                let before = expense.group().share_of(&member).unwrap().contributed();
                let result = expense.record_contribution(&member, test_contribution(amount));
                let after = expense.group().share_of(&member).unwrap().contributed();

                match result {
                    Ok(_) => prop_assert_eq!(after, before + amount),
                    Err(_) => prop_assert_eq!(after, before),
                }
                prop_assert!(after <= share);
                prop_assert!(expense.status() >= last_status);
                last_status = expense.status();
            }
        }

        /// Property: an expense settles exactly when every member's share is
        /// fully paid, regardless of how payments are split up.
        #[test]
        fn settlement_is_reached_iff_every_share_is_covered(
            shares in prop::collection::vec(1u64..10_000, 1..6)
        ) {
            let members: Vec<UserId> = (0..shares.len())
                .map(|i| test_member(&format!("m{i}@example.com")))
                .collect();

            let mut expense = lunch_expense(shares.iter().sum());
            for member in &members {
                expense.add_member(member.clone(), test_time()).unwrap();
            }
            for (member, share) in members.iter().zip(&shares) {
                expense.assign_share(member, *share, test_time()).unwrap();
            }

            // Pay each share in two installments where it splits.
            let total = shares.len();
            for (i, (member, share)) in members.iter().zip(&shares).enumerate() {
                let first = share / 2;
                if first > 0 {
                    expense.record_contribution(member, test_contribution(first)).unwrap();
                    // A half-paid share can never complete the settlement.
                    prop_assert!(!expense.is_settled());
                }
                let rest = share - first;
                expense.record_contribution(member, test_contribution(rest)).unwrap();
                prop_assert_eq!(expense.is_settled(), i + 1 == total);
            }

            prop_assert_eq!(expense.status(), ExpenseStatus::Settled);
        }
    }
}
