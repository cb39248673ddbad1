use std::sync::Arc;

use chrono::Utc;

use splitledger_core::{DomainError, DomainResult, ExpenseId, UserId};
use splitledger_events::{Event, EventBus};
use splitledger_expenses::{Contribution, Expense, ExpenseEvent, ExpenseStatus, NewExpense};
use splitledger_identity::IdentityRegistry;

use crate::snapshot::ExpenseSnapshot;
use crate::store::ExpenseStore;

/// The expense lifecycle engine.
///
/// Owns the expense table and composes the two collaborators the core
/// consumes: the identity registry (owner resolution) and the event bus
/// (notification transport). Generic over both so tests and deployments can
/// swap implementations without touching domain code.
///
/// Every mutating operation runs as one critical section per expense: the
/// domain mutation, the settlement re-evaluation and the status advance are
/// observed atomically together. Operations on distinct expenses proceed in
/// parallel.
pub struct LifecycleEngine<R, B> {
    store: ExpenseStore,
    registry: Arc<R>,
    bus: B,
}

impl<R, B> LifecycleEngine<R, B>
where
    R: IdentityRegistry,
    B: EventBus<ExpenseEvent>,
{
    pub fn new(registry: Arc<R>, bus: B) -> Self {
        Self {
            store: ExpenseStore::new(),
            registry,
            bus,
        }
    }

    pub fn store(&self) -> &ExpenseStore {
        &self.store
    }

    /// Create an expense and register it in the store.
    ///
    /// The owner must resolve in the identity registry; the total must be
    /// positive. The expense starts in `Created` with an empty group, and
    /// creation has no side effects beyond the store insertion.
    pub fn create_expense(&self, spec: NewExpense) -> DomainResult<ExpenseId> {
        if self.registry.lookup_user(&spec.owner).is_none() {
            return Err(DomainError::validation(format!(
                "owner not registered: {}",
                spec.owner
            )));
        }

        let id = ExpenseId::new();
        let expense = Expense::create(id, spec, Utc::now())?;
        self.store.insert(expense)?;

        tracing::info!(expense_id = %id, "expense created");
        Ok(id)
    }

    /// Add a member to an expense's group.
    ///
    /// Idempotent; the notification hook fires for a newly added member.
    pub fn add_member(&self, expense_id: ExpenseId, member: UserId) -> DomainResult<()> {
        self.mutate(expense_id, |expense| expense.add_member(member, Utc::now()))
    }

    /// Assign (or re-assign) a member's share of the expense total.
    pub fn assign_share(
        &self,
        expense_id: ExpenseId,
        member: &UserId,
        share: u64,
    ) -> DomainResult<()> {
        self.mutate(expense_id, |expense| {
            expense.assign_share(member, share, Utc::now())
        })
    }

    /// Record a member's contribution and re-evaluate settlement.
    pub fn record_contribution(
        &self,
        expense_id: ExpenseId,
        member: &UserId,
        contribution: Contribution,
    ) -> DomainResult<()> {
        self.mutate(expense_id, |expense| {
            expense.record_contribution(member, contribution)
        })
    }

    /// Read-only settlement evaluation.
    pub fn is_settled(&self, expense_id: ExpenseId) -> DomainResult<bool> {
        let handle = self.store.get(expense_id)?;
        let expense = lock(&handle)?;
        Ok(expense.is_settled())
    }

    /// Explicit status override (forward-only).
    pub fn set_status(&self, expense_id: ExpenseId, status: ExpenseStatus) -> DomainResult<()> {
        self.mutate(expense_id, |expense| expense.set_status(status, Utc::now()))
    }

    /// Consistent view of one expense's status and group.
    pub fn snapshot(&self, expense_id: ExpenseId) -> DomainResult<ExpenseSnapshot> {
        let handle = self.store.get(expense_id)?;
        let expense = lock(&handle)?;
        Ok(ExpenseSnapshot::of(&expense))
    }

    /// Every expense created by `owner` (the creator's tracking view).
    pub fn expenses_for_owner(&self, owner: &UserId) -> DomainResult<Vec<ExpenseSnapshot>> {
        let mut snapshots = Vec::new();
        for handle in self.store.all()? {
            let expense = lock(&handle)?;
            if expense.owner() == owner {
                snapshots.push(ExpenseSnapshot::of(&expense));
            }
        }
        snapshots.sort_by_key(|s| *s.id.as_uuid());
        Ok(snapshots)
    }

    /// Run one mutating operation inside the expense's critical section and
    /// publish whatever events it produced.
    ///
    /// Publication happens before the lock is released so subscribers observe
    /// transitions of one expense in order.
    fn mutate(
        &self,
        expense_id: ExpenseId,
        op: impl FnOnce(&mut Expense) -> DomainResult<Vec<ExpenseEvent>>,
    ) -> DomainResult<()> {
        let handle = self.store.get(expense_id)?;
        let mut expense = lock(&handle)?;

        let events = op(&mut expense)?;
        for event in events {
            if let ExpenseEvent::StatusAdvanced(e) = &event {
                tracing::info!(
                    expense_id = %e.expense_id,
                    from = %e.from,
                    to = %e.to,
                    "expense status advanced"
                );
            }
            self.publish(event);
        }
        Ok(())
    }

    /// Fire-and-forget notification publish.
    fn publish(&self, event: ExpenseEvent) {
        let event_type = event.event_type();
        tracing::debug!(event_type, expense_id = %event.expense_id(), "publishing expense event");
        if let Err(err) = self.bus.publish(event) {
            // Notification delivery is not part of correctness.
            tracing::warn!(error = ?err, event_type, "failed to publish expense event");
        }
    }
}

fn lock<'a>(
    handle: &'a Arc<std::sync::Mutex<Expense>>,
) -> DomainResult<std::sync::MutexGuard<'a, Expense>> {
    handle
        .lock()
        .map_err(|_| DomainError::internal("expense lock poisoned"))
}
