use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use splitledger_core::{DomainError, DomainResult, ExpenseId};
use splitledger_expenses::Expense;

/// Process-wide table of live expenses, keyed by identifier.
///
/// Two locking layers: the outer `RwLock` guards the table structure
/// (insertion and lookup only); the `Mutex` around each expense is that
/// expense's critical section. Lookup clones the `Arc` handle and releases
/// the table lock before the expense is touched, so operations on distinct
/// expenses never contend.
///
/// Initialized empty at startup; never persisted.
#[derive(Debug, Default)]
pub struct ExpenseStore {
    expenses: RwLock<HashMap<ExpenseId, Arc<Mutex<Expense>>>>,
}

impl ExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fully-constructed expense.
    ///
    /// Construction happens before insertion, so no caller can observe a
    /// partially-built expense through the table.
    pub(crate) fn insert(&self, expense: Expense) -> DomainResult<()> {
        let id = expense.id_typed();
        let mut expenses = self
            .expenses
            .write()
            .map_err(|_| DomainError::internal("expense store lock poisoned"))?;
        expenses.insert(id, Arc::new(Mutex::new(expense)));
        Ok(())
    }

    /// Handle to one expense.
    pub(crate) fn get(&self, id: ExpenseId) -> DomainResult<Arc<Mutex<Expense>>> {
        let expenses = self
            .expenses
            .read()
            .map_err(|_| DomainError::internal("expense store lock poisoned"))?;
        expenses.get(&id).cloned().ok_or(DomainError::ExpenseNotFound)
    }

    /// Handles to every live expense (for scans/snapshots).
    pub(crate) fn all(&self) -> DomainResult<Vec<Arc<Mutex<Expense>>>> {
        let expenses = self
            .expenses
            .read()
            .map_err(|_| DomainError::internal("expense store lock poisoned"))?;
        Ok(expenses.values().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.expenses.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
