use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use splitledger_core::{DomainError, DomainResult, UserId};

use crate::user::{BankDetails, ContactInfo, User};

/// Collaborator contract consumed by the lifecycle engine.
///
/// Implementations must be safe under concurrent upserts and lookups.
pub trait IdentityRegistry: Send + Sync {
    /// Register a user, idempotently.
    ///
    /// Repeated calls with the same identifier are no-ops after the first and
    /// return the stored record unchanged — never a duplicate.
    fn upsert_user(
        &self,
        id: UserId,
        name: &str,
        contact: ContactInfo,
    ) -> DomainResult<User>;

    /// Look up a registered user.
    fn lookup_user(&self, id: &UserId) -> Option<User>;

    /// Attach bank details for payout to an existing user.
    fn set_bank_details(&self, id: &UserId, bank: BankDetails) -> DomainResult<User>;
}

/// In-memory registry.
///
/// Process-resident for the process lifetime; never persisted.
#[derive(Debug, Default)]
pub struct InMemoryIdentityRegistry {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryIdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityRegistry for InMemoryIdentityRegistry {
    fn upsert_user(
        &self,
        id: UserId,
        name: &str,
        contact: ContactInfo,
    ) -> DomainResult<User> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let mut users = self
            .users
            .write()
            .map_err(|_| DomainError::internal("identity registry lock poisoned"))?;

        // First write wins: an existing record is returned untouched.
        let user = users
            .entry(id.clone())
            .or_insert_with(|| User::new(id, name.to_string(), contact, Utc::now()));

        Ok(user.clone())
    }

    fn lookup_user(&self, id: &UserId) -> Option<User> {
        let users = self.users.read().ok()?;
        users.get(id).cloned()
    }

    fn set_bank_details(&self, id: &UserId, bank: BankDetails) -> DomainResult<User> {
        let mut users = self
            .users
            .write()
            .map_err(|_| DomainError::internal("identity registry lock poisoned"))?;

        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::validation(format!("user not registered: {id}")))?;
        user.set_bank(bank);

        Ok(user.clone())
    }
}
