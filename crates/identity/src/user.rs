use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{Entity, UserId};

/// Contact information for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
}

impl ContactInfo {
    pub fn with_phone(phone: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
        }
    }
}

/// Bank account details for payout transfers.
///
/// Stored alongside the profile and handed to whatever executes transfers;
/// the lifecycle core never reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder: String,
    pub account_number: String,
    pub routing_code: String,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    contact: ContactInfo,
    bank: Option<BankDetails>,
    registered_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: UserId,
        name: String,
        contact: ContactInfo,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            contact,
            bank: None,
            registered_at,
        }
    }

    pub fn id_typed(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn bank(&self) -> Option<&BankDetails> {
        self.bank.as_ref()
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub(crate) fn set_bank(&mut self, bank: BankDetails) {
        self.bank = Some(bank);
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
