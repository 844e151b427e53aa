//! Account models and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{checked_balance, Amount};
use crate::error::Result;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Cash account of a registered user.
///
/// Accounts are opened by registration; the exchange only moves the balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Account {
    /// User ID
    pub id: Uuid,
    /// Cash balance, never negative after a completed operation
    pub balance: Amount,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create an account holding `balance`
    pub fn new(id: Uuid, balance: Amount) -> Self {
        Self {
            id,
            balance,
            updated_at: Utc::now(),
        }
    }

    /// Apply a signed change to the balance.
    ///
    /// No sign check happens here; callers validate funds first. A change
    /// that would overflow leaves the account untouched.
    pub fn apply_delta(&mut self, delta: Amount) -> Result<()> {
        self.balance = checked_balance(self.balance, delta)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
