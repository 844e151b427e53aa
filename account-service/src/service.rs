//! Account service implementation

use std::sync::Arc;

use common::decimal::Amount;
use common::error::{Error, ErrorExt, Result};
use common::model::account::Account;
use common::{RepositoryType, StoreConfig, UserLocks};
use tracing::{debug, info};
use uuid::Uuid;

use crate::repository::{InMemoryLedgerRepository, LedgerRepository, PostgresLedgerRepository};

/// Account service for reading and moving cash balances
pub struct AccountService {
    /// Repository for ledger data
    repo: Arc<dyn LedgerRepository>,
    /// Serialization scopes shared with the trade executor
    locks: Arc<UserLocks>,
}

impl AccountService {
    /// Create a new account service on an empty in-memory ledger
    pub fn new() -> Self {
        Self {
            repo: Arc::new(InMemoryLedgerRepository::new()),
            locks: Arc::new(UserLocks::new()),
        }
    }

    /// Create an account service over an existing ledger and lock registry
    pub fn with_repository(repo: Arc<dyn LedgerRepository>, locks: Arc<UserLocks>) -> Self {
        Self { repo, locks }
    }

    /// Create a new account service from the store configuration
    pub async fn with_config(config: &StoreConfig, locks: Arc<UserLocks>) -> Result<Self> {
        let repo: Arc<dyn LedgerRepository> = match config.backend {
            RepositoryType::InMemory => Arc::new(InMemoryLedgerRepository::new()),
            RepositoryType::Postgres(_) => Arc::new(PostgresLedgerRepository::with_config(config).await?),
        };

        Ok(Self { repo, locks })
    }

    /// The underlying ledger
    pub fn repository(&self) -> Arc<dyn LedgerRepository> {
        self.repo.clone()
    }

    /// Get an account by user ID
    pub async fn get_account(&self, user_id: Uuid) -> Result<Option<Account>> {
        self.repo.get_account(user_id).await
    }

    /// Current cash balance
    pub async fn get_balance(&self, user_id: Uuid) -> Result<Amount> {
        self.repo.balance(user_id).await
    }

    /// Deposit cash into an account
    pub async fn deposit(&self, user_id: Uuid, amount: Amount) -> Result<Amount> {
        validate_amount(amount)?;
        info!("Depositing {} to account {}", amount, user_id);

        let _scope = self.locks.acquire(user_id).await;

        // Ensure the account exists
        self.repo.balance(user_id).await
            .with_context(|| format!("Failed to retrieve balance for account {}", user_id))?;

        self.repo.apply_delta(user_id, amount).await
            .with_context(|| format!("Failed to update balance after deposit for account {}", user_id))
    }

    /// Withdraw cash from an account
    pub async fn withdraw(&self, user_id: Uuid, amount: Amount) -> Result<Amount> {
        validate_amount(amount)?;
        info!("Withdrawing {} from account {}", amount, user_id);

        let _scope = self.locks.acquire(user_id).await;

        let balance = self.repo.balance(user_id).await
            .with_context(|| format!("Failed to retrieve balance for account {}", user_id))?;

        if amount > balance {
            debug!("Rejecting withdrawal of {} from {}: balance {}", amount, user_id, balance);
            return Err(Error::InsufficientBalance(format!(
                "Cannot withdraw {} from account {} holding {}",
                amount, user_id, balance
            )));
        }

        self.repo.apply_delta(user_id, -amount).await
            .with_context(|| format!("Failed to update balance after withdrawal for account {}", user_id))
    }
}

impl Default for AccountService {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_amount(amount: Amount) -> Result<()> {
    if amount <= Amount::ZERO {
        return Err(Error::ValidationError(format!("Amount must be positive, got {}", amount)));
    }
    Ok(())
}
