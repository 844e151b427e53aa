//! Repository for the cash ledger

use async_trait::async_trait;
use chrono::Utc;
use common::decimal::Amount;
use common::error::{Error, Result};
use common::model::account::Account;
use common::StoreConfig;
use dashmap::DashMap;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

/// Ledger repository trait defining the interface for cash balance storage.
///
/// The store does not enforce a non-negative balance; callers check funds
/// before issuing a negative delta. `apply_delta` is used both for forward
/// steps and for compensating inverse deltas.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Get an account by user ID
    async fn get_account(&self, user_id: Uuid) -> Result<Option<Account>>;

    /// Apply a signed change to the balance, returning the new balance
    async fn apply_delta(&self, user_id: Uuid, delta: Amount) -> Result<Amount>;

    /// Current cash balance of a user
    async fn balance(&self, user_id: Uuid) -> Result<Amount> {
        self.get_account(user_id)
            .await?
            .map(|account| account.balance)
            .ok_or_else(|| Error::AccountNotFound(format!("Account not found: {}", user_id)))
    }
}

/// In-memory repository for ledger data
pub struct InMemoryLedgerRepository {
    /// Accounts by user ID
    pub accounts: DashMap<Uuid, Account>,
}

impl InMemoryLedgerRepository {
    /// Create a new in-memory ledger repository
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Open an account with an initial balance (registration does this in production)
    pub fn open_account(&self, user_id: Uuid, balance: Amount) -> Account {
        let account = Account::new(user_id, balance);
        self.accounts.insert(user_id, account.clone());
        account
    }
}

impl Default for InMemoryLedgerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    /// Get an account by user ID
    async fn get_account(&self, user_id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.get(&user_id).map(|a| a.clone()))
    }

    /// Apply a signed change to the balance
    async fn apply_delta(&self, user_id: Uuid, delta: Amount) -> Result<Amount> {
        let mut account = self
            .accounts
            .get_mut(&user_id)
            .ok_or_else(|| Error::AccountNotFound(format!("Account not found: {}", user_id)))?;

        account.apply_delta(delta)?;
        Ok(account.balance)
    }
}

/// PostgreSQL repository for ledger data
pub struct PostgresLedgerRepository {
    /// Database connection pool
    pool: PgPool,
}

impl PostgresLedgerRepository {
    /// Create a ledger repository on an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the store configuration
    pub async fn with_config(config: &StoreConfig) -> Result<Self> {
        let pool = common::db::connect(config).await?;
        Ok(Self::new(pool))
    }

    /// Open an account with an initial balance. Existing accounts are left untouched.
    pub async fn open_account(&self, user_id: Uuid, balance: Amount) -> Result<()> {
        info!("Opening ledger account {} with balance {}", user_id, balance);

        sqlx::query(
            "INSERT INTO users (id, balance) VALUES ($1, $2)
             ON CONFLICT (id) DO NOTHING"
        )
        .bind(user_id)
        .bind(balance)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    /// Get an account by user ID
    async fn get_account(&self, user_id: Uuid) -> Result<Option<Account>> {
        debug!("Getting ledger account from database: {}", user_id);

        let row = sqlx::query(
            "SELECT id, balance, updated_at FROM users WHERE id = $1"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Account {
                id: row.try_get("id")?,
                balance: row.try_get("balance")?,
                updated_at: row.try_get("updated_at")?,
            })),
            None => Ok(None),
        }
    }

    /// Apply a signed change to the balance in a single statement
    async fn apply_delta(&self, user_id: Uuid, delta: Amount) -> Result<Amount> {
        debug!("Changing balance of {} by {}", user_id, delta);

        // NUMERIC does not overflow where Decimal does, so the range is checked in the statement
        let row = sqlx::query(
            "UPDATE users SET balance = balance + $1, updated_at = $2
             WHERE id = $3 AND ABS(balance + $1) <= $4
             RETURNING balance"
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(user_id)
        .bind(Amount::MAX)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get("balance")?),
            None => match self.get_account(user_id).await? {
                Some(account) => Err(Error::DecimalError(format!(
                    "balance {} plus {} overflows",
                    account.balance, delta
                ))),
                None => Err(Error::AccountNotFound(format!("Account not found: {}", user_id))),
            },
        }
    }
}
