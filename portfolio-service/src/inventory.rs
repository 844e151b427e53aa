//! Repository for per-user paper holdings

use async_trait::async_trait;
use chrono::Utc;
use common::decimal::PaperCount;
use common::error::{Error, Result};
use common::model::holding::Holding;
use common::StoreConfig;
use dashmap::DashMap;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

/// Inventory repository trait defining the interface for holdings storage.
///
/// `get_holding` returns `None` when the user never held the paper; the first
/// purchase has to create the row instead of applying a delta. Non-negative
/// quantities are the caller's responsibility.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Quantity of one paper held by a user, `None` if no row exists
    async fn get_holding(&self, user_id: Uuid, paper: &str) -> Result<Option<PaperCount>>;

    /// All holdings of a user ordered by paper name, zero rows included
    async fn get_holdings(&self, user_id: Uuid) -> Result<Vec<Holding>>;

    /// Insert a new holding row
    async fn create_holding(&self, user_id: Uuid, paper: &str, quantity: PaperCount) -> Result<Holding>;

    /// Apply a signed change to an existing holding, returning the new quantity
    async fn apply_delta(&self, user_id: Uuid, paper: &str, delta: PaperCount) -> Result<PaperCount>;
}

/// In-memory repository for holdings
pub struct InMemoryInventoryRepository {
    /// Holdings by user ID and paper name
    pub holdings: DashMap<(Uuid, String), Holding>,
}

impl InMemoryInventoryRepository {
    /// Create a new in-memory inventory repository
    pub fn new() -> Self {
        Self {
            holdings: DashMap::new(),
        }
    }
}

impl Default for InMemoryInventoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn get_holding(&self, user_id: Uuid, paper: &str) -> Result<Option<PaperCount>> {
        Ok(self
            .holdings
            .get(&(user_id, paper.to_string()))
            .map(|h| h.quantity))
    }

    async fn get_holdings(&self, user_id: Uuid) -> Result<Vec<Holding>> {
        let mut holdings: Vec<Holding> = self
            .holdings
            .iter()
            .filter_map(|entry| {
                let ((owner, _), holding) = entry.pair();
                if *owner == user_id {
                    Some(holding.clone())
                } else {
                    None
                }
            })
            .collect();

        holdings.sort_by(|a, b| a.paper.cmp(&b.paper));
        Ok(holdings)
    }

    async fn create_holding(&self, user_id: Uuid, paper: &str, quantity: PaperCount) -> Result<Holding> {
        let key = (user_id, paper.to_string());
        if self.holdings.contains_key(&key) {
            return Err(Error::Storage(format!(
                "Holding of {} already exists for user {}",
                paper, user_id
            )));
        }

        let holding = Holding::new(user_id, paper, quantity);
        self.holdings.insert(key, holding.clone());
        Ok(holding)
    }

    async fn apply_delta(&self, user_id: Uuid, paper: &str, delta: PaperCount) -> Result<PaperCount> {
        let mut holding = self
            .holdings
            .get_mut(&(user_id, paper.to_string()))
            .ok_or_else(|| Error::Storage(format!("No holding of {} for user {}", paper, user_id)))?;

        holding.quantity += delta;
        holding.updated_at = Utc::now();
        Ok(holding.quantity)
    }
}

/// PostgreSQL repository for holdings (`storage` table)
pub struct PostgresInventoryRepository {
    /// Database connection pool
    pool: PgPool,
}

impl PostgresInventoryRepository {
    /// Create an inventory repository on an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the store configuration
    pub async fn with_config(config: &StoreConfig) -> Result<Self> {
        let pool = common::db::connect(config).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn get_holding(&self, user_id: Uuid, paper: &str) -> Result<Option<PaperCount>> {
        debug!("Getting holding of {} for {}", paper, user_id);

        let row = sqlx::query(
            "SELECT amount FROM storage WHERE id = $1 AND paper_name = $2"
        )
        .bind(user_id)
        .bind(paper)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("amount")?)),
            None => Ok(None),
        }
    }

    async fn get_holdings(&self, user_id: Uuid) -> Result<Vec<Holding>> {
        debug!("Getting all holdings for {}", user_id);

        let rows = sqlx::query(
            "SELECT paper_name, amount, updated_at
             FROM storage
             WHERE id = $1
             ORDER BY paper_name"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut holdings = Vec::with_capacity(rows.len());
        for row in rows {
            holdings.push(Holding {
                user_id,
                paper: row.try_get("paper_name")?,
                quantity: row.try_get("amount")?,
                updated_at: row.try_get("updated_at")?,
            });
        }

        Ok(holdings)
    }

    async fn create_holding(&self, user_id: Uuid, paper: &str, quantity: PaperCount) -> Result<Holding> {
        debug!("Creating holding of {} {} for {}", quantity, paper, user_id);

        let holding = Holding::new(user_id, paper, quantity);
        sqlx::query(
            "INSERT INTO storage (id, paper_name, amount, updated_at) VALUES ($1, $2, $3, $4)"
        )
        .bind(user_id)
        .bind(paper)
        .bind(quantity)
        .bind(holding.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(holding)
    }

    async fn apply_delta(&self, user_id: Uuid, paper: &str, delta: PaperCount) -> Result<PaperCount> {
        debug!("Changing holding of {} for {} by {}", paper, user_id, delta);

        let row = sqlx::query(
            "UPDATE storage SET amount = amount + $1, updated_at = $2
             WHERE id = $3 AND paper_name = $4
             RETURNING amount"
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(user_id)
        .bind(paper)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get("amount")?),
            None => Err(Error::Storage(format!("No holding of {} for user {}", paper, user_id))),
        }
    }
}
