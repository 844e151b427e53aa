//! Holdings cache
//!
//! A disposable projection of each user's holdings with the prices attached
//! at refresh time. It carries no truth of its own: the inventory store is
//! authoritative and the projection can be rebuilt from it at any time.

use async_trait::async_trait;
use common::error::{Error, Result};
use common::model::holding::PaperPosition;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Key under which a user's projection is stored
pub fn holdings_key(user_id: Uuid) -> String {
    format!("user_papers:{}", user_id)
}

/// Read-optimized projection of user holdings
#[async_trait]
pub trait HoldingsCache: Send + Sync {
    /// Cached holdings for a user, `None` on a miss
    async fn user_holdings(&self, user_id: Uuid) -> Result<Option<Vec<PaperPosition>>>;

    /// Replace the whole projection for a user
    async fn replace_user_holdings(&self, user_id: Uuid, holdings: &[PaperPosition]) -> Result<()>;
}

/// In-memory key/value cache holding JSON documents
pub struct InMemoryHoldingsCache {
    /// Serialized projections by key
    entries: DashMap<String, String>,
}

impl InMemoryHoldingsCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Drop a user's projection; the next read rebuilds it
    pub fn evict(&self, user_id: Uuid) {
        self.entries.remove(&holdings_key(user_id));
    }

    /// Number of cached projections
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryHoldingsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HoldingsCache for InMemoryHoldingsCache {
    async fn user_holdings(&self, user_id: Uuid) -> Result<Option<Vec<PaperPosition>>> {
        let key = holdings_key(user_id);
        let Some(document) = self.entries.get(&key).map(|d| d.clone()) else {
            debug!("Holdings cache miss for {}", key);
            return Ok(None);
        };

        let holdings = serde_json::from_str(&document)
            .map_err(|e| Error::Storage(format!("Corrupt cache entry {}: {}", key, e)))?;
        Ok(Some(holdings))
    }

    async fn replace_user_holdings(&self, user_id: Uuid, holdings: &[PaperPosition]) -> Result<()> {
        let key = holdings_key(user_id);
        let document = serde_json::to_string(holdings)?;

        debug!("Replacing {} with {} holdings", key, holdings.len());
        self.entries.insert(key, document);
        Ok(())
    }
}
