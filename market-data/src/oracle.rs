//! Read-only price lookup used by trading

use async_trait::async_trait;
use common::decimal::Price;
use common::error::Result;
use common::model::paper::Paper;

/// Source of current paper prices.
///
/// A missing price or a price of zero means the paper cannot be traded.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Current unit price of a paper
    async fn paper_price(&self, name: &str) -> Result<Option<Price>>;

    /// All papers that can currently be traded, ordered by name
    async fn tradable_papers(&self) -> Result<Vec<Paper>>;

    /// Price of a paper if it is tradable right now
    async fn tradable_price(&self, name: &str) -> Result<Option<Price>> {
        Ok(self.paper_price(name).await?.filter(|price| *price > Price::ZERO))
    }
}
