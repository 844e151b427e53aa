//! Market data service implementation

use async_trait::async_trait;
use common::decimal::Price;
use common::error::{Error, Result};
use common::model::paper::Paper;
use dashmap::DashMap;
use tracing::debug;

use crate::oracle::PriceOracle;

/// Price board the market simulation publishes into
pub struct MarketDataService {
    /// Latest unit price by paper name
    prices: DashMap<String, Price>,
}

impl MarketDataService {
    /// Create an empty price board
    pub fn new() -> Self {
        Self {
            prices: DashMap::new(),
        }
    }

    /// Publish the latest price of a paper
    pub fn publish(&self, name: &str, price: Price) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::ValidationError("Paper name must not be empty".to_string()));
        }
        if price < Price::ZERO {
            return Err(Error::ValidationError(format!(
                "Price of {} must not be negative, got {}",
                name, price
            )));
        }

        debug!("Publishing price {} for {}", price, name);
        self.prices.insert(name.to_string(), price);
        Ok(())
    }

    /// Publish a batch of prices
    pub fn seed(&self, papers: &[Paper]) -> Result<()> {
        for paper in papers {
            self.publish(&paper.name, paper.price)?;
        }
        Ok(())
    }

    /// Stop quoting a paper
    pub fn delist(&self, name: &str) -> Option<Price> {
        self.prices.remove(name).map(|(_, price)| price)
    }
}

impl Default for MarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceOracle for MarketDataService {
    async fn paper_price(&self, name: &str) -> Result<Option<Price>> {
        Ok(self.prices.get(name).map(|p| *p))
    }

    async fn tradable_papers(&self) -> Result<Vec<Paper>> {
        let mut papers: Vec<Paper> = self
            .prices
            .iter()
            .map(|entry| Paper::new(entry.key().clone(), *entry.value()))
            .filter(Paper::is_tradable)
            .collect();

        papers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(papers)
    }
}
