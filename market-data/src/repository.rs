//! Durable paper prices written by the market simulation
//!
//! The simulation keeps rewriting the `papers` table, so every lookup reads
//! the row as it is now instead of a snapshot taken at startup.

use async_trait::async_trait;
use common::decimal::Price;
use common::error::Result;
use common::model::paper::Paper;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::oracle::PriceOracle;

/// Live price oracle over the `papers` table
pub struct PostgresPaperRepository {
    pool: PgPool,
}

impl PostgresPaperRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceOracle for PostgresPaperRepository {
    async fn paper_price(&self, name: &str) -> Result<Option<Price>> {
        debug!("Reading price of {} from database", name);

        let row = sqlx::query("SELECT price FROM papers WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get::<Price, _>("price")?)),
            None => Ok(None),
        }
    }

    async fn tradable_papers(&self) -> Result<Vec<Paper>> {
        debug!("Listing tradable papers from database");

        let rows = sqlx::query("SELECT name, price FROM papers WHERE price > 0 ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let mut papers = Vec::with_capacity(rows.len());
        for row in rows {
            papers.push(Paper::new(row.try_get::<String, _>("name")?, row.try_get("price")?));
        }

        Ok(papers)
    }
}
