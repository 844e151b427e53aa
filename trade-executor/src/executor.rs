//! Trade executor implementation

use std::sync::Arc;

use account_service::LedgerRepository;
use common::decimal::{amount_for, Price};
use common::error::{ErrorExt, Result};
use common::model::holding::PaperPosition;
use common::model::paper::Paper;
use common::model::trade::{Side, TradeOutcome, TradeReceipt, TradeRequest};
use common::UserLocks;
use futures::FutureExt;
use market_data::PriceOracle;
use portfolio_service::cache::HoldingsCache;
use portfolio_service::inventory::InventoryRepository;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::saga::Saga;

/// Executes trades across the ledger, the inventory and the holdings cache.
///
/// Every trade takes the user's serialization scope before its first read
/// and keeps it until the holdings cache has been refreshed, so funds and
/// holdings checks can never act on a stale balance.
pub struct TradeExecutor {
    ledger: Arc<dyn LedgerRepository>,
    inventory: Arc<dyn InventoryRepository>,
    cache: Arc<dyn HoldingsCache>,
    oracle: Arc<dyn PriceOracle>,
    locks: Arc<UserLocks>,
}

impl TradeExecutor {
    pub fn new(
        ledger: Arc<dyn LedgerRepository>,
        inventory: Arc<dyn InventoryRepository>,
        cache: Arc<dyn HoldingsCache>,
        oracle: Arc<dyn PriceOracle>,
        locks: Arc<UserLocks>,
    ) -> Self {
        Self {
            ledger,
            inventory,
            cache,
            oracle,
            locks,
        }
    }

    /// Serialization scopes, shared with the balance service
    pub fn locks(&self) -> Arc<UserLocks> {
        self.locks.clone()
    }

    /// Run a trade request
    pub async fn execute(&self, request: &TradeRequest) -> Result<TradeOutcome> {
        match request.side {
            Side::Buy => self.buy(request.user_id, &request.paper, request.quantity).await,
            Side::Sell => self.sell(request.user_id, &request.paper, request.quantity).await,
        }
    }

    /// Buy `quantity` papers, paying from the cash balance
    pub async fn buy(&self, user_id: Uuid, paper: &str, quantity: i32) -> Result<TradeOutcome> {
        let quantity = TradeRequest::buy(user_id, paper, quantity).validate()?;
        let _scope = self.locks.acquire(user_id).await;

        let Some(price) = self.current_price(paper).await? else {
            debug!("Rejecting buy of {} for {}: no tradable price", paper, user_id);
            return Ok(TradeOutcome::UnknownInstrument);
        };

        let cost = amount_for(price, quantity)
            .with_context(|| format!("Failed to price buy of {} {}", quantity, paper))?;
        let balance = self.ledger.balance(user_id).await
            .with_context(|| format!("Failed to read balance of {}", user_id))?;
        if cost > balance {
            debug!("Rejecting buy of {} {} for {}: cost {} exceeds balance {}", quantity, paper, user_id, cost, balance);
            return Ok(TradeOutcome::InsufficientFunds);
        }

        let ledger = &self.ledger;
        let inventory = &self.inventory;

        Saga::new(format!("buy {} {} for {}", quantity, paper, user_id))
            .step(
                "debit ledger",
                move || async move { ledger.apply_delta(user_id, -cost).await.map(drop) }.boxed(),
                move || async move { ledger.apply_delta(user_id, cost).await.map(drop) }.boxed(),
            )
            .final_step("add papers", move || {
                async move {
                    match inventory.get_holding(user_id, paper).await? {
                        Some(_) => inventory.apply_delta(user_id, paper, quantity).await.map(drop),
                        None => inventory.create_holding(user_id, paper, quantity).await.map(drop),
                    }
                }
                .boxed()
            })
            .run()
            .await?;

        info!(user = %user_id, paper, quantity, amount = %cost, "Buy executed");

        let mut receipt = TradeReceipt::new(user_id, Side::Buy, paper, quantity, price, cost);
        receipt.holdings = self.refresh_holdings(user_id).await;
        Ok(TradeOutcome::Executed(receipt))
    }

    /// Sell `quantity` papers, crediting the cash balance
    pub async fn sell(&self, user_id: Uuid, paper: &str, quantity: i32) -> Result<TradeOutcome> {
        let quantity = TradeRequest::sell(user_id, paper, quantity).validate()?;
        let _scope = self.locks.acquire(user_id).await;

        let held = self.inventory.get_holding(user_id, paper).await
            .with_context(|| format!("Failed to read holding of {} for {}", paper, user_id))?
            .unwrap_or(0);
        if quantity > held {
            debug!("Rejecting sell of {} {} for {}: holds {}", quantity, paper, user_id, held);
            return Ok(TradeOutcome::InsufficientHoldings);
        }

        let Some(price) = self.current_price(paper).await? else {
            debug!("Rejecting sell of {} for {}: no tradable price", paper, user_id);
            return Ok(TradeOutcome::UnknownInstrument);
        };

        let proceeds = amount_for(price, quantity)
            .with_context(|| format!("Failed to price sell of {} {}", quantity, paper))?;
        let ledger = &self.ledger;
        let inventory = &self.inventory;

        Saga::new(format!("sell {} {} for {}", quantity, paper, user_id))
            .step(
                "withdraw papers",
                move || async move { inventory.apply_delta(user_id, paper, -quantity).await.map(drop) }.boxed(),
                move || async move { inventory.apply_delta(user_id, paper, quantity).await.map(drop) }.boxed(),
            )
            .final_step(
                "credit ledger",
                move || async move { ledger.apply_delta(user_id, proceeds).await.map(drop) }.boxed(),
            )
            .run()
            .await?;

        info!(user = %user_id, paper, quantity, amount = %proceeds, "Sell executed");

        let mut receipt = TradeReceipt::new(user_id, Side::Sell, paper, quantity, price, proceeds);
        receipt.holdings = self.refresh_holdings(user_id).await;
        Ok(TradeOutcome::Executed(receipt))
    }

    /// Holdings of a user marked to the current prices.
    ///
    /// Served from the holdings cache; a missing or unreadable projection is
    /// rebuilt from the inventory and written back first.
    pub async fn user_papers(&self, user_id: Uuid) -> Result<Vec<PaperPosition>> {
        let cached = match self.cache.user_holdings(user_id).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Ignoring unreadable holdings cache for {}: {}", user_id, e);
                None
            }
        };

        let positions = match cached {
            Some(positions) => positions,
            None => {
                let _scope = self.locks.acquire(user_id).await;
                let positions = self.project_holdings(user_id).await?;
                if let Err(e) = self.cache.replace_user_holdings(user_id, &positions).await {
                    warn!("Failed to write rebuilt holdings cache for {}: {}", user_id, e);
                }
                positions
            }
        };

        self.mark_to_market(positions).await
    }

    /// Papers that can be traded right now, ordered by name
    pub async fn available_papers(&self) -> Result<Vec<Paper>> {
        self.oracle.tradable_papers().await
    }

    async fn current_price(&self, paper: &str) -> Result<Option<Price>> {
        self.oracle.tradable_price(paper).await
            .with_context(|| format!("Failed to look up price of {}", paper))
    }

    /// Rebuild and store the projection after a committed trade.
    ///
    /// Never fails the trade: a projection that cannot be built yields `None`,
    /// a cache write failure leaves the previous projection in place.
    async fn refresh_holdings(&self, user_id: Uuid) -> Option<Vec<PaperPosition>> {
        let positions = match self.project_holdings(user_id).await {
            Ok(positions) => positions,
            Err(e) => {
                warn!("Failed to rebuild holdings of {} after trade: {}", user_id, e);
                return None;
            }
        };

        if let Err(e) = self.cache.replace_user_holdings(user_id, &positions).await {
            warn!("Failed to refresh holdings cache for {}: {}", user_id, e);
        }

        Some(positions)
    }

    /// Current inventory of a user with today's prices attached
    async fn project_holdings(&self, user_id: Uuid) -> Result<Vec<PaperPosition>> {
        let holdings = self.inventory.get_holdings(user_id).await
            .with_context(|| format!("Failed to read holdings of {}", user_id))?;

        let positions = holdings
            .into_iter()
            .map(|holding| PaperPosition::new(holding.paper, holding.quantity, Price::ZERO))
            .collect();

        self.mark_to_market(positions).await
    }

    // Unpriced papers are shown at zero
    async fn mark_to_market(&self, positions: Vec<PaperPosition>) -> Result<Vec<PaperPosition>> {
        let mut marked = Vec::with_capacity(positions.len());
        for mut position in positions {
            position.price = self.oracle.paper_price(&position.name).await?.unwrap_or(Price::ZERO);
            marked.push(position);
        }
        Ok(marked)
    }
}
