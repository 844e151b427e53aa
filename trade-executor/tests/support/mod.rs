//! Store doubles with switchable failures

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use account_service::{InMemoryLedgerRepository, LedgerRepository};
use async_trait::async_trait;
use common::decimal::{Amount, PaperCount, Price};
use common::error::{Error, Result};
use common::model::account::Account;
use common::model::holding::{Holding, PaperPosition};
use common::model::paper::Paper;
use common::UserLocks;
use market_data::MarketDataService;
use portfolio_service::cache::{HoldingsCache, InMemoryHoldingsCache};
use portfolio_service::inventory::{InMemoryInventoryRepository, InventoryRepository};
use trade_executor::TradeExecutor;
use uuid::Uuid;

fn injected(what: &str) -> Error {
    Error::Storage(format!("injected {} failure", what))
}

/// Ledger that can refuse debits, credits or reads
#[derive(Default)]
pub struct FaultyLedger {
    pub inner: InMemoryLedgerRepository,
    pub fail_debit: AtomicBool,
    pub fail_credit: AtomicBool,
    pub fail_read: AtomicBool,
}

#[async_trait]
impl LedgerRepository for FaultyLedger {
    async fn get_account(&self, user_id: Uuid) -> Result<Option<Account>> {
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(injected("ledger read"));
        }
        self.inner.get_account(user_id).await
    }

    async fn apply_delta(&self, user_id: Uuid, delta: Amount) -> Result<Amount> {
        if delta < Amount::ZERO && self.fail_debit.load(Ordering::SeqCst) {
            return Err(injected("ledger debit"));
        }
        if delta > Amount::ZERO && self.fail_credit.load(Ordering::SeqCst) {
            return Err(injected("ledger credit"));
        }
        self.inner.apply_delta(user_id, delta).await
    }
}

/// Inventory that can refuse row creation, additions or removals
#[derive(Default)]
pub struct FaultyInventory {
    pub inner: InMemoryInventoryRepository,
    pub fail_create: AtomicBool,
    pub fail_add: AtomicBool,
    pub fail_remove: AtomicBool,
}

#[async_trait]
impl InventoryRepository for FaultyInventory {
    async fn get_holding(&self, user_id: Uuid, paper: &str) -> Result<Option<PaperCount>> {
        self.inner.get_holding(user_id, paper).await
    }

    async fn get_holdings(&self, user_id: Uuid) -> Result<Vec<Holding>> {
        self.inner.get_holdings(user_id).await
    }

    async fn create_holding(&self, user_id: Uuid, paper: &str, quantity: PaperCount) -> Result<Holding> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(injected("holding create"));
        }
        self.inner.create_holding(user_id, paper, quantity).await
    }

    async fn apply_delta(&self, user_id: Uuid, paper: &str, delta: PaperCount) -> Result<PaperCount> {
        if delta > 0 && self.fail_add.load(Ordering::SeqCst) {
            return Err(injected("holding add"));
        }
        if delta < 0 && self.fail_remove.load(Ordering::SeqCst) {
            return Err(injected("holding remove"));
        }
        self.inner.apply_delta(user_id, paper, delta).await
    }
}

/// Cache that can refuse reads and writes
#[derive(Default)]
pub struct FaultyCache {
    pub inner: InMemoryHoldingsCache,
    pub fail_read: AtomicBool,
    pub fail_write: AtomicBool,
}

#[async_trait]
impl HoldingsCache for FaultyCache {
    async fn user_holdings(&self, user_id: Uuid) -> Result<Option<Vec<PaperPosition>>> {
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(injected("cache read"));
        }
        self.inner.user_holdings(user_id).await
    }

    async fn replace_user_holdings(&self, user_id: Uuid, holdings: &[PaperPosition]) -> Result<()> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(injected("cache write"));
        }
        self.inner.replace_user_holdings(user_id, holdings).await
    }
}

/// An executor over switchable stores, with handles kept for assertions
pub struct Harness {
    pub executor: TradeExecutor,
    pub ledger: Arc<FaultyLedger>,
    pub inventory: Arc<FaultyInventory>,
    pub cache: Arc<FaultyCache>,
    pub market: Arc<MarketDataService>,
}

impl Harness {
    pub fn new() -> Self {
        let ledger = Arc::new(FaultyLedger::default());
        let inventory = Arc::new(FaultyInventory::default());
        let cache = Arc::new(FaultyCache::default());
        let market = Arc::new(MarketDataService::new());

        let executor = TradeExecutor::new(
            ledger.clone(),
            inventory.clone(),
            cache.clone(),
            market.clone(),
            Arc::new(UserLocks::new()),
        );

        Self {
            executor,
            ledger,
            inventory,
            cache,
            market,
        }
    }

    /// Open an account and return its id
    pub fn user_with_balance(&self, balance: Amount) -> Uuid {
        let user_id = Uuid::new_v4();
        self.ledger.inner.open_account(user_id, balance);
        user_id
    }

    pub fn price(&self, name: &str, price: Price) {
        self.market.seed(&[Paper::new(name, price)]).unwrap();
    }

    pub async fn balance(&self, user_id: Uuid) -> Amount {
        self.ledger.inner.balance(user_id).await.unwrap()
    }

    /// Held quantity, `None` when no row exists
    pub async fn held(&self, user_id: Uuid, paper: &str) -> Option<PaperCount> {
        self.inventory.inner.get_holding(user_id, paper).await.unwrap()
    }

    pub async fn cached(&self, user_id: Uuid) -> Option<Vec<PaperPosition>> {
        self.cache.inner.user_holdings(user_id).await.unwrap()
    }
}

pub fn switch_on(flag: &AtomicBool) {
    flag.store(true, Ordering::SeqCst);
}

pub fn switch_off(flag: &AtomicBool) {
    flag.store(false, Ordering::SeqCst);
}
