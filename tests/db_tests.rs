//! PostgreSQL-backed store tests.
//!
//! Run with `DATABASE_URL=... cargo test --features db_tests -- --test-threads=1`.

#![cfg(feature = "db_tests")]

use std::env;
use std::sync::Arc;

use papers_tests::account_service::{LedgerRepository, PostgresLedgerRepository};
use papers_tests::common::db::{self, DbPool};
use papers_tests::common::decimal::{dec, Amount};
use papers_tests::common::error::Error;
use papers_tests::common::model::holding::PaperPosition;
use papers_tests::common::model::paper::Paper;
use papers_tests::common::{StoreConfig, UserLocks};
use papers_tests::market_data::{PostgresPaperRepository, PriceOracle};
use papers_tests::portfolio_service::{InMemoryHoldingsCache, InventoryRepository, PostgresInventoryRepository};
use papers_tests::trade_executor::TradeExecutor;
use uuid::Uuid;

async fn pool() -> DbPool {
    let url = env::var("DATABASE_URL").expect("DATABASE_URL must be set for db_tests");
    let pool = db::connect(&StoreConfig::postgres(url, 2)).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

#[tokio::test]
async fn test_ledger_deltas() {
    let pool = pool().await;
    let ledger = PostgresLedgerRepository::new(pool);
    let user = Uuid::new_v4();

    ledger.open_account(user, dec!(100)).await.unwrap();
    // Opening again leaves the balance alone
    ledger.open_account(user, dec!(999)).await.unwrap();

    assert_eq!(ledger.apply_delta(user, dec!(-30.25)).await.unwrap(), dec!(69.75));
    assert_eq!(ledger.balance(user).await.unwrap(), dec!(69.75));

    assert!(matches!(
        ledger.apply_delta(Uuid::new_v4(), dec!(1)).await,
        Err(Error::AccountNotFound(_))
    ));
}

#[tokio::test]
async fn test_inventory_rows() {
    let pool = pool().await;
    let ledger = PostgresLedgerRepository::new(pool.clone());
    let inventory = PostgresInventoryRepository::new(pool);
    let user = Uuid::new_v4();
    ledger.open_account(user, dec!(0)).await.unwrap();

    assert_eq!(inventory.get_holding(user, "Tin").await.unwrap(), None);
    inventory.create_holding(user, "Tin", 4).await.unwrap();
    assert!(inventory.create_holding(user, "Tin", 1).await.is_err());

    assert_eq!(inventory.apply_delta(user, "Tin", -4).await.unwrap(), 0);
    assert_eq!(inventory.get_holding(user, "Tin").await.unwrap(), Some(0));
    assert!(matches!(
        inventory.apply_delta(user, "Gold", 1).await,
        Err(Error::Storage(_))
    ));
}

#[tokio::test]
async fn test_trade_against_postgres_stores() {
    let pool = pool().await;
    let paper = format!("P{}", Uuid::new_v4().simple());
    sqlx::query("INSERT INTO papers (name, price) VALUES ($1, $2)")
        .bind(&paper)
        .bind(dec!(12.5))
        .execute(&pool)
        .await
        .unwrap();

    let market = Arc::new(PostgresPaperRepository::new(pool.clone()));
    assert_eq!(market.paper_price(&paper).await.unwrap(), Some(dec!(12.5)));

    let ledger = Arc::new(PostgresLedgerRepository::new(pool.clone()));
    let user = Uuid::new_v4();
    ledger.open_account(user, dec!(100)).await.unwrap();

    let executor = TradeExecutor::new(
        ledger.clone(),
        Arc::new(PostgresInventoryRepository::new(pool)),
        Arc::new(InMemoryHoldingsCache::new()),
        market,
        Arc::new(UserLocks::new()),
    );

    assert!(executor.buy(user, &paper, 4).await.unwrap().is_executed());
    assert!(executor.sell(user, &paper, 1).await.unwrap().is_executed());

    assert_eq!(ledger.balance(user).await.unwrap(), dec!(62.5));
    assert_eq!(
        executor.user_papers(user).await.unwrap(),
        vec![PaperPosition::new(paper, 3, dec!(12.5))]
    );
}

#[tokio::test]
async fn test_oracle_follows_price_updates() {
    let pool = pool().await;
    let oracle = PostgresPaperRepository::new(pool.clone());
    let paper = format!("P{}", Uuid::new_v4().simple());

    assert_eq!(oracle.paper_price(&paper).await.unwrap(), None);

    sqlx::query("INSERT INTO papers (name, price) VALUES ($1, $2)")
        .bind(&paper)
        .bind(dec!(3))
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(oracle.tradable_price(&paper).await.unwrap(), Some(dec!(3)));

    // The simulation moves the price after the oracle was built
    sqlx::query("UPDATE papers SET price = $1 WHERE name = $2")
        .bind(dec!(4.75))
        .bind(&paper)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(oracle.paper_price(&paper).await.unwrap(), Some(dec!(4.75)));
    assert!(oracle
        .tradable_papers()
        .await
        .unwrap()
        .contains(&Paper::new(paper.clone(), dec!(4.75))));

    // Halted papers drop out of the tradable list
    sqlx::query("UPDATE papers SET price = 0 WHERE name = $1")
        .bind(&paper)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(oracle.tradable_price(&paper).await.unwrap(), None);
    assert!(oracle.tradable_papers().await.unwrap().iter().all(|p| p.name != paper));
}

#[tokio::test]
async fn test_ledger_rejects_out_of_range_balance() {
    let pool = pool().await;
    let ledger = PostgresLedgerRepository::new(pool);
    let user = Uuid::new_v4();
    ledger.open_account(user, Amount::MAX).await.unwrap();

    assert!(matches!(ledger.apply_delta(user, dec!(1)).await, Err(Error::DecimalError(_))));
    assert_eq!(ledger.balance(user).await.unwrap(), Amount::MAX);
}
