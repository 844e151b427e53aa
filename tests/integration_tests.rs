//! End-to-end flows across the ledger, inventory, cache, price board and executor

use std::sync::Arc;

use papers_tests::account_service::{AccountService, InMemoryLedgerRepository};
use papers_tests::common::decimal::{dec, Price};
use papers_tests::common::error::Error;
use papers_tests::common::model::holding::PaperPosition;
use papers_tests::common::model::paper::Paper;
use papers_tests::common::model::trade::{TradeOutcome, TradeRequest};
use papers_tests::common::UserLocks;
use papers_tests::market_data::MarketDataService;
use papers_tests::portfolio_service::{HoldingsCache, InMemoryHoldingsCache, InMemoryInventoryRepository};
use papers_tests::trade_executor::TradeExecutor;
use uuid::Uuid;

struct Exchange {
    accounts: AccountService,
    executor: Arc<TradeExecutor>,
    ledger: Arc<InMemoryLedgerRepository>,
    cache: Arc<InMemoryHoldingsCache>,
    market: Arc<MarketDataService>,
}

fn exchange() -> Exchange {
    let locks = Arc::new(UserLocks::new());
    let ledger = Arc::new(InMemoryLedgerRepository::new());
    let cache = Arc::new(InMemoryHoldingsCache::new());
    let market = Arc::new(MarketDataService::new());

    let executor = Arc::new(TradeExecutor::new(
        ledger.clone(),
        Arc::new(InMemoryInventoryRepository::new()),
        cache.clone(),
        market.clone(),
        locks.clone(),
    ));

    Exchange {
        accounts: AccountService::with_repository(ledger.clone(), locks),
        executor,
        ledger,
        cache,
        market,
    }
}

#[tokio::test]
async fn test_trading_session() {
    let ex = exchange();
    let user = Uuid::new_v4();
    ex.ledger.open_account(user, dec!(0));
    ex.market
        .seed(&[Paper::new("BasePaper", dec!(1)), Paper::new("Gold", dec!(40))])
        .unwrap();

    // Nothing to spend yet
    let outcome = ex.executor.execute(&TradeRequest::buy(user, "Gold", 1)).await.unwrap();
    assert_eq!(outcome, TradeOutcome::InsufficientFunds);

    ex.accounts.deposit(user, dec!(100)).await.unwrap();
    assert!(ex.executor.execute(&TradeRequest::buy(user, "Gold", 2)).await.unwrap().is_executed());
    assert!(ex.executor.execute(&TradeRequest::buy(user, "BasePaper", 15)).await.unwrap().is_executed());
    assert_eq!(ex.accounts.get_balance(user).await.unwrap(), dec!(5));

    // The market moves, holdings follow
    ex.market.publish("Gold", dec!(45.5)).unwrap();
    let papers = ex.executor.user_papers(user).await.unwrap();
    assert_eq!(
        papers,
        vec![
            PaperPosition::new("BasePaper", 15, dec!(1)),
            PaperPosition::new("Gold", 2, dec!(45.5)),
        ]
    );

    let outcome = ex.executor.execute(&TradeRequest::sell(user, "Gold", 2)).await.unwrap();
    assert_eq!(outcome.receipt().map(|r| r.amount), Some(dec!(91)));
    assert_eq!(ex.accounts.get_balance(user).await.unwrap(), dec!(96));

    ex.accounts.withdraw(user, dec!(96)).await.unwrap();
    assert!(matches!(
        ex.accounts.withdraw(user, dec!(1)).await,
        Err(Error::InsufficientBalance(_))
    ));

    // Emptied holdings stay listed at zero quantity
    let cached = ex.cache.user_holdings(user).await.unwrap().unwrap();
    assert_eq!(cached[1], PaperPosition::new("Gold", 0, dec!(45.5)));
}

#[tokio::test]
async fn test_halted_paper_cannot_be_traded_but_stays_in_holdings() {
    let ex = exchange();
    let user = Uuid::new_v4();
    ex.ledger.open_account(user, dec!(50));
    ex.market.publish("Tin", dec!(2)).unwrap();

    ex.executor.buy(user, "Tin", 5).await.unwrap();
    ex.market.publish("Tin", Price::ZERO).unwrap();

    assert_eq!(ex.executor.sell(user, "Tin", 5).await.unwrap(), TradeOutcome::UnknownInstrument);
    assert!(ex.executor.available_papers().await.unwrap().is_empty());
    assert_eq!(
        ex.executor.user_papers(user).await.unwrap(),
        vec![PaperPosition::new("Tin", 5, Price::ZERO)]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_withdrawals_serialize_with_trades() {
    let ex = Arc::new(exchange());
    let user = Uuid::new_v4();
    ex.ledger.open_account(user, dec!(100));
    ex.market.publish("Gold", dec!(10)).unwrap();

    let mut tasks = Vec::new();
    for i in 0..10 {
        let ex = ex.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                ex.executor.buy(user, "Gold", 2).await.map(|o| o.is_executed())
            } else {
                ex.accounts.withdraw(user, dec!(20)).await.map(|_| true)
            }
        }));
    }

    for task in tasks {
        match task.await.unwrap() {
            Ok(_) | Err(Error::InsufficientBalance(_)) => (),
            Err(e) => panic!("Unexpected error {:?}", e),
        }
    }

    // Every successful debit was 20, so the balance never went below zero
    assert_eq!(ex.accounts.get_balance(user).await.unwrap(), dec!(0));
}
