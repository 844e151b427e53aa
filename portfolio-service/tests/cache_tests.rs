use common::decimal::dec;
use common::model::holding::PaperPosition;
use portfolio_service::{holdings_key, HoldingsCache, InMemoryHoldingsCache};
use uuid::Uuid;

#[tokio::test]
async fn test_miss_then_replace() {
    let cache = InMemoryHoldingsCache::new();
    let user_id = Uuid::new_v4();

    assert!(cache.user_holdings(user_id).await.unwrap().is_none());

    let holdings = vec![
        PaperPosition::new("ACME", 3, dec!(12.5)),
        PaperPosition::new("ZETA", 0, dec!(1)),
    ];
    cache.replace_user_holdings(user_id, &holdings).await.unwrap();

    assert_eq!(cache.user_holdings(user_id).await.unwrap(), Some(holdings));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_replace_overwrites_whole_projection() {
    let cache = InMemoryHoldingsCache::new();
    let user_id = Uuid::new_v4();

    cache
        .replace_user_holdings(user_id, &[PaperPosition::new("ACME", 3, dec!(2))])
        .await
        .unwrap();
    cache
        .replace_user_holdings(user_id, &[PaperPosition::new("ZETA", 1, dec!(4))])
        .await
        .unwrap();

    let cached = cache.user_holdings(user_id).await.unwrap().unwrap();
    assert_eq!(cached, vec![PaperPosition::new("ZETA", 1, dec!(4))]);
}

#[tokio::test]
async fn test_evict() {
    let cache = InMemoryHoldingsCache::new();
    let user_id = Uuid::new_v4();

    cache.replace_user_holdings(user_id, &[]).await.unwrap();
    assert_eq!(cache.user_holdings(user_id).await.unwrap(), Some(vec![]));

    cache.evict(user_id);
    assert!(cache.user_holdings(user_id).await.unwrap().is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_key_format() {
    let user_id = Uuid::nil();
    assert_eq!(holdings_key(user_id), "user_papers:00000000-0000-0000-0000-000000000000");
}
