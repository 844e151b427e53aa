//! Portfolio service: the durable papers inventory and the read-optimized
//! holdings cache derived from it

pub mod cache;
pub mod inventory;

pub use cache::{holdings_key, HoldingsCache, InMemoryHoldingsCache};
pub use inventory::{InMemoryInventoryRepository, InventoryRepository, PostgresInventoryRepository};
