//! Metapackage for cross-crate tests.
//!
//! Re-exports the workspace crates so the integration tests under `tests/`
//! can wire stores, the price board and the executor together.

pub use account_service;
pub use common;
pub use market_data;
pub use portfolio_service;
pub use trade_executor;
