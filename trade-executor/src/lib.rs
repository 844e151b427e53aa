//! Trade execution: buy and sell papers against the cash ledger
//!
//! A trade touches two independent durable stores (ledger and inventory) and
//! then refreshes the holdings cache. There is no shared transaction, so each
//! trade runs as a [`Saga`]: ordered steps, each paired with the action that
//! undoes it if a later step fails.

pub mod executor;
pub mod saga;

pub use executor::TradeExecutor;
pub use saga::Saga;
