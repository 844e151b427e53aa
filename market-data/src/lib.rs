//! Market data: current paper prices
//!
//! Prices are owned by an external market simulation. In memory it publishes
//! into the [`MarketDataService`] board; with Postgres it writes the `papers`
//! table that [`PostgresPaperRepository`] reads. Trading only sees them
//! through [`PriceOracle`].

pub mod oracle;
pub mod repository;
mod service;

pub use oracle::PriceOracle;
pub use repository::PostgresPaperRepository;
pub use service::MarketDataService;
