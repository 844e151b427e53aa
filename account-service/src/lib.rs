//! Account service: the durable cash ledger and balance operations

pub mod repository;
pub mod service;

pub use repository::{InMemoryLedgerRepository, LedgerRepository, PostgresLedgerRepository};
pub use service::AccountService;
