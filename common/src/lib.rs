//! Common types and utilities for the papers exchange
//!
//! This library contains shared types, utilities, and abstractions used across
//! all services of the exchange. It provides a unified approach to error
//! handling, store configuration, per-user serialization and domain models.

pub mod config;
pub mod db;
pub mod decimal;
pub mod error;
pub mod model;
pub mod sync;

/// Re-export important types
pub use config::{RepositoryType, StoreConfig};
pub use decimal::*;
pub use error::{Error, ErrorExt, IntoError, Result};
pub use sync::{UserLockGuard, UserLocks};

// Re-export utoipa for use in model ToSchema derives
#[cfg(feature = "utoipa")]
pub use utoipa;
