//! Application configuration

use std::env;

use common::{RepositoryType, StoreConfig};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API port
    pub port: u16,
    /// Ledger and inventory stores
    pub store: StoreConfig,
}

impl AppConfig {
    /// Create a new configuration from environment variables
    pub fn new() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            store: StoreConfig::from_env(),
        }
    }

    /// Force the PostgreSQL stores regardless of `STORAGE_BACKEND`
    pub fn use_postgres(&mut self) {
        if self.store.backend == RepositoryType::InMemory {
            self.store.backend = RepositoryType::Postgres(None);
        }
    }

    /// Default listening address when none is given on the command line
    pub fn listen_addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
