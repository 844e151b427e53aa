//! Holding models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{PaperCount, Price};
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Durable number of papers of one kind held by a user.
///
/// One row per (user, paper). A holding that drops to zero is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Holding {
    /// Owner
    pub user_id: Uuid,
    /// Paper name
    pub paper: String,
    /// Number of papers held
    pub quantity: PaperCount,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Holding {
    pub fn new(user_id: Uuid, paper: impl Into<String>, quantity: PaperCount) -> Self {
        Self {
            user_id,
            paper: paper.into(),
            quantity,
            updated_at: Utc::now(),
        }
    }
}

/// A holding marked to market: what "my papers" returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct PaperPosition {
    /// Paper name
    pub name: String,
    /// Number of papers held
    pub quantity: PaperCount,
    /// Current unit price (zero when the paper is no longer priced)
    pub price: Price,
}

impl PaperPosition {
    pub fn new(name: impl Into<String>, quantity: PaperCount, price: Price) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }
}
