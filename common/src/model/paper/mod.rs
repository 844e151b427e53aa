//! Paper (tradable instrument) models

use serde::{Deserialize, Serialize};

use crate::decimal::{precision, Price};
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// A tradable paper and its current unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Paper {
    /// Unique paper name
    pub name: String,
    /// Current unit price
    pub price: Price,
}

impl Paper {
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// A price of zero marks a paper that cannot be traded
    pub fn is_tradable(&self) -> bool {
        self.price > Price::ZERO
    }

    /// Price rounded for display
    pub fn display_price(&self) -> Price {
        precision::round_display(self.price)
    }
}
