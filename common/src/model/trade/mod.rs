//! Trade models and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Amount, PaperCount, Price};
use crate::error::{Error, Result};
use crate::model::holding::PaperPosition;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

/// A request to buy or sell a number of papers against the cash balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct TradeRequest {
    /// Trading user
    pub user_id: Uuid,
    /// Paper name
    pub paper: String,
    /// Number of papers, must be positive
    pub quantity: i32,
    /// Buy or sell
    pub side: Side,
}

impl TradeRequest {
    pub fn buy(user_id: Uuid, paper: impl Into<String>, quantity: i32) -> Self {
        Self {
            user_id,
            paper: paper.into(),
            quantity,
            side: Side::Buy,
        }
    }

    pub fn sell(user_id: Uuid, paper: impl Into<String>, quantity: i32) -> Self {
        Self {
            user_id,
            paper: paper.into(),
            quantity,
            side: Side::Sell,
        }
    }

    /// Reject requests that must never reach a store.
    ///
    /// Returns the quantity widened to a holding count.
    pub fn validate(&self) -> Result<PaperCount> {
        if self.quantity <= 0 {
            return Err(Error::ValidationError(format!(
                "Quantity must be positive, got {}",
                self.quantity
            )));
        }
        if self.paper.trim().is_empty() {
            return Err(Error::ValidationError("Paper name must not be empty".to_string()));
        }
        Ok(PaperCount::from(self.quantity))
    }
}

/// Details of an executed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct TradeReceipt {
    /// Trading user
    pub user_id: Uuid,
    /// Buy or sell
    pub side: Side,
    /// Paper name
    pub paper: String,
    /// Number of papers traded
    pub quantity: PaperCount,
    /// Unit price the trade executed at
    pub price: Price,
    /// Cash moved (price * quantity)
    pub amount: Amount,
    /// User holdings after the trade, `None` if the refresh could not be assembled
    pub holdings: Option<Vec<PaperPosition>>,
    /// Execution timestamp
    pub executed_at: DateTime<Utc>,
}

impl TradeReceipt {
    pub fn new(
        user_id: Uuid,
        side: Side,
        paper: impl Into<String>,
        quantity: PaperCount,
        price: Price,
        amount: Amount,
    ) -> Self {
        Self {
            user_id,
            side,
            paper: paper.into(),
            quantity,
            price,
            amount,
            holdings: None,
            executed_at: Utc::now(),
        }
    }
}

/// Result of a trade that reached the executor.
///
/// Rejections are normal outcomes, not errors: nothing was mutated and the
/// caller may retry with different parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeOutcome {
    /// Both durable steps committed
    Executed(TradeReceipt),
    /// Buy cost exceeds the cash balance
    InsufficientFunds,
    /// Sell quantity exceeds the papers held
    InsufficientHoldings,
    /// Paper has no price or a price of zero
    UnknownInstrument,
}

impl TradeOutcome {
    /// Stable wire code for the outcome kind
    pub fn code(&self) -> &'static str {
        match self {
            TradeOutcome::Executed(_) => "executed",
            TradeOutcome::InsufficientFunds => "insufficient_funds",
            TradeOutcome::InsufficientHoldings => "insufficient_holdings",
            TradeOutcome::UnknownInstrument => "unknown_instrument",
        }
    }

    /// Human readable description
    pub fn message(&self) -> &'static str {
        match self {
            TradeOutcome::Executed(_) => "trade executed",
            TradeOutcome::InsufficientFunds => "low balance",
            TradeOutcome::InsufficientHoldings => "not enough papers",
            TradeOutcome::UnknownInstrument => "unknown paper",
        }
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, TradeOutcome::Executed(_))
    }

    /// The receipt when the trade executed
    pub fn receipt(&self) -> Option<&TradeReceipt> {
        match self {
            TradeOutcome::Executed(receipt) => Some(receipt),
            _ => None,
        }
    }
}
