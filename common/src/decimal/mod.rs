//! Decimal type utilities for precise financial calculations

use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

use crate::error::{Error, Result};

/// Unit price of a paper
pub type Price = Decimal;

/// Cash amount (typically Price * number of papers)
pub type Amount = Decimal;

/// Number of papers held or traded. Signed so it can carry deltas.
pub type PaperCount = i64;

/// Total cost of `count` papers at `price`
pub fn amount_for(price: Price, count: PaperCount) -> Result<Amount> {
    price.checked_mul(Decimal::from(count)).ok_or_else(|| {
        Error::DecimalError(format!("{} papers at {} overflows the amount range", count, price))
    })
}

/// `balance + delta`, failing instead of overflowing
pub fn checked_balance(balance: Amount, delta: Amount) -> Result<Amount> {
    balance
        .checked_add(delta)
        .ok_or_else(|| Error::DecimalError(format!("balance {} plus {} overflows", balance, delta)))
}

/// Precision helpers for common operations
pub mod precision {
    use super::*;

    /// Precision used when prices are shown to a user
    pub const DISPLAY_PRECISION: u32 = 2;

    /// Round a price or amount for presentation. Stored values keep full precision.
    pub fn round_display(value: Decimal) -> Decimal {
        value.round_dp(DISPLAY_PRECISION)
    }
}
