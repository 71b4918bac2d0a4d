//! Integer amount arithmetic.
//!
//! ## Overview
//!
//! Balances, order amounts and prices are `u64` token units. There is no
//! implicit scaling: a price of `3` means three quote units per base unit.
//! Every operation that can leave the `u64` range is checked and reports
//! [`ExchangeError::Overflow`] instead of wrapping.
//!
//! Aggregates over many balances (used by invariant checks) are `u128`.
//! Average fill prices are not integers in general and are reported as
//! [`Decimal`].
//!
//! ```
//! use token_dex::types::amount::{notional, average_price};
//! use rust_decimal::Decimal;
//!
//! assert_eq!(notional(100, 3).unwrap(), 300);
//! assert!(notional(u64::MAX, 2).is_err());
//! assert_eq!(average_price(250, 100), Some(Decimal::new(25, 1)));
//! ```

use rust_decimal::Decimal;

use crate::error::{ExchangeError, Result};

/// Quote value of `amount` base units at `price`
#[inline]
pub fn notional(amount: u64, price: u64) -> Result<u64> {
    amount.checked_mul(price).ok_or(ExchangeError::Overflow)
}

/// Checked addition
#[inline]
pub fn checked_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(ExchangeError::Overflow)
}

/// Volume-weighted average price: `quote_volume / base_amount`.
///
/// Returns `None` when nothing was filled.
pub fn average_price(quote_volume: u64, base_amount: u64) -> Option<Decimal> {
    if base_amount == 0 {
        return None;
    }
    Decimal::from(quote_volume).checked_div(Decimal::from(base_amount))
}

// ============================================================================
// Unit Tests
// ============================================================================
