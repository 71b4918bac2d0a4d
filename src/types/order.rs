//! Order types for the exchange.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so that resting orders have
//! one canonical byte encoding. The state commitment hashes these bytes.
//!
//! ## Units
//!
//! `amount` and `remaining` are base-token units. `price` is quote-token units
//! per one base unit, so the quote value of `n` base units is `n * price`.

use ssz_rs::prelude::*;

use crate::error::Result as ExchangeResult;
use crate::types::amount::notional;
use crate::types::{AccountId, Market, Ticker};

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Side {
    /// Buy order (bid) - pays quote, receives base
    #[default]
    Buy,
    /// Sell order (ask) - pays base, receives quote
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A resting limit order.
///
/// ## SSZ Layout
///
/// Fixed-size container of 113 bytes:
/// id(8) + trader(8) + side_raw(1) + base(32) + quote(32) + price(8)
/// + amount(8) + remaining(8) + sequence(8).
///
/// ## Example
///
/// ```
/// use token_dex::types::{AccountId, Market, Order, Side, Ticker};
///
/// let market = Market::new(Ticker::new("MTK").unwrap(), Ticker::new("USDC").unwrap()).unwrap();
/// let order = Order::new(1, AccountId(7), Side::Buy, market, 2, 100, 1);
///
/// assert_eq!(order.remaining, 100);
/// assert_eq!(order.reserved().unwrap(), 200);
/// assert_eq!(order.reserved_ticker(), market.quote);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier (assigned by the engine)
    pub id: u64,

    /// Account that placed the order
    pub trader: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Encoded base ticker
    pub base_ticker: [u8; 32],

    /// Encoded quote ticker
    pub quote_ticker: [u8; 32],

    /// Quote units per one base unit
    pub price: u64,

    /// Original amount in base units
    pub amount: u64,

    /// Amount not yet matched
    pub remaining: u64,

    /// Admission sequence number; tie-break for equal prices
    pub sequence: u64,
}

impl Order {
    /// Create a new resting order with `remaining == amount`.
    pub fn new(
        id: u64,
        trader: AccountId,
        side: Side,
        market: Market,
        price: u64,
        amount: u64,
        sequence: u64,
    ) -> Self {
        Self {
            id,
            trader: trader.as_u64(),
            side_raw: side.to_u8(),
            base_ticker: market.base.to_bytes(),
            quote_ticker: market.quote.to_bytes(),
            price,
            amount,
            remaining: amount,
            sequence,
        }
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    /// Account that owns the order
    #[inline]
    pub fn trader(&self) -> AccountId {
        AccountId(self.trader)
    }

    #[inline]
    pub fn base(&self) -> Ticker {
        Ticker::from_bytes(self.base_ticker)
    }

    #[inline]
    pub fn quote(&self) -> Ticker {
        Ticker::from_bytes(self.quote_ticker)
    }

    /// The `(base, quote)` pair this order trades
    #[inline]
    pub fn market(&self) -> Market {
        Market::from_parts(self.base(), self.quote())
    }

    /// Check if the order is fully filled
    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    /// Get the filled amount
    pub fn filled_amount(&self) -> u64 {
        self.amount.saturating_sub(self.remaining)
    }

    /// Fill a portion of this order
    ///
    /// Returns the amount actually filled, capped at `remaining`.
    pub fn fill(&mut self, fill_qty: u64) -> u64 {
        let actual_fill = fill_qty.min(self.remaining);
        self.remaining -= actual_fill;
        actual_fill
    }

    /// Ticker escrowed by this order: quote for a buy, base for a sell
    pub fn reserved_ticker(&self) -> Ticker {
        match self.side() {
            Side::Buy => self.quote(),
            Side::Sell => self.base(),
        }
    }

    /// Value still held in escrow for the unfilled remainder
    pub fn reserved(&self) -> ExchangeResult<u64> {
        match self.side() {
            Side::Buy => notional(self.remaining, self.price),
            Side::Sell => Ok(self.remaining),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
