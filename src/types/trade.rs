//! Trade type representing one fill between a resting order and a taker.

use crate::types::{AccountId, Market, Side};

/// A single match between a maker order and a taker.
///
/// ## Terminology
///
/// - **Maker**: the resting limit order that was already in the book
/// - **Taker**: the market order (or conversion hop) that consumed it
///
/// ## Price
///
/// The trade always executes at the maker's price.
///
/// ## Example
///
/// ```
/// use token_dex::types::{AccountId, Market, Side, Ticker, Trade};
///
/// let market = Market::new(Ticker::new("MTK").unwrap(), Ticker::new("USDC").unwrap()).unwrap();
/// let trade = Trade {
///     id: 1,
///     maker_order_id: 10,
///     maker: AccountId(1),
///     taker: AccountId(2),
///     taker_side: Side::Sell,
///     market,
///     price: 2,
///     amount: 50,
/// };
///
/// assert_eq!(trade.quote_amount(), 100);
/// assert_eq!(trade.buyer(), AccountId(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    /// Unique trade identifier (assigned by the engine)
    pub id: u64,

    /// Resting order that was matched
    pub maker_order_id: u64,

    /// Owner of the resting order
    pub maker: AccountId,

    /// Account that consumed liquidity
    pub taker: AccountId,

    /// Side of the taker
    pub taker_side: Side,

    /// Market the trade settled in
    pub market: Market,

    /// Execution price, always the maker's
    pub price: u64,

    /// Executed amount in base units
    pub amount: u64,
}

impl Trade {
    /// Quote value exchanged. Cannot overflow: the maker's escrow for this
    /// amount was computed with checked arithmetic at admission.
    pub fn quote_amount(&self) -> u64 {
        self.amount.saturating_mul(self.price)
    }

    /// Account that received the base asset
    pub fn buyer(&self) -> AccountId {
        match self.taker_side {
            Side::Buy => self.taker,
            Side::Sell => self.maker,
        }
    }

    /// Account that delivered the base asset
    pub fn seller(&self) -> AccountId {
        match self.taker_side {
            Side::Buy => self.maker,
            Side::Sell => self.taker,
        }
    }
}
