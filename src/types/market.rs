//! Trading pair identifier.

use std::fmt;

use crate::error::{ExchangeError, Result};
use crate::types::{Side, Ticker};

/// A `(base, quote)` pair. Prices in this market are quote units per base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Market {
    pub base: Ticker,
    pub quote: Ticker,
}

impl Market {
    /// Build a market, rejecting a pair that trades an asset against itself.
    pub fn new(base: Ticker, quote: Ticker) -> Result<Self> {
        if base == quote {
            return Err(ExchangeError::InvalidMarket { base, quote });
        }
        Ok(Self { base, quote })
    }

    /// Build without validation; used when decoding stored orders.
    pub(crate) fn from_parts(base: Ticker, quote: Ticker) -> Self {
        Self { base, quote }
    }

    /// Asset a trader on `side` gives up
    pub fn paid_with(&self, side: Side) -> Ticker {
        match side {
            Side::Buy => self.quote,
            Side::Sell => self.base,
        }
    }

    /// Asset a trader on `side` receives
    pub fn received(&self, side: Side) -> Ticker {
        match side {
            Side::Buy => self.base,
            Side::Sell => self.quote,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
