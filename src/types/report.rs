//! Results of market executions and conversions.
//!
//! An under-filled market order is a normal outcome, so the caller learns how
//! much executed from these reports rather than from an error.

use rust_decimal::Decimal;

use crate::types::amount::average_price;
use crate::types::{Market, Side, Ticker, Trade};

/// Outcome of one market order (or one conversion hop).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub market: Market,
    pub side: Side,
    /// Base amount the taker asked for
    pub requested: u64,
    /// Base amount actually executed
    pub filled: u64,
    /// Quote value exchanged across all fills
    pub quote_volume: u64,
    /// Fills in execution order
    pub trades: Vec<Trade>,
}

impl ExecutionReport {
    /// Report for an execution that matched nothing
    pub fn empty(market: Market, side: Side, requested: u64) -> Self {
        Self {
            market,
            side,
            requested,
            filled: 0,
            quote_volume: 0,
            trades: Vec::new(),
        }
    }

    /// Base amount left unexecuted because the book ran out
    pub fn unfilled(&self) -> u64 {
        self.requested - self.filled
    }

    pub fn is_complete(&self) -> bool {
        self.filled == self.requested
    }

    /// Amount of the asset the taker received
    pub fn received(&self) -> u64 {
        match self.side {
            Side::Buy => self.filled,
            Side::Sell => self.quote_volume,
        }
    }

    /// Amount of the asset the taker gave up
    pub fn paid(&self) -> u64 {
        match self.side {
            Side::Buy => self.quote_volume,
            Side::Sell => self.filled,
        }
    }

    /// Volume-weighted average execution price
    pub fn average_price(&self) -> Option<Decimal> {
        average_price(self.quote_volume, self.filled)
    }
}

/// Outcome of a conversion routed through an intermediate ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub from: Ticker,
    pub to: Ticker,
    pub intermediate: Ticker,
    /// Amount of `from` the caller asked to convert
    pub requested: u64,
    /// One report per executed hop (one or two)
    pub hops: Vec<ExecutionReport>,
}

impl ConversionReport {
    /// Amount of `from` actually spent
    pub fn spent(&self) -> u64 {
        self.hops.first().map_or(0, ExecutionReport::paid)
    }

    /// Amount of `to` delivered to the caller
    pub fn amount_out(&self) -> u64 {
        self.hops.last().map_or(0, ExecutionReport::received)
    }

    /// Intermediate tokens obtained by the first hop but not converted by the
    /// second. They stay in the caller's balance.
    pub fn residual_intermediate(&self) -> u64 {
        match self.hops.as_slice() {
            [first, second] => first.received() - second.paid(),
            _ => 0,
        }
    }
}
