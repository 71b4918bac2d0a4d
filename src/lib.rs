//! # token-dex
//!
//! On-ledger token exchange: a balance ledger for registered tokens, a
//! price-time-priority order book per market, and conversion routing through
//! an intermediate asset.
//!
//! ## Architecture
//!
//! - **Types**: tickers, markets, orders, trades, execution reports
//! - **Registry**: tickers and the external tokens they stand for
//! - **Ledger**: per-account balances with transactional updates
//! - **OrderBook**: slab-backed books with price-time priority
//! - **Engine**: limit admission, market execution, conversion routing
//! - **Exchange**: the public operation surface over a custodian and an
//!   access policy
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical operation sequences yield identical state
//!    and identical state roots
//! 2. **Integer math**: `u64` amounts with checked arithmetic, no floating
//!    point
//! 3. **Conservation**: available balances plus escrow always equal net
//!    deposits, per ticker
//! 4. **All-or-nothing**: a failed operation changes nothing

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Core data types: Ticker, Market, Order, Trade, reports
pub mod types;

/// Token registry
pub mod registry;

/// Balance ledger and transactions
pub mod ledger;

/// Order books with slab-based storage
pub mod orderbook;

/// Matching engine and conversion router
pub mod engine;

/// Access control for privileged operations
pub mod access;

/// Custodian interface and in-memory token custody
pub mod custody;

/// Runtime configuration
pub mod config;

/// Public operation surface
pub mod exchange;

/// Thread-safe handle
pub mod shared;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::ExchangeConfig;
pub use error::{CustodyError, ExchangeError, Result};
pub use exchange::Exchange;
pub use shared::SharedExchange;
pub use types::{
    AccountId, ConversionReport, ExecutionReport, Market, Order, Side, StateCommitment, Ticker,
    TokenRef, Trade,
};
