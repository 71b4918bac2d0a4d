//! Core data types for the exchange
//!
//! ## Types
//!
//! - [`Ticker`], [`AccountId`], [`TokenRef`]: identifiers
//! - [`Market`]: a `(base, quote)` trading pair
//! - [`Order`], [`Side`]: resting limit orders (SSZ encodable)
//! - [`Trade`]: a single fill
//! - [`ExecutionReport`], [`ConversionReport`]: results of market execution
//! - [`StateCommitment`]: digest of the durable state
//!
//! ## Integer Units
//!
//! Amounts and prices are plain `u64` token units; see [`amount`].

mod ids;
mod market;
mod order;
mod trade;
mod report;
mod commitment;
pub mod amount;

// Re-export all types at module level
pub use ids::{AccountId, Ticker, TokenRef, MAX_SYMBOL_LEN, TICKER_LEN};
pub use market::Market;
pub use order::{Order, Side};
pub use trade::Trade;
pub use report::{ConversionReport, ExecutionReport};
pub use commitment::StateCommitment;
