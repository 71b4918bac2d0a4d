//! Error types for the exchange.
//!
//! Every mutating operation is all-or-nothing: when one of these errors is
//! returned, the registry, the balance ledger and the order books are exactly
//! as they were before the call. Under-filled market orders and partial
//! conversions are *not* errors; they are reported through
//! [`ExecutionReport`](crate::types::ExecutionReport).

use thiserror::Error;

use crate::types::Ticker;

/// Errors raised by the custodian collaborator when moving value in or out
/// of the exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("custodian does not know token {0}")]
    UnknownToken(String),

    #[error("transfer amount exceeds holder balance")]
    InsufficientFunds,

    #[error("transfer amount exceeds allowance")]
    InsufficientAllowance,

    #[error("custodian rejected transfer: {0}")]
    Rejected(String),
}

/// Exchange error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Ticker is not present in the token registry
    #[error("Token does not exist: {0}")]
    UnknownTicker(Ticker),

    /// Ticker is already present in the token registry
    #[error("Token already exists: {0}")]
    DuplicateTicker(Ticker),

    /// Available balance is lower than the amount being debited
    #[error("Balance not sufficient: {ticker} required {required}, available {available}")]
    InsufficientBalance {
        ticker: Ticker,
        required: u64,
        available: u64,
    },

    /// Arithmetic result exceeds the representable range
    #[error("Arithmetic overflow")]
    Overflow,

    /// Caller lacks the capability for a privileged operation
    #[error("Unauthorized caller: {0}")]
    Unauthorized(String),

    /// Zero amount or price
    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),

    /// Base and quote ticker are the same asset
    #[error("Invalid market: base {base} and quote {quote} must differ")]
    InvalidMarket { base: Ticker, quote: Ticker },

    /// Ticker text cannot be encoded as a fixed-width identifier
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// External token reference is malformed
    #[error("Invalid token reference: {0}")]
    InvalidReference(String),

    /// No resting order with this id
    #[error("Order not found: {0}")]
    OrderNotFound(u64),

    /// The custodian refused the transfer
    #[error("Custody transfer failed: {0}")]
    Custody(#[from] CustodyError),

    /// State could not be encoded for the commitment
    #[error("State encoding failed: {0}")]
    Encoding(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ExchangeError>;
