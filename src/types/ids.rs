//! Identifier types: tickers, accounts and external token references.
//!
//! ## Ticker Encoding
//!
//! A [`Ticker`] is a fixed 32-byte value holding a zero-padded UTF-8 symbol,
//! the same layout as a `bytes32` string. Symbols must be 1..=31 bytes so the
//! encoding always keeps a terminating zero byte.
//!
//! ```
//! use token_dex::types::Ticker;
//!
//! let mtk = Ticker::new("MTK").unwrap();
//! assert_eq!(mtk.as_str(), "MTK");
//! assert_eq!(&mtk.to_bytes()[..4], b"MTK\0");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{ExchangeError, Result};

/// Width of an encoded ticker in bytes
pub const TICKER_LEN: usize = 32;

/// Longest symbol that still leaves a terminating zero byte
pub const MAX_SYMBOL_LEN: usize = TICKER_LEN - 1;

// ============================================================================
// Ticker
// ============================================================================

/// Fixed-width identifier of a registered asset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Ticker([u8; TICKER_LEN]);

impl Ticker {
    /// Encode a symbol such as `"USDC"`.
    ///
    /// Fails with [`ExchangeError::InvalidTicker`] when the symbol is empty,
    /// longer than [`MAX_SYMBOL_LEN`] bytes, or contains a NUL byte.
    pub fn new(symbol: &str) -> Result<Self> {
        let bytes = symbol.as_bytes();
        if bytes.is_empty() || bytes.len() > MAX_SYMBOL_LEN || bytes.contains(&0) {
            return Err(ExchangeError::InvalidTicker(symbol.to_string()));
        }

        let mut raw = [0u8; TICKER_LEN];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(raw))
    }

    /// Wrap an already-encoded 32-byte value
    #[inline]
    pub const fn from_bytes(raw: [u8; TICKER_LEN]) -> Self {
        Self(raw)
    }

    /// The encoded 32-byte value
    #[inline]
    pub const fn to_bytes(self) -> [u8; TICKER_LEN] {
        self.0
    }

    /// Borrow the encoded bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; TICKER_LEN] {
        &self.0
    }

    /// Decode the symbol (bytes up to the first zero byte)
    pub fn as_str(&self) -> Cow<'_, str> {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(TICKER_LEN);
        String::from_utf8_lossy(&self.0[..end])
    }
}

impl FromStr for Ticker {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticker({})", self.as_str())
    }
}

// ============================================================================
// AccountId
// ============================================================================

/// Caller identity. Any caller is an account; there is no explicit creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId(pub u64);

impl AccountId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account#{}", self.0)
    }
}

impl From<u64> for AccountId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ============================================================================
// TokenRef
// ============================================================================

/// Reference to the external asset behind a ticker (a 20-byte address).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TokenRef(pub [u8; 20]);

impl TokenRef {
    /// Build a reference whose low 8 bytes hold `value` (big-endian).
    ///
    /// ```
    /// use token_dex::types::TokenRef;
    ///
    /// let r = TokenRef::from_low_u64(0xabcd);
    /// assert_eq!(r.to_string(), "0x000000000000000000000000000000000000abcd");
    /// ```
    pub fn from_low_u64(value: u64) -> Self {
        let mut raw = [0u8; 20];
        raw[12..].copy_from_slice(&value.to_be_bytes());
        Self(raw)
    }

    /// Parse a `0x`-prefixed (or bare) 40 hex character address
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| ExchangeError::InvalidReference(format!("{s}: {e}")))?;
        let raw: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ExchangeError::InvalidReference(format!("{s}: expected 20 bytes")))?;
        Ok(Self(raw))
    }
}

impl fmt::Display for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenRef({self})")
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
