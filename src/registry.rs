//! Token registry: maps each ticker to the external asset it stands for.
//!
//! Entries are created once and never modified or removed. Every other
//! component asks the registry whether a ticker exists before touching it.
//! The privilege check for registration lives in
//! [`Exchange::add_token`](crate::Exchange::add_token).

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{ExchangeError, Result};
use crate::types::{Ticker, TokenRef};

/// A registered asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEntry {
    pub ticker: Ticker,
    /// Reference handed to the custodian when moving this asset
    pub reference: TokenRef,
}

/// Ticker table. Ordered so that hashing is deterministic.
#[derive(Debug, Default, Clone)]
pub struct TokenRegistry {
    tokens: BTreeMap<Ticker, TokenEntry>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry.
    ///
    /// Fails with [`ExchangeError::DuplicateTicker`] and leaves the registry
    /// untouched if the ticker is already present.
    pub fn register(&mut self, ticker: Ticker, reference: TokenRef) -> Result<TokenEntry> {
        if self.tokens.contains_key(&ticker) {
            return Err(ExchangeError::DuplicateTicker(ticker));
        }

        let entry = TokenEntry { ticker, reference };
        self.tokens.insert(ticker, entry);
        info!(%ticker, %reference, "token registered");
        Ok(entry)
    }

    /// Look up the entry for `ticker`
    pub fn resolve(&self, ticker: Ticker) -> Result<&TokenEntry> {
        self.tokens
            .get(&ticker)
            .ok_or(ExchangeError::UnknownTicker(ticker))
    }

    #[inline]
    pub fn exists(&self, ticker: Ticker) -> bool {
        self.tokens.contains_key(&ticker)
    }

    /// `Ok(())` if registered, `UnknownTicker` otherwise
    #[inline]
    pub fn ensure(&self, ticker: Ticker) -> Result<()> {
        self.resolve(ticker).map(|_| ())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Entries in ticker order
    pub fn iter(&self) -> impl Iterator<Item = &TokenEntry> {
        self.tokens.values()
    }

    /// Feed every entry into the state hasher
    pub(crate) fn hash_into(&self, hasher: &mut Sha256) {
        hasher.update(b"registry");
        hasher.update((self.tokens.len() as u64).to_le_bytes());
        for entry in self.tokens.values() {
            hasher.update(entry.ticker.as_bytes());
            hasher.update(entry.reference.0);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
