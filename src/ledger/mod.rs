//! Balance ledger: the authoritative internal balance of every
//! `(account, ticker)` pair.
//!
//! ## Model
//!
//! Balances only move through [`credit`](BalanceLedger::credit) and
//! [`debit`](BalanceLedger::debit). Both refuse tickers the registry does not
//! know. A debit never takes a balance below zero and a credit never wraps.
//!
//! Escrow is not tracked here: a limit order debits its committed amount at
//! admission and the order book holds that value until the order is consumed
//! or cancelled.
//!
//! ## Transactions
//!
//! Operations that touch several balances go through a [`LedgerTxn`], which
//! records every prior value and restores them unless committed.
//!
//! ```
//! use token_dex::ledger::BalanceLedger;
//! use token_dex::registry::TokenRegistry;
//! use token_dex::types::{AccountId, Ticker, TokenRef};
//!
//! let mut registry = TokenRegistry::new();
//! let usdc = Ticker::new("USDC").unwrap();
//! registry.register(usdc, TokenRef::from_low_u64(1)).unwrap();
//!
//! let mut ledger = BalanceLedger::new();
//! ledger.credit(&registry, AccountId(1), usdc, 100).unwrap();
//! ledger.debit(&registry, AccountId(1), usdc, 40).unwrap();
//!
//! assert_eq!(ledger.balance_of(AccountId(1), usdc), 60);
//! ```

mod txn;

pub use txn::LedgerTxn;

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::error::{ExchangeError, Result};
use crate::registry::TokenRegistry;
use crate::types::amount::checked_add;
use crate::types::{AccountId, Ticker};

type BalanceKey = (AccountId, Ticker);

/// Balance table. Absent entries read as zero; zero balances are not stored.
#[derive(Debug, Default, Clone)]
pub struct BalanceLedger {
    balances: BTreeMap<BalanceKey, u64>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance, zero if never credited
    #[inline]
    pub fn balance_of(&self, account: AccountId, ticker: Ticker) -> u64 {
        self.balances.get(&(account, ticker)).copied().unwrap_or(0)
    }

    /// Add `amount` to a balance. Returns the new balance.
    pub fn credit(
        &mut self,
        registry: &TokenRegistry,
        account: AccountId,
        ticker: Ticker,
        amount: u64,
    ) -> Result<u64> {
        registry.ensure(ticker)?;
        let updated = checked_add(self.balance_of(account, ticker), amount)?;
        self.store(account, ticker, updated);
        Ok(updated)
    }

    /// Remove `amount` from a balance. Returns the new balance.
    pub fn debit(
        &mut self,
        registry: &TokenRegistry,
        account: AccountId,
        ticker: Ticker,
        amount: u64,
    ) -> Result<u64> {
        registry.ensure(ticker)?;
        let available = self.balance_of(account, ticker);
        let updated = available
            .checked_sub(amount)
            .ok_or(ExchangeError::InsufficientBalance {
                ticker,
                required: amount,
                available,
            })?;
        self.store(account, ticker, updated);
        Ok(updated)
    }

    /// Check that a credit would succeed without applying it
    pub fn can_credit(
        &self,
        registry: &TokenRegistry,
        account: AccountId,
        ticker: Ticker,
        amount: u64,
    ) -> Result<()> {
        registry.ensure(ticker)?;
        checked_add(self.balance_of(account, ticker), amount).map(|_| ())
    }

    /// Check that a debit would succeed without applying it
    pub fn can_debit(
        &self,
        registry: &TokenRegistry,
        account: AccountId,
        ticker: Ticker,
        amount: u64,
    ) -> Result<()> {
        registry.ensure(ticker)?;
        let available = self.balance_of(account, ticker);
        if available < amount {
            return Err(ExchangeError::InsufficientBalance {
                ticker,
                required: amount,
                available,
            });
        }
        Ok(())
    }

    /// Sum of every account's balance in `ticker`
    pub fn total_for(&self, ticker: Ticker) -> u128 {
        self.balances
            .iter()
            .filter(|((_, t), _)| *t == ticker)
            .map(|(_, balance)| u128::from(*balance))
            .sum()
    }

    /// Non-zero balances in `(account, ticker)` order
    pub fn iter(&self) -> impl Iterator<Item = (AccountId, Ticker, u64)> + '_ {
        self.balances
            .iter()
            .map(|(&(account, ticker), &balance)| (account, ticker, balance))
    }

    /// Number of non-zero balances
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Begin a transaction over this ledger
    pub fn begin<'a>(&'a mut self, registry: &'a TokenRegistry) -> LedgerTxn<'a> {
        LedgerTxn::new(self, registry)
    }

    pub(crate) fn hash_into(&self, hasher: &mut Sha256) {
        hasher.update(b"balances");
        hasher.update((self.balances.len() as u64).to_le_bytes());
        for (&(account, ticker), balance) in &self.balances {
            hasher.update(account.as_u64().to_le_bytes());
            hasher.update(ticker.as_bytes());
            hasher.update(balance.to_le_bytes());
        }
    }

    /// Raw write used by credit, debit and transaction rollback
    fn store(&mut self, account: AccountId, ticker: Ticker, balance: u64) {
        if balance == 0 {
            self.balances.remove(&(account, ticker));
        } else {
            self.balances.insert((account, ticker), balance);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
