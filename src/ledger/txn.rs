//! All-or-nothing balance updates.
//!
//! A `LedgerTxn` applies credits and debits to the ledger immediately and keeps
//! the prior value of every touched balance. Dropping the transaction without
//! calling [`commit`](LedgerTxn::commit) writes those values back in reverse
//! order, so an error returned with `?` halfway through a settlement leaves the
//! ledger exactly as it was.

use crate::error::Result;
use crate::ledger::BalanceLedger;
use crate::registry::TokenRegistry;
use crate::types::{AccountId, Ticker};

/// Undo-logged view over a [`BalanceLedger`].
pub struct LedgerTxn<'a> {
    ledger: &'a mut BalanceLedger,
    registry: &'a TokenRegistry,
    undo: Vec<(AccountId, Ticker, u64)>,
    committed: bool,
}

impl<'a> LedgerTxn<'a> {
    pub(crate) fn new(ledger: &'a mut BalanceLedger, registry: &'a TokenRegistry) -> Self {
        Self {
            ledger,
            registry,
            undo: Vec::new(),
            committed: false,
        }
    }

    pub fn credit(&mut self, account: AccountId, ticker: Ticker, amount: u64) -> Result<u64> {
        let prior = self.ledger.balance_of(account, ticker);
        let updated = self.ledger.credit(self.registry, account, ticker, amount)?;
        self.undo.push((account, ticker, prior));
        Ok(updated)
    }

    pub fn debit(&mut self, account: AccountId, ticker: Ticker, amount: u64) -> Result<u64> {
        let prior = self.ledger.balance_of(account, ticker);
        let updated = self.ledger.debit(self.registry, account, ticker, amount)?;
        self.undo.push((account, ticker, prior));
        Ok(updated)
    }

    /// Balance as seen inside the transaction
    #[inline]
    pub fn balance_of(&self, account: AccountId, ticker: Ticker) -> u64 {
        self.ledger.balance_of(account, ticker)
    }

    /// Number of balance writes recorded so far
    pub fn writes(&self) -> usize {
        self.undo.len()
    }

    /// Keep every change
    pub fn commit(mut self) {
        self.committed = true;
        self.undo.clear();
    }
}

impl Drop for LedgerTxn<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        while let Some((account, ticker, prior)) = self.undo.pop() {
            self.ledger.store(account, ticker, prior);
        }
    }
}
