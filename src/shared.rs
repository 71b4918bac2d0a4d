//! Single-writer handle for calling one exchange from many threads.
//!
//! Every call takes the lock for its whole duration, so operations are
//! applied one at a time in lock-acquisition order and a matching walk is
//! never interleaved with another mutation. Operations are all-or-nothing,
//! so a poisoned lock is recovered and not propagated.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::access::{AccessPolicy, Owner};
use crate::custody::{Custodian, InMemoryCustodian};
use crate::error::Result;
use crate::exchange::Exchange;
use crate::types::{AccountId, ConversionReport, ExecutionReport, Order, Side, StateCommitment, Ticker};

/// Cloneable handle to an exchange behind a mutex.
///
/// ```
/// use std::thread;
/// use token_dex::custody::InMemoryCustodian;
/// use token_dex::types::{AccountId, Ticker, TokenRef};
/// use token_dex::{Exchange, SharedExchange};
///
/// let usdc = Ticker::new("USDC").unwrap();
/// let mut dex = Exchange::new(AccountId(0), InMemoryCustodian::new());
/// dex.add_token(AccountId(0), usdc, TokenRef::from_low_u64(1)).unwrap();
///
/// let shared = SharedExchange::new(dex);
/// let reader = shared.clone();
/// let handle = thread::spawn(move || reader.balances(AccountId(1), usdc));
///
/// assert_eq!(handle.join().unwrap(), 0);
/// ```
#[derive(Debug)]
pub struct SharedExchange<C = InMemoryCustodian, P = Owner> {
    inner: Arc<Mutex<Exchange<C, P>>>,
}

impl<C, P> Clone for SharedExchange<C, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Custodian, P: AccessPolicy> SharedExchange<C, P> {
    pub fn new(exchange: Exchange<C, P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(exchange)),
        }
    }

    /// Exclusive access for the lifetime of the guard
    pub fn lock(&self) -> MutexGuard<'_, Exchange<C, P>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut Exchange<C, P>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn deposit(&self, caller: AccountId, amount: u64, ticker: Ticker) -> Result<u64> {
        self.lock().deposit(caller, amount, ticker)
    }

    pub fn withdrawal(&self, caller: AccountId, amount: u64, ticker: Ticker) -> Result<u64> {
        self.lock().withdrawal(caller, amount, ticker)
    }

    pub fn balances(&self, account: AccountId, ticker: Ticker) -> u64 {
        self.lock().balances(account, ticker)
    }

    pub fn create_limit_order(
        &self,
        caller: AccountId,
        side: Side,
        base: Ticker,
        quote: Ticker,
        amount: u64,
        price: u64,
    ) -> Result<Order> {
        self.lock()
            .create_limit_order(caller, side, base, quote, amount, price)
    }

    pub fn create_market_order(
        &self,
        caller: AccountId,
        side: Side,
        base: Ticker,
        quote: Ticker,
        amount: u64,
    ) -> Result<ExecutionReport> {
        self.lock()
            .create_market_order(caller, side, base, quote, amount)
    }

    pub fn cancel_order(&self, caller: AccountId, order_id: u64) -> Result<Order> {
        self.lock().cancel_order(caller, order_id)
    }

    pub fn convert_tokens(
        &self,
        caller: AccountId,
        from: Ticker,
        to: Ticker,
        amount: u64,
        intermediate: Ticker,
    ) -> Result<ConversionReport> {
        self.lock()
            .convert_tokens(caller, from, to, amount, intermediate)
    }

    pub fn get_order_book(&self, base: Ticker, side: Side) -> Vec<Order> {
        self.lock().get_order_book(base, side)
    }

    pub fn commitment(&self) -> Result<StateCommitment> {
        self.lock().commitment()
    }
}
