//! The exchange: every externally callable operation in one place.
//!
//! ## Surface
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`add_token`](Exchange::add_token) | register a ticker (privileged) |
//! | [`deposit`](Exchange::deposit) / [`withdrawal`](Exchange::withdrawal) | move value through the custodian |
//! | [`create_limit_order`](Exchange::create_limit_order) | reserve and rest an order |
//! | [`create_market_order`](Exchange::create_market_order) | execute against the book |
//! | [`cancel_order`](Exchange::cancel_order) | remove an order and refund its escrow |
//! | [`convert_tokens`](Exchange::convert_tokens) | route a sale through an intermediate ticker |
//! | [`get_order_book`](Exchange::get_order_book) | priority-ordered view of one side |
//!
//! Every mutating operation either applies fully or returns an error with
//! nothing changed.
//!
//! ## Example
//!
//! ```
//! use token_dex::custody::InMemoryCustodian;
//! use token_dex::types::{AccountId, Side, Ticker, TokenRef};
//! use token_dex::Exchange;
//!
//! let owner = AccountId(0);
//! let trader = AccountId(1);
//! let (mtk, usdc) = (Ticker::new("MTK").unwrap(), Ticker::new("USDC").unwrap());
//! let usdc_ref = TokenRef::from_low_u64(2);
//!
//! let mut custodian = InMemoryCustodian::new();
//! custodian.mint(usdc_ref, trader, 1_000);
//! custodian.approve(usdc_ref, trader, 1_000);
//!
//! let mut dex = Exchange::new(owner, custodian);
//! dex.add_token(owner, mtk, TokenRef::from_low_u64(1)).unwrap();
//! dex.add_token(owner, usdc, usdc_ref).unwrap();
//!
//! dex.deposit(trader, 1_000, usdc).unwrap();
//! dex.create_limit_order(trader, Side::Buy, mtk, usdc, 100, 1).unwrap();
//!
//! let bids = dex.get_order_book(mtk, Side::Buy);
//! assert_eq!(bids.len(), 1);
//! assert_eq!(bids[0].trader(), trader);
//! assert_eq!(dex.balances(trader, usdc), 900);
//! ```

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::access::{AccessPolicy, Owner};
use crate::config::ExchangeConfig;
use crate::custody::{Custodian, InMemoryCustodian};
use crate::engine::{ConversionRequest, LimitRequest, MarketRequest, MatchingEngine};
use crate::error::{ExchangeError, Result};
use crate::ledger::BalanceLedger;
use crate::orderbook::OrderBooks;
use crate::registry::{TokenEntry, TokenRegistry};
use crate::types::{
    AccountId, ConversionReport, ExecutionReport, Market, Order, Side, StateCommitment, Ticker,
    TokenRef,
};

/// Token exchange over a custodian `C` with access policy `P`.
#[derive(Debug)]
pub struct Exchange<C = InMemoryCustodian, P = Owner> {
    registry: TokenRegistry,
    ledger: BalanceLedger,
    books: OrderBooks,
    engine: MatchingEngine,
    custodian: C,
    access: P,
    /// Successful state-changing operations
    operations: u64,
}

// ============================================================================
// Owner-controlled construction
// ============================================================================

impl<C: Custodian> Exchange<C, Owner> {
    /// Exchange whose token registration is restricted to `owner`
    pub fn new(owner: AccountId, custodian: C) -> Self {
        Self::with_policy(custodian, Owner::new(owner), 0)
    }

    pub fn with_config(config: &ExchangeConfig, custodian: C) -> Self {
        Self::with_policy(
            custodian,
            Owner::new(AccountId(config.owner)),
            config.book_capacity,
        )
    }

    #[inline]
    pub fn owner(&self) -> AccountId {
        self.access.owner()
    }

    /// Hand the registration privilege to another account
    pub fn transfer_ownership(&mut self, caller: AccountId, new_owner: AccountId) -> Result<()> {
        self.access.transfer(caller, new_owner).inspect_err(|e| {
            warn!(%caller, error = %e, "ownership transfer rejected");
        })?;
        self.operations += 1;
        Ok(())
    }
}

impl<C: Custodian, P: AccessPolicy> Exchange<C, P> {
    pub fn with_policy(custodian: C, access: P, book_capacity: usize) -> Self {
        Self {
            registry: TokenRegistry::new(),
            ledger: BalanceLedger::new(),
            books: OrderBooks::with_capacity(book_capacity),
            engine: MatchingEngine::new(),
            custodian,
            access,
            operations: 0,
        }
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register `ticker` as the exchange's name for the external token at
    /// `reference`. Only privileged callers may do this.
    pub fn add_token(&mut self, caller: AccountId, ticker: Ticker, reference: TokenRef) -> Result<TokenEntry> {
        if !self.access.is_privileged(caller) {
            warn!(%caller, %ticker, "token registration rejected");
            return Err(ExchangeError::Unauthorized(format!(
                "{caller} may not register tokens"
            )));
        }
        let entry = self.registry.register(ticker, reference)?;
        self.operations += 1;
        Ok(entry)
    }

    pub fn token(&self, ticker: Ticker) -> Result<&TokenEntry> {
        self.registry.resolve(ticker)
    }

    #[inline]
    pub fn exists(&self, ticker: Ticker) -> bool {
        self.registry.exists(ticker)
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    // ========================================================================
    // Deposits and withdrawals
    // ========================================================================

    /// Pull `amount` of `ticker` from the caller through the custodian and
    /// credit it. Returns the new balance.
    pub fn deposit(&mut self, caller: AccountId, amount: u64, ticker: Ticker) -> Result<u64> {
        if amount == 0 {
            return Err(ExchangeError::InvalidAmount("deposit amount must be positive"));
        }
        let reference = self.registry.resolve(ticker)?.reference;
        self.ledger.can_credit(&self.registry, caller, ticker, amount)?;

        if let Err(e) = self.custodian.pull_in(reference, caller, amount) {
            warn!(%caller, %ticker, amount, error = %e, "deposit refused by custodian");
            return Err(e.into());
        }

        let balance = self.ledger.credit(&self.registry, caller, ticker, amount)?;
        self.operations += 1;
        info!(%caller, %ticker, amount, balance, "deposit");
        Ok(balance)
    }

    /// Debit `amount` of `ticker` and push it out to the caller through the
    /// custodian. Returns the new balance.
    pub fn withdrawal(&mut self, caller: AccountId, amount: u64, ticker: Ticker) -> Result<u64> {
        if amount == 0 {
            return Err(ExchangeError::InvalidAmount("withdrawal amount must be positive"));
        }
        let reference = self.registry.resolve(ticker)?.reference;
        self.ledger.can_debit(&self.registry, caller, ticker, amount)?;

        if let Err(e) = self.custodian.push_out(reference, caller, amount) {
            warn!(%caller, %ticker, amount, error = %e, "withdrawal refused by custodian");
            return Err(e.into());
        }

        let balance = self.ledger.debit(&self.registry, caller, ticker, amount)?;
        self.operations += 1;
        info!(%caller, %ticker, amount, balance, "withdrawal");
        Ok(balance)
    }

    /// Available balance; value escrowed in resting orders is not included
    #[inline]
    pub fn balances(&self, account: AccountId, ticker: Ticker) -> u64 {
        self.ledger.balance_of(account, ticker)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Reserve the order's value and rest it on the `(base, quote)` book.
    ///
    /// `price` is in `quote` units per one `base` unit.
    pub fn create_limit_order(
        &mut self,
        caller: AccountId,
        side: Side,
        base: Ticker,
        quote: Ticker,
        amount: u64,
        price: u64,
    ) -> Result<Order> {
        let market = self.market(base, quote)?;
        let order = self.engine.place_limit(
            &mut self.books,
            &mut self.ledger,
            &self.registry,
            LimitRequest {
                trader: caller,
                side,
                market,
                amount,
                price,
            },
        )?;
        self.operations += 1;
        Ok(order)
    }

    /// Execute up to `amount` base units against the opposite side of the
    /// `(base, quote)` book.
    pub fn create_market_order(
        &mut self,
        caller: AccountId,
        side: Side,
        base: Ticker,
        quote: Ticker,
        amount: u64,
    ) -> Result<ExecutionReport> {
        let market = self.market(base, quote)?;
        let report = self.engine.execute_market(
            &mut self.books,
            &mut self.ledger,
            &self.registry,
            MarketRequest {
                taker: caller,
                side,
                market,
                amount,
            },
        )?;
        self.operations += 1;
        info!(
            %caller,
            ?side,
            %market,
            requested = amount,
            filled = report.filled,
            quote_volume = report.quote_volume,
            "market order"
        );
        Ok(report)
    }

    /// Remove one of the caller's resting orders and refund its escrow
    pub fn cancel_order(&mut self, caller: AccountId, order_id: u64) -> Result<Order> {
        let order = self
            .engine
            .cancel(&mut self.books, &mut self.ledger, &self.registry, caller, order_id)?;
        self.operations += 1;
        Ok(order)
    }

    /// Sell `amount` of `from` for `to`, through `intermediate` unless it is
    /// `to` itself
    pub fn convert_tokens(
        &mut self,
        caller: AccountId,
        from: Ticker,
        to: Ticker,
        amount: u64,
        intermediate: Ticker,
    ) -> Result<ConversionReport> {
        let report = self.engine.convert(
            &mut self.books,
            &mut self.ledger,
            &self.registry,
            ConversionRequest {
                caller,
                from,
                to,
                intermediate,
                amount,
            },
        )?;
        self.operations += 1;
        Ok(report)
    }

    fn market(&self, base: Ticker, quote: Ticker) -> Result<Market> {
        self.registry.ensure(base)?;
        self.registry.ensure(quote)?;
        Market::new(base, quote)
    }

    // ========================================================================
    // Book views
    // ========================================================================

    /// Orders on `side` for `base` across every quote ticker, in price-time
    /// priority
    pub fn get_order_book(&self, base: Ticker, side: Side) -> Vec<Order> {
        self.books.snapshot_base(base, side)
    }

    /// Orders on `side` of the `(base, quote)` book only
    pub fn get_market_book(&self, base: Ticker, quote: Ticker, side: Side) -> Result<Vec<Order>> {
        Ok(self.books.snapshot_market(Market::new(base, quote)?, side))
    }

    pub fn order(&self, order_id: u64) -> Option<&Order> {
        self.books.get(order_id)
    }

    pub fn resting_orders(&self) -> usize {
        self.books.resting_orders()
    }

    // ========================================================================
    // Accounting
    // ========================================================================

    /// Value of `ticker` escrowed by resting orders
    pub fn reserved(&self, ticker: Ticker) -> Result<u128> {
        self.books.reserved(ticker)
    }

    /// Sum of all available balances of `ticker`
    pub fn total_balance(&self, ticker: Ticker) -> u128 {
        self.ledger.total_for(ticker)
    }

    #[inline]
    pub fn operations(&self) -> u64 {
        self.operations
    }

    #[inline]
    pub fn trades_executed(&self) -> u64 {
        self.engine.trades_executed()
    }

    /// Digest of the registry, the balance table and every book
    pub fn commitment(&self) -> Result<StateCommitment> {
        let mut hasher = Sha256::new();
        self.registry.hash_into(&mut hasher);
        self.ledger.hash_into(&mut hasher);
        self.books.hash_into(&mut hasher)?;

        Ok(StateCommitment::new(
            self.operations,
            self.engine.trades_executed(),
            self.books.resting_orders() as u64,
            StateCommitment::finalize(hasher),
        ))
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    pub fn custodian(&self) -> &C {
        &self.custodian
    }

    pub fn custodian_mut(&mut self) -> &mut C {
        &mut self.custodian
    }

    pub fn access(&self) -> &P {
        &self.access
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
