//! Limit order admission and market order execution.
//!
//! ## Limit Orders
//!
//! A limit order never matches on arrival. Its committed value is debited
//! from the trader (the escrow) and the order rests in its market's book.
//!
//! ## Market Orders
//!
//! Execution happens in three steps so that a failure can never leave the
//! books and the ledger out of step:
//!
//! 1. **Plan**: walk the opposite side in priority order, read-only, and
//!    decide every fill
//! 2. **Settle**: apply the fills to the ledger inside a [`LedgerTxn`];
//!    any error rolls every balance back
//! 3. **Apply**: once the transaction is committed, consume the makers in
//!    the book and record trades
//!
//! Trades always execute at the maker's price. When the book runs dry the
//! remainder is simply not executed.

use tracing::debug;

use crate::error::{ExchangeError, Result};
use crate::ledger::{BalanceLedger, LedgerTxn};
use crate::orderbook::OrderBooks;
use crate::registry::TokenRegistry;
use crate::types::amount::{checked_add, notional};
use crate::types::{AccountId, ExecutionReport, Market, Order, Side, Trade};

// ============================================================================
// Requests
// ============================================================================

/// Parameters of a limit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitRequest {
    pub trader: AccountId,
    pub side: Side,
    pub market: Market,
    pub amount: u64,
    pub price: u64,
}

/// Parameters of a market order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketRequest {
    pub taker: AccountId,
    pub side: Side,
    pub market: Market,
    pub amount: u64,
}

// ============================================================================
// Plans
// ============================================================================

/// One planned match against a resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub maker_order_id: u64,
    pub maker: AccountId,
    pub price: u64,
    /// Base units
    pub amount: u64,
    /// `amount * price`
    pub quote: u64,
}

/// Read-only result of walking the book for a market order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPlan {
    pub request: MarketRequest,
    pub fills: Vec<Fill>,
    /// Base units matched
    pub filled: u64,
    /// Quote units exchanged
    pub quote_volume: u64,
}

impl MarketPlan {
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Sequence and trade counters plus the matching rules.
///
/// The engine owns no order or balance state; the caller passes the books
/// and the ledger in.
#[derive(Debug)]
pub struct MatchingEngine {
    /// Next admission sequence number (also the order id)
    next_sequence: u64,

    /// Next trade id
    next_trade_id: u64,

    /// Total trades executed
    trades_executed: u64,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self {
            next_sequence: 1,
            next_trade_id: 1,
            trades_executed: 0,
        }
    }

    #[inline]
    pub fn trades_executed(&self) -> u64 {
        self.trades_executed
    }

    /// Sequence number the next admitted order will get
    #[inline]
    pub fn peek_next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Reserve the order's committed value and rest it in the book.
    ///
    /// Fails before touching any state if either ticker is unregistered, the
    /// amount or price is zero, or the trader cannot cover the escrow.
    pub fn place_limit(
        &mut self,
        books: &mut OrderBooks,
        ledger: &mut BalanceLedger,
        registry: &TokenRegistry,
        request: LimitRequest,
    ) -> Result<Order> {
        let LimitRequest {
            trader,
            side,
            market,
            amount,
            price,
        } = request;

        registry.ensure(market.base)?;
        registry.ensure(market.quote)?;
        if amount == 0 {
            return Err(ExchangeError::InvalidAmount("order amount must be positive"));
        }
        if price == 0 {
            return Err(ExchangeError::InvalidAmount("order price must be positive"));
        }

        let reserve = match side {
            Side::Buy => notional(amount, price)?,
            Side::Sell => amount,
        };

        let mut txn = ledger.begin(registry);
        txn.debit(trader, market.paid_with(side), reserve)?;
        txn.commit();

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let order = Order::new(sequence, trader, side, market, price, amount, sequence);
        books.insert(order.clone());

        debug!(
            order_id = order.id,
            %trader,
            ?side,
            %market,
            amount,
            price,
            reserve,
            "limit order resting"
        );
        Ok(order)
    }

    /// Walk the opposite side of `request.market` and decide the fills.
    ///
    /// Does not touch any state.
    pub fn plan_market(books: &OrderBooks, request: MarketRequest) -> Result<MarketPlan> {
        let mut plan = MarketPlan {
            request,
            fills: Vec::new(),
            filled: 0,
            quote_volume: 0,
        };

        let Some(best) = books.best_opposite(request.market, request.side) else {
            debug!(market = %request.market, side = ?request.side, "no opposite liquidity");
            return Ok(plan);
        };
        let best_price = best.price;
        let Some(book) = books.book(request.market) else {
            return Ok(plan);
        };

        let mut remaining = request.amount;
        for maker in book.iter_side(request.side.opposite()) {
            if remaining == 0 {
                break;
            }
            let amount = remaining.min(maker.remaining);
            let quote = notional(amount, maker.price)?;

            plan.fills.push(Fill {
                maker_order_id: maker.id,
                maker: maker.trader(),
                price: maker.price,
                amount,
                quote,
            });
            plan.filled += amount;
            plan.quote_volume = checked_add(plan.quote_volume, quote)?;
            remaining -= amount;
        }

        debug!(
            market = %request.market,
            side = ?request.side,
            requested = request.amount,
            best_price,
            filled = plan.filled,
            fills = plan.fills.len(),
            "market plan"
        );
        Ok(plan)
    }

    /// Apply a plan's balance changes inside `txn`.
    ///
    /// The taker is debited and credited directly. The maker's escrow already
    /// left its balance at admission, so the maker is only credited.
    pub fn settle(txn: &mut LedgerTxn<'_>, plan: &MarketPlan) -> Result<()> {
        let MarketRequest {
            taker, side, market, ..
        } = plan.request;

        for fill in &plan.fills {
            match side {
                Side::Sell => {
                    txn.debit(taker, market.base, fill.amount)?;
                    txn.credit(taker, market.quote, fill.quote)?;
                    txn.credit(fill.maker, market.base, fill.amount)?;
                }
                Side::Buy => {
                    txn.debit(taker, market.quote, fill.quote)?;
                    txn.credit(taker, market.base, fill.amount)?;
                    txn.credit(fill.maker, market.quote, fill.quote)?;
                }
            }
        }
        Ok(())
    }

    /// Consume the planned makers and record the trades.
    ///
    /// Call only after the plan's settlement has been committed and with the
    /// books unchanged since planning.
    pub fn apply(&mut self, books: &mut OrderBooks, plan: MarketPlan) -> Result<ExecutionReport> {
        let MarketRequest {
            taker,
            side,
            market,
            amount,
        } = plan.request;

        let mut trades = Vec::with_capacity(plan.fills.len());
        for fill in &plan.fills {
            books.consume(fill.maker_order_id, fill.amount)?;

            let trade = Trade {
                id: self.next_trade_id,
                maker_order_id: fill.maker_order_id,
                maker: fill.maker,
                taker,
                taker_side: side,
                market,
                price: fill.price,
                amount: fill.amount,
            };
            self.next_trade_id += 1;
            self.trades_executed += 1;

            debug!(
                trade_id = trade.id,
                maker_order_id = trade.maker_order_id,
                price = trade.price,
                amount = trade.amount,
                "fill"
            );
            trades.push(trade);
        }

        Ok(ExecutionReport {
            market,
            side,
            requested: amount,
            filled: plan.filled,
            quote_volume: plan.quote_volume,
            trades,
        })
    }

    /// Execute a market order against the book: plan, settle, apply.
    pub fn execute_market(
        &mut self,
        books: &mut OrderBooks,
        ledger: &mut BalanceLedger,
        registry: &TokenRegistry,
        request: MarketRequest,
    ) -> Result<ExecutionReport> {
        registry.ensure(request.market.base)?;
        registry.ensure(request.market.quote)?;
        if request.amount == 0 {
            return Err(ExchangeError::InvalidAmount("order amount must be positive"));
        }

        let plan = Self::plan_market(books, request)?;

        let mut txn = ledger.begin(registry);
        Self::settle(&mut txn, &plan)?;
        txn.commit();

        self.apply(books, plan)
    }

    /// Remove a resting order and return its escrow to the owner.
    pub fn cancel(
        &mut self,
        books: &mut OrderBooks,
        ledger: &mut BalanceLedger,
        registry: &TokenRegistry,
        caller: AccountId,
        order_id: u64,
    ) -> Result<Order> {
        let order = books.get(order_id).ok_or(ExchangeError::OrderNotFound(order_id))?;
        if order.trader() != caller {
            return Err(ExchangeError::Unauthorized(format!(
                "{caller} does not own order {order_id}"
            )));
        }

        let refund_ticker = order.reserved_ticker();
        let refund = order.reserved()?;
        ledger.can_credit(registry, caller, refund_ticker, refund)?;

        let order = books
            .remove(order_id)
            .ok_or(ExchangeError::OrderNotFound(order_id))?;
        ledger.credit(registry, caller, refund_ticker, refund)?;

        debug!(order_id, %caller, refund, ticker = %refund_ticker, "order cancelled");
        Ok(order)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
