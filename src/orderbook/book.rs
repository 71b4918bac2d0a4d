//! Limit order book for a single market.
//!
//! ## Layout
//!
//! - **Slab**: owns every resting order node
//! - **BTreeMap**: price levels per side, best price first
//! - **HashMap**: order id to slab key
//!
//! ## Priority
//!
//! - **Bids**: price descending, then sequence ascending
//! - **Asks**: price ascending, then sequence ascending
//!
//! Bids are keyed by `Reverse(price)` so that both maps iterate best-first.
//!
//! ## Example
//!
//! ```
//! use token_dex::orderbook::OrderBook;
//! use token_dex::types::{AccountId, Market, Order, Side, Ticker};
//!
//! let market = Market::new(Ticker::new("MTK").unwrap(), Ticker::new("USDC").unwrap()).unwrap();
//! let mut book = OrderBook::with_capacity(market, 16);
//!
//! book.insert(Order::new(1, AccountId(1), Side::Sell, market, 2, 50, 1));
//! book.insert(Order::new(2, AccountId(2), Side::Sell, market, 1, 50, 2));
//!
//! // A buyer meets the cheapest ask first
//! assert_eq!(book.best_opposite(Side::Buy).map(|o| o.id), Some(2));
//! assert_eq!(book.best_ask(), Some(1));
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};
use slab::Slab;

use crate::error::{ExchangeError, Result};
use crate::orderbook::{OrderNode, PriceLevel};
use crate::types::{Market, Order, Side};

/// Price-time priority book for one `(base, quote)` pair.
#[derive(Debug)]
pub struct OrderBook {
    market: Market,

    /// Resting order storage
    orders: Slab<OrderNode>,

    /// Bid levels, highest price first
    bids: BTreeMap<Reverse<u64>, PriceLevel>,

    /// Ask levels, lowest price first
    asks: BTreeMap<u64, PriceLevel>,

    /// Order id to slab key
    order_index: HashMap<u64, usize>,

    bid_count: usize,
    ask_count: usize,
}

impl OrderBook {
    pub fn new(market: Market) -> Self {
        Self::with_capacity(market, 0)
    }

    /// Create a book with `capacity` pre-allocated order slots
    pub fn with_capacity(market: Market, capacity: usize) -> Self {
        Self {
            market,
            orders: Slab::with_capacity(capacity),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::with_capacity(capacity),
            bid_count: 0,
            ask_count: 0,
        }
    }

    // ========================================================================
    // Size
    // ========================================================================

    #[inline]
    pub fn market(&self) -> Market {
        self.market
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of distinct prices on `side`
    pub fn levels(&self, side: Side) -> usize {
        match side {
            Side::Buy => self.bids.len(),
            Side::Sell => self.asks.len(),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Add a resting order behind every order already at its price.
    ///
    /// Returns the slab key.
    pub fn insert(&mut self, order: Order) -> usize {
        let order_id = order.id;
        let price = order.price;
        let side = order.side();

        let key = self.orders.insert(OrderNode::new(order));
        self.order_index.insert(order_id, key);

        match side {
            Side::Buy => {
                self.bids
                    .entry(Reverse(price))
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(key, &mut self.orders);
                self.bid_count += 1;
            }
            Side::Sell => {
                self.asks
                    .entry(price)
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(key, &mut self.orders);
                self.ask_count += 1;
            }
        }

        key
    }

    /// Reduce a resting order by `amount`, removing it when nothing remains.
    ///
    /// Returns the order as it stands after the reduction.
    pub fn consume(&mut self, order_id: u64, amount: u64) -> Result<Order> {
        let key = self.key_of(order_id)?;
        let node = self
            .orders
            .get_mut(key)
            .ok_or(ExchangeError::OrderNotFound(order_id))?;

        if amount > node.remaining() {
            return Err(ExchangeError::InvalidAmount("consume exceeds remaining amount"));
        }
        node.order.fill(amount);

        if node.order.is_filled() {
            return self.remove_key(key).ok_or(ExchangeError::OrderNotFound(order_id));
        }

        let (side, price, order) = (node.order.side(), node.price(), node.order.clone());
        if let Some(level) = self.level_mut(side, price) {
            level.reduce(amount);
        }
        Ok(order)
    }

    /// Take an order out of the book regardless of how much remains
    pub fn remove(&mut self, order_id: u64) -> Option<Order> {
        let key = *self.order_index.get(&order_id)?;
        self.remove_key(key)
    }

    fn remove_key(&mut self, key: usize) -> Option<Order> {
        let node = self.orders.get(key)?;
        let (order_id, side, price) = (node.order_id(), node.order.side(), node.price());

        match side {
            Side::Buy => {
                if let Some(level) = self.bids.get_mut(&Reverse(price)) {
                    level.unlink(key, &mut self.orders);
                    if level.is_empty() {
                        self.bids.remove(&Reverse(price));
                    }
                }
                self.bid_count = self.bid_count.saturating_sub(1);
            }
            Side::Sell => {
                if let Some(level) = self.asks.get_mut(&price) {
                    level.unlink(key, &mut self.orders);
                    if level.is_empty() {
                        self.asks.remove(&price);
                    }
                }
                self.ask_count = self.ask_count.saturating_sub(1);
            }
        }

        self.order_index.remove(&order_id);
        Some(self.orders.remove(key).order)
    }

    fn level_mut(&mut self, side: Side, price: u64) -> Option<&mut PriceLevel> {
        match side {
            Side::Buy => self.bids.get_mut(&Reverse(price)),
            Side::Sell => self.asks.get_mut(&price),
        }
    }

    fn key_of(&self, order_id: u64) -> Result<usize> {
        self.order_index
            .get(&order_id)
            .copied()
            .ok_or(ExchangeError::OrderNotFound(order_id))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, order_id: u64) -> Option<&Order> {
        let key = self.order_index.get(&order_id)?;
        self.orders.get(*key).map(|node| &node.order)
    }

    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Highest bid price
    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Lowest ask price
    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.keys().next().copied()
    }

    /// Order with the highest priority on `side`
    pub fn best(&self, side: Side) -> Option<&Order> {
        self.iter_side(side).next()
    }

    /// Order a taker on `side` would meet first
    #[inline]
    pub fn best_opposite(&self, side: Side) -> Option<&Order> {
        self.best(side.opposite())
    }

    /// Orders on `side` in priority order
    pub fn iter_side(&self, side: Side) -> SideIter<'_> {
        let levels: Box<dyn Iterator<Item = &PriceLevel> + '_> = match side {
            Side::Buy => Box::new(self.bids.values()),
            Side::Sell => Box::new(self.asks.values()),
        };
        SideIter {
            orders: &self.orders,
            levels,
            cursor: None,
        }
    }

    /// Copy of `side` in priority order
    pub fn snapshot(&self, side: Side) -> Vec<Order> {
        self.iter_side(side).cloned().collect()
    }

    /// `(price, total remaining, order count)` per level, best first
    pub fn depth(&self, side: Side) -> Vec<(u64, u64, usize)> {
        let row = |level: &PriceLevel| (level.price, level.total_amount, level.order_count);
        match side {
            Side::Buy => self.bids.values().map(row).collect(),
            Side::Sell => self.asks.values().map(row).collect(),
        }
    }

    /// Feed both sides, in priority order, into the state hasher
    pub(crate) fn hash_into(&self, hasher: &mut Sha256) -> Result<()> {
        hasher.update(self.market.base.as_bytes());
        hasher.update(self.market.quote.as_bytes());
        for side in [Side::Buy, Side::Sell] {
            hasher.update([side.to_u8()]);
            for order in self.iter_side(side) {
                let bytes = ssz_rs::serialize(order)
                    .map_err(|e| ExchangeError::Encoding(format!("{e:?}")))?;
                hasher.update(&bytes);
            }
        }
        Ok(())
    }
}

/// Iterator over one side of an [`OrderBook`], best price first and oldest
/// first within a price.
pub struct SideIter<'a> {
    orders: &'a Slab<OrderNode>,
    levels: Box<dyn Iterator<Item = &'a PriceLevel> + 'a>,
    cursor: Option<usize>,
}

impl<'a> Iterator for SideIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<&'a Order> {
        loop {
            if let Some(key) = self.cursor {
                let node = self.orders.get(key)?;
                self.cursor = node.next;
                return Some(&node.order);
            }
            self.cursor = self.levels.next()?.head;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
