//! Every market's book, plus the lookups that span markets.
//!
//! Books are created on first insert and kept for the life of the exchange.
//! A side-wide view for a base ticker merges the books of every quote ticker
//! that base trades against, still in price-time priority.

use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};

use crate::error::{ExchangeError, Result};
use crate::orderbook::OrderBook;
use crate::types::{Market, Order, Side, Ticker};

/// Books keyed by market.
#[derive(Debug, Default)]
pub struct OrderBooks {
    books: BTreeMap<Market, OrderBook>,

    /// Order id to the market whose book holds it
    locations: HashMap<u64, Market>,

    /// Slots pre-allocated for each new book
    book_capacity: usize,
}

impl OrderBooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(book_capacity: usize) -> Self {
        Self {
            book_capacity,
            ..Self::default()
        }
    }

    /// Rest an order in its market's book
    pub fn insert(&mut self, order: Order) {
        let market = order.market();
        let capacity = self.book_capacity;
        self.locations.insert(order.id, market);
        self.books
            .entry(market)
            .or_insert_with(|| OrderBook::with_capacity(market, capacity))
            .insert(order);
    }

    /// See [`OrderBook::consume`]
    pub fn consume(&mut self, order_id: u64, amount: u64) -> Result<Order> {
        let book = self.book_holding(order_id)?;
        let order = book.consume(order_id, amount)?;
        if order.is_filled() {
            self.locations.remove(&order_id);
        }
        Ok(order)
    }

    /// Take an order out of whichever book holds it
    pub fn remove(&mut self, order_id: u64) -> Option<Order> {
        let market = self.locations.remove(&order_id)?;
        self.books.get_mut(&market)?.remove(order_id)
    }

    fn book_holding(&mut self, order_id: u64) -> Result<&mut OrderBook> {
        self.locations
            .get(&order_id)
            .and_then(|market| self.books.get_mut(market))
            .ok_or(ExchangeError::OrderNotFound(order_id))
    }

    pub fn get(&self, order_id: u64) -> Option<&Order> {
        let market = self.locations.get(&order_id)?;
        self.books.get(market)?.get(order_id)
    }

    pub fn book(&self, market: Market) -> Option<&OrderBook> {
        self.books.get(&market)
    }

    /// Order a taker on `side` of `market` would meet first
    pub fn best_opposite(&self, market: Market, side: Side) -> Option<&Order> {
        self.books.get(&market)?.best_opposite(side)
    }

    /// One market's side in priority order
    pub fn snapshot_market(&self, market: Market, side: Side) -> Vec<Order> {
        self.books
            .get(&market)
            .map(|book| book.snapshot(side))
            .unwrap_or_default()
    }

    /// Every order on `side` whose base is `base`, across all quote tickers,
    /// in price-time priority
    pub fn snapshot_base(&self, base: Ticker, side: Side) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .books
            .values()
            .filter(|book| book.market().base == base)
            .flat_map(|book| book.iter_side(side).cloned())
            .collect();

        match side {
            Side::Buy => orders.sort_by(|a, b| b.price.cmp(&a.price).then(a.sequence.cmp(&b.sequence))),
            Side::Sell => orders.sort_by(|a, b| a.price.cmp(&b.price).then(a.sequence.cmp(&b.sequence))),
        }
        orders
    }

    /// Resting orders across all books
    pub fn resting_orders(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Markets that have had at least one order
    pub fn markets(&self) -> impl Iterator<Item = Market> + '_ {
        self.books.keys().copied()
    }

    /// Value of `ticker` held in escrow by resting orders
    pub fn reserved(&self, ticker: Ticker) -> Result<u128> {
        let mut total = 0u128;
        for book in self.books.values() {
            if book.market().base != ticker && book.market().quote != ticker {
                continue;
            }
            for side in [Side::Buy, Side::Sell] {
                for order in book.iter_side(side) {
                    if order.reserved_ticker() == ticker {
                        total += u128::from(order.reserved()?);
                    }
                }
            }
        }
        Ok(total)
    }

    /// Feed every non-empty book, in market order, into the state hasher
    pub(crate) fn hash_into(&self, hasher: &mut Sha256) -> Result<()> {
        hasher.update(b"books");
        hasher.update((self.locations.len() as u64).to_le_bytes());
        for book in self.books.values().filter(|book| !book.is_empty()) {
            book.hash_into(hasher)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountId;

    fn ticker(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    fn market(base: &str, quote: &str) -> Market {
        Market::new(ticker(base), ticker(quote)).unwrap()
    }

    #[test]
    fn test_insert_creates_book() {
        let mut books = OrderBooks::with_capacity(8);
        let m = market("MTK", "USDC");
        books.insert(Order::new(1, AccountId(1), Side::Buy, m, 2, 10, 1));

        assert_eq!(books.resting_orders(), 1);
        assert!(books.book(m).unwrap().capacity() >= 8);
        assert_eq!(books.get(1).map(|o| o.market()), Some(m));
    }

    #[test]
    fn test_snapshot_base_merges_quotes() {
        let mut books = OrderBooks::new();
        let usdc = market("MTK", "USDC");
        let dai = market("MTK", "DAI");
        books.insert(Order::new(1, AccountId(1), Side::Sell, usdc, 3, 10, 1));
        books.insert(Order::new(2, AccountId(1), Side::Sell, dai, 2, 10, 2));
        books.insert(Order::new(3, AccountId(1), Side::Sell, usdc, 2, 10, 3));
        books.insert(Order::new(4, AccountId(1), Side::Sell, market("BTC", "USDC"), 1, 10, 4));

        let merged: Vec<u64> = books
            .snapshot_base(ticker("MTK"), Side::Sell)
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(merged, vec![2, 3, 1]);

        let only_usdc: Vec<u64> = books.snapshot_market(usdc, Side::Sell).iter().map(|o| o.id).collect();
        assert_eq!(only_usdc, vec![3, 1]);
    }

    #[test]
    fn test_consume_and_remove_track_locations() {
        let mut books = OrderBooks::new();
        let m = market("MTK", "USDC");
        books.insert(Order::new(1, AccountId(1), Side::Sell, m, 1, 10, 1));
        books.insert(Order::new(2, AccountId(1), Side::Sell, m, 1, 10, 2));

        books.consume(1, 10).unwrap();
        assert!(books.get(1).is_none());
        assert_eq!(books.consume(1, 1), Err(ExchangeError::OrderNotFound(1)));

        assert_eq!(books.remove(2).map(|o| o.id), Some(2));
        assert!(books.is_empty());
        assert!(books.remove(2).is_none());
    }

    #[test]
    fn test_reserved_by_ticker() {
        let mut books = OrderBooks::new();
        let m = market("MTK", "USDC");
        books.insert(Order::new(1, AccountId(1), Side::Buy, m, 2, 10, 1));
        books.insert(Order::new(2, AccountId(2), Side::Sell, m, 5, 7, 2));

        assert_eq!(books.reserved(ticker("USDC")).unwrap(), 20);
        assert_eq!(books.reserved(ticker("MTK")).unwrap(), 7);
        assert_eq!(books.reserved(ticker("BTC")).unwrap(), 0);
    }

    #[test]
    fn test_best_opposite_per_market() {
        let mut books = OrderBooks::new();
        let usdc = market("MTK", "USDC");
        let dai = market("MTK", "DAI");
        books.insert(Order::new(1, AccountId(1), Side::Sell, usdc, 4, 10, 1));
        books.insert(Order::new(2, AccountId(1), Side::Sell, usdc, 3, 10, 2));
        books.insert(Order::new(3, AccountId(2), Side::Buy, usdc, 2, 10, 3));
        books.insert(Order::new(4, AccountId(1), Side::Sell, dai, 1, 10, 4));

        assert_eq!(books.best_opposite(usdc, Side::Buy).map(|o| o.id), Some(2));
        assert_eq!(books.best_opposite(usdc, Side::Sell).map(|o| o.id), Some(3));
        assert_eq!(books.best_opposite(dai, Side::Buy).map(|o| o.id), Some(4));
        assert!(books.best_opposite(dai, Side::Sell).is_none());
        assert!(books.best_opposite(market("BTC", "USDC"), Side::Buy).is_none());
    }
}
