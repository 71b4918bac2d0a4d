//! Slab entry for a resting order.
//!
//! Orders at one price form a doubly-linked queue whose links are slab keys,
//! so an order can be unlinked in O(1) when it is consumed or cancelled.
//!
//! - `prev` points towards the head (older, matched first)
//! - `next` points towards the tail (newer)

use crate::types::{AccountId, Order};

/// Order plus its queue links.
#[derive(Debug, Clone)]
pub struct OrderNode {
    pub order: Order,

    /// Newer neighbour at the same price
    pub next: Option<usize>,

    /// Older neighbour at the same price
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Wrap an order; the node starts unlinked.
    ///
    /// ```
    /// use token_dex::orderbook::OrderNode;
    /// use token_dex::types::{AccountId, Market, Order, Side, Ticker};
    ///
    /// let market = Market::new(Ticker::new("MTK").unwrap(), Ticker::new("USDC").unwrap()).unwrap();
    /// let node = OrderNode::new(Order::new(1, AccountId(1), Side::Sell, market, 2, 10, 1));
    ///
    /// assert!(node.is_unlinked());
    /// ```
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }

    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id
    }

    #[inline]
    pub fn trader(&self) -> AccountId {
        self.order.trader()
    }

    #[inline]
    pub fn price(&self) -> u64 {
        self.order.price
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.order.remaining
    }
}
