//! FIFO queue of the orders resting at one price.
//!
//! ```text
//! head (oldest) <-> ... <-> tail (newest)
//! ```
//!
//! Orders join at the tail and are matched from the head. Admission order is
//! sequence order, so walking from the head visits orders by ascending
//! sequence number.

use slab::Slab;

use crate::orderbook::OrderNode;

/// Queue metadata for one price. Order data lives in the book's slab.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: u64,

    /// Sum of `remaining` over the queue, in base units
    pub total_amount: u64,

    /// Oldest order, matched first
    pub head: Option<usize>,

    /// Newest order
    pub tail: Option<usize>,

    pub order_count: usize,
}

impl PriceLevel {
    pub fn new(price: u64) -> Self {
        Self {
            price,
            total_amount: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append the node at `key` to the tail. Unknown keys are ignored.
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let Some(node) = slab.get_mut(key) else {
            return;
        };
        let amount = node.remaining();
        node.prev = self.tail;
        node.next = None;

        match self.tail.and_then(|tail| slab.get_mut(tail)) {
            Some(tail_node) => tail_node.next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_amount = self.total_amount.saturating_add(amount);
    }

    /// Unlink the node at `key`, returning its remaining amount.
    ///
    /// The node stays in the slab with cleared links.
    pub fn unlink(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Option<u64> {
        let node = slab.get(key)?;
        let (amount, prev, next) = (node.remaining(), node.prev, node.next);

        match prev.and_then(|p| slab.get_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| slab.get_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }

        if let Some(node) = slab.get_mut(key) {
            node.prev = None;
            node.next = None;
        }

        self.order_count -= 1;
        self.total_amount = self.total_amount.saturating_sub(amount);
        Some(amount)
    }

    /// Account for a partial fill of one of the queued orders
    #[inline]
    pub fn reduce(&mut self, filled: u64) {
        self.total_amount = self.total_amount.saturating_sub(filled);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
