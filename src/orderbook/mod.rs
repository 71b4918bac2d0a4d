//! Order books for every market.
//!
//! ## Architecture
//!
//! Each market `(base, quote)` has its own central limit order book:
//!
//! - **Slab-based storage**: O(1) order insertion, removal, and lookup
//! - **Price levels**: orders grouped by price in a BTreeMap
//! - **Price-time priority**: FIFO within a price level
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` with queue links
//! - [`PriceLevel`]: FIFO queue at one price
//! - [`OrderBook`]: bid and ask sides of one market
//! - [`OrderBooks`]: all markets, with cross-market lookups
//!
//! ## Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Insert | O(log n) |
//! | Consume / remove by id | O(log n) |
//! | Best opposite | O(1)* |
//!
//! *First level of the BTreeMap

pub mod node;
pub mod level;
pub mod book;
pub mod books;

pub use node::OrderNode;
pub use level::PriceLevel;
pub use book::{OrderBook, SideIter};
pub use books::OrderBooks;
