//! Matching engine.
//!
//! ## Rules
//!
//! 1. **Determinism**: the same operations in the same order always produce
//!    the same balances, books and trades
//! 2. **Integer math**: all amounts are `u64` with checked arithmetic
//! 3. **Price-time priority**: best price first, then lowest sequence number
//! 4. **Maker price**: every trade executes at the resting order's price
//!
//! ## Order Kinds
//!
//! - **Limit orders** reserve their committed value and rest on the book.
//!   They never match on arrival.
//! - **Market orders** consume resting orders until filled or until the book
//!   is exhausted. Whatever is left is not executed.
//! - **Conversions** chain up to two market sells through an intermediate
//!   ticker (see [`router`]).
//!
//! ## Example
//!
//! ```
//! use token_dex::engine::{LimitRequest, MarketRequest, MatchingEngine};
//! use token_dex::ledger::BalanceLedger;
//! use token_dex::orderbook::OrderBooks;
//! use token_dex::registry::TokenRegistry;
//! use token_dex::types::{AccountId, Market, Side, Ticker, TokenRef};
//!
//! let mut registry = TokenRegistry::new();
//! let (mtk, usdc) = (Ticker::new("MTK").unwrap(), Ticker::new("USDC").unwrap());
//! registry.register(mtk, TokenRef::from_low_u64(1)).unwrap();
//! registry.register(usdc, TokenRef::from_low_u64(2)).unwrap();
//!
//! let mut ledger = BalanceLedger::new();
//! ledger.credit(&registry, AccountId(1), mtk, 100).unwrap();
//! ledger.credit(&registry, AccountId(2), usdc, 300).unwrap();
//!
//! let mut books = OrderBooks::new();
//! let mut engine = MatchingEngine::new();
//! let market = Market::new(mtk, usdc).unwrap();
//!
//! // Resting sell: 100 MTK at 3 USDC
//! let limit = LimitRequest { trader: AccountId(1), side: Side::Sell, market, amount: 100, price: 3 };
//! engine.place_limit(&mut books, &mut ledger, &registry, limit).unwrap();
//!
//! // Taker buys all of it
//! let taker = MarketRequest { taker: AccountId(2), side: Side::Buy, market, amount: 100 };
//! let report = engine.execute_market(&mut books, &mut ledger, &registry, taker).unwrap();
//!
//! assert!(report.is_complete());
//! assert_eq!(ledger.balance_of(AccountId(2), mtk), 100);
//! assert_eq!(ledger.balance_of(AccountId(1), usdc), 300);
//! ```

pub mod matcher;
pub mod router;

pub use matcher::{Fill, LimitRequest, MarketPlan, MarketRequest, MatchingEngine};
pub use router::ConversionRequest;
