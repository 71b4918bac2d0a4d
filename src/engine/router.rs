//! Conversion routing through an intermediate ticker.
//!
//! ```text
//! from --SELL from/intermediate--> q1 intermediate --SELL intermediate/to--> to
//! ```
//!
//! The second hop sells exactly what the first hop produced. Both hops are
//! planned against the current books and settled in one ledger transaction,
//! so a conversion either happens completely as planned or not at all. If
//! the second book is too thin, the unconverted intermediate tokens stay in
//! the caller's balance.
//!
//! When `intermediate == to` there is a direct market and only one hop runs.

use tracing::{debug, info};

use crate::engine::{MarketRequest, MatchingEngine};
use crate::error::{ExchangeError, Result};
use crate::ledger::BalanceLedger;
use crate::orderbook::OrderBooks;
use crate::registry::TokenRegistry;
use crate::types::{AccountId, ConversionReport, ExecutionReport, Market, Side, Ticker};

/// Parameters of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest {
    pub caller: AccountId,
    pub from: Ticker,
    pub to: Ticker,
    pub intermediate: Ticker,
    /// Amount of `from` to sell
    pub amount: u64,
}

impl MatchingEngine {
    /// Convert `request.amount` of `from` into `to`.
    pub fn convert(
        &mut self,
        books: &mut OrderBooks,
        ledger: &mut BalanceLedger,
        registry: &TokenRegistry,
        request: ConversionRequest,
    ) -> Result<ConversionReport> {
        let ConversionRequest {
            caller,
            from,
            to,
            intermediate,
            amount,
        } = request;

        registry.ensure(from)?;
        registry.ensure(to)?;
        registry.ensure(intermediate)?;
        if amount == 0 {
            return Err(ExchangeError::InvalidAmount("conversion amount must be positive"));
        }

        let first = MarketRequest {
            taker: caller,
            side: Side::Sell,
            market: Market::new(from, intermediate)?,
            amount,
        };
        let second_market = if intermediate == to {
            None
        } else {
            Some(Market::new(intermediate, to)?)
        };

        // The two markets are always distinct, so planning the second hop
        // against the untouched books sees exactly what it will consume.
        let first_plan = Self::plan_market(books, first)?;
        let second_plan = match second_market {
            Some(market) if first_plan.quote_volume > 0 => Some(Self::plan_market(
                books,
                MarketRequest {
                    taker: caller,
                    side: Side::Sell,
                    market,
                    amount: first_plan.quote_volume,
                },
            )?),
            _ => None,
        };

        let mut txn = ledger.begin(registry);
        Self::settle(&mut txn, &first_plan)?;
        if let Some(plan) = &second_plan {
            Self::settle(&mut txn, plan)?;
        }
        txn.commit();

        let mut hops = vec![self.apply(books, first_plan)?];
        match (second_market, second_plan) {
            (_, Some(plan)) => hops.push(self.apply(books, plan)?),
            (Some(market), None) => {
                debug!(%market, "first hop produced nothing, second hop skipped");
                hops.push(ExecutionReport::empty(market, Side::Sell, 0));
            }
            (None, None) => {}
        }

        let report = ConversionReport {
            from,
            to,
            intermediate,
            requested: amount,
            hops,
        };
        info!(
            %caller,
            %from,
            %to,
            %intermediate,
            spent = report.spent(),
            received = report.amount_out(),
            residual = report.residual_intermediate(),
            "conversion"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LimitRequest;
    use crate::types::TokenRef;

    struct Fixture {
        registry: TokenRegistry,
        ledger: BalanceLedger,
        books: OrderBooks,
        engine: MatchingEngine,
    }

    fn t(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    fn fixture() -> Fixture {
        let mut registry = TokenRegistry::new();
        for (i, symbol) in ["MTK", "USDC", "BTC"].iter().enumerate() {
            registry.register(t(symbol), TokenRef::from_low_u64(i as u64 + 1)).unwrap();
        }
        Fixture {
            registry,
            ledger: BalanceLedger::new(),
            books: OrderBooks::new(),
            engine: MatchingEngine::new(),
        }
    }

    impl Fixture {
        fn fund(&mut self, account: u64, ticker: &str, amount: u64) {
            self.ledger
                .credit(&self.registry, AccountId(account), t(ticker), amount)
                .unwrap();
        }

        fn bid(&mut self, trader: u64, base: &str, quote: &str, amount: u64, price: u64) {
            let request = LimitRequest {
                trader: AccountId(trader),
                side: Side::Buy,
                market: Market::new(t(base), t(quote)).unwrap(),
                amount,
                price,
            };
            self.engine
                .place_limit(&mut self.books, &mut self.ledger, &self.registry, request)
                .unwrap();
        }

        fn convert(&mut self, caller: u64, from: &str, to: &str, amount: u64, via: &str) -> Result<ConversionReport> {
            let request = ConversionRequest {
                caller: AccountId(caller),
                from: t(from),
                to: t(to),
                intermediate: t(via),
                amount,
            };
            self.engine
                .convert(&mut self.books, &mut self.ledger, &self.registry, request)
        }

        fn balance(&self, account: u64, ticker: &str) -> u64 {
            self.ledger.balance_of(AccountId(account), t(ticker))
        }
    }

    #[test]
    fn test_two_hop_with_residual() {
        let mut f = fixture();
        f.fund(1, "USDC", 100);
        f.fund(2, "BTC", 60);
        f.fund(3, "MTK", 50);
        f.bid(1, "MTK", "USDC", 50, 2);
        // Buys at most 60 USDC, paying 1 BTC each
        f.bid(2, "USDC", "BTC", 60, 1);

        let report = f.convert(3, "MTK", "BTC", 50, "USDC").unwrap();

        assert_eq!(report.hops.len(), 2);
        assert_eq!(report.hops[0].quote_volume, 100);
        assert_eq!(report.hops[1].requested, 100);
        assert_eq!(report.spent(), 50);
        assert_eq!(report.amount_out(), 60);
        assert_eq!(report.residual_intermediate(), 40);

        assert_eq!(f.balance(3, "MTK"), 0);
        assert_eq!(f.balance(3, "USDC"), 40);
        assert_eq!(f.balance(3, "BTC"), 60);
        assert_eq!(f.balance(1, "MTK"), 50);
        assert_eq!(f.balance(2, "USDC"), 60);
        assert!(f.books.is_empty());
    }

    #[test]
    fn test_direct_when_intermediate_is_target() {
        let mut f = fixture();
        f.fund(1, "USDC", 100);
        f.fund(3, "MTK", 20);
        f.bid(1, "MTK", "USDC", 50, 2);

        let report = f.convert(3, "MTK", "USDC", 20, "USDC").unwrap();

        assert_eq!(report.hops.len(), 1);
        assert_eq!(report.amount_out(), 40);
        assert_eq!(report.residual_intermediate(), 0);
        assert_eq!(f.balance(3, "USDC"), 40);
    }

    #[test]
    fn test_empty_first_hop_skips_second() {
        let mut f = fixture();
        f.fund(2, "BTC", 60);
        f.fund(3, "MTK", 50);
        f.bid(2, "USDC", "BTC", 60, 1);

        let report = f.convert(3, "MTK", "BTC", 50, "USDC").unwrap();

        assert_eq!(report.hops.len(), 2);
        assert!(report.hops[1].trades.is_empty());
        assert_eq!(report.amount_out(), 0);
        assert_eq!(f.balance(3, "MTK"), 50);
        assert_eq!(f.books.resting_orders(), 1);
    }

    #[test]
    fn test_failure_changes_nothing() {
        let mut f = fixture();
        f.fund(1, "USDC", 100);
        f.fund(2, "BTC", 60);
        f.fund(3, "MTK", 10);
        f.bid(1, "MTK", "USDC", 50, 2);
        f.bid(2, "USDC", "BTC", 60, 1);

        let err = f.convert(3, "MTK", "BTC", 50, "USDC").unwrap_err();

        assert!(matches!(err, ExchangeError::InsufficientBalance { .. }));
        assert_eq!(f.balance(3, "MTK"), 10);
        assert_eq!(f.balance(3, "USDC"), 0);
        assert_eq!(f.balance(3, "BTC"), 0);
        assert_eq!(f.books.resting_orders(), 2);
        assert_eq!(f.engine.trades_executed(), 0);
    }

    #[test]
    fn test_rejects_bad_routes() {
        let mut f = fixture();
        f.fund(3, "MTK", 10);

        assert!(matches!(
            f.convert(3, "MTK", "BTC", 10, "MTK"),
            Err(ExchangeError::InvalidMarket { .. })
        ));
        assert!(matches!(
            f.convert(3, "MTK", "BTC", 0, "USDC"),
            Err(ExchangeError::InvalidAmount(_))
        ));
        let non = t("NON");
        assert_eq!(
            f.convert(3, "MTK", "NON", 10, "USDC"),
            Err(ExchangeError::UnknownTicker(non))
        );
    }
}
