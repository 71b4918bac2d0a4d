//! Randomized invariant checks for the exchange.
//!
//! These tests drive a seeded stream of deposits, withdrawals, limit and
//! market orders, cancellations and conversions, and verify after every step:
//! 1. Available balances plus order escrow equal the custodian's holdings
//! 2. Every book side stays in price-time order
//! 3. Failed operations leave the state root unchanged
//! 4. Two runs over the same seed end in the same state root
//!
//! ## Running
//!
//! ```bash
//! cargo test --release --test invariants -- --nocapture
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use token_dex::custody::InMemoryCustodian;
use token_dex::{AccountId, Exchange, Order, Side, StateCommitment, Ticker, TokenRef};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Operations per randomized run
const STEPS: usize = 2_000;

/// Traders participating in a run (ids 1..=TRADERS)
const TRADERS: u64 = 6;

/// Tokens each trader holds outside the exchange
const MINTED: u64 = 1_000_000_000;

const OWNER: AccountId = AccountId(0);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn tickers() -> [Ticker; 3] {
    [
        Ticker::new("MTK").unwrap(),
        Ticker::new("USDC").unwrap(),
        Ticker::new("BTC").unwrap(),
    ]
}

fn reference(index: usize) -> TokenRef {
    TokenRef::from_low_u64(0x100 + index as u64)
}

fn exchange() -> Exchange {
    let mut custodian = InMemoryCustodian::new();
    for index in 0..3 {
        for id in 1..=TRADERS {
            custodian.mint(reference(index), AccountId(id), MINTED);
            custodian.approve(reference(index), AccountId(id), MINTED);
        }
    }

    let mut dex = Exchange::new(OWNER, custodian);
    for (index, ticker) in tickers().into_iter().enumerate() {
        dex.add_token(OWNER, ticker, reference(index)).unwrap();
    }
    dex
}

fn assert_conserved(dex: &Exchange, step: usize) {
    for (index, ticker) in tickers().into_iter().enumerate() {
        let available = dex.total_balance(ticker);
        let reserved = dex.reserved(ticker).unwrap();
        let held = u128::from(dex.custodian().held(reference(index)));
        assert_eq!(
            available + reserved,
            held,
            "step {step}: {ticker} available {available} + reserved {reserved} != held {held}"
        );
    }
}

fn assert_sorted(orders: &[Order], side: Side, step: usize) {
    for pair in orders.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let price_ok = match side {
            Side::Buy => a.price >= b.price,
            Side::Sell => a.price <= b.price,
        };
        assert!(price_ok, "step {step}: {side:?} book out of price order");
        if a.price == b.price {
            assert!(a.sequence < b.sequence, "step {step}: {side:?} book out of time order");
        }
    }
}

fn pick_pair(rng: &mut ChaCha8Rng) -> (Ticker, Ticker) {
    let all = tickers();
    let base = rng.gen_range(0..3);
    let quote = (base + rng.gen_range(1..3)) % 3;
    (all[base], all[quote])
}

/// Run `STEPS` random operations and return the final commitment.
///
/// With `check` set, invariants are verified after every step.
fn run(seed: u64, check: bool) -> StateCommitment {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut dex = exchange();
    let all = tickers();
    let mut placed: Vec<u64> = Vec::new();

    for step in 0..STEPS {
        let trader = AccountId(rng.gen_range(1..=TRADERS));
        let before = dex.commitment().unwrap();

        let result = match rng.gen_range(0..100) {
            0..=19 => {
                let ticker = all[rng.gen_range(0..3)];
                dex.deposit(trader, rng.gen_range(1..=10_000), ticker).map(|_| ())
            }
            20..=27 => {
                let ticker = all[rng.gen_range(0..3)];
                dex.withdrawal(trader, rng.gen_range(1..=5_000), ticker).map(|_| ())
            }
            28..=64 => {
                let (base, quote) = pick_pair(&mut rng);
                let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
                let amount = rng.gen_range(1..=200);
                let price = rng.gen_range(1..=20);
                dex.create_limit_order(trader, side, base, quote, amount, price)
                    .map(|order| placed.push(order.id))
            }
            65..=84 => {
                let (base, quote) = pick_pair(&mut rng);
                let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
                dex.create_market_order(trader, side, base, quote, rng.gen_range(1..=300))
                    .map(|_| ())
            }
            85..=92 if !placed.is_empty() => {
                let id = placed[rng.gen_range(0..placed.len())];
                dex.cancel_order(trader, id).map(|_| ())
            }
            _ => {
                let (from, to) = pick_pair(&mut rng);
                let intermediate = all
                    .into_iter()
                    .find(|t| *t != from && *t != to)
                    .unwrap();
                dex.convert_tokens(trader, from, to, rng.gen_range(1..=100), intermediate)
                    .map(|_| ())
            }
        };

        if check {
            if result.is_err() {
                assert_eq!(dex.commitment().unwrap(), before, "step {step}: failed op mutated state");
            }
            assert_conserved(&dex, step);
            for base in all {
                for side in [Side::Buy, Side::Sell] {
                    assert_sorted(&dex.get_order_book(base, side), side, step);
                }
            }
        }
    }

    dex.commitment().unwrap()
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn invariants_hold_under_random_flow() {
    for seed in [1, 7, 42] {
        let commitment = run(seed, true);
        println!(
            "seed {seed}: {} ops, {} trades, {} resting, root {}",
            commitment.operations,
            commitment.trades_executed,
            commitment.resting_orders,
            commitment.state_root_hex()
        );
        assert!(commitment.operations > 0);
    }
}

#[test]
fn same_seed_same_state_root() {
    let first = run(12_345, false);
    let second = run(12_345, false);

    assert_eq!(first, second);
}

#[test]
fn different_flows_diverge() {
    let first = run(1, false);
    let second = run(2, false);

    assert_ne!(first.state_root, second.state_root);
}

#[test]
fn resting_orders_are_fully_escrowed() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut dex = exchange();
    let [mtk, usdc, _] = tickers();
    dex.deposit(AccountId(1), 1_000_000, usdc).unwrap();
    dex.deposit(AccountId(2), 1_000_000, mtk).unwrap();

    let mut escrow = 0u128;
    for _ in 0..200 {
        let amount = rng.gen_range(1..=50);
        let price = rng.gen_range(1..=10);
        dex.create_limit_order(AccountId(1), Side::Buy, mtk, usdc, amount, price).unwrap();
        escrow += u128::from(amount * price);
    }

    assert_eq!(dex.reserved(usdc).unwrap(), escrow);
    assert_eq!(u128::from(dex.balances(AccountId(1), usdc)) + escrow, 1_000_000);

    // Sweeping the whole bid side moves all escrow to the seller
    let resting: u64 = dex.get_order_book(mtk, Side::Buy).iter().map(|o| o.remaining).sum();
    let report = dex.create_market_order(AccountId(2), Side::Sell, mtk, usdc, resting).unwrap();

    assert!(report.is_complete());
    assert_eq!(u128::from(report.quote_volume), escrow);
    assert_eq!(dex.reserved(usdc).unwrap(), 0);
    assert_eq!(u128::from(dex.balances(AccountId(2), usdc)), escrow);
}
