//! Concurrent access through [`SharedExchange`].
//!
//! Threads hammer one exchange with deposits, orders and conversions. Since
//! every call holds the lock for its full duration, balances must still be
//! conserved and books ordered once all threads have joined.

use std::sync::{Arc, Barrier};
use std::thread;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use token_dex::custody::InMemoryCustodian;
use token_dex::{AccountId, Exchange, SharedExchange, Side, Ticker, TokenRef};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

const THREADS: u64 = 8;
const OPS_PER_THREAD: usize = 500;
const MINTED: u64 = 10_000_000;
const OWNER: AccountId = AccountId(0);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn tickers() -> (Ticker, Ticker) {
    (Ticker::new("MTK").unwrap(), Ticker::new("USDC").unwrap())
}

const MTK_REF: TokenRef = TokenRef([0x11; 20]);
const USDC_REF: TokenRef = TokenRef([0x22; 20]);

fn shared_exchange() -> SharedExchange {
    let (mtk, usdc) = tickers();
    let mut custodian = InMemoryCustodian::new();
    for id in 1..=THREADS {
        for reference in [MTK_REF, USDC_REF] {
            custodian.mint(reference, AccountId(id), MINTED);
            custodian.approve(reference, AccountId(id), MINTED);
        }
    }

    let mut dex = Exchange::new(OWNER, custodian);
    dex.add_token(OWNER, mtk, MTK_REF).unwrap();
    dex.add_token(OWNER, usdc, USDC_REF).unwrap();
    SharedExchange::new(dex)
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn concurrent_traders_conserve_balances() {
    let (mtk, usdc) = tickers();
    let shared = shared_exchange();
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (1..=THREADS)
        .map(|id| {
            let dex = shared.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let trader = AccountId(id);
                let mut rng = ChaCha8Rng::seed_from_u64(id);
                dex.deposit(trader, 100_000, mtk).unwrap();
                dex.deposit(trader, 100_000, usdc).unwrap();
                barrier.wait();

                let mut own_orders = Vec::new();
                for _ in 0..OPS_PER_THREAD {
                    let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
                    match rng.gen_range(0..10) {
                        0..=5 => {
                            let price = rng.gen_range(5..=15);
                            if let Ok(order) = dex.create_limit_order(trader, side, mtk, usdc, rng.gen_range(1..=50), price) {
                                own_orders.push(order.id);
                            }
                        }
                        6..=8 => {
                            let _ = dex.create_market_order(trader, side, mtk, usdc, rng.gen_range(1..=80));
                        }
                        _ => {
                            if let Some(id) = own_orders.pop() {
                                // May already be filled by another thread
                                let _ = dex.cancel_order(trader, id);
                            }
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let dex = shared.lock();
    for (ticker, reference) in [(mtk, MTK_REF), (usdc, USDC_REF)] {
        assert_eq!(
            dex.total_balance(ticker) + dex.reserved(ticker).unwrap(),
            u128::from(dex.custodian().held(reference)),
        );
        assert_eq!(dex.custodian().held(reference), THREADS * 100_000);
    }

    let bids = dex.get_order_book(mtk, Side::Buy);
    assert!(bids.windows(2).all(|w| w[0].price >= w[1].price));
    let asks = dex.get_order_book(mtk, Side::Sell);
    assert!(asks.windows(2).all(|w| w[0].price <= w[1].price));
    assert!(bids.iter().chain(&asks).all(|o| o.remaining > 0));
}

#[test]
fn cancels_from_other_threads_are_refused() {
    let (mtk, usdc) = tickers();
    let shared = shared_exchange();
    shared.deposit(AccountId(1), 1_000, usdc).unwrap();
    let order = shared
        .create_limit_order(AccountId(1), Side::Buy, mtk, usdc, 100, 2)
        .unwrap();

    let handles: Vec<_> = (2..=THREADS)
        .map(|id| {
            let dex = shared.clone();
            thread::spawn(move || dex.cancel_order(AccountId(id), order.id).is_err())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(shared.get_order_book(mtk, Side::Buy).len(), 1);
    assert_eq!(shared.balances(AccountId(1), usdc), 800);
}

#[test]
fn withdrawals_race_for_one_balance() {
    let (_, usdc) = tickers();
    let shared = shared_exchange();
    shared.deposit(AccountId(1), 1_000, usdc).unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let dex = shared.clone();
            thread::spawn(move || dex.withdrawal(AccountId(1), 300, usdc).is_ok())
        })
        .collect();

    let succeeded = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(succeeded, 3);
    assert_eq!(shared.balances(AccountId(1), usdc), 100);
    let commitment = shared.commitment().unwrap();
    // two registrations, one deposit, three withdrawals
    assert_eq!(commitment.operations, 6);
}
