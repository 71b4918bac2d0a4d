//! token-dex demo binary
//!
//! Runs a short scripted session: token registration, deposits, a resting
//! limit order, a market sell against it, and a two-hop conversion. Logging
//! follows `RUST_LOG`, falling back to the configured filter.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use token_dex::custody::InMemoryCustodian;
use token_dex::{AccountId, Exchange, ExchangeConfig, Side, Ticker, TokenRef};

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ExchangeConfig::from_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => ExchangeConfig::from_env().context("loading config from environment")?,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(?config, "starting");

    let owner = AccountId(config.owner);
    let (alice, bob, carol, dave) = (AccountId(1), AccountId(2), AccountId(3), AccountId(4));

    let mtk = Ticker::new("MTK")?;
    let usdc = Ticker::new("USDC")?;
    let btc = Ticker::new("BTC")?;
    let refs = [
        (mtk, TokenRef::from_low_u64(0x01)),
        (usdc, TokenRef::from_low_u64(0x02)),
        (btc, TokenRef::from_low_u64(0x03)),
    ];

    let mut custodian = InMemoryCustodian::new();
    for (_, reference) in refs {
        for account in [alice, bob, carol, dave] {
            custodian.mint(reference, account, 1_000_000);
            custodian.approve(reference, account, 1_000_000);
        }
    }

    let mut dex = Exchange::with_config(&config, custodian);
    for (ticker, reference) in refs {
        dex.add_token(owner, ticker, reference)?;
    }

    // Alice bids for 100 MTK at 1 USDC
    dex.deposit(alice, 1_000, usdc)?;
    let bid = dex.create_limit_order(alice, Side::Buy, mtk, usdc, 100, 1)?;
    println!("resting bid #{} for {} MTK @ {} USDC", bid.id, bid.amount, bid.price);

    // Bob sells into it
    dex.deposit(bob, 100, mtk)?;
    let report = dex.create_market_order(bob, Side::Sell, mtk, usdc, 100)?;
    println!(
        "market sell filled {} MTK for {} USDC in {} trade(s)",
        report.filled,
        report.quote_volume,
        report.trades.len()
    );

    // Dave makes a market for USDC in BTC and for MTK in USDC
    dex.deposit(dave, 500, usdc)?;
    dex.deposit(dave, 60, btc)?;
    dex.create_limit_order(dave, Side::Buy, mtk, usdc, 50, 2)?;
    dex.create_limit_order(dave, Side::Buy, usdc, btc, 60, 1)?;

    // Carol converts 50 MTK to BTC through USDC
    dex.deposit(carol, 50, mtk)?;
    let conversion = dex.convert_tokens(carol, mtk, btc, 50, usdc)?;
    println!(
        "converted {} MTK into {} BTC, {} USDC left over",
        conversion.spent(),
        conversion.amount_out(),
        conversion.residual_intermediate()
    );

    for ticker in [mtk, usdc, btc] {
        println!(
            "{ticker}: available {} + reserved {}",
            dex.total_balance(ticker),
            dex.reserved(ticker)?
        );
    }

    let commitment = dex.commitment()?;
    println!(
        "state root {} after {} operations, {} trades, {} resting orders",
        commitment.state_root_hex(),
        commitment.operations,
        commitment.trades_executed,
        commitment.resting_orders
    );

    Ok(())
}
