//! LMSR Markets - demo binary
//!
//! Runs one market through its whole life: creation, liquidity, trading,
//! resolution and redemption. Pass a JSON [`ExchangeConfig`] path as the
//! first argument to override defaults; set `RUST_LOG` to control logging.

use std::process::ExitCode;

use lmsr_markets::prelude::*;
use lmsr_markets::Checkpoint;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// 6-decimal collateral, like most stablecoins
const UNIT: u128 = 1_000_000;

fn load_config() -> Result<ExchangeConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| Error::Encoding(format!("{}: {}", path, e)))?;
            ExchangeConfig::from_json(&text)
        }
        None => Ok(ExchangeConfig::default()),
    }
}

fn show_prices(exchange: &Exchange<OutcomeBook, CollateralBook>, market: &MarketId) -> Result<()> {
    let prices = exchange.prices(market)?;
    let text: Vec<String> = prices.iter().map(|p| p.to_string()).collect();
    info!(prices = %text.join(" / "), "prices");
    Ok(())
}

fn run() -> Result<Checkpoint> {
    let config = load_config()?;

    let usdc = AssetId::derive(b"usdc");
    let lp = AccountId::derive(b"liquidity-provider");
    let alice = AccountId::derive(b"alice");
    let bob = AccountId::derive(b"bob");
    let oracle_id = OracleId::derive(b"manual-oracle");
    let question = QuestionId::derive(b"Which team wins the final?");

    let mut collateral = CollateralBook::new();
    collateral.credit(usdc, lp, 10_000 * UNIT)?;
    collateral.credit(usdc, alice, 1_000 * UNIT)?;
    collateral.credit(usdc, bob, 1_000 * UNIT)?;

    let oracle = ManualOracle::new();
    let oracles = OracleSet::new().with(oracle_id, oracle.clone());
    let mut exchange = Exchange::new(config, OutcomeBook::new(), collateral, oracles)?;

    let deadline = 1_000;
    let market_config = MarketConfig::new(usdc, deadline, MarketFlags::NONE, 3, oracle_id, question);
    let market = exchange.create_market(market_config)?;
    exchange.register_amm(market, Fixed::from_raw((1_000 * UNIT) as i128), 0)?;
    exchange.add_liquidity(lp, market, 1_000 * UNIT, 0, 0)?;
    show_prices(&exchange, &market)?;

    let first = exchange.buy(alice, market, 0, 200 * UNIT, 0, 10)?;
    let second = exchange.buy(bob, market, 2, 100 * UNIT, 0, 20)?;
    show_prices(&exchange, &market)?;

    // Bob changes his mind about half of his position
    exchange.sell(bob, market, 2, second.tokens / 2, 0, 30)?;
    show_prices(&exchange, &market)?;

    exchange.request_resolution(market, deadline)?;
    oracle.resolve(question, 0, false, deadline + 60)?;
    exchange.finalize(market)?;

    let paid = exchange.redeem(alice, market, 0, first.tokens)?;
    info!(paid, "alice redeemed");

    let shares = exchange.lp_shares(&market, &lp);
    let withdrawal = exchange.remove_liquidity(lp, market, shares, 0, &[0, 0, 0])?;
    info!(collateral = withdrawal.collateral, "liquidity provider exited");

    Ok(exchange.checkpoint(deadline + 120))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(checkpoint) => {
            info!(
                sequence = checkpoint.sequence,
                trades = checkpoint.trades,
                state_root = %checkpoint.state_root_hex(),
                "demo complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, category = ?err.category(), "demo failed");
            ExitCode::FAILURE
        }
    }
}
