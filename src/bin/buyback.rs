//! Buyback poll loop. Checks the watched wallet every poll interval and
//! prepares a SOL -> token swap when the balance clears the threshold.
//! Dry run: the transaction is never signed or sent.

use anyhow::Context;
use std::sync::Arc;
use whalewatch::datasource::{SolanaRpcSource, SwapAggregator};
use whalewatch::orchestration::BuybackMonitor;
use whalewatch::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;

    let chain = Arc::new(SolanaRpcSource::new(config.rpc_endpoint.clone()));
    let swaps = Arc::new(SwapAggregator::new(
        reqwest::Client::new(),
        config.swap_api_url.clone(),
    ));

    tracing::info!(
        wallet = %config.watched_address,
        mint = %config.token_mint,
        threshold_sol = %config.min_balance.to_sol(),
        reserve_sol = %config.reserve.to_sol(),
        "Buyback monitor started"
    );

    let monitor = BuybackMonitor::new(chain, swaps, &config);
    monitor
        .run_until(tokio::signal::ctrl_c())
        .await
        .context("Failed to listen for shutdown signal")?;

    Ok(())
}
