//! Buyback monitor: poll the wallet balance and prepare a SOL -> token swap
//! when it clears the threshold.
//!
//! Runs dry: the prepared transaction is logged, never signed or submitted.

use crate::config::Config;
use crate::datasource::{AggregatorError, ChainSource, DataSourceError, SwapSource};
use crate::domain::{Address, Lamports};
use crate::engine::{plan_buyback, BuybackDecision, SkipReason};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Skipped {
        reason: SkipReason,
        balance: Lamports,
    },
    Prepared {
        spend: Lamports,
        out_amount: String,
        transaction_len: usize,
    },
}

#[derive(Debug, Error)]
pub enum BuybackError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
}

pub struct BuybackMonitor {
    chain: Arc<dyn ChainSource>,
    swaps: Arc<dyn SwapSource>,
    wallet: Address,
    token_mint: Address,
    min_balance: Lamports,
    reserve: Lamports,
    slippage_bps: u16,
    poll_interval: Duration,
}

impl BuybackMonitor {
    pub fn new(chain: Arc<dyn ChainSource>, swaps: Arc<dyn SwapSource>, config: &Config) -> Self {
        Self {
            chain,
            swaps,
            wallet: config.watched_address.clone(),
            token_mint: config.token_mint.clone(),
            min_balance: config.min_balance,
            reserve: config.reserve,
            slippage_bps: config.slippage_bps,
            poll_interval: config.poll_interval,
        }
    }

    /// One check: balance, plan, quote, swap transaction.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, BuybackError> {
        let balance = self.chain.fetch_balance(&self.wallet).await?;
        info!(balance_sol = %balance.to_sol().to_fixed(4), "Current balance");

        let spend = match plan_buyback(balance, self.min_balance, self.reserve) {
            BuybackDecision::Skip(reason) => {
                info!(
                    ?reason,
                    threshold_sol = %self.min_balance.to_sol(),
                    "Skipping buyback"
                );
                return Ok(CycleOutcome::Skipped { reason, balance });
            }
            BuybackDecision::Swap { lamports } => lamports,
        };

        info!(spend_sol = %spend.to_sol().to_fixed(4), "Requesting buyback quote");
        let quote = self
            .swaps
            .quote(&self.token_mint, spend, self.slippage_bps)
            .await?;
        info!(out_amount = %quote.out_amount, "Quote received");

        let transaction = self.swaps.swap_transaction(&quote, &self.wallet).await?;
        info!(
            bytes = transaction.len(),
            "Swap transaction prepared; signing is disabled, not submitting"
        );

        Ok(CycleOutcome::Prepared {
            spend,
            out_amount: quote.out_amount,
            transaction_len: transaction.len(),
        })
    }

    /// Run cycles every poll interval until `shutdown` resolves. Cycle errors
    /// are logged and the loop continues.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            if let Err(e) = self.run_cycle().await {
                error!(error = %e, "Buyback cycle failed");
            }

            info!(secs = self.poll_interval.as_secs(), "Waiting for next check");
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = &mut shutdown => {
                    info!("Buyback monitor stopped");
                    return;
                }
            }
        }
    }

    /// Run until `signal` resolves. A signal that fails to install is an
    /// error, not a shutdown request.
    pub async fn run_until<S>(&self, signal: S) -> io::Result<()>
    where
        S: Future<Output = io::Result<()>>,
    {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let run = self.run(async {
            let _ = stop_rx.await;
        });
        tokio::pin!(run);

        let signalled = tokio::select! {
            _ = &mut run => return Ok(()),
            signalled = signal => signalled,
        };
        signalled?;

        let _ = stop_tx.send(());
        run.await;
        Ok(())
    }
}
