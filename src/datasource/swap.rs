//! Swap aggregator HTTP client (Jupiter v6-style `/quote` + `/swap`).

use crate::domain::{Address, Lamports};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Wrapped SOL mint, the input side of a SOL -> token swap.
pub const WRAPPED_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected http status: {0}")]
    HttpStatus(u16),
    #[error("aggregator rejected request: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A quote as returned by the aggregator. The raw body is passed back
/// verbatim when requesting the swap transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub in_amount: Lamports,
    pub out_amount: String,
    pub raw: Value,
}

/// Quote and swap-transaction provider.
#[async_trait]
pub trait SwapSource: Send + Sync {
    /// Quote swapping `amount` lamports of SOL into `output_mint`.
    async fn quote(
        &self,
        output_mint: &Address,
        amount: Lamports,
        slippage_bps: u16,
    ) -> Result<Quote, AggregatorError>;

    /// Request a serialized swap transaction for `quote`, to be signed by
    /// `user`. Returns the decoded transaction bytes.
    async fn swap_transaction(
        &self,
        quote: &Quote,
        user: &Address,
    ) -> Result<Vec<u8>, AggregatorError>;
}

#[derive(Debug, Clone)]
pub struct SwapAggregator {
    client: reqwest::Client,
    base_url: String,
}

impl SwapAggregator {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn quote_url(
        &self,
        input_mint: &str,
        output_mint: &Address,
        amount: Lamports,
        slippage_bps: u16,
    ) -> String {
        format!(
            "{}/quote?inputMint={}&outputMint={}&amount={}&slippageBps={}",
            self.base_url, input_mint, output_mint, amount, slippage_bps
        )
    }
}

#[async_trait]
impl SwapSource for SwapAggregator {
    async fn quote(
        &self,
        output_mint: &Address,
        amount: Lamports,
        slippage_bps: u16,
    ) -> Result<Quote, AggregatorError> {
        let url = self.quote_url(WRAPPED_SOL_MINT, output_mint, amount, slippage_bps);
        debug!(url = %url, "Requesting quote");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AggregatorError::Http(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AggregatorError::HttpStatus(status.as_u16()));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| AggregatorError::Malformed(e.to_string()))?;

        parse_quote(body, amount)
    }

    async fn swap_transaction(
        &self,
        quote: &Quote,
        user: &Address,
    ) -> Result<Vec<u8>, AggregatorError> {
        let payload = serde_json::json!({
            "quoteResponse": quote.raw,
            "userPublicKey": user.as_str(),
            "wrapAndUnwrapSol": true,
        });

        let resp = self
            .client
            .post(format!("{}/swap", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AggregatorError::Http(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AggregatorError::HttpStatus(status.as_u16()));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| AggregatorError::Malformed(e.to_string()))?;

        decode_swap_transaction(&body)
    }
}

fn parse_quote(body: Value, amount: Lamports) -> Result<Quote, AggregatorError> {
    if let Some(err) = body.get("error") {
        return Err(AggregatorError::Rejected(
            err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string()),
        ));
    }

    let out_amount = body
        .get("outAmount")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AggregatorError::Malformed("missing outAmount".to_string()))?
        .to_string();

    Ok(Quote {
        in_amount: amount,
        out_amount,
        raw: body,
    })
}

fn decode_swap_transaction(body: &Value) -> Result<Vec<u8>, AggregatorError> {
    let encoded = body
        .get("swapTransaction")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AggregatorError::Malformed("missing swapTransaction".to_string()))?;

    BASE64
        .decode(encoded)
        .map_err(|e| AggregatorError::Malformed(format!("invalid base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_url() {
        let agg = SwapAggregator::new(reqwest::Client::new(), "https://quote.test/v6/".to_string());
        let url = agg.quote_url(
            WRAPPED_SOL_MINT,
            &Address::new("Mint".to_string()),
            Lamports::new(80_000_000),
            50,
        );
        assert_eq!(
            url,
            "https://quote.test/v6/quote?inputMint=So11111111111111111111111111111111111111112&outputMint=Mint&amount=80000000&slippageBps=50"
        );
    }

    #[test]
    fn test_parse_quote_keeps_raw_body() {
        let body = serde_json::json!({ "outAmount": "12345", "routePlan": [] });
        let quote = parse_quote(body.clone(), Lamports::new(1)).unwrap();
        assert_eq!(quote.out_amount, "12345");
        assert_eq!(quote.raw, body);
    }

    #[test]
    fn test_parse_quote_error() {
        let body = serde_json::json!({ "error": "No routes found" });
        match parse_quote(body, Lamports::new(1)) {
            Err(AggregatorError::Rejected(msg)) => assert_eq!(msg, "No routes found"),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_swap_transaction() {
        let body = serde_json::json!({ "swapTransaction": "AQID" });
        assert_eq!(decode_swap_transaction(&body).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_swap_transaction_missing() {
        let body = serde_json::json!({});
        assert!(matches!(
            decode_swap_transaction(&body),
            Err(AggregatorError::Malformed(_))
        ));
    }
}
