//! Solana JSON-RPC client implementation.

use super::{ChainSource, DataSourceError, SignatureInfo, MAX_SIGNATURE_PAGE};
use crate::domain::{
    Address, BalanceMeta, Decimal, Instruction, Lamports, ParsedTransfer, Signature,
    TransactionRecord, UnixTime,
};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Solana data source over HTTP JSON-RPC with `jsonParsed` encoding.
#[derive(Debug, Clone)]
pub struct SolanaRpcSource {
    client: Client,
    endpoint: String,
}

impl SolanaRpcSource {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, DataSourceError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let body = retry(backoff, || async {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await?;

        unwrap_rpc_result(body)
    }
}

#[async_trait]
impl ChainSource for SolanaRpcSource {
    async fn fetch_signatures(
        &self,
        address: &Address,
        limit: usize,
        before: Option<&Signature>,
    ) -> Result<Vec<SignatureInfo>, DataSourceError> {
        let limit = limit.clamp(1, MAX_SIGNATURE_PAGE);
        debug!(address = %address, limit, before = ?before, "Fetching signatures");

        let mut options = serde_json::json!({ "limit": limit, "commitment": "confirmed" });
        if let Some(before) = before {
            options["before"] = Value::String(before.to_string());
        }

        let result = self
            .call(
                "getSignaturesForAddress",
                serde_json::json!([address.as_str(), options]),
            )
            .await?;

        let entries = result
            .as_array()
            .ok_or_else(|| DataSourceError::ParseError("Expected array result".to_string()))?;

        let mut signatures = Vec::with_capacity(entries.len());
        for entry in entries {
            match parse_signature_info(entry) {
                Ok(info) => signatures.push(info),
                Err(e) => warn!("Failed to parse signature entry: {}", e),
            }
        }

        Ok(signatures)
    }

    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionRecord>, DataSourceError> {
        debug!(signature = %signature, "Fetching transaction");

        let result = self
            .call(
                "getTransaction",
                serde_json::json!([
                    signature.as_str(),
                    {
                        "encoding": "jsonParsed",
                        "commitment": "confirmed",
                        "maxSupportedTransactionVersion": 0
                    }
                ]),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        parse_transaction(signature, &result).map(Some)
    }

    async fn fetch_balance(&self, address: &Address) -> Result<Lamports, DataSourceError> {
        debug!(address = %address, "Fetching balance");

        let result = self
            .call(
                "getBalance",
                serde_json::json!([address.as_str(), { "commitment": "confirmed" }]),
            )
            .await?;

        result
            .get("value")
            .and_then(|v| v.as_u64())
            .map(Lamports::new)
            .ok_or_else(|| DataSourceError::ParseError("Missing balance value".to_string()))
    }

    async fn fetch_token_balance(
        &self,
        owner: &Address,
        mint: &Address,
    ) -> Result<Decimal, DataSourceError> {
        debug!(owner = %owner, mint = %mint, "Fetching token balance");

        let result = self
            .call(
                "getTokenAccountsByOwner",
                serde_json::json!([
                    owner.as_str(),
                    { "mint": mint.as_str() },
                    { "encoding": "jsonParsed", "commitment": "confirmed" }
                ]),
            )
            .await?;

        parse_token_accounts_total(&result)
    }
}

fn unwrap_rpc_result(body: Value) -> Result<Value, DataSourceError> {
    if let Some(error) = body.get("error") {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(DataSourceError::RpcError { code, message });
    }

    body.get("result")
        .cloned()
        .ok_or_else(|| DataSourceError::ParseError("Missing result field".to_string()))
}

fn parse_signature_info(entry: &Value) -> Result<SignatureInfo, DataSourceError> {
    let signature = entry
        .get("signature")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError("Missing signature field".to_string()))?;
    let slot = entry.get("slot").and_then(|v| v.as_u64()).unwrap_or(0);
    let block_time = entry
        .get("blockTime")
        .and_then(|v| v.as_i64())
        .map(UnixTime::new);
    let err = entry
        .get("err")
        .filter(|e| !e.is_null())
        .map(|e| e.to_string());

    Ok(SignatureInfo {
        signature: Signature::new(signature.to_string()),
        slot,
        block_time,
        err,
    })
}

fn parse_transaction(
    signature: &Signature,
    tx_json: &Value,
) -> Result<TransactionRecord, DataSourceError> {
    let message = tx_json
        .get("transaction")
        .and_then(|t| t.get("message"))
        .ok_or_else(|| DataSourceError::ParseError("Missing transaction message".to_string()))?;

    let instructions: Vec<Instruction> = message
        .get("instructions")
        .and_then(|v| v.as_array())
        .map(|ixs| ixs.iter().map(parse_instruction).collect())
        .unwrap_or_default();

    let meta = tx_json.get("meta").filter(|m| !m.is_null());

    let inner_instructions: Vec<Vec<Instruction>> = meta
        .and_then(|m| m.get("innerInstructions"))
        .and_then(|v| v.as_array())
        .map(|groups| {
            groups
                .iter()
                .map(|group| {
                    group
                        .get("instructions")
                        .and_then(|v| v.as_array())
                        .map(|ixs| ixs.iter().map(parse_instruction).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();

    let balances = meta.map(|m| BalanceMeta {
        account_keys: parse_account_keys(message),
        pre_balances: parse_u64_array(m.get("preBalances")),
        post_balances: parse_u64_array(m.get("postBalances")),
    });

    Ok(TransactionRecord {
        signature: signature.clone(),
        block_time: tx_json
            .get("blockTime")
            .and_then(|v| v.as_i64())
            .map(UnixTime::new),
        instructions,
        inner_instructions,
        balances,
        failed: meta.and_then(|m| m.get("err")).is_some_and(|e| !e.is_null()),
    })
}

/// Decode one `jsonParsed` instruction. Only fully-shaped system transfers
/// become `Instruction::Transfer`.
fn parse_instruction(ix: &Value) -> Instruction {
    let program = ix.get("program").and_then(|v| v.as_str());

    if program == Some("system") {
        let parsed = ix.get("parsed");
        let is_transfer = parsed
            .and_then(|p| p.get("type"))
            .and_then(|t| t.as_str())
            == Some("transfer");
        if is_transfer {
            if let Some(transfer) = parsed.and_then(|p| p.get("info")).and_then(parse_transfer_info)
            {
                return Instruction::Transfer(transfer);
            }
        }
    }

    Instruction::Other {
        program: program
            .or_else(|| ix.get("programId").and_then(|v| v.as_str()))
            .map(|s| s.to_string()),
    }
}

fn parse_transfer_info(info: &Value) -> Option<ParsedTransfer> {
    let source = info.get("source")?.as_str()?;
    let destination = info.get("destination")?.as_str()?;
    let lamports = info.get("lamports")?.as_u64()?;

    Some(ParsedTransfer {
        source: Address::new(source.to_string()),
        destination: Address::new(destination.to_string()),
        lamports: Lamports::new(lamports),
    })
}

/// Account keys come either as plain strings or as `{pubkey, ...}` objects.
fn parse_account_keys(message: &Value) -> Vec<Address> {
    message
        .get("accountKeys")
        .and_then(|v| v.as_array())
        .map(|keys| {
            keys.iter()
                .filter_map(|k| k.as_str().or_else(|| k.get("pubkey").and_then(|p| p.as_str())))
                .map(|s| Address::new(s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_u64_array(value: Option<&Value>) -> Vec<u64> {
    value
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(|x| x.as_u64().unwrap_or(0)).collect())
        .unwrap_or_default()
}

fn parse_token_accounts_total(result: &Value) -> Result<Decimal, DataSourceError> {
    let accounts = result
        .get("value")
        .and_then(|v| v.as_array())
        .ok_or_else(|| DataSourceError::ParseError("Expected token account array".to_string()))?;

    let mut total = Decimal::zero();
    for account in accounts {
        let token_amount = account
            .get("account")
            .and_then(|a| a.get("data"))
            .and_then(|d| d.get("parsed"))
            .and_then(|p| p.get("info"))
            .and_then(|i| i.get("tokenAmount"));

        let Some(ui_amount) = token_amount
            .and_then(|t| t.get("uiAmountString"))
            .and_then(|s| s.as_str())
        else {
            warn!("Token account without uiAmountString, skipping");
            continue;
        };

        match Decimal::from_str_canonical(ui_amount) {
            Ok(amount) => total = total + amount,
            Err(e) => warn!("Invalid token amount {}: {}", ui_amount, e),
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer_ix(source: &str, destination: &str, lamports: u64) -> Value {
        serde_json::json!({
            "program": "system",
            "programId": "11111111111111111111111111111111",
            "parsed": {
                "type": "transfer",
                "info": { "source": source, "destination": destination, "lamports": lamports }
            }
        })
    }

    #[test]
    fn test_parse_system_transfer() {
        let ix = parse_instruction(&transfer_ix("A", "B", 5));
        assert_eq!(ix, Instruction::transfer("A", "B", 5));
    }

    #[test]
    fn test_parse_transfer_without_lamports_is_other() {
        let ix = parse_instruction(&serde_json::json!({
            "program": "system",
            "parsed": { "type": "transfer", "info": { "source": "A", "destination": "B" } }
        }));
        assert_eq!(ix, Instruction::other("system"));
    }

    #[test]
    fn test_parse_spl_transfer_is_other() {
        let ix = parse_instruction(&serde_json::json!({
            "program": "spl-token",
            "parsed": {
                "type": "transfer",
                "info": { "source": "A", "destination": "B", "amount": "5" }
            }
        }));
        assert_eq!(ix, Instruction::other("spl-token"));
    }

    #[test]
    fn test_parse_undecoded_instruction_keeps_program_id() {
        let ix = parse_instruction(&serde_json::json!({
            "programId": "Vote111111111111111111111111111111111111111",
            "accounts": [],
            "data": "3Bxs4h24hBtQy9rw"
        }));
        assert_eq!(ix, Instruction::other("Vote111111111111111111111111111111111111111"));
    }

    #[test]
    fn test_parse_transaction_with_inner_instructions_and_meta() {
        let sig = Signature::new("5sig".to_string());
        let tx_json = serde_json::json!({
            "blockTime": 1_700_000_000,
            "slot": 10,
            "meta": {
                "err": null,
                "preBalances": [100, 0],
                "postBalances": [40, 55],
                "innerInstructions": [
                    { "index": 0, "instructions": [transfer_ix("A", "B", 7)] }
                ]
            },
            "transaction": {
                "message": {
                    "accountKeys": [
                        { "pubkey": "A", "signer": true, "writable": true },
                        { "pubkey": "B", "signer": false, "writable": true }
                    ],
                    "instructions": [transfer_ix("A", "B", 55)]
                }
            }
        });

        let record = parse_transaction(&sig, &tx_json).unwrap();
        assert_eq!(record.block_time, Some(UnixTime::new(1_700_000_000)));
        assert_eq!(record.instructions.len(), 1);
        assert_eq!(record.inner_instructions, vec![vec![Instruction::transfer("A", "B", 7)]]);
        let meta = record.balances.unwrap();
        assert_eq!(meta.delta_for(&Address::new("B".to_string())), Some(55));
        assert_eq!(meta.delta_for(&Address::new("A".to_string())), Some(-60));
        assert!(!record.failed);
    }

    #[test]
    fn test_parse_transaction_with_meta_err_is_failed() {
        let sig = Signature::new("5fail".to_string());
        let tx_json = serde_json::json!({
            "meta": {
                "err": { "InstructionError": [0, { "Custom": 1 }] },
                "preBalances": [1_000_000_000u64],
                "postBalances": [999_995_000u64]
            },
            "transaction": {
                "message": {
                    "accountKeys": ["A"],
                    "instructions": [transfer_ix("A", "B", 55)]
                }
            }
        });

        let record = parse_transaction(&sig, &tx_json).unwrap();
        assert!(record.failed);
        let meta = record.balances.unwrap();
        assert_eq!(meta.delta_for(&Address::new("A".to_string())), Some(-5_000));
    }

    #[test]
    fn test_parse_transaction_without_message_fails() {
        let sig = Signature::new("x".to_string());
        assert!(parse_transaction(&sig, &serde_json::json!({ "meta": null })).is_err());
    }

    #[test]
    fn test_parse_signature_info() {
        let info = parse_signature_info(&serde_json::json!({
            "signature": "abc",
            "slot": 42,
            "err": null,
            "memo": null,
            "blockTime": 1000,
            "confirmationStatus": "finalized"
        }))
        .unwrap();
        assert_eq!(info.signature.as_str(), "abc");
        assert_eq!(info.slot, 42);
        assert_eq!(info.block_time, Some(UnixTime::new(1000)));
        assert_eq!(info.err, None);
    }

    #[test]
    fn test_unwrap_rpc_error() {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "Invalid param" }
        });
        match unwrap_rpc_result(body) {
            Err(DataSourceError::RpcError { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid param");
            }
            other => panic!("Expected RpcError, got {:?}", other),
        }
    }

    #[test]
    fn test_unwrap_null_result() {
        let body = serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": null });
        assert!(unwrap_rpc_result(body).unwrap().is_null());
    }

    #[test]
    fn test_token_accounts_summed() {
        let result = serde_json::json!({
            "context": { "slot": 1 },
            "value": [
                { "account": { "data": { "parsed": { "info": { "tokenAmount": {
                    "amount": "1500000", "decimals": 6, "uiAmount": 1.5, "uiAmountString": "1.5"
                } } } } } },
                { "account": { "data": { "parsed": { "info": { "tokenAmount": {
                    "amount": "2500000", "decimals": 6, "uiAmount": 2.5, "uiAmountString": "2.5"
                } } } } } }
            ]
        });
        let total = parse_token_accounts_total(&result).unwrap();
        assert_eq!(total, Decimal::from(4u64));
    }

    #[test]
    fn test_no_token_accounts_is_zero() {
        let result = serde_json::json!({ "context": { "slot": 1 }, "value": [] });
        assert_eq!(parse_token_accounts_total(&result).unwrap(), Decimal::zero());
    }
}
