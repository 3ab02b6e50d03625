//! Fetched transaction records, reduced to what the ledger logic reads.

use crate::domain::{Address, Lamports, Signature, UnixTime};
use serde::{Deserialize, Serialize};

/// A decoded native (system program) transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransfer {
    pub source: Address,
    pub destination: Address,
    pub lamports: Lamports,
}

/// One instruction of a transaction.
///
/// Only instructions the node decoded as a system transfer carry a shape the
/// scanner reads. Everything else is kept as `Other` and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Instruction {
    Transfer(ParsedTransfer),
    Other {
        #[serde(skip_serializing_if = "Option::is_none")]
        program: Option<String>,
    },
}

impl Instruction {
    pub fn transfer(source: &str, destination: &str, lamports: u64) -> Self {
        Instruction::Transfer(ParsedTransfer {
            source: Address::new(source.to_string()),
            destination: Address::new(destination.to_string()),
            lamports: Lamports::new(lamports),
        })
    }

    pub fn other(program: &str) -> Self {
        Instruction::Other {
            program: Some(program.to_string()),
        }
    }

    pub fn as_transfer(&self) -> Option<&ParsedTransfer> {
        match self {
            Instruction::Transfer(t) => Some(t),
            Instruction::Other { .. } => None,
        }
    }
}

/// Account balances before and after execution, indexed like `account_keys`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceMeta {
    pub account_keys: Vec<Address>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
}

impl BalanceMeta {
    /// Signed lamport change for `address`, or None if it is not an account
    /// of the transaction.
    pub fn delta_for(&self, address: &Address) -> Option<i128> {
        let idx = self.account_keys.iter().position(|k| k == address)?;
        let pre = self.pre_balances.get(idx).copied().unwrap_or(0);
        let post = self.post_balances.get(idx).copied().unwrap_or(0);
        Some(post as i128 - pre as i128)
    }
}

/// A transaction as fetched from the chain node. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: Signature,
    pub block_time: Option<UnixTime>,
    /// Top-level instructions, in message order.
    pub instructions: Vec<Instruction>,
    /// Inner-instruction lists, in the order the node reported them.
    pub inner_instructions: Vec<Vec<Instruction>>,
    #[serde(default)]
    pub balances: Option<BalanceMeta>,
    /// Executed but failed on-chain. Its transfers did not happen; its fee
    /// was still charged.
    #[serde(default)]
    pub failed: bool,
}

impl TransactionRecord {
    pub fn new(signature: &str, block_time: Option<i64>) -> Self {
        Self {
            signature: Signature::new(signature.to_string()),
            block_time: block_time.map(UnixTime::new),
            instructions: Vec::new(),
            inner_instructions: Vec::new(),
            balances: None,
            failed: false,
        }
    }

    pub fn with_instruction(mut self, ix: Instruction) -> Self {
        self.instructions.push(ix);
        self
    }

    pub fn with_inner_instructions(mut self, ixs: Vec<Instruction>) -> Self {
        self.inner_instructions.push(ixs);
        self
    }

    pub fn with_balances(mut self, balances: BalanceMeta) -> Self {
        self.balances = Some(balances);
        self
    }

    pub fn mark_failed(mut self) -> Self {
        self.failed = true;
        self
    }

    /// Top-level instructions followed by every inner list, in given order.
    pub fn all_instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions
            .iter()
            .chain(self.inner_instructions.iter().flatten())
    }
}
