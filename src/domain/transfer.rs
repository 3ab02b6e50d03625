//! Transfer events derived from transaction records.

use crate::domain::{Address, Lamports, Signature, UnixTime};
use serde::{Deserialize, Serialize};

/// Direction of a transfer relative to the watched address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::In => write!(f, "IN"),
            Direction::Out => write!(f, "OUT"),
        }
    }
}

/// A native transfer touching the watched address. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub source: Address,
    pub destination: Address,
    pub amount: Lamports,
    pub signature: Signature,
    pub time: Option<UnixTime>,
    /// Direction relative to the watched address. A self-transfer yields one
    /// event per direction.
    pub direction: Direction,
}

impl TransferEvent {
    /// The address on the non-watched side of the transfer.
    pub fn counterparty(&self) -> &Address {
        match self.direction {
            Direction::In => &self.source,
            Direction::Out => &self.destination,
        }
    }
}
