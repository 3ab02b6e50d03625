//! Domain types for wallet activity scanning.
//!
//! This module provides:
//! - Integer lamports and a lossless Decimal for display amounts
//! - Domain primitives: Address, Signature, UnixTime
//! - Fetched transaction records and the transfer events derived from them

pub mod amount;
pub mod primitives;
pub mod transaction;
pub mod transfer;

pub use amount::{Decimal, Lamports, LAMPORTS_PER_SOL, SOL_DECIMALS};
pub use primitives::{Address, AddressParseError, Signature, UnixTime};
pub use transaction::{BalanceMeta, Instruction, ParsedTransfer, TransactionRecord};
pub use transfer::{Direction, TransferEvent};
