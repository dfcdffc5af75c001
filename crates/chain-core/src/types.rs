//! Common types for wallet and contract interactions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// EVM account or contract address (20 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| ParseError::InvalidHex)?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ParseError::InvalidLength { expected: 20 })?;
        Ok(Self(bytes))
    }
}

/// Transaction hash (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| ParseError::InvalidHex)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ParseError::InvalidLength { expected: 32 })?;
        Ok(Self(bytes))
    }
}

/// Errors from parsing hex-encoded identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid hex string")]
    InvalidHex,

    #[error("invalid length, expected {expected} bytes")]
    InvalidLength { expected: usize },
}

/// EIP-155 chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const ETHEREUM: ChainId = ChainId(1);
    pub const SEPOLIA: ChainId = ChainId(11_155_111);
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account snapshot returned by a successful wallet connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: Address,
    pub chain_id: ChainId,
}

/// Events pushed by the wallet provider while a connection is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    /// The active chain changed (user switched networks in the wallet).
    ChainChanged(ChainId),
    /// The wallet terminated the connection on its side.
    Disconnected,
}

/// Outcome reported by a transaction receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Transaction receipt as far as the orchestration layer cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub status: ReceiptStatus,
}

/// Native-token balance of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Raw value in the smallest unit (wei for ETH).
    pub value: u128,
    /// Decimals of the native token (18 for ETH).
    pub decimals: u8,
    /// Ticker symbol, e.g. "ETH".
    pub symbol: String,
}

impl Balance {
    /// Formats the raw value as a decimal string, e.g. `1.5 ETH`.
    pub fn display(&self) -> String {
        format!("{} {}", format_units(self.value, self.decimals), self.symbol)
    }
}

/// Converts a raw integer amount to a decimal string with `decimals`
/// fractional digits, trimming trailing zeros.
pub fn format_units(value: u128, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let digits = value.to_string();
    let decimals = decimals as usize;

    let (whole, frac) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole
    } else {
        format!("{whole}.{frac}")
    }
}

/// Functions exposed by the counter contract.
///
/// The ABI is fixed: two equivalent views and two mutating entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterFunction {
    /// `count() -> uint256` (view)
    Count,
    /// `get() -> uint256` (view, alias of `count`)
    Get,
    /// `inc()` (nonpayable)
    Inc,
    /// `dec()` (nonpayable, reverts when the count is zero)
    Dec,
}

impl CounterFunction {
    /// Solidity-level function name.
    pub fn name(&self) -> &'static str {
        match self {
            CounterFunction::Count => "count",
            CounterFunction::Get => "get",
            CounterFunction::Inc => "inc",
            CounterFunction::Dec => "dec",
        }
    }

    /// Whether calling this function mutates contract state.
    pub fn mutates(&self) -> bool {
        matches!(self, CounterFunction::Inc | CounterFunction::Dec)
    }
}

impl fmt::Display for CounterFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies the one contract this client targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    pub address: Address,
    pub chain_id: ChainId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_roundtrip() {
        let addr: Address = "0x2f513113753558b7505De6157255dc4Ad3f0b17D"
            .parse()
            .unwrap();
        assert_eq!(
            addr.to_string(),
            "0x2f513113753558b7505de6157255dc4ad3f0b17d"
        );
    }

    #[test]
    fn address_rejects_bad_input() {
        assert_eq!("0x1234".parse::<Address>(), Err(ParseError::InvalidLength { expected: 20 }));
        assert_eq!("zz".parse::<Address>(), Err(ParseError::InvalidHex));
    }

    #[test]
    fn tx_hash_roundtrip() {
        let hash: TxHash = format!("0x{}", "ab".repeat(32)).parse().unwrap();
        assert_eq!(hash.to_string(), format!("0x{}", "ab".repeat(32)));
    }

    #[test]
    fn format_units_basic() {
        assert_eq!(format_units(1_500_000_000_000_000_000, 18), "1.5");
        assert_eq!(format_units(1_000_000_000_000_000_000, 18), "1");
        assert_eq!(format_units(1, 18), "0.000000000000000001");
        assert_eq!(format_units(0, 18), "0");
        assert_eq!(format_units(42, 0), "42");
    }

    #[test]
    fn counter_function_names() {
        assert_eq!(CounterFunction::Count.name(), "count");
        assert_eq!(CounterFunction::Get.name(), "get");
        assert!(!CounterFunction::Count.mutates());
        assert!(!CounterFunction::Get.mutates());
        assert!(CounterFunction::Inc.mutates());
        assert!(CounterFunction::Dec.mutates());
    }
}
