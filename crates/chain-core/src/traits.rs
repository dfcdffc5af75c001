//! Wallet and contract abstraction traits.
//!
//! Two narrow seams separate the orchestration layer from the outside world:
//! - [`WalletProvider`]: account access, chain switching, wallet-side events
//! - [`ContractProvider`]: read-only calls, transaction submission, receipts

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::types::{
    Address, Balance, ChainId, ContractConfig, CounterFunction, TxHash, TxReceipt, WalletAccount,
    WalletEvent,
};

// ============================================================================
// Error Types
// ============================================================================

/// Wallet-side errors (connection, signing, chain switching).
#[derive(Debug, Clone, thiserror::Error)]
pub enum WalletError {
    #[error("user rejected the request")]
    Rejected,

    #[error("no wallet provider available")]
    Unavailable,

    #[error("chain {0} is not known to the wallet")]
    UnknownChain(ChainId),

    #[error("wallet provider error: {0}")]
    Provider(String),
}

/// Read-only contract call errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CallError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("call reverted: {0}")]
    Reverted(String),

    #[error("RPC request timed out")]
    Timeout,
}

/// Errors raised before a transaction hash exists.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    #[error("user rejected the signature request")]
    Rejected,

    #[error("transaction rejected by RPC: {0}")]
    Rpc(String),
}

/// Errors raised while waiting for a receipt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReceiptError {
    #[error("RPC error while watching receipt: {0}")]
    Rpc(String),

    #[error("receipt watch timed out for {0}")]
    Timeout(TxHash),
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Browser-wallet abstraction.
///
/// Implementations bridge to an injected provider (MetaMask and friends).
/// The orchestration layer never touches key material; it only sees the
/// account snapshot and wallet-side events.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request a connection; resolves once the user approves or rejects.
    async fn connect(&self) -> Result<WalletAccount, WalletError>;

    /// Drop the connection on the wallet side. Infallible by contract.
    async fn disconnect(&self);

    /// Ask the wallet to switch the active chain.
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), WalletError>;

    /// Subscribe to asynchronous wallet events (chain changes, disconnects).
    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Contract binding over a chain RPC endpoint.
///
/// Scoped to the single configured counter contract; the function argument
/// selects which ABI entry to hit.
#[async_trait]
pub trait ContractProvider: Send + Sync {
    /// Execute a read-only call, returning the decoded counter value.
    async fn call(
        &self,
        contract: &ContractConfig,
        function: CounterFunction,
    ) -> Result<u128, CallError>;

    /// Sign and submit a state-mutating call, returning the transaction hash.
    async fn send_transaction(
        &self,
        contract: &ContractConfig,
        function: CounterFunction,
    ) -> Result<TxHash, SubmitError>;

    /// Wait until the transaction is mined and return its receipt.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ReceiptError>;

    /// Fetch the native-token balance of an account.
    async fn get_balance(&self, address: Address) -> Result<Balance, CallError>;
}
