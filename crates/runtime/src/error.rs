//! Unified error types surfaced by the orchestrator API.
//!
//! Component failures (wallet, RPC) are captured at the boundary and carried
//! here so callers can bubble them up with consistent context instead of
//! crashing.

use thiserror::Error;
use tokio::sync::oneshot;

use chain_core::{CallError, ChainId, CounterFunction, ReceiptError, SubmitError, WalletError};

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    // --- boundary failures -----------------------------------------------
    #[error("wallet connection failed")]
    Connection(#[source] WalletError),

    #[error("wrong network: connected to {actual:?}, required {required}")]
    NetworkMismatch {
        required: ChainId,
        actual: Option<ChainId>,
    },

    #[error("counter read failed")]
    Read(#[source] CallError),

    #[error("transaction submission failed")]
    Submission(#[source] SubmitError),

    #[error("transaction confirmation failed")]
    Confirmation(#[source] ReceiptError),

    // --- eligibility signals ---------------------------------------------
    #[error("no wallet connected")]
    NotConnected,

    #[error("a connection attempt is already in progress")]
    AlreadyConnecting,

    #[error("wallet already connected")]
    AlreadyConnected,

    #[error("a transaction is already awaiting signature or submitted")]
    TransactionInFlight,

    #[error("dec would revert: counter is zero")]
    WouldRevert,

    #[error("{0} is a read-only function")]
    NotMutating(CounterFunction),

    #[error("operation superseded by disconnect")]
    Superseded,

    // --- plumbing ---------------------------------------------------------
    #[error("orchestrator command channel closed")]
    CommandChannelClosed,

    #[error("orchestrator reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("orchestrator worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("orchestrator requires a wallet provider before building")]
    MissingWallet,

    #[error("orchestrator requires a contract provider before building")]
    MissingContract,
}
