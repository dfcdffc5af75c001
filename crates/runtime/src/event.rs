//! Events emitted by the orchestrator for front-ends to observe.
//!
//! Consumers subscribe to [`DappEvent`] to react to state changes without
//! blocking the worker loop. Events carry the post-change state, so a
//! subscriber never needs an extra snapshot round-trip to render.

use serde::{Deserialize, Serialize};

use chain_core::Balance;

use crate::network::NetworkState;
use crate::reader::ReadResult;
use crate::session::Session;
use crate::submitter::Transaction;

/// Events emitted by the orchestrator worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DappEvent {
    /// Session status, address, or chain id changed.
    SessionChanged(Session),
    /// Network correctness was re-derived after a session change.
    NetworkChanged(NetworkState),
    /// A counter read was dispatched.
    ReadStarted,
    /// A counter read resolved (success or failure).
    ReadUpdated(ReadResult),
    /// The live transaction advanced a phase.
    TxPhaseChanged(Transaction),
    /// The account balance was refreshed.
    BalanceUpdated(Balance),
    /// A requested chain switch failed in the wallet.
    SwitchFailed(String),
}
