//! Wallet session state.
//!
//! [`Session`] is owned by the orchestrator worker and mutated only in
//! response to wallet-provider outcomes and events. Everything else sees it
//! through read-only snapshots.

use serde::{Deserialize, Serialize};

use chain_core::{Address, ChainId, WalletAccount};

/// Connection lifecycle of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No wallet connected. Initial state.
    Disconnected,
    /// A connect request is pending wallet approval.
    Connecting,
    /// Wallet connected; address and chain id are populated.
    Connected,
    /// The last connect attempt failed; the error is recorded.
    Error,
}

/// Current wallet connection, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub status: SessionStatus,
    /// Present only while connected.
    pub address: Option<Address>,
    /// Present only while connected; updated in place on chain changes.
    pub chain_id: Option<ChainId>,
    /// Message of the last failed connect attempt.
    pub error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Disconnected,
            address: None,
            chain_id: None,
            error: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }

    /// A connect request was dispatched to the wallet.
    pub(crate) fn begin_connect(&mut self) {
        self.status = SessionStatus::Connecting;
        self.error = None;
    }

    /// The wallet approved the connection.
    pub(crate) fn complete_connect(&mut self, account: WalletAccount) {
        self.status = SessionStatus::Connected;
        self.address = Some(account.address);
        self.chain_id = Some(account.chain_id);
        self.error = None;
    }

    /// The wallet rejected the connection or errored. Address and chain id
    /// stay unset.
    pub(crate) fn fail_connect(&mut self, message: String) {
        self.status = SessionStatus::Error;
        self.address = None;
        self.chain_id = None;
        self.error = Some(message);
    }

    /// The wallet reported a chain change. Status and address are untouched.
    pub(crate) fn apply_chain_change(&mut self, chain_id: ChainId) {
        self.chain_id = Some(chain_id);
    }

    /// Unconditional reset to `Disconnected`. Idempotent.
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
