//! Derived orchestrator state and read-only snapshots.
//!
//! Write- and read-eligibility are pure derivations from the current
//! session, network, and transaction state, recomputed on demand instead of
//! cached in flags that could go stale.

use std::fmt;

use serde::{Deserialize, Serialize};

use chain_core::Balance;

use crate::network::NetworkState;
use crate::reader::ReadResult;
use crate::session::Session;
use crate::submitter::Transaction;

/// The four top-level states of the orchestration state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrchestratorState {
    /// No connected session.
    NotConnected,
    /// Connected, but the wallet is on the wrong chain.
    WrongNetwork,
    /// Connected on the required chain, no live transaction.
    Ready,
    /// A write is awaiting signature or submitted.
    Busy,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrchestratorState::NotConnected => "not-connected",
            OrchestratorState::WrongNetwork => "wrong-network",
            OrchestratorState::Ready => "ready",
            OrchestratorState::Busy => "busy",
        };
        f.write_str(label)
    }
}

/// Derives the machine state from current session/network/transaction.
///
/// `live_tx` must be the transaction of the current session generation;
/// transactions stranded by a disconnect do not keep the machine busy.
pub fn derive_state(
    session: &Session,
    network: &NetworkState,
    live_tx: Option<&Transaction>,
) -> OrchestratorState {
    if !session.is_connected() {
        OrchestratorState::NotConnected
    } else if !network.is_correct_chain {
        OrchestratorState::WrongNetwork
    } else if live_tx.is_some_and(Transaction::is_live) {
        OrchestratorState::Busy
    } else {
        OrchestratorState::Ready
    }
}

/// Reads are allowed whenever we are on the right chain, even while a
/// write is in flight.
pub fn can_read(state: OrchestratorState) -> bool {
    matches!(state, OrchestratorState::Ready | OrchestratorState::Busy)
}

/// Writes require the right chain and no live transaction.
pub fn can_write(state: OrchestratorState) -> bool {
    state == OrchestratorState::Ready
}

/// Read-only snapshot of everything the UI observes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSnapshot {
    pub session: Session,
    pub network: NetworkState,
    pub read: ReadResult,
    /// The most recent transaction, including stale history kept across
    /// disconnects.
    pub transaction: Option<Transaction>,
    pub balance: Option<Balance>,
    pub state: OrchestratorState,
}

#[cfg(test)]
mod tests {
    use super::*;

    use chain_core::{Address, ChainId, TxHash, WalletAccount};

    use crate::network::evaluate;

    fn connected(chain_id: ChainId) -> Session {
        let mut session = Session::new();
        session.begin_connect();
        session.complete_connect(WalletAccount {
            address: Address([1; 20]),
            chain_id,
        });
        session
    }

    fn submitted_tx() -> Transaction {
        let mut tx = Transaction::new();
        tx.mark_submitted(TxHash([9; 32]));
        tx
    }

    #[test]
    fn state_matrix() {
        let required = ChainId::SEPOLIA;

        let session = Session::new();
        let network = evaluate(&session, required);
        assert_eq!(
            derive_state(&session, &network, None),
            OrchestratorState::NotConnected
        );

        let session = connected(ChainId::ETHEREUM);
        let network = evaluate(&session, required);
        assert_eq!(
            derive_state(&session, &network, None),
            OrchestratorState::WrongNetwork
        );

        let session = connected(required);
        let network = evaluate(&session, required);
        assert_eq!(
            derive_state(&session, &network, None),
            OrchestratorState::Ready
        );
        assert_eq!(
            derive_state(&session, &network, Some(&submitted_tx())),
            OrchestratorState::Busy
        );
    }

    #[test]
    fn terminal_transaction_does_not_hold_busy() {
        let required = ChainId::SEPOLIA;
        let session = connected(required);
        let network = evaluate(&session, required);

        let mut tx = submitted_tx();
        tx.mark_confirmed();
        assert_eq!(
            derive_state(&session, &network, Some(&tx)),
            OrchestratorState::Ready
        );
    }

    #[test]
    fn eligibility_per_state() {
        assert!(!can_read(OrchestratorState::NotConnected));
        assert!(!can_read(OrchestratorState::WrongNetwork));
        assert!(can_read(OrchestratorState::Ready));
        assert!(can_read(OrchestratorState::Busy));

        assert!(!can_write(OrchestratorState::NotConnected));
        assert!(!can_write(OrchestratorState::WrongNetwork));
        assert!(can_write(OrchestratorState::Ready));
        assert!(!can_write(OrchestratorState::Busy));
    }
}
