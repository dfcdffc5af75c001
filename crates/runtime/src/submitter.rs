//! Transaction lifecycle state.
//!
//! Each accepted submit creates a fresh [`Transaction`]. The phase only
//! advances; `Confirmed` and `Failed` are terminal for the instance, and a
//! later submit replaces it with a brand-new one.

use serde::{Deserialize, Serialize};

use chain_core::TxHash;

/// Lifecycle phase of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPhase {
    /// Waiting for the user to sign in the wallet.
    AwaitingSignature,
    /// Signed and accepted by the RPC; waiting for a receipt.
    Submitted,
    /// Receipt landed with success status. Terminal.
    Confirmed,
    /// Rejected before a hash existed, reverted on-chain, or the receipt
    /// watch errored. Terminal.
    Failed,
}

/// One state-mutating call tracked from signature request to receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Present once the RPC accepted the transaction. Immutable after.
    pub hash: Option<TxHash>,
    pub phase: TxPhase,
    /// Failure message for the `Failed` phase.
    pub error: Option<String>,
}

impl Transaction {
    pub(crate) fn new() -> Self {
        Self {
            hash: None,
            phase: TxPhase::AwaitingSignature,
            error: None,
        }
    }

    /// True while the transaction blocks further submissions.
    pub fn is_live(&self) -> bool {
        matches!(self.phase, TxPhase::AwaitingSignature | TxPhase::Submitted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, TxPhase::Confirmed | TxPhase::Failed)
    }

    /// Records the hash and advances to `Submitted`. No-op unless the
    /// transaction is awaiting signature; the hash is set at most once.
    pub(crate) fn mark_submitted(&mut self, hash: TxHash) {
        if self.phase == TxPhase::AwaitingSignature {
            self.hash = Some(hash);
            self.phase = TxPhase::Submitted;
        }
    }

    pub(crate) fn mark_confirmed(&mut self) {
        if !self.is_terminal() {
            self.phase = TxPhase::Confirmed;
        }
    }

    pub(crate) fn mark_failed(&mut self, message: String) {
        if !self.is_terminal() {
            self.phase = TxPhase::Failed;
            self.error = Some(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> TxHash {
        TxHash([byte; 32])
    }

    #[test]
    fn phases_advance_forward() {
        let mut tx = Transaction::new();
        assert_eq!(tx.phase, TxPhase::AwaitingSignature);
        assert!(tx.is_live());

        tx.mark_submitted(hash(1));
        assert_eq!(tx.phase, TxPhase::Submitted);
        assert_eq!(tx.hash, Some(hash(1)));
        assert!(tx.is_live());

        tx.mark_confirmed();
        assert_eq!(tx.phase, TxPhase::Confirmed);
        assert!(tx.is_terminal());
    }

    #[test]
    fn hash_is_immutable_once_set() {
        let mut tx = Transaction::new();
        tx.mark_submitted(hash(1));
        tx.mark_submitted(hash(2));
        assert_eq!(tx.hash, Some(hash(1)));
    }

    #[test]
    fn terminal_phases_are_final() {
        let mut tx = Transaction::new();
        tx.mark_failed("user rejected the signature request".into());
        assert_eq!(tx.phase, TxPhase::Failed);

        tx.mark_submitted(hash(1));
        tx.mark_confirmed();
        assert_eq!(tx.phase, TxPhase::Failed);
        assert_eq!(tx.hash, None);

        let mut tx = Transaction::new();
        tx.mark_submitted(hash(1));
        tx.mark_confirmed();
        tx.mark_failed("late watch error".into());
        assert_eq!(tx.phase, TxPhase::Confirmed);
        assert_eq!(tx.error, None);
    }

    #[test]
    fn failure_before_hash_has_no_hash() {
        let mut tx = Transaction::new();
        tx.mark_failed("transaction rejected by RPC: underpriced".into());
        assert_eq!(tx.hash, None);
        assert!(tx.is_terminal());
        assert!(!tx.is_live());
    }
}
