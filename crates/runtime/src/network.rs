//! Network correctness derivation.
//!
//! [`evaluate`] is a pure function of the latest [`Session`]: no hysteresis,
//! no I/O, never independently mutated. The worker recomputes it on every
//! session change.

use serde::{Deserialize, Serialize};

use chain_core::ChainId;

use crate::session::Session;

/// Derived view of the session's chain versus the required chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkState {
    /// True only while connected to the required chain.
    pub is_correct_chain: bool,
    /// Human label for the session's chain, `-` when unknown.
    pub display_name: String,
}

/// Derives [`NetworkState`] from the current session.
///
/// `is_correct_chain` is false whenever the session is not connected,
/// regardless of the last seen chain id.
pub fn evaluate(session: &Session, required_chain: ChainId) -> NetworkState {
    NetworkState {
        is_correct_chain: session.is_connected() && session.chain_id == Some(required_chain),
        display_name: display_name(session.chain_id),
    }
}

fn display_name(chain_id: Option<ChainId>) -> String {
    match chain_id {
        Some(ChainId::ETHEREUM) => "Ethereum".to_string(),
        Some(ChainId::SEPOLIA) => "Sepolia".to_string(),
        Some(id) => format!("Chain {id}"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chain_core::{Address, WalletAccount};

    fn connected(chain_id: ChainId) -> Session {
        let mut session = Session::new();
        session.begin_connect();
        session.complete_connect(WalletAccount {
            address: Address([1; 20]),
            chain_id,
        });
        session
    }

    #[test]
    fn correct_only_when_connected_to_required_chain() {
        let state = evaluate(&connected(ChainId::SEPOLIA), ChainId::SEPOLIA);
        assert!(state.is_correct_chain);

        let state = evaluate(&connected(ChainId::ETHEREUM), ChainId::SEPOLIA);
        assert!(!state.is_correct_chain);
    }

    #[test]
    fn never_correct_while_disconnected() {
        let state = evaluate(&Session::new(), ChainId::SEPOLIA);
        assert!(!state.is_correct_chain);
        assert_eq!(state.display_name, "-");
    }

    #[test]
    fn pure_function_of_latest_session() {
        // Flip the chain back and forth; only the final session matters.
        let mut session = connected(ChainId::SEPOLIA);
        session.apply_chain_change(ChainId::ETHEREUM);
        session.apply_chain_change(ChainId(42));
        session.apply_chain_change(ChainId::SEPOLIA);

        let state = evaluate(&session, ChainId::SEPOLIA);
        assert!(state.is_correct_chain);
        assert_eq!(state.display_name, "Sepolia");
    }

    #[test]
    fn display_names() {
        assert_eq!(
            evaluate(&connected(ChainId::ETHEREUM), ChainId::SEPOLIA).display_name,
            "Ethereum"
        );
        assert_eq!(
            evaluate(&connected(ChainId(42)), ChainId::SEPOLIA).display_name,
            "Chain 42"
        );
    }
}
