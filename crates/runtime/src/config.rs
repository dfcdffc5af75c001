//! Orchestrator configuration structures and loaders.

use std::env;

use chain_core::{Address, ChainId, ContractConfig};

/// Counter contract deployed on Sepolia.
const DEFAULT_CONTRACT: &str = "0x2f513113753558b7505De6157255dc4Ad3f0b17D";

/// Configuration required to start an orchestrator.
///
/// Fixed at startup; the design targets exactly one contract on one required
/// chain at a time.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Chain the contract lives on; reads and writes are gated on it.
    pub required_chain: ChainId,
    pub contract: ContractConfig,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let required_chain = ChainId::SEPOLIA;
        Self {
            required_chain,
            contract: ContractConfig {
                address: DEFAULT_CONTRACT
                    .parse()
                    .expect("default contract address is valid"),
                chain_id: required_chain,
            },
            command_buffer_size: 32,
            event_buffer_size: 100,
        }
    }
}

impl OrchestratorConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DAPP_CHAIN_ID` - Required chain id (default: 11155111, Sepolia)
    /// - `DAPP_CONTRACT_ADDRESS` - Counter contract address
    /// - `DAPP_COMMAND_BUFFER` - Command queue size (default: 32)
    /// - `DAPP_EVENT_BUFFER` - Event channel capacity (default: 100)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(chain_id) = read_env::<u64>("DAPP_CHAIN_ID") {
            config.required_chain = ChainId(chain_id);
            config.contract.chain_id = ChainId(chain_id);
        }

        if let Some(address) = read_env::<Address>("DAPP_CONTRACT_ADDRESS") {
            config.contract.address = address;
        }

        if let Some(capacity) = read_env::<usize>("DAPP_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }

        if let Some(capacity) = read_env::<usize>("DAPP_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
