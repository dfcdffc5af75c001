//! High-level orchestrator owner.
//!
//! The orchestrator spawns the worker, wires up command/event channels, and
//! exposes a builder-based API for clients to connect providers.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use chain_core::{ContractProvider, WalletProvider};

use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, Result};
use crate::event::DappEvent;
use crate::handle::OrchestratorHandle;
use crate::worker::{Command, OrchestratorWorker};

/// Owns the background worker and hands out cloneable handles.
#[derive(Debug)]
pub struct Orchestrator {
    handle: OrchestratorHandle,
    worker_handle: JoinHandle<()>,
}

impl Orchestrator {
    /// Create a new orchestrator builder.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Get a cloneable handle to this orchestrator.
    pub fn handle(&self) -> OrchestratorHandle {
        self.handle.clone()
    }

    /// Subscribe to orchestrator events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<DappEvent> {
        self.handle.subscribe_events()
    }

    /// Shut down gracefully: drops the command channel and waits for the
    /// worker to drain.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle
            .await
            .map_err(OrchestratorError::WorkerJoin)
    }
}

/// Builder for [`Orchestrator`] with flexible configuration.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    wallet: Option<Arc<dyn WalletProvider>>,
    contract: Option<Arc<dyn ContractProvider>>,
}

impl OrchestratorBuilder {
    fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            wallet: None,
            contract: None,
        }
    }

    /// Override orchestrator configuration.
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the wallet provider (required).
    pub fn wallet(mut self, wallet: impl WalletProvider + 'static) -> Self {
        self.wallet = Some(Arc::new(wallet));
        self
    }

    /// Set the contract provider (required).
    pub fn contract(mut self, contract: impl ContractProvider + 'static) -> Self {
        self.contract = Some(Arc::new(contract));
        self
    }

    /// Build the orchestrator and spawn its worker.
    pub fn build(self) -> Result<Orchestrator> {
        let wallet = self.wallet.ok_or(OrchestratorError::MissingWallet)?;
        let contract = self.contract.ok_or(OrchestratorError::MissingContract)?;

        let (command_tx, command_rx) =
            mpsc::channel::<Command>(self.config.command_buffer_size);
        let (event_tx, _event_rx) =
            broadcast::channel::<DappEvent>(self.config.event_buffer_size);

        let handle = OrchestratorHandle::new(command_tx, event_tx.clone());

        let worker = OrchestratorWorker::new(self.config, wallet, contract, command_rx, event_tx);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Orchestrator {
            handle,
            worker_handle,
        })
    }
}
