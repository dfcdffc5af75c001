//! Cloneable façade for issuing commands to the orchestrator.
//!
//! [`OrchestratorHandle`] hides channel plumbing and offers async helpers
//! for driving the wallet session and streaming [`DappEvent`]s.

use tokio::sync::{broadcast, mpsc, oneshot};

use chain_core::{ChainId, CounterFunction};

use crate::error::{OrchestratorError, Result};
use crate::event::DappEvent;
use crate::state::AppSnapshot;
use crate::worker::Command;

/// Client-facing handle to interact with the orchestrator.
#[derive(Clone, Debug)]
pub struct OrchestratorHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<DappEvent>,
}

impl OrchestratorHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<DappEvent>,
    ) -> Self {
        Self {
            command_tx,
            event_tx,
        }
    }

    /// Request a wallet connection; resolves once the wallet approves or
    /// rejects.
    pub async fn connect(&self) -> Result<()> {
        self.request(|reply| Command::Connect { reply }).await?
    }

    /// Reset the session. Idempotent; stale read/transaction data is kept
    /// as history.
    pub async fn disconnect(&self) -> Result<()> {
        self.request(|reply| Command::Disconnect { reply }).await
    }

    /// Ask the wallet to switch to `chain_id`. Resolves on acceptance;
    /// completion shows up as a [`DappEvent::NetworkChanged`].
    pub async fn switch_chain(&self, chain_id: ChainId) -> Result<()> {
        self.request(|reply| Command::SwitchChain { chain_id, reply })
            .await?
    }

    /// Trigger a counter read. Errs with the ineligibility reason if reads
    /// are not allowed in the current state.
    pub async fn read(&self) -> Result<()> {
        self.request(|reply| Command::Read { reply }).await?
    }

    /// Submit `inc` or `dec`. Errs with the rejection reason if writes are
    /// not allowed; on acceptance the transaction lifecycle is observable
    /// via [`DappEvent::TxPhaseChanged`].
    pub async fn submit(&self, function: CounterFunction) -> Result<()> {
        self.request(|reply| Command::Submit { function, reply })
            .await?
    }

    /// Read-only snapshot of the current application state.
    pub async fn snapshot(&self) -> Result<AppSnapshot> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Subscribe to orchestrator events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<DappEvent> {
        self.event_tx.subscribe()
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| OrchestratorError::CommandChannelClosed)?;

        reply_rx.await.map_err(OrchestratorError::ReplyChannelClosed)
    }
}
