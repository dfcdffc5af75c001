//! Orchestrator worker that owns the authoritative application state.
//!
//! Receives commands from [`OrchestratorHandle`], drives the wallet and
//! contract providers, and publishes [`DappEvent`] notifications. All state
//! mutation is funneled through this single task; wallet and RPC operations
//! run in spawned tasks and report back over an internal channel, so the
//! worker never blocks on external systems.
//!
//! Stale completions are fenced two ways:
//! - a `generation` counter, bumped on every disconnect, drops callbacks
//!   from operations started under a previous session;
//! - per-read sequence numbers give overlapping reads last-started-wins
//!   semantics regardless of resolution order.
//!
//! [`OrchestratorHandle`]: crate::handle::OrchestratorHandle

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use chain_core::{
    Balance, CallError, ChainId, ContractProvider, CounterFunction, ReceiptError, ReceiptStatus,
    SubmitError, TxHash, WalletAccount, WalletError, WalletEvent, WalletProvider,
};

use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, Result};
use crate::event::DappEvent;
use crate::network::{self, NetworkState};
use crate::reader::ReadResult;
use crate::session::{Session, SessionStatus};
use crate::state::{self, AppSnapshot, OrchestratorState};
use crate::submitter::Transaction;

/// Commands that can be sent to the orchestrator worker.
pub enum Command {
    /// Request a wallet connection; replies once the wallet resolves.
    Connect { reply: oneshot::Sender<Result<()>> },
    /// Reset the session. Unconditional and idempotent.
    Disconnect { reply: oneshot::Sender<()> },
    /// Ask the wallet to switch chains; replies on acceptance, completion
    /// arrives as a chain-change event.
    SwitchChain {
        chain_id: ChainId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Start a counter read; replies on acceptance or ineligibility.
    Read { reply: oneshot::Sender<Result<()>> },
    /// Submit a state-mutating call; replies on acceptance or rejection.
    Submit {
        function: CounterFunction,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Query a read-only snapshot of the application state.
    QueryState { reply: oneshot::Sender<AppSnapshot> },
}

/// Completion notices sent back by spawned I/O tasks.
enum TaskEvent {
    ConnectFinished {
        generation: u64,
        result: std::result::Result<WalletAccount, WalletError>,
        reply: oneshot::Sender<Result<()>>,
    },
    SwitchFinished {
        seq: u64,
        generation: u64,
        result: std::result::Result<(), WalletError>,
    },
    ReadFinished {
        seq: u64,
        generation: u64,
        result: std::result::Result<u128, CallError>,
    },
    TxUpdate {
        tx_seq: u64,
        generation: u64,
        update: TxUpdate,
    },
    BalanceFetched {
        generation: u64,
        result: std::result::Result<Balance, CallError>,
    },
}

enum TxUpdate {
    Submitted(TxHash),
    Confirmed,
    Reverted,
    SubmitFailed(SubmitError),
    WatchFailed(ReceiptError),
}

/// Background task that serializes all state mutation.
pub struct OrchestratorWorker {
    config: OrchestratorConfig,
    wallet: Arc<dyn WalletProvider>,
    contract: Arc<dyn ContractProvider>,

    session: Session,
    read: ReadResult,
    transaction: Option<Transaction>,
    balance: Option<Balance>,

    /// Bumped on every disconnect; completions from older generations are
    /// ignored instead of being applied to the reset session.
    generation: u64,
    read_seq: u64,
    applied_read_seq: u64,
    switch_seq: u64,
    /// Sequence and target of the in-flight chain switch, if any.
    switch_pending: Option<(u64, ChainId)>,
    tx_seq: u64,
    /// Generation the current transaction was submitted under.
    tx_generation: u64,

    command_rx: mpsc::Receiver<Command>,
    task_tx: mpsc::Sender<TaskEvent>,
    task_rx: mpsc::Receiver<TaskEvent>,
    wallet_events: broadcast::Receiver<WalletEvent>,
    wallet_open: bool,
    event_tx: broadcast::Sender<DappEvent>,
}

impl OrchestratorWorker {
    pub fn new(
        config: OrchestratorConfig,
        wallet: Arc<dyn WalletProvider>,
        contract: Arc<dyn ContractProvider>,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<DappEvent>,
    ) -> Self {
        let (task_tx, task_rx) = mpsc::channel(config.command_buffer_size);
        let wallet_events = wallet.subscribe_events();

        Self {
            config,
            wallet,
            contract,
            session: Session::new(),
            read: ReadResult::new(),
            transaction: None,
            balance: None,
            generation: 0,
            read_seq: 0,
            applied_read_seq: 0,
            switch_seq: 0,
            switch_pending: None,
            tx_seq: 0,
            tx_generation: 0,
            command_rx,
            task_tx,
            task_rx,
            wallet_events,
            wallet_open: true,
            event_tx,
        }
    }

    /// Main worker loop. Exits when the command channel closes.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(task) = self.task_rx.recv() => self.handle_task_event(task),
                event = self.wallet_events.recv(), if self.wallet_open => match event {
                    Ok(event) => self.handle_wallet_event(event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(target: "runtime::worker", missed, "wallet event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        self.wallet_open = false;
                    }
                },
            }
        }
    }

    // ------------------------------------------------------------------
    // Derivations
    // ------------------------------------------------------------------

    fn network(&self) -> NetworkState {
        network::evaluate(&self.session, self.config.required_chain)
    }

    /// The current transaction, unless a disconnect stranded it.
    fn live_tx(&self) -> Option<&Transaction> {
        if self.tx_generation == self.generation {
            self.transaction.as_ref()
        } else {
            None
        }
    }

    fn derived_state(&self) -> OrchestratorState {
        state::derive_state(&self.session, &self.network(), self.live_tx())
    }

    fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            session: self.session.clone(),
            network: self.network(),
            read: self.read.clone(),
            transaction: self.transaction.clone(),
            balance: self.balance.clone(),
            state: self.derived_state(),
        }
    }

    fn publish(&self, event: DappEvent) {
        let _ = self.event_tx.send(event);
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { reply } => self.handle_connect(reply),
            Command::Disconnect { reply } => {
                self.do_disconnect();
                let _ = reply.send(());
            }
            Command::SwitchChain { chain_id, reply } => self.handle_switch(chain_id, reply),
            Command::Read { reply } => {
                let _ = reply.send(self.handle_read());
            }
            Command::Submit { function, reply } => {
                let _ = reply.send(self.handle_submit(function));
            }
            Command::QueryState { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn handle_connect(&mut self, reply: oneshot::Sender<Result<()>>) {
        match self.session.status {
            SessionStatus::Connecting => {
                let _ = reply.send(Err(OrchestratorError::AlreadyConnecting));
                return;
            }
            SessionStatus::Connected => {
                let _ = reply.send(Err(OrchestratorError::AlreadyConnected));
                return;
            }
            SessionStatus::Disconnected | SessionStatus::Error => {}
        }

        self.session.begin_connect();
        self.publish(DappEvent::SessionChanged(self.session.clone()));

        let wallet = Arc::clone(&self.wallet);
        let task_tx = self.task_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = wallet.connect().await;
            let _ = task_tx
                .send(TaskEvent::ConnectFinished {
                    generation,
                    result,
                    reply,
                })
                .await;
        });
    }

    fn handle_switch(&mut self, chain_id: ChainId, reply: oneshot::Sender<Result<()>>) {
        // Repeated requests for a pending target are deduplicated; a new
        // target supersedes the pending switch.
        if let Some((_, target)) = self.switch_pending
            && target == chain_id
        {
            debug!(target: "runtime::worker", %chain_id, "chain switch already pending");
            let _ = reply.send(Ok(()));
            return;
        }

        self.switch_seq += 1;
        self.switch_pending = Some((self.switch_seq, chain_id));

        let wallet = Arc::clone(&self.wallet);
        let task_tx = self.task_tx.clone();
        let seq = self.switch_seq;
        let generation = self.generation;
        tokio::spawn(async move {
            let result = wallet.switch_chain(chain_id).await;
            let _ = task_tx
                .send(TaskEvent::SwitchFinished {
                    seq,
                    generation,
                    result,
                })
                .await;
        });

        let _ = reply.send(Ok(()));
    }

    fn handle_read(&mut self) -> Result<()> {
        match self.derived_state() {
            OrchestratorState::NotConnected => return Err(OrchestratorError::NotConnected),
            OrchestratorState::WrongNetwork => {
                return Err(OrchestratorError::NetworkMismatch {
                    required: self.config.required_chain,
                    actual: self.session.chain_id,
                });
            }
            OrchestratorState::Ready | OrchestratorState::Busy => {}
        }

        self.start_read();
        Ok(())
    }

    fn handle_submit(&mut self, function: CounterFunction) -> Result<()> {
        match self.derived_state() {
            OrchestratorState::NotConnected => return Err(OrchestratorError::NotConnected),
            OrchestratorState::WrongNetwork => {
                return Err(OrchestratorError::NetworkMismatch {
                    required: self.config.required_chain,
                    actual: self.session.chain_id,
                });
            }
            OrchestratorState::Busy => return Err(OrchestratorError::TransactionInFlight),
            OrchestratorState::Ready => {}
        }

        if !function.mutates() {
            return Err(OrchestratorError::NotMutating(function));
        }

        // dec() reverts on a zero counter; reject before submission so no
        // transaction is created at all.
        if function == CounterFunction::Dec && self.read.value == Some(0) {
            return Err(OrchestratorError::WouldRevert);
        }

        self.tx_seq += 1;
        self.tx_generation = self.generation;
        let tx = Transaction::new();
        self.transaction = Some(tx.clone());
        info!(target: "runtime::worker", %function, "transaction accepted, awaiting signature");
        self.publish(DappEvent::TxPhaseChanged(tx));

        let contract = Arc::clone(&self.contract);
        let contract_config = self.config.contract.clone();
        let task_tx = self.task_tx.clone();
        let tx_seq = self.tx_seq;
        let generation = self.generation;
        tokio::spawn(async move {
            let send = |update: TxUpdate| {
                let task_tx = task_tx.clone();
                async move {
                    let _ = task_tx
                        .send(TaskEvent::TxUpdate {
                            tx_seq,
                            generation,
                            update,
                        })
                        .await;
                }
            };

            let tx_hash = match contract.send_transaction(&contract_config, function).await {
                Ok(tx_hash) => tx_hash,
                Err(e) => {
                    send(TxUpdate::SubmitFailed(e)).await;
                    return;
                }
            };
            send(TxUpdate::Submitted(tx_hash)).await;

            match contract.wait_for_receipt(tx_hash).await {
                Ok(receipt) => match receipt.status {
                    ReceiptStatus::Success => send(TxUpdate::Confirmed).await,
                    ReceiptStatus::Reverted => send(TxUpdate::Reverted).await,
                },
                Err(e) => send(TxUpdate::WatchFailed(e)).await,
            }
        });

        Ok(())
    }

    // ------------------------------------------------------------------
    // Wallet events
    // ------------------------------------------------------------------

    fn handle_wallet_event(&mut self, event: WalletEvent) {
        match event {
            WalletEvent::ChainChanged(chain_id) => self.handle_chain_change(chain_id),
            WalletEvent::Disconnected => {
                info!(target: "runtime::worker", "wallet reported disconnect");
                self.do_disconnect();
            }
        }
    }

    fn handle_chain_change(&mut self, chain_id: ChainId) {
        if !self.session.is_connected() {
            debug!(target: "runtime::worker", %chain_id, "chain change while not connected, ignored");
            return;
        }

        let was_correct = self.network().is_correct_chain;
        self.session.apply_chain_change(chain_id);
        let network = self.network();
        info!(
            target: "runtime::worker",
            %chain_id,
            correct = network.is_correct_chain,
            "chain changed"
        );

        self.publish(DappEvent::SessionChanged(self.session.clone()));
        self.publish(DappEvent::NetworkChanged(network.clone()));

        // Entering the required chain enables the counter query; mirror the
        // automatic fetch-on-enable behavior.
        if !was_correct && network.is_correct_chain {
            self.start_read();
        }
        self.start_balance_fetch();
    }

    /// Unconditional session reset. ReadResult, Transaction, and Balance are
    /// preserved as stale history; only their pending flags are cleared,
    /// since the in-flight operations are now fenced off.
    fn do_disconnect(&mut self) {
        self.generation += 1;
        self.switch_pending = None;
        self.session.reset();
        self.read.fetching = false;

        self.publish(DappEvent::SessionChanged(self.session.clone()));
        self.publish(DappEvent::NetworkChanged(self.network()));

        let wallet = Arc::clone(&self.wallet);
        tokio::spawn(async move {
            wallet.disconnect().await;
        });
    }

    // ------------------------------------------------------------------
    // Task completions
    // ------------------------------------------------------------------

    fn handle_task_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::ConnectFinished {
                generation,
                result,
                reply,
            } => {
                if generation != self.generation {
                    debug!(target: "runtime::worker", "stale connect completion dropped");
                    let _ = reply.send(Err(OrchestratorError::Superseded));
                    return;
                }
                self.apply_connect(result, reply);
            }
            TaskEvent::SwitchFinished {
                seq,
                generation,
                result,
            } => {
                if generation != self.generation
                    || self.switch_pending.map(|(s, _)| s) != Some(seq)
                {
                    debug!(target: "runtime::worker", "stale chain switch completion dropped");
                    return;
                }
                self.switch_pending = None;
                if let Err(e) = result {
                    error!(target: "runtime::worker", error = %e, "chain switch failed");
                    self.publish(DappEvent::SwitchFailed(e.to_string()));
                }
            }
            TaskEvent::ReadFinished {
                seq,
                generation,
                result,
            } => self.apply_read(seq, generation, result),
            TaskEvent::TxUpdate {
                tx_seq,
                generation,
                update,
            } => {
                if generation != self.generation || tx_seq != self.tx_seq {
                    debug!(target: "runtime::worker", tx_seq, "stale transaction update dropped");
                    return;
                }
                self.apply_tx_update(update);
            }
            TaskEvent::BalanceFetched { generation, result } => {
                if generation != self.generation {
                    return;
                }
                match result {
                    Ok(balance) => {
                        self.balance = Some(balance.clone());
                        self.publish(DappEvent::BalanceUpdated(balance));
                    }
                    Err(e) => {
                        debug!(target: "runtime::worker", error = %e, "balance fetch failed");
                    }
                }
            }
        }
    }

    fn apply_connect(
        &mut self,
        result: std::result::Result<WalletAccount, WalletError>,
        reply: oneshot::Sender<Result<()>>,
    ) {
        match result {
            Ok(account) => {
                info!(
                    target: "runtime::worker",
                    address = %account.address,
                    chain_id = %account.chain_id,
                    "wallet connected"
                );
                self.session.complete_connect(account);
                self.publish(DappEvent::SessionChanged(self.session.clone()));
                let network = self.network();
                self.publish(DappEvent::NetworkChanged(network.clone()));

                if network.is_correct_chain {
                    self.start_read();
                }
                self.start_balance_fetch();

                let _ = reply.send(Ok(()));
            }
            Err(e) => {
                warn!(target: "runtime::worker", error = %e, "wallet connection failed");
                self.session.fail_connect(e.to_string());
                self.publish(DappEvent::SessionChanged(self.session.clone()));
                let _ = reply.send(Err(OrchestratorError::Connection(e)));
            }
        }
    }

    fn apply_read(
        &mut self,
        seq: u64,
        generation: u64,
        result: std::result::Result<u128, CallError>,
    ) {
        if generation != self.generation {
            debug!(target: "runtime::worker", seq, "read from previous session dropped");
            return;
        }
        // Last-started-wins: a read that resolves after a later-started read
        // has already been applied must not overwrite it.
        if seq <= self.applied_read_seq {
            debug!(target: "runtime::worker", seq, "superseded read result dropped");
            return;
        }
        self.applied_read_seq = seq;

        match result {
            Ok(value) => {
                debug!(target: "runtime::worker", value, "counter read");
                self.read.apply_success(value);
            }
            Err(e) => {
                warn!(target: "runtime::worker", error = %e, "counter read failed");
                self.read.apply_failure(e.to_string());
            }
        }
        // A later-started read is still in flight.
        if seq != self.read_seq {
            self.read.fetching = true;
        }
        self.publish(DappEvent::ReadUpdated(self.read.clone()));
    }

    fn apply_tx_update(&mut self, update: TxUpdate) {
        let Some(tx) = self.transaction.as_mut() else {
            return;
        };

        let mut refresh = false;
        match update {
            TxUpdate::Submitted(tx_hash) => {
                info!(target: "runtime::worker", %tx_hash, "transaction submitted");
                tx.mark_submitted(tx_hash);
            }
            TxUpdate::Confirmed => {
                info!(target: "runtime::worker", "transaction confirmed");
                tx.mark_confirmed();
                refresh = true;
            }
            TxUpdate::Reverted => {
                warn!(target: "runtime::worker", "transaction reverted on-chain");
                tx.mark_failed("transaction reverted on-chain".to_string());
            }
            TxUpdate::SubmitFailed(e) => {
                warn!(target: "runtime::worker", error = %e, "transaction submission failed");
                tx.mark_failed(e.to_string());
            }
            TxUpdate::WatchFailed(e) => {
                warn!(target: "runtime::worker", error = %e, "receipt watch failed");
                tx.mark_failed(e.to_string());
            }
        }

        let updated = tx.clone();
        self.publish(DappEvent::TxPhaseChanged(updated));

        // Refresh-after-write: exactly one automatic read per confirmation,
        // plus a balance refresh for the gas spent.
        if refresh {
            self.start_read();
            self.start_balance_fetch();
        }
    }

    // ------------------------------------------------------------------
    // Spawned operations
    // ------------------------------------------------------------------

    fn start_read(&mut self) {
        self.read_seq += 1;
        self.read.begin();
        self.publish(DappEvent::ReadStarted);

        let contract = Arc::clone(&self.contract);
        let contract_config = self.config.contract.clone();
        let task_tx = self.task_tx.clone();
        let seq = self.read_seq;
        let generation = self.generation;
        tokio::spawn(async move {
            let result = contract.call(&contract_config, CounterFunction::Count).await;
            let _ = task_tx
                .send(TaskEvent::ReadFinished {
                    seq,
                    generation,
                    result,
                })
                .await;
        });
    }

    fn start_balance_fetch(&mut self) {
        let Some(address) = self.session.address else {
            return;
        };

        let contract = Arc::clone(&self.contract);
        let task_tx = self.task_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = contract.get_balance(address).await;
            let _ = task_tx
                .send(TaskEvent::BalanceFetched { generation, result })
                .await;
        });
    }
}
