//! Mock wallet and contract providers for testing without a browser wallet
//! or RPC endpoint.
//!
//! Both mocks are scriptable: tests can queue connect results, gate
//! individual read resolutions to force overlap orderings, and choose
//! receipt outcomes per transaction.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Notify, broadcast};

use crate::traits::{
    CallError, ContractProvider, ReceiptError, SubmitError, WalletError, WalletProvider,
};
use crate::types::{
    Address, Balance, ChainId, ContractConfig, CounterFunction, ReceiptStatus, TxHash, TxReceipt,
    WalletAccount, WalletEvent,
};

/// Mock wallet provider.
///
/// Connect results are queued; if the queue is empty, connections succeed
/// with the configured default account. Wallet events are emitted manually
/// from the test via [`MockWallet::emit`].
#[derive(Clone)]
pub struct MockWallet {
    default_account: WalletAccount,
    connect_results: Arc<Mutex<VecDeque<Result<WalletAccount, WalletError>>>>,
    connect_gate: Arc<Mutex<Option<Arc<Notify>>>>,
    switch_results: Arc<Mutex<VecDeque<Result<(), WalletError>>>>,
    switch_gate: Arc<Mutex<Option<Arc<Notify>>>>,
    switch_calls: Arc<Mutex<Vec<ChainId>>>,
    event_tx: broadcast::Sender<WalletEvent>,
}

impl MockWallet {
    pub fn new(default_account: WalletAccount) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            default_account,
            connect_results: Arc::new(Mutex::new(VecDeque::new())),
            connect_gate: Arc::new(Mutex::new(None)),
            switch_results: Arc::new(Mutex::new(VecDeque::new())),
            switch_gate: Arc::new(Mutex::new(None)),
            switch_calls: Arc::new(Mutex::new(Vec::new())),
            event_tx,
        }
    }

    /// Queue the outcome of the next `connect()` call.
    pub fn push_connect_result(&self, result: Result<WalletAccount, WalletError>) {
        self.connect_results.lock().unwrap().push_back(result);
    }

    /// Queue the outcome of the next `switch_chain()` call.
    pub fn push_switch_result(&self, result: Result<(), WalletError>) {
        self.switch_results.lock().unwrap().push_back(result);
    }

    /// Make `connect()` block until the returned handle is notified.
    pub fn gate_connect(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.connect_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Make `switch_chain()` block until the returned handle is notified.
    pub fn gate_switch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.switch_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Chain ids passed to `switch_chain()`, in call order.
    pub fn switch_calls(&self) -> Vec<ChainId> {
        self.switch_calls.lock().unwrap().clone()
    }

    /// Emit a wallet-side event to all subscribers.
    pub fn emit(&self, event: WalletEvent) {
        let _ = self.event_tx.send(event);
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        let gate = self.connect_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let scripted = self.connect_results.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(self.default_account.clone()),
        }
    }

    async fn disconnect(&self) {}

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), WalletError> {
        self.switch_calls.lock().unwrap().push(chain_id);

        let gate = self.switch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let scripted = self.switch_results.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result?,
            None => {}
        }

        // A real wallet reports the switch through a chainChanged event.
        self.emit(WalletEvent::ChainChanged(chain_id));
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.event_tx.subscribe()
    }
}

/// A scripted read: the value (or error) to resolve with, and an optional
/// gate the call awaits before resolving.
struct ScriptedRead {
    result: Result<u128, CallError>,
    gate: Option<Arc<Notify>>,
}

/// A scripted receipt outcome with an optional resolution gate.
struct ScriptedReceipt {
    result: Result<ReceiptStatus, ReceiptError>,
    gate: Option<Arc<Notify>>,
}

/// Mock contract provider backed by an in-memory counter.
///
/// Unscripted reads return the current counter; unscripted transactions
/// succeed and apply their mutation when the receipt resolves as success,
/// so a post-confirmation refetch observes the new value.
#[derive(Clone)]
pub struct MockContract {
    counter: Arc<Mutex<u128>>,
    balance: Arc<Mutex<Balance>>,
    reads: Arc<Mutex<VecDeque<ScriptedRead>>>,
    submits: Arc<Mutex<VecDeque<Result<TxHash, SubmitError>>>>,
    receipts: Arc<Mutex<VecDeque<ScriptedReceipt>>>,
    pending: Arc<Mutex<HashMap<TxHash, CounterFunction>>>,
    tx_counter: Arc<Mutex<u64>>,
    read_calls: Arc<AtomicUsize>,
    balance_calls: Arc<AtomicUsize>,
}

impl MockContract {
    pub fn new(initial_count: u128) -> Self {
        Self {
            counter: Arc::new(Mutex::new(initial_count)),
            balance: Arc::new(Mutex::new(Balance {
                value: 1_000_000_000_000_000_000,
                decimals: 18,
                symbol: "ETH".to_string(),
            })),
            reads: Arc::new(Mutex::new(VecDeque::new())),
            submits: Arc::new(Mutex::new(VecDeque::new())),
            receipts: Arc::new(Mutex::new(VecDeque::new())),
            pending: Arc::new(Mutex::new(HashMap::new())),
            tx_counter: Arc::new(Mutex::new(0)),
            read_calls: Arc::new(AtomicUsize::new(0)),
            balance_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a read that resolves immediately with `result`.
    pub fn push_read(&self, result: Result<u128, CallError>) {
        self.reads
            .lock()
            .unwrap()
            .push_back(ScriptedRead { result, gate: None });
    }

    /// Queue a read that resolves with `result` only once the returned
    /// handle is notified. Used to force overlap orderings.
    pub fn push_gated_read(&self, result: Result<u128, CallError>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.reads.lock().unwrap().push_back(ScriptedRead {
            result,
            gate: Some(gate.clone()),
        });
        gate
    }

    /// Queue the outcome of the next `send_transaction()` call.
    pub fn push_submit_result(&self, result: Result<TxHash, SubmitError>) {
        self.submits.lock().unwrap().push_back(result);
    }

    /// Queue the outcome of the next `wait_for_receipt()` call.
    pub fn push_receipt(&self, result: Result<ReceiptStatus, ReceiptError>) {
        self.receipts
            .lock()
            .unwrap()
            .push_back(ScriptedReceipt { result, gate: None });
    }

    /// Queue a receipt that resolves only once the returned handle is
    /// notified. Keeps the transaction in its submitted phase meanwhile.
    pub fn push_gated_receipt(&self, result: Result<ReceiptStatus, ReceiptError>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.receipts.lock().unwrap().push_back(ScriptedReceipt {
            result,
            gate: Some(gate.clone()),
        });
        gate
    }

    pub fn set_balance(&self, balance: Balance) {
        *self.balance.lock().unwrap() = balance;
    }

    pub fn count(&self) -> u128 {
        *self.counter.lock().unwrap()
    }

    /// Number of read-only `call()` invocations so far.
    pub fn read_call_count(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_balance()` invocations so far.
    pub fn balance_call_count(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    fn next_tx_hash(&self) -> TxHash {
        let mut counter = self.tx_counter.lock().unwrap();
        *counter += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&counter.to_be_bytes());
        TxHash(bytes)
    }

    fn apply(&self, function: CounterFunction) {
        let mut counter = self.counter.lock().unwrap();
        match function {
            CounterFunction::Inc => *counter += 1,
            CounterFunction::Dec => *counter = counter.saturating_sub(1),
            CounterFunction::Count | CounterFunction::Get => {}
        }
    }
}

#[async_trait]
impl ContractProvider for MockContract {
    async fn call(
        &self,
        _contract: &ContractConfig,
        _function: CounterFunction,
    ) -> Result<u128, CallError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.reads.lock().unwrap().pop_front();
        match scripted {
            Some(ScriptedRead { result, gate }) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                result
            }
            None => Ok(*self.counter.lock().unwrap()),
        }
    }

    async fn send_transaction(
        &self,
        _contract: &ContractConfig,
        function: CounterFunction,
    ) -> Result<TxHash, SubmitError> {
        let scripted = self.submits.lock().unwrap().pop_front();
        let tx_hash = match scripted {
            Some(result) => result?,
            None => self.next_tx_hash(),
        };
        self.pending.lock().unwrap().insert(tx_hash, function);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ReceiptError> {
        let scripted = self.receipts.lock().unwrap().pop_front();
        let status = match scripted {
            Some(ScriptedReceipt { result, gate }) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                result?
            }
            None => ReceiptStatus::Success,
        };

        if status == ReceiptStatus::Success
            && let Some(function) = self.pending.lock().unwrap().remove(&tx_hash)
        {
            self.apply(function);
        }

        Ok(TxReceipt { tx_hash, status })
    }

    async fn get_balance(&self, _address: Address) -> Result<Balance, CallError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> ContractConfig {
        ContractConfig {
            address: Address([0x2f; 20]),
            chain_id: ChainId::SEPOLIA,
        }
    }

    #[tokio::test]
    async fn unscripted_reads_track_confirmed_mutations() {
        let chain = MockContract::new(3);

        let value = chain.call(&contract(), CounterFunction::Count).await.unwrap();
        assert_eq!(value, 3);

        let tx_hash = chain
            .send_transaction(&contract(), CounterFunction::Inc)
            .await
            .unwrap();
        // Mutation is not visible until the receipt lands.
        assert_eq!(chain.count(), 3);

        let receipt = chain.wait_for_receipt(tx_hash).await.unwrap();
        assert_eq!(receipt.status, ReceiptStatus::Success);
        assert_eq!(chain.count(), 4);
    }

    #[tokio::test]
    async fn reverted_receipt_leaves_counter_untouched() {
        let chain = MockContract::new(0);
        chain.push_receipt(Ok(ReceiptStatus::Reverted));

        let tx_hash = chain
            .send_transaction(&contract(), CounterFunction::Dec)
            .await
            .unwrap();
        let receipt = chain.wait_for_receipt(tx_hash).await.unwrap();

        assert_eq!(receipt.status, ReceiptStatus::Reverted);
        assert_eq!(chain.count(), 0);
    }

    #[tokio::test]
    async fn gated_read_resolves_after_notify() {
        let chain = MockContract::new(0);
        let gate = chain.push_gated_read(Ok(7));

        let chain2 = chain.clone();
        let task = tokio::spawn(async move {
            chain2.call(&contract(), CounterFunction::Count).await
        });

        // Give the task a chance to reach the gate, then release it.
        tokio::task::yield_now().await;
        gate.notify_one();
        assert_eq!(task.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn wallet_switch_emits_chain_changed() {
        let wallet = MockWallet::new(WalletAccount {
            address: Address([1; 20]),
            chain_id: ChainId::SEPOLIA,
        });
        let mut events = wallet.subscribe_events();

        wallet.switch_chain(ChainId::SEPOLIA).await.unwrap();

        assert_eq!(wallet.switch_calls(), vec![ChainId::SEPOLIA]);
        assert_eq!(
            events.recv().await.unwrap(),
            WalletEvent::ChainChanged(ChainId::SEPOLIA)
        );
    }
}
