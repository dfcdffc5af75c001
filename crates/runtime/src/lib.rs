//! Transaction orchestration runtime for the counter dApp.
//!
//! Sequences wallet connection, network validation, contract reads, write
//! submission, and confirmation tracking while keeping the UI-observable
//! state consistent at every step.
//!
//! # Architecture
//!
//! ```text
//! OrchestratorHandle ──commands──▶ OrchestratorWorker ──▶ WalletProvider
//!        ▲                          (single reducer)  ──▶ ContractProvider
//!        └───────────events (broadcast)────┘
//! ```
//!
//! All state mutation happens inside the worker task; wallet and RPC
//! operations run in spawned tasks and report completions back through an
//! internal channel, fenced against disconnects and read overlap.

pub mod config;
pub mod error;
pub mod event;
pub mod handle;
pub mod network;
pub mod orchestrator;
pub mod reader;
pub mod session;
pub mod state;
pub mod submitter;
pub mod worker;

pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, Result};
pub use event::DappEvent;
pub use handle::OrchestratorHandle;
pub use network::{NetworkState, evaluate};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use reader::ReadResult;
pub use session::{Session, SessionStatus};
pub use state::{AppSnapshot, OrchestratorState, can_read, can_write, derive_state};
pub use submitter::{Transaction, TxPhase};
