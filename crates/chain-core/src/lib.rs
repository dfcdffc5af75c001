//! Wallet and chain abstraction layer for the counter dApp.
//!
//! This crate defines the two seams the orchestration layer depends on:
//!
//! ```text
//! WalletProvider   — account access, chain switching, wallet events
//! ContractProvider — read-only calls, transaction submission, receipts
//! ```
//!
//! # Design Philosophy
//!
//! - No cryptography, no transport: implementations bridge to an injected
//!   browser wallet and an RPC endpoint; this crate only shapes the calls.
//! - Errors are plain data (`thiserror` enums) so the orchestrator can
//!   surface them as state instead of crashing.
//! - The `mock` feature provides scriptable in-memory implementations for
//!   tests and local development.

pub mod traits;
pub mod types;

#[cfg(feature = "mock")]
pub mod mock;

pub use traits::{
    CallError, ContractProvider, ReceiptError, SubmitError, WalletError, WalletProvider,
};

pub use types::{
    Address, Balance, ChainId, ContractConfig, CounterFunction, ParseError, ReceiptStatus, TxHash,
    TxReceipt, WalletAccount, WalletEvent, format_units,
};
