//! # Biblio Lending Engine
//!
//! The transactional lending core: checks books out and back in, runs the
//! FIFO reservation queue, and assesses late fines.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Where This Crate Sits                               │
//! │                                                                         │
//! │   request layer (out of scope)                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │   biblio-engine   Borrow / Return / Reserve / Cancel / PreviewFine     │
//! │         │          state machine + one-transaction-per-operation       │
//! │         ▼                                                               │
//! │   biblio-db       ledger primitives, repositories, pool, migrations   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │   biblio-core     domain types, fine policy, money, validation        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations on the same book behave as if executed one at a time: each
//! runs in a single store transaction with guarded writes, and stale
//! snapshots are retried with backoff. Every operation either fully applies
//! or leaves no trace.

pub mod engine;
pub mod error;

pub use engine::{EngineConfig, LendingEngine, ReturnReceipt, ReturnWarning};
pub use error::{EngineError, EngineResult, ErrorKind};
