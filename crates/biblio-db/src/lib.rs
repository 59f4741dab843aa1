//! # biblio-db: Ledger Store for Biblio
//!
//! This crate provides durable storage for the Biblio lending system.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Biblio Data Flow                                 │
//! │                                                                         │
//! │  Lending Engine operation (borrow / return / reserve / cancel)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     biblio-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    ledger     │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (per-book tx  │    │  (embedded)  │  │   │
//! │  │   │               │    │  primitives)  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ open_loan     │    │ 001_init.sql │  │   │
//! │  │   │ begin()       │    │ update_status │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │          ▲                                                      │   │
//! │  │          │             ┌───────────────┐                        │   │
//! │  │          └─────────────│ Repositories  │  Query Surface reads   │   │
//! │  │                        │ book/loan/... │  (never lending state) │   │
//! │  │                        └───────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`ledger`] - Transaction-scoped primitives composed by the Lending Engine
//! - [`repository`] - Read-oriented repositories for the Query Surface
//!
//! ## Two Access Paths
//!
//! The engine and the query surface deliberately use different doors:
//!
//! - **Engine**: `db.begin()` then [`ledger`] functions on the transaction.
//!   Every lending operation's reads and writes happen inside one
//!   transaction, so readers never observe half-applied state.
//! - **Query Surface**: pool-backed repositories. Read-only projections plus
//!   the insert paths owned by the external catalog/membership collaborators.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use biblio_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/biblio.db")).await?;
//!
//! // Query surface
//! let books = db.books().search("tolkien", 20).await?;
//!
//! // Engine path
//! let mut tx = db.begin().await?;
//! let book = biblio_db::ledger::book_by_id(&mut tx, "some-id").await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::book::BookRepository;
pub use repository::loan::LoanRepository;
pub use repository::member::MemberRepository;
pub use repository::reservation::ReservationRepository;
