//! # biblio-core: Pure Domain Logic for Biblio
//!
//! This crate is the **heart** of the Biblio lending system. It contains the
//! lending domain as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Biblio Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Request Layer (out of scope)                       │   │
//! │  │    borrow ──► return ──► reserve ──► cancel ──► preview-fine    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 biblio-engine (Lending Engine)                  │   │
//! │  │       per-book transactions, state machine enforcement          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ biblio-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   fine    │  │ validation│  │   │
//! │  │   │   Book    │  │   Money   │  │FinePolicy │  │   rules   │  │   │
//! │  │   │   Loan    │  │ (cents)   │  │ days late │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  biblio-db (Ledger Store)                       │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Book, Loan, Reservation, Member)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`fine`] - The Fine Policy: lateness → monetary amount
//! - [`error`] - Validation error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use biblio_core::fine::FinePolicy;
//! use biblio_core::money::Money;
//! use chrono::NaiveDate;
//!
//! // Fifty cents per day late
//! let policy = FinePolicy::new(Money::from_cents(50));
//!
//! let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//! let returned = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//!
//! // Five days late at $0.50/day = $2.50
//! assert_eq!(policy.assess(due, returned).cents(), 250);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fine;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use biblio_core::Money` instead of
// `use biblio_core::money::Money`

pub use error::ValidationError;
pub use fine::FinePolicy;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default fine accrued per calendar day a loan is overdue, in cents.
///
/// ## Why a constant?
/// v0.1 uses a single flat rate for the whole library. Per-category rates
/// (reference vs. circulation) would move this into configuration.
pub const DEFAULT_DAILY_FINE_CENTS: i64 = 50;

/// Default loan period offered to members, in calendar days.
///
/// ## Business Reason
/// Fourteen days is the standard circulation period. Callers supply the due
/// date explicitly on borrow; this constant is the suggested default for
/// request layers and seed data.
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;
