//! # Repository Module
//!
//! Pool-backed repositories for the Query Surface.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Query Surface caller                                                  │
//! │       │                                                                 │
//! │       │  db.loans().active_for_member(member_id)                       │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  LoanRepository                                                        │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── active_for_member(&self, member_id)                               │
//! │  ├── history_for_book(&self, book_id)                                  │
//! │  └── all_open(&self)                                                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Scope Boundary
//! Repositories are READ paths plus the insert operations owned by the
//! external catalog/membership collaborators (and the seed tool). They never
//! mutate lending state - book status, loan lifecycle, and the reservation
//! queue belong to the Lending Engine via [`crate::ledger`].
//!
//! ## Available Repositories
//!
//! - [`BookRepository`] - Catalog lookup and availability search
//! - [`LoanRepository`] - Loan history projections
//! - [`ReservationRepository`] - Queue contents
//! - [`MemberRepository`] - Member existence and lookup
//!
//! [`BookRepository`]: book::BookRepository
//! [`LoanRepository`]: loan::LoanRepository
//! [`ReservationRepository`]: reservation::ReservationRepository
//! [`MemberRepository`]: member::MemberRepository

pub mod book;
pub mod loan;
pub mod member;
pub mod reservation;
