//! # Domain Types
//!
//! Core domain types for the Biblio lending system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Book       │   │      Loan       │   │   Reservation   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (queue pos) │       │
//! │  │  isbn (business)│   │  book_id (FK)   │   │  book_id (FK)   │       │
//! │  │  title, author  │   │  member_id (FK) │   │  member_id (FK) │       │
//! │  │  price_cents    │   │  due_date       │   │  created_at     │       │
//! │  │  status         │   │  return_date?   │   └─────────────────┘       │
//! │  └─────────────────┘   │  fine_cents?    │                             │
//! │                        └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   BookStatus    │   │     Member      │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Available      │   │  id (UUID)      │                             │
//! │  │  Borrowed       │   │  name, email    │                             │
//! │  │  Reserved       │   │  (read-only)    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants (enforced by the Lending Engine)
//! - `status == Borrowed` iff exactly one open Loan references the book
//! - `status == Reserved` only when no open Loan exists and the reservation
//!   queue is non-empty
//! - At most one open Loan per book; at most one open Reservation per
//!   (book, member) pair

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Book Status
// =============================================================================

/// The availability status of a physical book copy.
///
/// ## State Machine
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │   Available ──Borrow──────────────────────────► Borrowed               │
/// │       ▲                                            │                    │
/// │       │                                            │ Return             │
/// │       │ Return (queue empty)                       ▼                    │
/// │       ├────────────────────────────── queue empty? ──► Available        │
/// │       │                                            │                    │
/// │       │ queue drained by Cancel          queue non-empty                │
/// │       │                                            ▼                    │
/// │       └──────────────────────────────────────── Reserved                │
/// │                                                    │                    │
/// │                                          Borrow (by queue head)         │
/// │                                                    ▼                    │
/// │                                                 Borrowed                │
/// │                                                                         │
/// │   No other transitions are legal. An attempted illegal transition       │
/// │   fails with InvalidState and leaves all state unchanged.               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    /// On the shelf, no open loan, no queued reservations.
    Available,
    /// Checked out; exactly one open loan references the book.
    Borrowed,
    /// No open loan, but queued reservations give the head member priority.
    Reserved,
}

impl BookStatus {
    /// Whether a reservation may be placed while the book is in this status.
    ///
    /// Reserving an `Available` book is rejected - the caller should borrow
    /// it instead.
    #[inline]
    pub const fn accepts_reservations(&self) -> bool {
        !matches!(self, BookStatus::Available)
    }

    /// Resolves the status a book settles into once no open loan exists.
    ///
    /// This is the single rule used by Return and CancelReservation: a
    /// non-empty queue holds the book for its head, an empty queue releases
    /// it to the shelf.
    #[inline]
    pub const fn resolve_unloaned(queue_len: usize) -> Self {
        if queue_len == 0 {
            BookStatus::Available
        } else {
            BookStatus::Reserved
        }
    }
}

impl Default for BookStatus {
    fn default() -> Self {
        BookStatus::Available
    }
}

// =============================================================================
// Book
// =============================================================================

/// A physical book copy held by the library.
///
/// Catalog fields (isbn, title, author, price) are immutable from the
/// engine's perspective; only `status` is mutated, and exclusively by the
/// Lending Engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Book {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// ISBN - business identifier, unique per copy record.
    pub isbn: String,

    /// Display title.
    pub title: String,

    /// Author name.
    pub author: String,

    /// Replacement price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current availability status.
    pub status: BookStatus,

    /// When the catalog record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated (status changes bump this).
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Returns the replacement price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Loan
// =============================================================================

/// A lending record tying one book to one member.
///
/// A loan with `return_date == None` is **open**: the book is currently
/// checked out. Loans are closed by Return and never physically deleted -
/// closed loans are the lending history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Loan {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The book this loan covers.
    pub book_id: String,

    /// The member who checked the book out.
    pub member_id: String,

    /// Date the book is due back.
    pub due_date: NaiveDate,

    /// Date the book came back. `None` means the loan is open.
    pub return_date: Option<NaiveDate>,

    /// Fine assessed on return, in cents. `None` until the loan closes.
    pub fine_cents: Option<i64>,

    /// When the loan was created (the borrow instant).
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// Whether this loan is still open (book not yet returned).
    #[inline]
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Returns the assessed fine as Money, if the loan has closed.
    #[inline]
    pub fn fine(&self) -> Option<Money> {
        self.fine_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A member's queued claim on a book that is currently unavailable.
///
/// ## Queue Ordering
/// `id` is a monotonically increasing integer assigned by the store
/// (AUTOINCREMENT). Ordering reservations by `id` gives strict FIFO without
/// relying on timestamp resolution - two reservations created in the same
/// millisecond still have a total order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Reservation {
    /// Queue position. Lower id = earlier claim = higher priority.
    pub id: i64,

    /// The book being waited on.
    pub book_id: String,

    /// The member holding the claim.
    pub member_id: String,

    /// When the reservation was placed.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Member
// =============================================================================

/// A library member.
///
/// Read-only from the engine's perspective: authentication is an external
/// collaborator's responsibility, and the engine trusts a validated
/// `member_id` as input. Only existence is ever checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Member {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub first_name: String,
    pub last_name: String,

    /// Contact email, unique across members.
    pub email: String,

    pub phone: Option<String>,
    pub address: Option<String>,

    /// When the member registered.
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Full display name, for the (out-of-scope) admin views.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_available() {
        assert_eq!(BookStatus::default(), BookStatus::Available);
    }

    #[test]
    fn test_accepts_reservations() {
        assert!(!BookStatus::Available.accepts_reservations());
        assert!(BookStatus::Borrowed.accepts_reservations());
        assert!(BookStatus::Reserved.accepts_reservations());
    }

    #[test]
    fn test_resolve_unloaned() {
        assert_eq!(BookStatus::resolve_unloaned(0), BookStatus::Available);
        assert_eq!(BookStatus::resolve_unloaned(1), BookStatus::Reserved);
        assert_eq!(BookStatus::resolve_unloaned(7), BookStatus::Reserved);
    }

    #[test]
    fn test_loan_is_open() {
        let mut loan = Loan {
            id: "l1".to_string(),
            book_id: "b1".to_string(),
            member_id: "m1".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            return_date: None,
            fine_cents: None,
            created_at: Utc::now(),
        };
        assert!(loan.is_open());
        assert!(loan.fine().is_none());

        loan.return_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        loan.fine_cents = Some(250);
        assert!(!loan.is_open());
        assert_eq!(loan.fine().unwrap().cents(), 250);
    }

    #[test]
    fn test_member_full_name() {
        let member = Member {
            id: "m1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            address: None,
            created_at: Utc::now(),
        };
        assert_eq!(member.full_name(), "Ada Lovelace");
    }
}
