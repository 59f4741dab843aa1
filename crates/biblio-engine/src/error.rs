//! # Engine Error Types
//!
//! The lending error taxonomy surfaced to the request layer.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Error Kinds                                       │
//! │                                                                         │
//! │  NotFound      referenced book/member/loan/reservation doesn't exist   │
//! │                → rejected request, do not retry                        │
//! │                                                                         │
//! │  Conflict      a competing claim already holds the state               │
//! │                (open loan, duplicate reservation, queue priority)      │
//! │                → rejected request, do not retry automatically          │
//! │                                                                         │
//! │  InvalidState  operation illegal for the current book status           │
//! │                → caller must correct the request                       │
//! │                                                                         │
//! │  Unavailable   transient contention, retry budget exhausted            │
//! │                → safe to retry with backoff                            │
//! │                                                                         │
//! │  Store         non-transient ledger failure, propagated verbatim       │
//! │                                                                         │
//! │  NoActiveLoan is NOT here: it is a warning on a successful Return      │
//! │  receipt, because a consistent system state beats strict rejection.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use biblio_core::BookStatus;
use biblio_db::DbError;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors returned by lending operations.
///
/// Every operation returns a typed result; no store error is silently
/// swallowed. [`EngineError::kind`] gives the request layer the category to
/// map onto a response.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The book already has an open loan.
    ///
    /// ## When This Occurs
    /// - Borrowing a book in `Borrowed` status
    /// - Losing the race of N simultaneous borrows (the N-1 losers see this)
    #[error("book {book_id} already has an open loan")]
    AlreadyBorrowed { book_id: String },

    /// The member already holds an open reservation for this book.
    #[error("member {member_id} already holds a reservation for book {book_id}")]
    DuplicateReservation { book_id: String, member_id: String },

    /// The book is reserved and the caller is not the queue head.
    ///
    /// Queue priority protects members who waited: only the head may borrow
    /// a `Reserved` book.
    #[error("book {book_id} is held for the reservation queue head")]
    NotQueueHead { book_id: String },

    /// The operation is not legal while the book is in this status.
    ///
    /// ## When This Occurs
    /// - Reserving an `Available` book (borrow it instead)
    #[error("cannot {operation} book {book_id} while it is {status:?}")]
    InvalidState {
        book_id: String,
        status: BookStatus,
        operation: &'static str,
    },

    /// Transient contention: the retry budget ran out.
    ///
    /// The operation left no partial state; the caller may retry with
    /// backoff.
    #[error("operation could not complete after {attempts} attempt(s): {reason}")]
    Unavailable { attempts: u32, reason: String },

    /// Non-transient ledger store failure.
    #[error("ledger store error: {0}")]
    Store(DbError),
}

/// Coarse error category, for mapping onto request-layer responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidState,
    Unavailable,
    Store,
}

impl EngineError {
    /// The taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::AlreadyBorrowed { .. }
            | EngineError::DuplicateReservation { .. }
            | EngineError::NotQueueHead { .. } => ErrorKind::Conflict,
            EngineError::InvalidState { .. } => ErrorKind::InvalidState,
            EngineError::Unavailable { .. } => ErrorKind::Unavailable,
            EngineError::Store(_) => ErrorKind::Store,
        }
    }

    /// Whether a retry with backoff can reasonably succeed.
    pub fn is_retriable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }

    /// Marks a stale-snapshot refusal from a conditional write.
    ///
    /// The book changed under this operation between read and write; the
    /// retry loop re-reads fresh state and either succeeds or produces the
    /// real Conflict/InvalidState answer.
    pub(crate) fn stale_snapshot(book_id: &str) -> Self {
        EngineError::Unavailable {
            attempts: 1,
            reason: format!("book {} changed concurrently", book_id),
        }
    }

    /// Stamps the attempt count an operation actually consumed.
    pub(crate) fn with_attempts(self, attempts: u32) -> Self {
        match self {
            EngineError::Unavailable { reason, .. } => {
                EngineError::Unavailable { attempts, reason }
            }
            other => other,
        }
    }
}

/// Convert ledger store errors into the engine taxonomy.
///
/// ## Error Mapping
/// ```text
/// DbError::NotFound            → EngineError::NotFound
/// DbError::Busy / PoolExhausted → EngineError::Unavailable (retriable)
/// Other                        → EngineError::Store (propagated verbatim)
/// ```
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound {
                entity: match entity.as_str() {
                    "Book" => "Book",
                    "Member" => "Member",
                    "Loan" => "Loan",
                    "Reservation" => "Reservation",
                    _ => "Record",
                },
                id,
            },
            e if e.is_retriable() => EngineError::Unavailable {
                attempts: 1,
                reason: e.to_string(),
            },
            e => EngineError::Store(e),
        }
    }
}

/// Result type for lending operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
