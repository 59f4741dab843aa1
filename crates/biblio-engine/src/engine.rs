//! # Lending Engine
//!
//! The transactional core of the lending system: Borrow, Return, Reserve,
//! CancelReservation, and PreviewFine.
//!
//! ## Concurrency Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 One Operation = One Transaction                         │
//! │                                                                         │
//! │   op(book) ──► begin ──► read book + queue ──► decide ──► guarded      │
//! │                                                            writes       │
//! │                  │                                            │         │
//! │                  │              guard refused (stale snapshot)│         │
//! │                  │◄────── rollback + backoff + retry ◄────────┤         │
//! │                  │                                            │         │
//! │                  └────────────── commit ◄─────────────────────┘         │
//! │                                                                         │
//! │   SQLite's single writer serializes commits; the conditional status    │
//! │   UPDATE catches any snapshot that went stale between read and write.  │
//! │   Either way, operations on the same book observe each other in a      │
//! │   total order. A dropped transaction rolls back, so a failed           │
//! │   operation leaves no partial state.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use biblio_core::{BookStatus, FinePolicy, Loan, Money, Reservation, DEFAULT_LOAN_PERIOD_DAYS};
use biblio_db::{ledger, Database, DbError};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Configuration
// =============================================================================

/// Tunable parameters for the lending engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The fine policy applied when loans close late.
    pub fine_policy: FinePolicy,

    /// Default loan period, used by [`LendingEngine::standard_due_date`].
    pub loan_period_days: i64,

    /// How many times an operation is attempted before giving up with
    /// `Unavailable`. Attempt 1 is the initial try.
    pub max_attempts: u32,

    /// Base backoff between attempts; scaled linearly by attempt number.
    pub retry_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            fine_policy: FinePolicy::default(),
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            max_attempts: 3,
            retry_backoff: Duration::from_millis(25),
        }
    }
}

// =============================================================================
// Receipts
// =============================================================================

/// Non-fatal conditions reported on a successful Return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnWarning {
    /// The book had no open loan. The return still normalized the book's
    /// status from the reservation queue, because walking a book back to
    /// the desk must always leave the system consistent.
    NoActiveLoan,
}

/// The outcome of a Return operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReturnReceipt {
    /// The loan that was closed, if one was open.
    pub loan_id: Option<String>,

    /// The fine assessed against the closed loan. Zero when on time or when
    /// no loan was open.
    pub fine: Money,

    /// The status the book settled into.
    pub status: BookStatus,

    /// The member now at the head of the reservation queue, if the book
    /// settled into `Reserved`.
    pub next_holder: Option<String>,

    /// Set when the return completed in a degraded way.
    pub warning: Option<ReturnWarning>,
}

// =============================================================================
// Lending Engine
// =============================================================================

/// Executes lending operations against the ledger store.
///
/// Cheap to clone; clones share the underlying connection pool, so one
/// engine can serve many concurrent tasks.
#[derive(Debug, Clone)]
pub struct LendingEngine {
    db: Database,
    config: EngineConfig,
}

impl LendingEngine {
    /// Creates an engine with the default configuration.
    pub fn new(db: Database) -> Self {
        Self::with_config(db, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(db: Database, config: EngineConfig) -> Self {
        LendingEngine { db, config }
    }

    /// The configured fine policy.
    pub fn fine_policy(&self) -> &FinePolicy {
        &self.config.fine_policy
    }

    /// The due date for a loan opened today under the standard period.
    pub fn standard_due_date(&self) -> NaiveDate {
        Utc::now().date_naive() + chrono::Duration::days(self.config.loan_period_days)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Checks a book out to a member.
    ///
    /// - `Available` books go straight to `Borrowed`.
    /// - `Reserved` books may only be borrowed by the queue head; the head's
    ///   reservation is consumed in the same transaction.
    /// - `Borrowed` books are refused with a Conflict.
    pub async fn borrow(
        &self,
        book_id: &str,
        member_id: &str,
        due_date: NaiveDate,
    ) -> EngineResult<Loan> {
        let loan = self
            .run_with_retry(|| self.try_borrow(book_id, member_id, due_date))
            .await?;

        info!(
            loan_id = %loan.id,
            book_id = %book_id,
            member_id = %member_id,
            due_date = %due_date,
            "Book borrowed"
        );
        Ok(loan)
    }

    /// Returns a book, closing its open loan and assessing any fine.
    ///
    /// Succeeds even when no loan is open (the receipt carries a
    /// [`ReturnWarning::NoActiveLoan`]); in every case the book's status is
    /// recomputed from the reservation queue, never blindly reset.
    pub async fn return_book(
        &self,
        book_id: &str,
        return_date: NaiveDate,
    ) -> EngineResult<ReturnReceipt> {
        let receipt = self
            .run_with_retry(|| self.try_return(book_id, return_date))
            .await?;

        if receipt.warning == Some(ReturnWarning::NoActiveLoan) {
            warn!(book_id = %book_id, "Return with no open loan; status normalized");
        }
        info!(
            book_id = %book_id,
            loan_id = ?receipt.loan_id,
            fine = %receipt.fine,
            status = ?receipt.status,
            "Book returned"
        );
        Ok(receipt)
    }

    /// Places a member at the tail of a book's reservation queue.
    ///
    /// Only books that are not `Available` accept reservations, and a member
    /// may hold at most one reservation per book.
    pub async fn reserve(&self, book_id: &str, member_id: &str) -> EngineResult<Reservation> {
        let reservation = self
            .run_with_retry(|| self.try_reserve(book_id, member_id))
            .await?;

        info!(
            book_id = %book_id,
            member_id = %member_id,
            position = reservation.id,
            "Reservation placed"
        );
        Ok(reservation)
    }

    /// Cancels a member's reservation, returning the status the book
    /// settled into.
    ///
    /// Cancelling the last reservation of a `Reserved` book releases it back
    /// to `Available`.
    pub async fn cancel_reservation(
        &self,
        book_id: &str,
        member_id: &str,
    ) -> EngineResult<BookStatus> {
        let status = self
            .run_with_retry(|| self.try_cancel(book_id, member_id))
            .await?;

        info!(book_id = %book_id, member_id = %member_id, status = ?status, "Reservation cancelled");
        Ok(status)
    }

    /// Computes the fine a loan would carry if settled on `as_of`.
    ///
    /// Closed loans report their recorded fine; open loans are assessed
    /// against `as_of` without writing anything.
    pub async fn preview_fine(&self, loan_id: &str, as_of: NaiveDate) -> EngineResult<Money> {
        let loan = self
            .db
            .loans()
            .get_by_id(loan_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Loan",
                id: loan_id.to_string(),
            })?;

        if let Some(fine) = loan.fine() {
            return Ok(fine);
        }

        Ok(self.config.fine_policy.assess(loan.due_date, as_of))
    }

    // =========================================================================
    // Retry Loop
    // =========================================================================

    /// Runs one attempt closure under the retry budget.
    ///
    /// Only retriable failures (stale snapshots, a busy store) are retried;
    /// domain refusals surface immediately.
    async fn run_with_retry<T, F, Fut>(&self, attempt_fn: F) -> EngineResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = EngineResult<T>>,
    {
        let max = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match attempt_fn().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retriable() && attempt < max => {
                    debug!(attempt = attempt, error = %err, "Retrying after transient failure");
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.with_attempts(attempt)),
            }
        }
    }

    // =========================================================================
    // Single-Attempt Bodies
    // =========================================================================

    async fn try_borrow(
        &self,
        book_id: &str,
        member_id: &str,
        due_date: NaiveDate,
    ) -> EngineResult<Loan> {
        let mut tx = self.db.begin().await?;

        let book = ledger::book_by_id(&mut tx, book_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Book",
                id: book_id.to_string(),
            })?;

        if !ledger::member_exists(&mut tx, member_id).await? {
            return Err(EngineError::NotFound {
                entity: "Member",
                id: member_id.to_string(),
            });
        }

        match book.status {
            BookStatus::Borrowed => {
                return Err(EngineError::AlreadyBorrowed {
                    book_id: book_id.to_string(),
                });
            }
            BookStatus::Reserved => {
                let queue = ledger::reservation_queue(&mut tx, book_id).await?;
                match queue.first() {
                    Some(head) if head.member_id == member_id => {
                        // The head claims their hold; consume it.
                        ledger::remove_reservation(&mut tx, book_id, member_id).await?;
                    }
                    Some(_) => {
                        return Err(EngineError::NotQueueHead {
                            book_id: book_id.to_string(),
                        });
                    }
                    // A Reserved book with an empty queue is a normalization
                    // gap; treat it as available rather than wedging it.
                    None => {}
                }
            }
            BookStatus::Available => {}
        }

        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            book_id: book_id.to_string(),
            member_id: member_id.to_string(),
            due_date,
            return_date: None,
            fine_cents: None,
            created_at: Utc::now(),
        };
        ledger::insert_loan(&mut tx, &loan).await?;

        let moved = ledger::update_book_status(
            &mut tx,
            book_id,
            book.status,
            BookStatus::Borrowed,
            Utc::now(),
        )
        .await?;
        if !moved {
            return Err(EngineError::stale_snapshot(book_id));
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(loan)
    }

    async fn try_return(
        &self,
        book_id: &str,
        return_date: NaiveDate,
    ) -> EngineResult<ReturnReceipt> {
        let mut tx = self.db.begin().await?;

        let book = ledger::book_by_id(&mut tx, book_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Book",
                id: book_id.to_string(),
            })?;

        let (loan_id, fine, warning) = match ledger::open_loan(&mut tx, book_id).await? {
            Some(loan) => {
                let fine = self.config.fine_policy.assess(loan.due_date, return_date);
                let closed =
                    ledger::close_loan(&mut tx, &loan.id, return_date, fine.cents()).await?;
                if !closed {
                    return Err(EngineError::stale_snapshot(book_id));
                }
                (Some(loan.id), fine, None)
            }
            None => (None, Money::zero(), Some(ReturnWarning::NoActiveLoan)),
        };

        // The settled status comes from the queue, whatever the status was
        // before: a non-empty queue holds the book for its head.
        let queue = ledger::reservation_queue(&mut tx, book_id).await?;
        let settled = BookStatus::resolve_unloaned(queue.len());
        let next_holder = queue.first().map(|r| r.member_id.clone());

        if book.status != settled {
            let moved =
                ledger::update_book_status(&mut tx, book_id, book.status, settled, Utc::now())
                    .await?;
            if !moved {
                return Err(EngineError::stale_snapshot(book_id));
            }
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(ReturnReceipt {
            loan_id,
            fine,
            status: settled,
            next_holder,
            warning,
        })
    }

    async fn try_reserve(&self, book_id: &str, member_id: &str) -> EngineResult<Reservation> {
        let mut tx = self.db.begin().await?;

        let book = ledger::book_by_id(&mut tx, book_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Book",
                id: book_id.to_string(),
            })?;

        if !ledger::member_exists(&mut tx, member_id).await? {
            return Err(EngineError::NotFound {
                entity: "Member",
                id: member_id.to_string(),
            });
        }

        if !book.status.accepts_reservations() {
            return Err(EngineError::InvalidState {
                book_id: book_id.to_string(),
                status: book.status,
                operation: "reserve",
            });
        }

        if ledger::reservation_exists(&mut tx, book_id, member_id).await? {
            return Err(EngineError::DuplicateReservation {
                book_id: book_id.to_string(),
                member_id: member_id.to_string(),
            });
        }

        let reservation =
            ledger::insert_reservation(&mut tx, book_id, member_id, Utc::now()).await?;

        tx.commit().await.map_err(DbError::from)?;
        Ok(reservation)
    }

    async fn try_cancel(&self, book_id: &str, member_id: &str) -> EngineResult<BookStatus> {
        let mut tx = self.db.begin().await?;

        let book = ledger::book_by_id(&mut tx, book_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Book",
                id: book_id.to_string(),
            })?;

        if !ledger::remove_reservation(&mut tx, book_id, member_id).await? {
            return Err(EngineError::NotFound {
                entity: "Reservation",
                id: format!("{}:{}", book_id, member_id),
            });
        }

        let mut settled = book.status;
        if book.status == BookStatus::Reserved {
            let queue = ledger::reservation_queue(&mut tx, book_id).await?;
            settled = BookStatus::resolve_unloaned(queue.len());
            if settled != book.status {
                let moved =
                    ledger::update_book_status(&mut tx, book_id, book.status, settled, Utc::now())
                        .await?;
                if !moved {
                    return Err(EngineError::stale_snapshot(book_id));
                }
            }
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(settled)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use biblio_db::repository::book::new_book;
    use biblio_db::repository::member::new_member;
    use biblio_db::DbConfig;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// In-memory database with one book and three members.
    async fn setup() -> (LendingEngine, Database, String, [String; 3]) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let book = new_book("9780441013593", "Dune", "Frank Herbert", 1899);
        db.books().insert(&book).await.unwrap();

        let mut member_ids = Vec::new();
        for (first, last, email) in [
            ("Ada", "Lovelace", "ada@example.com"),
            ("Grace", "Hopper", "grace@example.com"),
            ("Edsger", "Dijkstra", "edsger@example.com"),
        ] {
            let member = new_member(first, last, email);
            db.members().insert(&member).await.unwrap();
            member_ids.push(member.id);
        }

        let engine = LendingEngine::new(db.clone());
        let members: [String; 3] = member_ids.try_into().unwrap();
        (engine, db, book.id, members)
    }

    #[tokio::test]
    async fn test_borrow_then_late_return_assesses_fine() {
        let (engine, db, book_id, [ada, ..]) = setup().await;

        // Due 2024-01-10, returned 2024-01-15, at 50 cents/day: $2.50
        let loan = engine
            .borrow(&book_id, &ada, date(2024, 1, 10))
            .await
            .unwrap();
        assert_eq!(loan.member_id, ada);
        assert!(loan.is_open());

        let book = db.books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Borrowed);

        let receipt = engine.return_book(&book_id, date(2024, 1, 15)).await.unwrap();
        assert_eq!(receipt.loan_id.as_deref(), Some(loan.id.as_str()));
        assert_eq!(receipt.fine.cents(), 250);
        assert_eq!(receipt.status, BookStatus::Available);
        assert!(receipt.next_holder.is_none());
        assert!(receipt.warning.is_none());

        let closed = db.loans().get_by_id(&loan.id).await.unwrap().unwrap();
        assert!(!closed.is_open());
        assert_eq!(closed.fine_cents, Some(250));

        let book = db.books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Available);
    }

    #[tokio::test]
    async fn test_on_time_return_is_free() {
        let (engine, _db, book_id, [ada, ..]) = setup().await;

        engine.borrow(&book_id, &ada, date(2024, 1, 10)).await.unwrap();
        let receipt = engine.return_book(&book_id, date(2024, 1, 8)).await.unwrap();
        assert!(receipt.fine.is_zero());
    }

    #[tokio::test]
    async fn test_double_borrow_is_conflict() {
        let (engine, _db, book_id, [ada, grace, _]) = setup().await;

        engine.borrow(&book_id, &ada, date(2024, 1, 10)).await.unwrap();

        let err = engine
            .borrow(&book_id, &grace, date(2024, 1, 10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(err, EngineError::AlreadyBorrowed { .. }));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let (engine, _db, book_id, [ada, ..]) = setup().await;

        let err = engine
            .borrow("no-such-book", &ada, date(2024, 1, 10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = engine
            .borrow(&book_id, "no-such-member", date(2024, 1, 10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = engine
            .preview_fine("no-such-loan", date(2024, 1, 10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_reserve_available_book_is_invalid_state() {
        let (engine, _db, book_id, [ada, ..]) = setup().await;

        let err = engine.reserve(&book_id, &ada).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(matches!(
            err,
            EngineError::InvalidState {
                status: BookStatus::Available,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_reservation_is_conflict() {
        let (engine, _db, book_id, [ada, grace, _]) = setup().await;

        engine.borrow(&book_id, &ada, date(2024, 1, 10)).await.unwrap();
        engine.reserve(&book_id, &grace).await.unwrap();

        let err = engine.reserve(&book_id, &grace).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(err, EngineError::DuplicateReservation { .. }));
    }

    #[tokio::test]
    async fn test_queue_head_priority() {
        let (engine, db, book_id, [ada, grace, edsger]) = setup().await;

        // Ada borrows; Grace then Edsger queue up.
        engine.borrow(&book_id, &ada, date(2024, 1, 10)).await.unwrap();
        engine.reserve(&book_id, &grace).await.unwrap();
        engine.reserve(&book_id, &edsger).await.unwrap();

        // Return holds the book for Grace, the queue head.
        let receipt = engine.return_book(&book_id, date(2024, 1, 10)).await.unwrap();
        assert_eq!(receipt.status, BookStatus::Reserved);
        assert_eq!(receipt.next_holder.as_deref(), Some(grace.as_str()));

        // Edsger is not the head; his borrow is refused.
        let err = engine
            .borrow(&book_id, &edsger, date(2024, 2, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(err, EngineError::NotQueueHead { .. }));

        // Grace borrows; her reservation is consumed, Edsger moves up.
        engine.borrow(&book_id, &grace, date(2024, 2, 1)).await.unwrap();
        let queue = db.reservations().queue_for_book(&book_id).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].member_id, edsger);
    }

    #[tokio::test]
    async fn test_cancel_recomputes_status() {
        let (engine, db, book_id, [ada, grace, edsger]) = setup().await;

        engine.borrow(&book_id, &ada, date(2024, 1, 10)).await.unwrap();
        engine.reserve(&book_id, &grace).await.unwrap();
        engine.reserve(&book_id, &edsger).await.unwrap();
        engine.return_book(&book_id, date(2024, 1, 10)).await.unwrap();

        // Cancelling the head keeps the book Reserved for the next in line.
        let status = engine.cancel_reservation(&book_id, &grace).await.unwrap();
        assert_eq!(status, BookStatus::Reserved);
        let queue = db.reservations().queue_for_book(&book_id).await.unwrap();
        assert_eq!(queue[0].member_id, edsger);

        // Draining the queue releases the book.
        let status = engine.cancel_reservation(&book_id, &edsger).await.unwrap();
        assert_eq!(status, BookStatus::Available);
        let book = db.books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Available);

        // Nothing left to cancel.
        let err = engine
            .cancel_reservation(&book_id, &edsger)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_cancel_does_not_touch_borrowed_status() {
        let (engine, db, book_id, [ada, grace, _]) = setup().await;

        engine.borrow(&book_id, &ada, date(2024, 1, 10)).await.unwrap();
        engine.reserve(&book_id, &grace).await.unwrap();

        let status = engine.cancel_reservation(&book_id, &grace).await.unwrap();
        assert_eq!(status, BookStatus::Borrowed);
        let book = db.books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Borrowed);
    }

    #[tokio::test]
    async fn test_return_without_loan_normalizes_status() {
        let (engine, db, book_id, _members) = setup().await;

        // Simulate a drifted record: status says borrowed, no loan exists.
        sqlx::query("UPDATE books SET status = 'borrowed' WHERE id = ?1")
            .bind(&book_id)
            .execute(db.pool())
            .await
            .unwrap();

        let receipt = engine.return_book(&book_id, date(2024, 1, 10)).await.unwrap();
        assert_eq!(receipt.warning, Some(ReturnWarning::NoActiveLoan));
        assert!(receipt.loan_id.is_none());
        assert!(receipt.fine.is_zero());
        assert_eq!(receipt.status, BookStatus::Available);

        let book = db.books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Available);
    }

    #[tokio::test]
    async fn test_return_without_loan_respects_queue() {
        let (engine, db, book_id, [ada, grace, _]) = setup().await;

        engine.borrow(&book_id, &ada, date(2024, 1, 10)).await.unwrap();
        engine.reserve(&book_id, &grace).await.unwrap();

        // Drop the loan out from under the status.
        sqlx::query("DELETE FROM loans WHERE book_id = ?1")
            .bind(&book_id)
            .execute(db.pool())
            .await
            .unwrap();

        let receipt = engine.return_book(&book_id, date(2024, 1, 10)).await.unwrap();
        assert_eq!(receipt.warning, Some(ReturnWarning::NoActiveLoan));
        assert_eq!(receipt.status, BookStatus::Reserved);
        assert_eq!(receipt.next_holder.as_deref(), Some(grace.as_str()));

        let book = db.books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Reserved);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_borrows_one_winner() {
        let (engine, db, book_id, [ada, ..]) = setup().await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            let book_id = book_id.clone();
            let ada = ada.clone();
            handles.push(tokio::spawn(async move {
                engine.borrow(&book_id, &ada, date(2024, 1, 10)).await
            }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => {
                    assert_eq!(err.kind(), ErrorKind::Conflict);
                    conflicts += 1;
                }
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(db.loans().count_open().await.unwrap(), 1);
        let book = db.books().get_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Borrowed);
    }

    #[tokio::test]
    async fn test_preview_fine_open_and_closed() {
        let (engine, _db, book_id, [ada, ..]) = setup().await;

        let loan = engine
            .borrow(&book_id, &ada, date(2024, 1, 10))
            .await
            .unwrap();

        // Open loan: assessed against the as-of date.
        let fine = engine.preview_fine(&loan.id, date(2024, 1, 13)).await.unwrap();
        assert_eq!(fine.cents(), 150);
        let fine = engine.preview_fine(&loan.id, date(2024, 1, 5)).await.unwrap();
        assert!(fine.is_zero());

        // Closed loan: the recorded fine wins over any as-of date.
        engine.return_book(&book_id, date(2024, 1, 15)).await.unwrap();
        let fine = engine.preview_fine(&loan.id, date(2024, 6, 1)).await.unwrap();
        assert_eq!(fine.cents(), 250);
    }

    #[tokio::test]
    async fn test_standard_due_date_uses_loan_period() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let engine = LendingEngine::with_config(
            db,
            EngineConfig {
                loan_period_days: 7,
                ..EngineConfig::default()
            },
        );
        let expected = Utc::now().date_naive() + chrono::Duration::days(7);
        assert_eq!(engine.standard_due_date(), expected);
    }
}
