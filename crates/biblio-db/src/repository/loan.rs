//! # Loan Repository
//!
//! Loan history projections for the Query Surface.
//!
//! ## Projections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Loan Read Paths                                   │
//! │                                                                         │
//! │  Member view:   active_for_member(m) → "what do I have out?"           │
//! │  Admin view:    all_open()           → every outstanding loan          │
//! │  Book view:     history_for_book(b)  → full lending history            │
//! │  Fine preview:  get_by_id(loan)      → engine's preview_fine input     │
//! │                                                                         │
//! │  All read-only. Loans are created and closed ONLY inside the           │
//! │  Lending Engine's transaction (see crate::ledger).                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use biblio_core::Loan;

/// Repository for loan read paths.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    /// Creates a new LoanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoanRepository { pool }
    }

    /// Gets a loan by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, member_id, due_date, return_date, fine_cents, created_at
            FROM loans
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    /// Lists a member's open loans, soonest due first.
    pub async fn active_for_member(&self, member_id: &str) -> DbResult<Vec<Loan>> {
        debug!(member_id = %member_id, "Listing active loans for member");

        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, member_id, due_date, return_date, fine_cents, created_at
            FROM loans
            WHERE member_id = ?1 AND return_date IS NULL
            ORDER BY due_date ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Lists the full lending history of a book, newest first.
    pub async fn history_for_book(&self, book_id: &str) -> DbResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, member_id, due_date, return_date, fine_cents, created_at
            FROM loans
            WHERE book_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Lists every open loan, soonest due first (the admin circulation view).
    pub async fn all_open(&self) -> DbResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, member_id, due_date, return_date, fine_cents, created_at
            FROM loans
            WHERE return_date IS NULL
            ORDER BY due_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Counts open loans (for diagnostics).
    pub async fn count_open(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE return_date IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
