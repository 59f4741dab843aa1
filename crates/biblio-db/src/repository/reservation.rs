//! # Reservation Repository
//!
//! Read access to reservation queues for the Query Surface.
//!
//! Queue mutation (append, consume, cancel) happens ONLY inside the Lending
//! Engine's per-book transaction (see [`crate::ledger`]): the queue is read
//! and written in the same atomic unit as the book-status decision that
//! depends on it. This repository exposes the queue contents to read-only
//! collaborators.

use sqlx::SqlitePool;

use crate::error::DbResult;
use biblio_core::Reservation;

/// Repository for reservation read paths.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    /// Creates a new ReservationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Lists the FIFO queue for a book; index 0 is the head.
    pub async fn queue_for_book(&self, book_id: &str) -> DbResult<Vec<Reservation>> {
        let queue = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, book_id, member_id, created_at
            FROM reservations
            WHERE book_id = ?1
            ORDER BY id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(queue)
    }

    /// Lists a member's open reservations, oldest first.
    pub async fn for_member(&self, member_id: &str) -> DbResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, book_id, member_id, created_at
            FROM reservations
            WHERE member_id = ?1
            ORDER BY id
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// Counts queued reservations for a book.
    pub async fn count_for_book(&self, book_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE book_id = ?1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
