//! # Ledger Primitives
//!
//! Transaction-scoped building blocks for the Lending Engine.
//!
//! ## Why Not Repositories?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              One Operation = One Transaction                            │
//! │                                                                         │
//! │  A lending operation is several reads and writes that must be          │
//! │  observed as a single step:                                            │
//! │                                                                         │
//! │  Return(book):   close open loan                                       │
//! │                  read reservation queue                                │
//! │                  resolve book status (Reserved / Available)            │
//! │                     └── all inside ONE transaction                     │
//! │                                                                         │
//! │  Pool-backed repositories each grab their own connection, so a         │
//! │  sequence of repository calls is NOT atomic. Every function in this    │
//! │  module instead takes `&mut SqliteConnection`, and the engine threads  │
//! │  one `Database::begin()` transaction through all of them.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conditional Writes
//! Status updates are guarded: `UPDATE books SET status = new WHERE id = ?
//! AND status = expected`. A `false` return means the snapshot this
//! operation read is stale - another operation committed in between - and
//! the caller should retry from the top. This is the optimistic half of the
//! per-book serialization discipline; SQLite's write lock is the
//! pessimistic half.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use biblio_core::{Book, BookStatus, Loan, Reservation};

// =============================================================================
// Reads
// =============================================================================

/// Fetches a book by id inside the current transaction.
pub async fn book_by_id(conn: &mut SqliteConnection, book_id: &str) -> DbResult<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(
        r#"
        SELECT id, isbn, title, author, price_cents, status, created_at, updated_at
        FROM books
        WHERE id = ?1
        "#,
    )
    .bind(book_id)
    .fetch_optional(conn)
    .await?;

    Ok(book)
}

/// Checks member existence. The engine never reads member profile data.
pub async fn member_exists(conn: &mut SqliteConnection, member_id: &str) -> DbResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE id = ?1")
        .bind(member_id)
        .fetch_one(conn)
        .await?;

    Ok(count > 0)
}

/// Fetches the open loan for a book, if any.
///
/// The partial unique index guarantees at most one row can match.
pub async fn open_loan(conn: &mut SqliteConnection, book_id: &str) -> DbResult<Option<Loan>> {
    let loan = sqlx::query_as::<_, Loan>(
        r#"
        SELECT id, book_id, member_id, due_date, return_date, fine_cents, created_at
        FROM loans
        WHERE book_id = ?1 AND return_date IS NULL
        "#,
    )
    .bind(book_id)
    .fetch_optional(conn)
    .await?;

    Ok(loan)
}

/// Fetches the reservation queue for a book in FIFO order.
///
/// Ordered by the AUTOINCREMENT id, so creation order is the queue order
/// even when timestamps collide. Index 0 is the queue head.
pub async fn reservation_queue(
    conn: &mut SqliteConnection,
    book_id: &str,
) -> DbResult<Vec<Reservation>> {
    let queue = sqlx::query_as::<_, Reservation>(
        r#"
        SELECT id, book_id, member_id, created_at
        FROM reservations
        WHERE book_id = ?1
        ORDER BY id
        "#,
    )
    .bind(book_id)
    .fetch_all(conn)
    .await?;

    Ok(queue)
}

/// Checks whether a member already holds an open reservation for a book.
pub async fn reservation_exists(
    conn: &mut SqliteConnection,
    book_id: &str,
    member_id: &str,
) -> DbResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE book_id = ?1 AND member_id = ?2")
            .bind(book_id)
            .bind(member_id)
            .fetch_one(conn)
            .await?;

    Ok(count > 0)
}

// =============================================================================
// Writes
// =============================================================================

/// Inserts a new open loan.
///
/// The partial unique index on `loans(book_id) WHERE return_date IS NULL`
/// is the store-level backstop: even if two transactions somehow both pass
/// the status check, the second insert fails with a unique violation.
pub async fn insert_loan(conn: &mut SqliteConnection, loan: &Loan) -> DbResult<()> {
    debug!(loan_id = %loan.id, book_id = %loan.book_id, member_id = %loan.member_id, "Inserting loan");

    sqlx::query(
        r#"
        INSERT INTO loans (id, book_id, member_id, due_date, return_date, fine_cents, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&loan.id)
    .bind(&loan.book_id)
    .bind(&loan.member_id)
    .bind(loan.due_date)
    .bind(loan.return_date)
    .bind(loan.fine_cents)
    .bind(loan.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Closes an open loan: sets the return date and the assessed fine.
///
/// Returns `false` when the loan was already closed (or does not exist) -
/// the guard in the WHERE clause refused the write.
pub async fn close_loan(
    conn: &mut SqliteConnection,
    loan_id: &str,
    return_date: NaiveDate,
    fine_cents: i64,
) -> DbResult<bool> {
    debug!(loan_id = %loan_id, fine_cents = %fine_cents, "Closing loan");

    let result = sqlx::query(
        r#"
        UPDATE loans
        SET return_date = ?2, fine_cents = ?3
        WHERE id = ?1 AND return_date IS NULL
        "#,
    )
    .bind(loan_id)
    .bind(return_date)
    .bind(fine_cents)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Appends a reservation to the book's FIFO queue.
///
/// The queue position is the AUTOINCREMENT id assigned by SQLite.
pub async fn insert_reservation(
    conn: &mut SqliteConnection,
    book_id: &str,
    member_id: &str,
    created_at: DateTime<Utc>,
) -> DbResult<Reservation> {
    debug!(book_id = %book_id, member_id = %member_id, "Inserting reservation");

    let result = sqlx::query(
        r#"
        INSERT INTO reservations (book_id, member_id, created_at)
        VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(book_id)
    .bind(member_id)
    .bind(created_at)
    .execute(conn)
    .await?;

    Ok(Reservation {
        id: result.last_insert_rowid(),
        book_id: book_id.to_string(),
        member_id: member_id.to_string(),
        created_at,
    })
}

/// Removes a member's reservation for a book.
///
/// Returns `false` when no such reservation existed.
pub async fn remove_reservation(
    conn: &mut SqliteConnection,
    book_id: &str,
    member_id: &str,
) -> DbResult<bool> {
    debug!(book_id = %book_id, member_id = %member_id, "Removing reservation");

    let result = sqlx::query("DELETE FROM reservations WHERE book_id = ?1 AND member_id = ?2")
        .bind(book_id)
        .bind(member_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Conditionally transitions a book's status.
///
/// The write only lands when the book still carries the status this
/// operation observed when it started. Returns `false` on a stale snapshot;
/// the caller retries the whole operation.
pub async fn update_book_status(
    conn: &mut SqliteConnection,
    book_id: &str,
    expected: BookStatus,
    new: BookStatus,
    updated_at: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(book_id = %book_id, from = ?expected, to = ?new, "Updating book status");

    let result = sqlx::query(
        r#"
        UPDATE books
        SET status = ?3, updated_at = ?4
        WHERE id = ?1 AND status = ?2
        "#,
    )
    .bind(book_id)
    .bind(expected)
    .bind(new)
    .bind(updated_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::book::generate_book_id;
    use chrono::Utc;
    use uuid::Uuid;

    async fn setup() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let book_id = generate_book_id();
        sqlx::query(
            "INSERT INTO books (id, isbn, title, author, price_cents, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'available', ?6, ?6)",
        )
        .bind(&book_id)
        .bind("9780132350884")
        .bind("Clean Code")
        .bind("Robert C. Martin")
        .bind(2499_i64)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();

        let member_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO members (id, first_name, last_name, email, created_at)
             VALUES (?1, 'Ada', 'Lovelace', 'ada@example.com', ?2)",
        )
        .bind(&member_id)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();

        (db, book_id, member_id)
    }

    #[tokio::test]
    async fn test_book_and_member_reads() {
        let (db, book_id, member_id) = setup().await;
        let mut tx = db.begin().await.unwrap();

        let book = book_by_id(&mut tx, &book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Available);
        assert_eq!(book.title, "Clean Code");

        assert!(member_exists(&mut tx, &member_id).await.unwrap());
        assert!(!member_exists(&mut tx, "no-such-member").await.unwrap());
        assert!(book_by_id(&mut tx, "no-such-book").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_loan_round_trip() {
        let (db, book_id, member_id) = setup().await;
        let mut tx = db.begin().await.unwrap();

        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            book_id: book_id.clone(),
            member_id: member_id.clone(),
            due_date: Utc::now().date_naive(),
            return_date: None,
            fine_cents: None,
            created_at: Utc::now(),
        };
        insert_loan(&mut tx, &loan).await.unwrap();

        let open = open_loan(&mut tx, &book_id).await.unwrap().unwrap();
        assert_eq!(open.id, loan.id);
        assert!(open.is_open());

        let closed = close_loan(&mut tx, &loan.id, Utc::now().date_naive(), 0)
            .await
            .unwrap();
        assert!(closed);
        assert!(open_loan(&mut tx, &book_id).await.unwrap().is_none());

        // Closing again refuses the write
        let closed_again = close_loan(&mut tx, &loan.id, Utc::now().date_naive(), 0)
            .await
            .unwrap();
        assert!(!closed_again);

        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_loan_unique_index() {
        let (db, book_id, member_id) = setup().await;
        let mut tx = db.begin().await.unwrap();

        let make_loan = || Loan {
            id: Uuid::new_v4().to_string(),
            book_id: book_id.clone(),
            member_id: member_id.clone(),
            due_date: Utc::now().date_naive(),
            return_date: None,
            fine_cents: None,
            created_at: Utc::now(),
        };

        insert_loan(&mut tx, &make_loan()).await.unwrap();

        // The partial unique index rejects a second open loan for the book
        let err = insert_loan(&mut tx, &make_loan()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_reservation_queue_is_fifo() {
        let (db, book_id, _member_id) = setup().await;
        let now = Utc::now();

        // Two more members waiting on the same book
        let mut members = Vec::new();
        for (i, name) in ["Grace", "Edsger"].iter().enumerate() {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO members (id, first_name, last_name, email, created_at)
                 VALUES (?1, ?2, 'X', ?3, ?4)",
            )
            .bind(&id)
            .bind(name)
            .bind(format!("m{}@example.com", i))
            .bind(now)
            .execute(db.pool())
            .await
            .unwrap();
            members.push(id);
        }

        let mut tx = db.begin().await.unwrap();
        // Insert with identical timestamps: FIFO must still hold
        insert_reservation(&mut tx, &book_id, &members[0], now)
            .await
            .unwrap();
        insert_reservation(&mut tx, &book_id, &members[1], now)
            .await
            .unwrap();

        let queue = reservation_queue(&mut tx, &book_id).await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].member_id, members[0]);
        assert_eq!(queue[1].member_id, members[1]);

        assert!(reservation_exists(&mut tx, &book_id, &members[0])
            .await
            .unwrap());
        assert!(remove_reservation(&mut tx, &book_id, &members[0])
            .await
            .unwrap());
        assert!(!remove_reservation(&mut tx, &book_id, &members[0])
            .await
            .unwrap());

        let queue = reservation_queue(&mut tx, &book_id).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].member_id, members[1]);
    }

    #[tokio::test]
    async fn test_update_book_status_guard() {
        let (db, book_id, _member) = setup().await;
        let mut tx = db.begin().await.unwrap();
        let now = Utc::now();

        // Matching expectation: write lands
        let moved =
            update_book_status(&mut tx, &book_id, BookStatus::Available, BookStatus::Borrowed, now)
                .await
                .unwrap();
        assert!(moved);

        // Stale expectation: write refused
        let moved =
            update_book_status(&mut tx, &book_id, BookStatus::Available, BookStatus::Reserved, now)
                .await
                .unwrap();
        assert!(!moved);

        let book = book_by_id(&mut tx, &book_id).await.unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Borrowed);
    }
}
