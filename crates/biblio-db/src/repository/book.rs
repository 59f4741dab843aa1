//! # Book Repository
//!
//! Catalog lookups for the Query Surface.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Catalog Search Works                             │
//! │                                                                         │
//! │  User types: "tolkien"                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE match across: title, author                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ books                                   │                           │
//! │  │ The Hobbit        | J.R.R. Tolkien │ ← MATCH!                       │
//! │  │ The Two Towers    | J.R.R. Tolkien │ ← MATCH!                       │
//! │  │ Clean Code        | Robert Martin  │                                │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! │  LIKE is adequate at branch-library scale (thousands of titles).       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use biblio_core::{Book, BookStatus};

/// Repository for catalog read paths.
///
/// ## Usage
/// ```rust,ignore
/// let repo = BookRepository::new(pool);
///
/// // Search the catalog
/// let results = repo.search("tolkien", 20).await?;
///
/// // Availability check
/// let book = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Gets a book by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Book))` - Book found
    /// * `Ok(None)` - Book not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, isbn, title, author, price_cents, status, created_at, updated_at
            FROM books
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Gets a book by its ISBN.
    pub async fn get_by_isbn(&self, isbn: &str) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, isbn, title, author, price_cents, status, created_at, updated_at
            FROM books
            WHERE isbn = ?1
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Searches the catalog by title or author substring.
    ///
    /// An empty query lists the catalog sorted by title.
    ///
    /// ## Arguments
    /// * `query` - Search term (can be partial)
    /// * `limit` - Maximum results to return
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Book>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching catalog");

        if query.is_empty() {
            let books = sqlx::query_as::<_, Book>(
                r#"
                SELECT id, isbn, title, author, price_cents, status, created_at, updated_at
                FROM books
                ORDER BY title
                LIMIT ?1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            return Ok(books);
        }

        let pattern = format!("%{}%", query);

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, isbn, title, author, price_cents, status, created_at, updated_at
            FROM books
            WHERE title LIKE ?1 OR author LIKE ?1
            ORDER BY title
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = books.len(), "Search returned books");
        Ok(books)
    }

    /// Lists books currently in a given status.
    ///
    /// The availability view: `available(BookStatus::Available)` is what a
    /// member browsing the shelves sees.
    pub async fn in_status(&self, status: BookStatus, limit: u32) -> DbResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, isbn, title, author, price_cents, status, created_at, updated_at
            FROM books
            WHERE status = ?1
            ORDER BY title
            LIMIT ?2
            "#,
        )
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Inserts a new catalog record.
    ///
    /// ## Scope Note
    /// Catalog management belongs to an external collaborator; this is the
    /// storage primitive it (and the seed tool, and tests) uses. New books
    /// always start `Available`.
    pub async fn insert(&self, book: &Book) -> DbResult<()> {
        debug!(isbn = %book.isbn, title = %book.title, "Inserting book");

        sqlx::query(
            r#"
            INSERT INTO books (id, isbn, title, author, price_cents, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&book.id)
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.price_cents)
        .bind(book.status)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts catalog records (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to build a new catalog record with generated id and timestamps.
pub fn new_book(isbn: &str, title: &str, author: &str, price_cents: i64) -> Book {
    let now = Utc::now();
    Book {
        id: generate_book_id(),
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        price_cents,
        status: BookStatus::Available,
        created_at: now,
        updated_at: now,
    }
}

/// Helper to generate a new book ID.
pub fn generate_book_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_get_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.books();

        repo.insert(&new_book("9780261102217", "The Hobbit", "J.R.R. Tolkien", 1499))
            .await
            .unwrap();
        repo.insert(&new_book("9780132350884", "Clean Code", "Robert C. Martin", 2499))
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);

        let hobbit = repo.get_by_isbn("9780261102217").await.unwrap().unwrap();
        assert_eq!(hobbit.status, BookStatus::Available);
        assert_eq!(hobbit.price().cents(), 1499);

        let by_id = repo.get_by_id(&hobbit.id).await.unwrap().unwrap();
        assert_eq!(by_id.title, "The Hobbit");

        let hits = repo.search("tolkien", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "The Hobbit");

        // Empty query lists by title
        let all = repo.search("", 20).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Clean Code");

        let available = repo.in_status(BookStatus::Available, 20).await.unwrap();
        assert_eq!(available.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_isbn_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.books();

        repo.insert(&new_book("9780261102217", "The Hobbit", "J.R.R. Tolkien", 1499))
            .await
            .unwrap();
        let err = repo
            .insert(&new_book("9780261102217", "The Hobbit (dup)", "J.R.R. Tolkien", 1499))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
