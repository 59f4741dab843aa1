//! # Seed Binary
//!
//! Seeds a database with demo catalog and membership data.
//!
//! ## Usage
//! ```bash
//! cargo run --bin seed -- [path/to/biblio.db]
//! ```
//!
//! Defaults to `./biblio.db`. Safe to re-run: duplicate ISBNs/emails are
//! skipped, existing lending state is untouched.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use biblio_core::validation::{validate_isbn, validate_price_cents, validate_title};
use biblio_db::repository::book::new_book;
use biblio_db::repository::member::new_member;
use biblio_db::{Database, DbConfig, DbError};

/// Demo catalog: (isbn, title, author, price_cents)
const CATALOG: &[(&str, &str, &str, i64)] = &[
    ("9780261102217", "The Hobbit", "J.R.R. Tolkien", 1499),
    ("9780441013593", "Dune", "Frank Herbert", 1899),
    ("9780132350884", "Clean Code", "Robert C. Martin", 2499),
    ("9780201633610", "Design Patterns", "Erich Gamma", 3999),
    ("9780135957059", "The Pragmatic Programmer", "David Thomas", 2999),
    ("9780062316097", "Sapiens", "Yuval Noah Harari", 1799),
];

/// Demo membership: (first, last, email)
const MEMBERS: &[(&str, &str, &str)] = &[
    ("Ada", "Lovelace", "ada@example.com"),
    ("Grace", "Hopper", "grace@example.com"),
    ("Edsger", "Dijkstra", "edsger@example.com"),
];

#[tokio::main]
async fn main() -> Result<(), DbError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "biblio.db".to_string());
    info!(path = %path, "Seeding database");

    let db = Database::new(DbConfig::new(&path)).await?;

    let mut inserted_books = 0;
    for (isbn, title, author, price_cents) in CATALOG {
        if let Err(e) = validate_isbn(isbn)
            .and_then(|_| validate_title(title))
            .and_then(|_| validate_price_cents(*price_cents))
        {
            warn!(isbn = %isbn, error = %e, "Skipping invalid catalog entry");
            continue;
        }

        match db.books().insert(&new_book(isbn, title, author, *price_cents)).await {
            Ok(()) => inserted_books += 1,
            Err(DbError::UniqueViolation { .. }) => {
                info!(isbn = %isbn, "Already present, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    let mut inserted_members = 0;
    for (first, last, email) in MEMBERS {
        match db.members().insert(&new_member(first, last, email)).await {
            Ok(()) => inserted_members += 1,
            Err(DbError::UniqueViolation { .. }) => {
                info!(email = %email, "Already present, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        books = inserted_books,
        members = inserted_members,
        total_books = db.books().count().await?,
        total_members = db.members().count().await?,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}
