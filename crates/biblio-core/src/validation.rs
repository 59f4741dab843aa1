//! # Validation Module
//!
//! Input validation utilities for the Biblio lending system.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request layer (out of scope)                                 │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── THIS MODULE: shared validation rules                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Lending Engine (Rust)                                        │
//! │  ├── Typed inputs (deserialization already happened)                   │
//! │  └── State machine preconditions (Conflict / InvalidState)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger Store (SQLite)                                        │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (isbn, email, open loan per book)              │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Multiple layers catch different errors                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use biblio_core::validation::{validate_isbn, validate_title};
//!
//! validate_isbn("9780132350884").unwrap();
//! validate_title("Clean Code").unwrap();
//! ```

use crate::error::{ValidationError, ValidationResult};

// =============================================================================
// String Validators
// =============================================================================

/// Validates an ISBN.
///
/// ## Rules
/// - Must not be empty
/// - Hyphens and spaces are ignored
/// - Must be 10 or 13 digits (last ISBN-10 character may be `X`)
///
/// ## Example
/// ```rust
/// use biblio_core::validation::validate_isbn;
///
/// assert!(validate_isbn("978-0-13-235088-4").is_ok());
/// assert!(validate_isbn("0321125215").is_ok());
/// assert!(validate_isbn("").is_err());
/// assert!(validate_isbn("not-an-isbn").is_err());
/// ```
pub fn validate_isbn(isbn: &str) -> ValidationResult<()> {
    let compact: String = isbn
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if compact.is_empty() {
        return Err(ValidationError::Required {
            field: "isbn".to_string(),
        });
    }

    let digits_ok = match compact.len() {
        // ISBN-10 allows a trailing X check digit
        10 => {
            compact[..9].chars().all(|c| c.is_ascii_digit())
                && compact
                    .chars()
                    .last()
                    .is_some_and(|c| c.is_ascii_digit() || c == 'X' || c == 'x')
        }
        13 => compact.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    };

    if !digits_ok {
        return Err(ValidationError::InvalidFormat {
            field: "isbn".to_string(),
            reason: "must be 10 or 13 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a book title.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a catalog search query.
///
/// ## Rules
/// - Can be empty (returns default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (donated copies with no replacement cost on file)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a daily fine rate in cents.
///
/// ## Rules
/// - Must be between 0 and 10_000 cents ($100/day is already punitive)
pub fn validate_daily_fine_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=10_000).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "daily_fine".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates an entity id (book, member, loan) as a UUID string.
///
/// ## Example
/// ```rust
/// use biblio_core::validation::validate_entity_id;
///
/// assert!(validate_entity_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_entity_id("not-a-uuid").is_err());
/// ```
pub fn validate_entity_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_isbn() {
        // Valid ISBNs
        assert!(validate_isbn("9780132350884").is_ok());
        assert!(validate_isbn("978-0-13-235088-4").is_ok());
        assert!(validate_isbn("0321125215").is_ok());
        assert!(validate_isbn("032112521X").is_ok());

        // Invalid ISBNs
        assert!(validate_isbn("").is_err());
        assert!(validate_isbn("   ").is_err());
        assert!(validate_isbn("12345").is_err());
        assert!(validate_isbn("not-an-isbn").is_err());
        assert!(validate_isbn("97801323508841234").is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Clean Code").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  tolkien ").unwrap(), "tolkien");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(150)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(2499).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_daily_fine_cents() {
        assert!(validate_daily_fine_cents(0).is_ok());
        assert!(validate_daily_fine_cents(50).is_ok());
        assert!(validate_daily_fine_cents(10_000).is_ok());
        assert!(validate_daily_fine_cents(10_001).is_err());
        assert!(validate_daily_fine_cents(-1).is_err());
    }

    #[test]
    fn test_validate_entity_id() {
        assert!(validate_entity_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_entity_id("").is_err());
        assert!(validate_entity_id("123").is_err());
    }
}
