//! # Error Types
//!
//! Validation error types for biblio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  biblio-core errors (this file)                                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  biblio-db errors (separate crate)                                     │
//! │  └── DbError          - Ledger store operation failures                │
//! │                                                                         │
//! │  biblio-engine errors (separate crate)                                 │
//! │  └── EngineError      - NotFound / Conflict / InvalidState /           │
//! │                         Unavailable, the lending taxonomy              │
//! │                                                                         │
//! │  Flow: ValidationError ──► EngineError ──► request layer ──► caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field names, limits)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any store access happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID, malformed ISBN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "isbn".to_string(),
        };
        assert_eq!(err.to_string(), "isbn is required");

        let err = ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "title must be at most 200 characters");

        let err = ValidationError::InvalidFormat {
            field: "member_id".to_string(),
            reason: "must be a valid UUID".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "member_id has invalid format: must be a valid UUID"
        );
    }
}
