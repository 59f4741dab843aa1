//! # Fine Policy
//!
//! The deterministic rule converting loan lateness into a monetary amount.
//!
//! ## Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fine Computation                                 │
//! │                                                                         │
//! │  days_late = max(0, calendar_days(return_date - due_date))             │
//! │  fine      = days_late × daily_rate                                    │
//! │                                                                         │
//! │  due 2024-01-10 │ returned 2024-01-08 │ rate $0.50 │ fine $0.00        │
//! │  due 2024-01-10 │ returned 2024-01-10 │ rate $0.50 │ fine $0.00        │
//! │  due 2024-01-10 │ returned 2024-01-15 │ rate $0.50 │ fine $2.50        │
//! │                                                                         │
//! │  Pure, deterministic, no side effects. Callable outside Return         │
//! │  (fine preview on an open loan uses "as of today" as the end date).    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::DEFAULT_DAILY_FINE_CENTS;

// =============================================================================
// Fine Policy
// =============================================================================

/// Converts lateness into a fine amount at a flat per-day rate.
///
/// ## Usage
/// ```rust
/// use biblio_core::fine::FinePolicy;
/// use biblio_core::money::Money;
/// use chrono::NaiveDate;
///
/// let policy = FinePolicy::default(); // $0.50/day
///
/// let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let returned = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// assert_eq!(policy.assess(due, returned), Money::from_cents(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePolicy {
    /// Fine accrued per calendar day overdue.
    daily_rate: Money,
}

impl FinePolicy {
    /// Creates a policy with the given per-day rate.
    ///
    /// Negative rates are clamped to zero - a policy can waive fines, it
    /// cannot pay members for being late.
    pub fn new(daily_rate: Money) -> Self {
        let daily_rate = if daily_rate.is_negative() {
            Money::zero()
        } else {
            daily_rate
        };
        FinePolicy { daily_rate }
    }

    /// The per-day rate this policy charges.
    #[inline]
    pub const fn daily_rate(&self) -> Money {
        self.daily_rate
    }

    /// Calendar days between due date and return date, floored at zero.
    ///
    /// Lateness is whole calendar days: a book due Monday and returned any
    /// time Tuesday is one day late, regardless of the hour.
    pub fn days_late(due_date: NaiveDate, return_date: NaiveDate) -> i64 {
        (return_date - due_date).num_days().max(0)
    }

    /// Computes the fine for a loan returned on `return_date`.
    ///
    /// Zero when returned on or before the due date; otherwise
    /// `days_late × daily_rate`. Monotonic non-decreasing in days late.
    pub fn assess(&self, due_date: NaiveDate, return_date: NaiveDate) -> Money {
        let days = Self::days_late(due_date, return_date);
        self.daily_rate.multiply_days(days)
    }
}

/// Default policy: fifty cents per day.
impl Default for FinePolicy {
    fn default() -> Self {
        FinePolicy::new(Money::from_cents(DEFAULT_DAILY_FINE_CENTS))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
