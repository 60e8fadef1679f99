//! Loan model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;

/// Loan record. A loan references exactly one book; `returned` is tri-state
/// to match the persisted column: `None` and `Some(false)` both mean the
/// book is still checked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: Option<i32>,
    pub book_id: i32,
    pub customer: String,
    pub customer_email: Option<String>,
    pub loan_date: NaiveDate,
    pub returned: Option<bool>,
}

impl Loan {
    /// The book is currently checked out under this loan
    pub fn is_outstanding(&self) -> bool {
        !self.returned.unwrap_or(false)
    }
}

/// Loan with its book attached, for search results and API responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub customer: String,
    pub customer_email: Option<String>,
    pub loan_date: NaiveDate,
    pub returned: Option<bool>,
    pub book: Book,
}

/// Loan search filter. Matches loans whose book ISBN equals `isbn` OR whose
/// customer equals `customer` (a union, not an intersection).
#[derive(Debug, Clone, Default)]
pub struct LoanFilter {
    pub isbn: Option<String>,
    pub customer: Option<String>,
}
