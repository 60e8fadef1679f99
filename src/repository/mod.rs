//! Data access layer: store contracts and their Postgres implementations

pub mod books;
pub mod loans;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookFilter},
        loan::{Loan, LoanDetails},
        page::{Page, Pagination},
    },
};

/// Persistent store of book records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn exists_by_isbn(&self, isbn: &str) -> AppResult<bool>;

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>>;

    /// Insert when `book.id` is `None`, replace otherwise. Inserting a book
    /// whose ISBN is already taken fails with `DuplicateIsbn`.
    async fn save(&self, book: &Book) -> AppResult<Book>;

    async fn delete(&self, book: &Book) -> AppResult<()>;

    /// Fuzzy search: every non-empty filter field must match
    /// case-insensitively as a substring
    async fn find(&self, filter: &BookFilter, pagination: &Pagination) -> AppResult<Page<Book>>;
}

/// Persistent store of loan records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Whether an unreturned loan exists for the given book
    async fn exists_outstanding_for_book(&self, book_id: i32) -> AppResult<bool>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Loan>>;

    /// Insert when `loan.id` is `None`, replace otherwise. The store enforces
    /// at most one outstanding loan per book: a save that would create a
    /// second one fails with `BookAlreadyLoaned`, also under concurrency.
    async fn save(&self, loan: &Loan) -> AppResult<Loan>;

    /// Loans whose book ISBN equals `isbn` OR whose customer equals
    /// `customer`; empty strings match nothing on that side
    async fn find_by_isbn_or_customer(
        &self,
        isbn: &str,
        customer: &str,
        pagination: &Pagination,
    ) -> AppResult<Page<LoanDetails>>;

    /// All loans for a book, returned or not
    async fn find_by_book(
        &self,
        book_id: i32,
        pagination: &Pagination,
    ) -> AppResult<Page<LoanDetails>>;

    /// Outstanding loans loaned on or before the given date
    async fn find_overdue(&self, loaned_on_or_before: NaiveDate) -> AppResult<Vec<Loan>>;
}

/// Store container handed to the service layer
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub loans: Arc<dyn LoanStore>,
}

impl Repository {
    /// Postgres-backed repository over the given connection pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBookStore::new(pool.clone())),
            loans: Arc::new(loans::PgLoanStore::new(pool)),
        }
    }
}
