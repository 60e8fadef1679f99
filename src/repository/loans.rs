//! Loans store over Postgres

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{Loan, LoanDetails},
        page::{Page, Pagination},
    },
};

use super::LoanStore;

/// Maps a violation of the one-outstanding-loan-per-book partial unique
/// index to the business error. This is what closes the race between two
/// concurrent loan creations for the same book.
fn map_outstanding_conflict(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db)
            if db.constraint() == Some("loans_one_outstanding_per_book") =>
        {
            AppError::BookAlreadyLoaned
        }
        _ => AppError::Database(e),
    }
}

fn loan_details_from_row(row: &sqlx::postgres::PgRow) -> LoanDetails {
    LoanDetails {
        id: row.get("id"),
        customer: row.get("customer"),
        customer_email: row.get("customer_email"),
        loan_date: row.get("loan_date"),
        returned: row.get("returned"),
        book: Book {
            id: row.get("book_id"),
            title: row.get("title"),
            author: row.get("author"),
            isbn: row.get("isbn"),
        },
    }
}

#[derive(Clone)]
pub struct PgLoanStore {
    pool: Pool<Postgres>,
}

impl PgLoanStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for PgLoanStore {
    async fn exists_outstanding_for_book(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM loans
                WHERE book_id = $1 AND (returned IS NULL OR returned = FALSE)
            )
            "#,
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, customer, customer_email, loan_date, returned
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn save(&self, loan: &Loan) -> AppResult<Loan> {
        let saved = match loan.id {
            Some(id) => sqlx::query_as::<_, Loan>(
                r#"
                UPDATE loans
                SET customer = $1, customer_email = $2, loan_date = $3, returned = $4
                WHERE id = $5
                RETURNING id, book_id, customer, customer_email, loan_date, returned
                "#,
            )
            .bind(&loan.customer)
            .bind(&loan.customer_email)
            .bind(loan.loan_date)
            .bind(loan.returned)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_outstanding_conflict)?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?,
            None => sqlx::query_as::<_, Loan>(
                r#"
                INSERT INTO loans (book_id, customer, customer_email, loan_date, returned)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, book_id, customer, customer_email, loan_date, returned
                "#,
            )
            .bind(loan.book_id)
            .bind(&loan.customer)
            .bind(&loan.customer_email)
            .bind(loan.loan_date)
            .bind(loan.returned)
            .fetch_one(&self.pool)
            .await
            .map_err(map_outstanding_conflict)?,
        };

        Ok(saved)
    }

    async fn find_by_isbn_or_customer(
        &self,
        isbn: &str,
        customer: &str,
        pagination: &Pagination,
    ) -> AppResult<Page<LoanDetails>> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE b.isbn = $1 OR l.customer = $2
            "#,
        )
        .bind(isbn)
        .bind(customer)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT l.id, l.customer, l.customer_email, l.loan_date, l.returned,
                   b.id as book_id, b.title, b.author, b.isbn
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE b.isbn = $1 OR l.customer = $2
            ORDER BY l.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(isbn)
        .bind(customer)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let content = rows.iter().map(loan_details_from_row).collect();

        Ok(Page::new(content, pagination, total))
    }

    async fn find_by_book(
        &self,
        book_id: i32,
        pagination: &Pagination,
    ) -> AppResult<Page<LoanDetails>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT l.id, l.customer, l.customer_email, l.loan_date, l.returned,
                   b.id as book_id, b.title, b.author, b.isbn
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE l.book_id = $1
            ORDER BY l.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(book_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let content = rows.iter().map(loan_details_from_row).collect();

        Ok(Page::new(content, pagination, total))
    }

    async fn find_overdue(&self, loaned_on_or_before: NaiveDate) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, customer, customer_email, loan_date, returned
            FROM loans
            WHERE loan_date <= $1 AND (returned IS NULL OR returned = FALSE)
            ORDER BY loan_date
            "#,
        )
        .bind(loaned_on_or_before)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }
}
