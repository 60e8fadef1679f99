//! In-memory store fakes backing the service-level tests.
//!
//! Both stores serialize access through a single mutex over the shared
//! tables, and the loan store enforces the same one-outstanding-loan-per-book
//! constraint the Postgres partial unique index does, so racing loan
//! creations resolve the same way they would against the real database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use alexandria_server::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter},
        loan::{Loan, LoanDetails},
        page::{Page, Pagination},
    },
    repository::{BookStore, LoanStore, Repository},
};

#[derive(Default)]
struct Tables {
    books: Vec<Book>,
    loans: Vec<Loan>,
    next_book_id: i32,
    next_loan_id: i32,
}

impl Tables {
    fn new() -> Self {
        Self {
            next_book_id: 1,
            next_loan_id: 1,
            ..Self::default()
        }
    }
}

/// Repository over fresh in-memory tables
pub fn repository() -> Repository {
    let tables = Arc::new(Mutex::new(Tables::new()));
    Repository {
        books: Arc::new(InMemoryBookStore {
            tables: tables.clone(),
        }),
        loans: Arc::new(InMemoryLoanStore { tables }),
    }
}

pub struct InMemoryBookStore {
    tables: Arc<Mutex<Tables>>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn paginate<T: Clone>(matches: &[T], pagination: &Pagination) -> Page<T> {
    let total = matches.len() as i64;
    let content = matches
        .iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit() as usize)
        .cloned()
        .collect();
    Page::new(content, pagination, total)
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn exists_by_isbn(&self, isbn: &str) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.books.iter().any(|b| b.isbn == isbn))
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.books.iter().find(|b| b.isbn == isbn).cloned())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.books.iter().find(|b| b.id == Some(id)).cloned())
    }

    async fn save(&self, book: &Book) -> AppResult<Book> {
        let mut tables = self.tables.lock().unwrap();

        let duplicate = tables
            .books
            .iter()
            .any(|b| b.isbn == book.isbn && b.id != book.id);
        if duplicate {
            return Err(AppError::DuplicateIsbn);
        }

        match book.id {
            Some(id) => {
                let existing = tables
                    .books
                    .iter_mut()
                    .find(|b| b.id == Some(id))
                    .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
                *existing = book.clone();
                Ok(existing.clone())
            }
            None => {
                let saved = Book {
                    id: Some(tables.next_book_id),
                    ..book.clone()
                };
                tables.next_book_id += 1;
                tables.books.push(saved.clone());
                Ok(saved)
            }
        }
    }

    async fn delete(&self, book: &Book) -> AppResult<()> {
        let id = book
            .id
            .ok_or_else(|| AppError::InvalidArgument("Book id can't be null.".to_string()))?;

        let mut tables = self.tables.lock().unwrap();
        let before = tables.books.len();
        tables.books.retain(|b| b.id != Some(id));
        if tables.books.len() == before {
            return Err(AppError::InvalidArgument(format!(
                "Book with id {} does not exist.",
                id
            )));
        }
        Ok(())
    }

    async fn find(&self, filter: &BookFilter, pagination: &Pagination) -> AppResult<Page<Book>> {
        let title = filter.title.as_deref().unwrap_or("");
        let author = filter.author.as_deref().unwrap_or("");
        let isbn = filter.isbn.as_deref().unwrap_or("");

        let tables = self.tables.lock().unwrap();
        let matches: Vec<Book> = tables
            .books
            .iter()
            .filter(|b| {
                contains_ci(&b.title, title)
                    && contains_ci(&b.author, author)
                    && contains_ci(&b.isbn, isbn)
            })
            .cloned()
            .collect();

        Ok(paginate(&matches, pagination))
    }
}

pub struct InMemoryLoanStore {
    tables: Arc<Mutex<Tables>>,
}

fn details(loan: &Loan, book: &Book) -> LoanDetails {
    LoanDetails {
        id: loan.id.unwrap_or_default(),
        customer: loan.customer.clone(),
        customer_email: loan.customer_email.clone(),
        loan_date: loan.loan_date,
        returned: loan.returned,
        book: book.clone(),
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn exists_outstanding_for_book(&self, book_id: i32) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .loans
            .iter()
            .any(|l| l.book_id == book_id && l.is_outstanding()))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.loans.iter().find(|l| l.id == Some(id)).cloned())
    }

    async fn save(&self, loan: &Loan) -> AppResult<Loan> {
        let mut tables = self.tables.lock().unwrap();

        if loan.is_outstanding() {
            let conflicting = tables
                .loans
                .iter()
                .any(|l| l.book_id == loan.book_id && l.is_outstanding() && l.id != loan.id);
            if conflicting {
                return Err(AppError::BookAlreadyLoaned);
            }
        }

        match loan.id {
            Some(id) => {
                let existing = tables
                    .loans
                    .iter_mut()
                    .find(|l| l.id == Some(id))
                    .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;
                *existing = loan.clone();
                Ok(existing.clone())
            }
            None => {
                let saved = Loan {
                    id: Some(tables.next_loan_id),
                    ..loan.clone()
                };
                tables.next_loan_id += 1;
                tables.loans.push(saved.clone());
                Ok(saved)
            }
        }
    }

    async fn find_by_isbn_or_customer(
        &self,
        isbn: &str,
        customer: &str,
        pagination: &Pagination,
    ) -> AppResult<Page<LoanDetails>> {
        let tables = self.tables.lock().unwrap();
        let matches: Vec<LoanDetails> = tables
            .loans
            .iter()
            .filter_map(|l| {
                let book = tables.books.iter().find(|b| b.id == Some(l.book_id))?;
                if book.isbn == isbn || l.customer == customer {
                    Some(details(l, book))
                } else {
                    None
                }
            })
            .collect();

        Ok(paginate(&matches, pagination))
    }

    async fn find_by_book(
        &self,
        book_id: i32,
        pagination: &Pagination,
    ) -> AppResult<Page<LoanDetails>> {
        let tables = self.tables.lock().unwrap();
        let matches: Vec<LoanDetails> = tables
            .loans
            .iter()
            .filter(|l| l.book_id == book_id)
            .filter_map(|l| {
                let book = tables.books.iter().find(|b| b.id == Some(l.book_id))?;
                Some(details(l, book))
            })
            .collect();

        Ok(paginate(&matches, pagination))
    }

    async fn find_overdue(&self, loaned_on_or_before: NaiveDate) -> AppResult<Vec<Loan>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .loans
            .iter()
            .filter(|l| l.loan_date <= loaned_on_or_before && l.is_outstanding())
            .cloned()
            .collect())
    }
}
