//! Loan lifecycle service

use chrono::{Duration, NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{Loan, LoanDetails, LoanFilter},
        page::{Page, Pagination},
    },
    repository::Repository,
};

/// Days after which an outstanding loan counts as late. Fixed policy, not
/// configurable.
const OVERDUE_LOAN_DAYS: i64 = 4;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Loan a book out. At most one outstanding loan may exist per book; the
    /// store constraint makes the check-and-insert effectively atomic, so
    /// two concurrent creations for the same book cannot both succeed.
    pub async fn create_loan(
        &self,
        book: &Book,
        customer: String,
        customer_email: Option<String>,
        loan_date: NaiveDate,
    ) -> AppResult<Loan> {
        let book_id = book
            .id
            .ok_or_else(|| AppError::InvalidArgument("Book id can't be null.".to_string()))?;

        if self
            .repository
            .loans
            .exists_outstanding_for_book(book_id)
            .await?
        {
            return Err(AppError::BookAlreadyLoaned);
        }

        let loan = Loan {
            id: None,
            book_id,
            customer,
            customer_email,
            loan_date,
            returned: None,
        };
        self.repository.loans.save(&loan).await
    }

    /// Absence is not an error; callers decide how to surface it
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        self.repository.loans.find_by_id(id).await
    }

    /// Persist a loan as given. This is the return transition: the caller
    /// flips `returned` and calls update. Transition legality is not
    /// re-checked; re-returning an already-returned loan is accepted.
    pub async fn update_loan(&self, loan: &Loan) -> AppResult<Loan> {
        if loan.id.is_none() {
            return Err(AppError::InvalidArgument("Loan id can't be null.".to_string()));
        }
        self.repository.loans.save(loan).await
    }

    /// Search loans by book ISBN or customer. The two filter fields combine
    /// as a union, so either one alone is enough to match.
    pub async fn find(
        &self,
        filter: &LoanFilter,
        pagination: &Pagination,
    ) -> AppResult<Page<LoanDetails>> {
        let isbn = filter.isbn.as_deref().unwrap_or("");
        let customer = filter.customer.as_deref().unwrap_or("");
        self.repository
            .loans
            .find_by_isbn_or_customer(isbn, customer, pagination)
            .await
    }

    /// All loans for a book, returned or not
    pub async fn get_loans_by_book(
        &self,
        book: &Book,
        pagination: &Pagination,
    ) -> AppResult<Page<LoanDetails>> {
        let book_id = book
            .id
            .ok_or_else(|| AppError::InvalidArgument("Book id can't be null.".to_string()))?;
        self.repository.loans.find_by_book(book_id, pagination).await
    }

    /// Outstanding loans whose loan date is at least `OVERDUE_LOAN_DAYS`
    /// days in the past
    pub async fn get_all_late_loans(&self) -> AppResult<Vec<Loan>> {
        let threshold = Utc::now().date_naive() - Duration::days(OVERDUE_LOAN_DAYS);
        self.repository.loans.find_overdue(threshold).await
    }
}
