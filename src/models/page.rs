//! Pagination request and result page types

use serde::Serialize;
use utoipa::ToSchema;

use super::book::Book;
use super::loan::LoanDetails;

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Pagination {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

/// One page of results plus the total match count
#[derive(Debug, Clone, Serialize, ToSchema)]
#[aliases(BookPage = Page<Book>, LoanDetailsPage = Page<LoanDetails>)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pagination: &Pagination, total: i64) -> Self {
        Self {
            content,
            page: pagination.page,
            size: pagination.size,
            total,
        }
    }
}
