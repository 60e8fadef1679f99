//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter},
        page::{Page, Pagination},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new book. The ISBN must not already be in use.
    pub async fn create(&self, book: Book) -> AppResult<Book> {
        if self.repository.books.exists_by_isbn(&book.isbn).await? {
            return Err(AppError::DuplicateIsbn);
        }
        self.repository.books.save(&book).await
    }

    /// Absence is not an error; callers decide how to surface it
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        self.repository.books.find_by_id(id).await
    }

    /// Replace an existing book. Identity is required; the ISBN is expected
    /// to stay unchanged by contract.
    pub async fn update(&self, book: &Book) -> AppResult<Book> {
        if book.id.is_none() {
            return Err(AppError::InvalidArgument("Book id can't be null.".to_string()));
        }
        self.repository.books.save(book).await
    }

    /// Remove a book. Identity is required.
    pub async fn delete(&self, book: &Book) -> AppResult<()> {
        if book.id.is_none() {
            return Err(AppError::InvalidArgument("Book id can't be null.".to_string()));
        }
        self.repository.books.delete(book).await
    }

    /// Fuzzy search over title/author/ISBN
    pub async fn find(&self, filter: &BookFilter, pagination: &Pagination) -> AppResult<Page<Book>> {
        self.repository.books.find(filter, pagination).await
    }

    /// Exact-match ISBN lookup
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        self.repository.books.find_by_isbn(isbn).await
    }
}
