//! Books store over Postgres

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter},
        page::{Page, Pagination},
    },
};

use super::BookStore;

/// Maps a unique violation on the ISBN index to the business error
fn map_isbn_conflict(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.constraint() == Some("books_isbn_key") => {
            AppError::DuplicateIsbn
        }
        _ => AppError::Database(e),
    }
}

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn exists_by_isbn(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, isbn FROM books WHERE isbn = $1",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book =
            sqlx::query_as::<_, Book>("SELECT id, title, author, isbn FROM books WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(book)
    }

    async fn save(&self, book: &Book) -> AppResult<Book> {
        let saved = match book.id {
            Some(id) => sqlx::query_as::<_, Book>(
                r#"
                UPDATE books
                SET title = $1, author = $2, isbn = $3, updated_at = NOW()
                WHERE id = $4
                RETURNING id, title, author, isbn
                "#,
            )
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_isbn_conflict)?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?,
            None => sqlx::query_as::<_, Book>(
                r#"
                INSERT INTO books (title, author, isbn)
                VALUES ($1, $2, $3)
                RETURNING id, title, author, isbn
                "#,
            )
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .fetch_one(&self.pool)
            .await
            .map_err(map_isbn_conflict)?,
        };

        Ok(saved)
    }

    async fn delete(&self, book: &Book) -> AppResult<()> {
        let id = book
            .id
            .ok_or_else(|| AppError::InvalidArgument("Book id can't be null.".to_string()))?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
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

        // Empty filter fields are ignored; the rest match as
        // case-insensitive substrings
        let where_clause = r#"
            ($1 = '' OR title ILIKE '%' || $1 || '%')
            AND ($2 = '' OR author ILIKE '%' || $2 || '%')
            AND ($3 = '' OR isbn ILIKE '%' || $3 || '%')
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM books WHERE {}",
            where_clause
        ))
        .bind(title)
        .bind(author)
        .bind(isbn)
        .fetch_one(&self.pool)
        .await?;

        let content = sqlx::query_as::<_, Book>(&format!(
            "SELECT id, title, author, isbn FROM books WHERE {} ORDER BY id LIMIT $4 OFFSET $5",
            where_clause
        ))
        .bind(title)
        .bind(author)
        .bind(isbn)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(content, pagination, total))
    }
}
