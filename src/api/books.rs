//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter},
        page::{BookPage, LoanDetailsPage, Pagination},
    },
};

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
}

/// Update book request. Only title and author are replaceable; the ISBN is
/// fixed at creation.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
}

/// Query parameters for the fuzzy book search
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Title substring, case-insensitive
    pub title: Option<String>,
    /// Author substring, case-insensitive
    pub author: Option<String>,
    /// ISBN substring, case-insensitive
    pub isbn: Option<String>,
    /// Zero-based page number
    pub page: Option<u32>,
    /// Page size
    pub size: Option<u32>,
}

/// Query parameters for paginated listings
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Zero-based page number
    pub page: Option<u32>,
    /// Page size
    pub size: Option<u32>,
}

fn pagination(page: Option<u32>, size: Option<u32>) -> Pagination {
    let defaults = Pagination::default();
    Pagination::new(page.unwrap_or(defaults.page), size.unwrap_or(defaults.size))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Validation failure or duplicated ISBN")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBookRequest>,
) -> AppResult<(StatusCode, Json<Book>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    tracing::info!("creating a book for isbn: {}", request.isbn);

    let book = Book {
        id: None,
        title: request.title,
        author: request.author,
        isbn: request.isbn,
    };
    let created = state.services.catalog.create(book).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Get book details by id
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    tracing::info!("obtaining details for book id: {}", id);

    let book = state
        .services
        .catalog
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

    Ok(Json(book))
}

/// Update a book's title and author
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBookRequest>,
) -> AppResult<Json<Book>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    tracing::info!("updating book id: {}", id);

    let mut book = state
        .services
        .catalog
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

    book.title = request.title;
    book.author = request.author;
    let updated = state.services.catalog.update(&book).await?;

    Ok(Json(updated))
}

/// Delete a book by id
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book successfully deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    tracing::info!("deleting book id: {}", id);

    let book = state
        .services
        .catalog
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

    state.services.catalog.delete(&book).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fuzzy search over books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books", body = BookPage)
    )
)]
pub async fn find_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookPage>> {
    let filter = BookFilter {
        title: query.title,
        author: query.author,
        isbn: query.isbn,
    };
    let page = state
        .services
        .catalog
        .find(&filter, &pagination(query.page, query.size))
        .await?;

    Ok(Json(page))
}

/// List loans of a book
#[utoipa::path(
    get,
    path = "/books/{id}/loans",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID"), PageQuery),
    responses(
        (status = 200, description = "Loans of the book", body = LoanDetailsPage),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_loans(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanDetailsPage>> {
    let book = state
        .services
        .catalog
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

    let page = state
        .services
        .loans
        .get_loans_by_book(&book, &pagination(query.page, query.size))
        .await?;

    Ok(Json(page))
}
