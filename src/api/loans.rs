//! Loan endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{Loan, LoanFilter},
        page::{LoanDetailsPage, Pagination},
    },
};

/// Create loan request. The book is resolved by ISBN.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoanRequest {
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "customer must not be empty"))]
    pub customer: String,
    /// Where the overdue reminder goes, if anywhere
    #[validate(email(message = "invalid customer email"))]
    pub customer_email: Option<String>,
}

/// Return transition request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnedLoanRequest {
    pub returned: bool,
}

/// Created loan response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoanCreatedResponse {
    pub id: i32,
}

/// Query parameters for the loan search
#[derive(Debug, Deserialize, IntoParams)]
pub struct LoanQuery {
    /// Exact book ISBN; combines with `customer` as a union
    pub isbn: Option<String>,
    /// Exact customer name; combines with `isbn` as a union
    pub customer: Option<String>,
    /// Zero-based page number
    pub page: Option<u32>,
    /// Page size
    pub size: Option<u32>,
}

/// Create a loan for the book with the given ISBN
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanCreatedResponse),
        (status = 400, description = "Unknown ISBN or book already loaned")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanCreatedResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    tracing::info!("creating a loan for isbn: {}", request.isbn);

    let book = state
        .services
        .catalog
        .get_by_isbn(&request.isbn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Book not found for passed isbn".to_string()))?;

    let loan = state
        .services
        .loans
        .create_loan(
            &book,
            request.customer,
            request.customer_email,
            Utc::now().date_naive(),
        )
        .await?;

    let id = loan
        .id
        .ok_or_else(|| AppError::Internal("Loan id missing after save".to_string()))?;

    Ok((StatusCode::CREATED, Json(LoanCreatedResponse { id })))
}

/// Set the returned flag of a loan
#[utoipa::path(
    patch,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = ReturnedLoanRequest,
    responses(
        (status = 200, description = "Loan updated", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ReturnedLoanRequest>,
) -> AppResult<Json<Loan>> {
    tracing::info!("returning loan id: {}", id);

    let mut loan = state
        .services
        .loans
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

    loan.returned = Some(request.returned);
    let updated = state.services.loans.update_loan(&loan).await?;

    Ok(Json(updated))
}

/// Search loans by book ISBN or customer
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "Matching loans", body = LoanDetailsPage)
    )
)]
pub async fn find_loans(
    State(state): State<crate::AppState>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<LoanDetailsPage>> {
    let filter = LoanFilter {
        isbn: query.isbn,
        customer: query.customer,
    };
    let defaults = Pagination::default();
    let pagination = Pagination::new(
        query.page.unwrap_or(defaults.page),
        query.size.unwrap_or(defaults.size),
    );

    let page = state.services.loans.find(&filter, &pagination).await?;

    Ok(Json(page))
}
