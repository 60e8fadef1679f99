//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Alexandria API",
        version = "1.0.0",
        description = "Library Loan Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::create_book,
        books::get_book,
        books::update_book,
        books::delete_book,
        books::find_books,
        books::get_book_loans,
        // Loans
        loans::create_loan,
        loans::return_loan,
        loans::find_loans,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::page::BookPage,
            crate::models::page::LoanDetailsPage,
            books::CreateBookRequest,
            books::UpdateBookRequest,
            loans::CreateLoanRequest,
            loans::ReturnedLoanRequest,
            loans::LoanCreatedResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "books", description = "Book catalog"),
        (name = "loans", description = "Loan lifecycle")
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated document
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
