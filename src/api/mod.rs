//! REST API handlers

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
