use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};

use bookshelf_http::error::AppError;

use super::models::Book;
use super::service::BookService;

/// HTTP routes for the Books module.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/books", post(create_book))
        .with_state(service)
}

/// POST /books
///
/// The body is taken as raw bytes so decode failures surface as
/// `{"error": ...}` rather than axum's plain-text JSON rejection.
async fn create_book(
    State(service): State<BookService>,
    body: Bytes,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(book)))
}
