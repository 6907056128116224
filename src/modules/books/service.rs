use std::sync::Arc;

use thiserror::Error;

use bookshelf_http::error::AppError;
use bookshelf_kernel::settings::MissingFields;

use super::models::{self, Book};
use super::store::{BookStore, StoreError};

#[derive(Debug, Error)]
pub enum CreateBookError {
    /// Payload did not decode into a book
    #[error("{0}")]
    Validation(#[source] serde_json::Error),

    #[error("Failed to save book: {0}")]
    Persistence(#[from] StoreError),
}

impl From<CreateBookError> for AppError {
    fn from(err: CreateBookError) -> Self {
        match err {
            CreateBookError::Validation(_) => AppError::validation(err.to_string()),
            CreateBookError::Persistence(_) => AppError::persistence(err.to_string()),
        }
    }
}

/// Decode, insert, echo. Holds no state beyond the injected store.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
    missing_fields: MissingFields,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>, missing_fields: MissingFields) -> Self {
        Self {
            store,
            missing_fields,
        }
    }

    pub fn missing_fields(&self) -> MissingFields {
        self.missing_fields
    }

    /// Create a book from a raw request body.
    ///
    /// Nothing is written when decoding fails. The returned title, author
    /// and year are the decoded input, not a re-read of the row.
    pub async fn create(&self, raw: &[u8]) -> Result<Book, CreateBookError> {
        let new_book =
            models::decode(raw, self.missing_fields).map_err(CreateBookError::Validation)?;

        let id = self.store.insert(&new_book).await?;
        tracing::info!(book_id = id, "book created");

        Ok(new_book.into_book(id))
    }
}
