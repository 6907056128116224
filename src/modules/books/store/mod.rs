//! Persistence seam for books.

mod memory;
mod postgres;

pub use memory::MemoryBookStore;
pub use postgres::PgBookStore;

use async_trait::async_trait;

use super::models::NewBook;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage backend for books.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert one row in a single statement and return the id the store assigned.
    async fn insert(&self, book: &NewBook) -> Result<i32, StoreError>;
}
