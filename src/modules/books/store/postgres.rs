use async_trait::async_trait;
use sqlx::PgPool;

use super::{BookStore, StoreError};
use crate::modules::books::models::NewBook;

const INSERT_BOOK: &str = "INSERT INTO books (title, author, year) VALUES ($1, $2, $3) RETURNING id";

/// `books` table in PostgreSQL.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn insert(&self, book: &NewBook) -> Result<i32, StoreError> {
        let id: i32 = sqlx::query_scalar(INSERT_BOOK)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.year)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }
}
