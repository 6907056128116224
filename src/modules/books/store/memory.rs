use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, NewBook};

/// In-process store with a `SERIAL`-like id sequence starting at 1.
///
/// [`disconnect`](Self::disconnect) makes every insert fail without touching
/// the stored rows, standing in for a dropped database connection.
#[derive(Debug)]
pub struct MemoryBookStore {
    state: Mutex<MemoryState>,
    connected: AtomicBool,
}

#[derive(Debug)]
struct MemoryState {
    rows: Vec<Book>,
    next_id: i32,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                rows: Vec::new(),
                next_id: 1,
            }),
            connected: AtomicBool::new(true),
        }
    }

    /// Snapshot of stored rows in insertion order.
    pub fn rows(&self) -> Vec<Book> {
        self.lock().rows.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // Rows are only pushed after the id is reserved, so a poisoned
        // guard still holds consistent data.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, book: &NewBook) -> Result<i32, StoreError> {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::Unavailable("id sequence exhausted".to_string()))?;
        state.rows.push(book.clone().into_book(id));

        Ok(id)
    }
}

impl Default for MemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, book: &NewBook) -> Result<i32, StoreError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection closed".to_string()));
        }

        self.push(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Anonymous".to_string(),
            year: 2000,
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let store = MemoryBookStore::new();
        assert_eq!(store.insert(&new_book("a")).await.unwrap(), 1);
        assert_eq!(store.insert(&new_book("b")).await.unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.rows()[1].title, "b");
    }

    #[tokio::test]
    async fn disconnected_store_rejects_without_writing() {
        let store = MemoryBookStore::new();
        store.insert(&new_book("kept")).await.unwrap();
        store.disconnect();

        let err = store.insert(&new_book("lost")).await.unwrap_err();
        assert_eq!(err.to_string(), "store unavailable: connection closed");
        assert_eq!(store.len(), 1);

        store.reconnect();
        assert_eq!(store.insert(&new_book("after")).await.unwrap(), 2);
    }
}
