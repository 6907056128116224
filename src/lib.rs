//! Bookshelf application library
//!
//! Project modules plus the startup sequence shared by the server binary and the CLI.

pub mod app;
pub mod modules;

pub use modules::books::models::{Book, NewBook};
pub use modules::books::store::{BookStore, MemoryBookStore, PgBookStore, StoreError};
