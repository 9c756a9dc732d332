//! Persistent [`SessionStorage`](campus_food_core::store::SessionStorage)
//! on top of SQLite.
//!
//! A flat map of string keys to string values, like a browser's
//! `localStorage`. Queries run on the [`tokio_rusqlite`] connection thread.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStorage;
