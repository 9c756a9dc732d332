//! Domain model and logic for Campus Food Finder: locations, the filter
//! engine, the catalogue merge, sessions and moderation.
//!
//! Backends are reached only through the traits in [`store`]. The SQLite
//! session storage lives in `campus-food-store-sqlite`, the spreadsheet
//! client in `campus-food-sheets`.

pub mod account;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod location;
pub mod moderation;
pub mod sample;
pub mod session;
pub mod store;
pub mod submission;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
