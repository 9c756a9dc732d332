//! HTTP client for the spreadsheet script that backs Campus Food Finder.
//!
//! The script exposes three actions on a single URL, selected with the
//! `action` query parameter:
//!
//! | Method | Action | Reply |
//! |--------|--------|-------|
//! | `GET`  | `getPendingSubmissions` | `{"submissions": [...]}` |
//! | `GET`  | `getApprovedLocations` | `{"locations": [...]}` |
//! | `POST` | `updateSubmissionStatus` (`rowId`, `status`, `reviewedBy`) | `{"success": bool, "approvedLocation"?: {...}, "error"?: "..."}` |
//!
//! [`SheetsClient`] implements [`campus_food_core::store::RemoteDirectory`].

mod client;

pub mod error;

pub use client::{SheetsClient, SheetsConfig};
pub use error::{Error, Result};
