//! Backend traits: the local session storage and the remote directory.
//!
//! Storage backends (e.g. `campus-food-store-sqlite`) and the remote client
//! (`campus-food-sheets`) implement these. Higher layers depend on the
//! abstractions, not on any concrete backend.

use std::{collections::HashMap, convert::Infallible, future::Future, sync::Mutex};

use crate::{
  location::Location,
  moderation::{Decision, DecisionReply},
  submission::{Submission, SubmissionId},
};

// ─── Session storage ─────────────────────────────────────────────────────────

/// A string key/value store in the style of a browser's `localStorage`.
///
/// All methods return `Send` futures so stores can be driven from a
/// multi-threaded tokio runtime.
pub trait SessionStorage: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The value stored under `key`, or `None` if the key is absent.
  fn get_item<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn set_item<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove `key`. Removing an absent key is not an error.
  fn remove_item<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Process-local [`SessionStorage`]; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    // A poisoned map is still a valid map.
    self.items.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl SessionStorage for MemoryStorage {
  type Error = Infallible;

  async fn get_item(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(self.items().get(key).cloned())
  }

  async fn set_item(&self, key: &str, value: String) -> Result<(), Infallible> {
    self.items().insert(key.to_owned(), value);
    Ok(())
  }

  async fn remove_item(&self, key: &str) -> Result<(), Infallible> {
    self.items().remove(key);
    Ok(())
  }
}

// ─── Remote directory ────────────────────────────────────────────────────────

/// The spreadsheet-backed service that holds submissions and approved
/// locations.
///
/// Implementations report transport and decoding problems as errors; the
/// fail-soft policy (empty lists, resync on failure) lives in
/// [`crate::catalog`] and [`crate::moderation`].
pub trait RemoteDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Submissions still awaiting a decision.
  fn pending_submissions(
    &self,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Locations approved in earlier sessions, with their remote ids.
  fn approved_locations(
    &self,
  ) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send + '_;

  /// Record a moderation decision made by `reviewed_by`.
  fn update_submission_status<'a>(
    &'a self,
    id: SubmissionId,
    decision: Decision,
    reviewed_by: &'a str,
  ) -> impl Future<Output = Result<DecisionReply, Self::Error>> + Send + 'a;
}
