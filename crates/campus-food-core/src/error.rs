//! Error types for `campus-food-core`.

use thiserror::Error;

use crate::account::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("registration rejected: {0}")]
  Validation(ValidationErrors),

  #[error("no user is signed in")]
  NotAuthenticated,

  #[error("{0} is not an administrator")]
  AdminRequired(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
