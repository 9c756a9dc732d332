//! Error type for `campus-food-sheets`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("{action} request failed: {source}")]
  Request {
    action: &'static str,
    #[source]
    source: reqwest::Error,
  },

  #[error("{action} returned HTTP {status}")]
  Status {
    action: &'static str,
    status: reqwest::StatusCode,
  },

  #[error("could not decode {action} reply: {source}")]
  Decode {
    action: &'static str,
    #[source]
    source: reqwest::Error,
  },
}

impl Error {
  /// Whether the request gave up waiting for the script.
  pub fn is_timeout(&self) -> bool {
    matches!(self, Self::Request { source, .. } if source.is_timeout())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
