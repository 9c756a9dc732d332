//! Async HTTP client wrapping the spreadsheet script.

use std::time::Duration;

use campus_food_core::{
  location::Location,
  moderation::{Decision, DecisionReply},
  store::RemoteDirectory,
  submission::{Submission, SubmissionId},
};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{Error, Result};

const PENDING: &str = "getPendingSubmissions";
const APPROVED: &str = "getApprovedLocations";
const UPDATE_STATUS: &str = "updateSubmissionStatus";

/// Connection settings for the script.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
  /// The deployed script URL, e.g. `https://script.google.com/macros/s/<id>/exec`.
  pub script_url: String,
  /// Upper bound on each request, redirects included.
  pub timeout:    Duration,
}

impl SheetsConfig {
  pub fn new(script_url: impl Into<String>) -> Self {
    Self {
      script_url: script_url.into(),
      timeout:    Duration::from_secs(30),
    }
  }
}

#[derive(Deserialize)]
struct SubmissionsReply {
  #[serde(default)]
  submissions: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct LocationsReply {
  #[serde(default)]
  locations: Option<Vec<Value>>,
}

/// Decode spreadsheet rows one by one. Rows that do not decode are logged
/// and skipped; the rest of the reply is kept.
fn decode_rows<T: DeserializeOwned>(action: &'static str, rows: Option<Vec<Value>>) -> Vec<T> {
  rows
    .unwrap_or_default()
    .into_iter()
    .enumerate()
    .filter_map(|(index, row)| {
      let id = row.get("id").map(ToString::to_string).unwrap_or_default();
      match serde_json::from_value(row) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
          warn!(action, index, %id, error = %e, "skipping malformed row");
          None
        }
      }
    })
    .collect()
}

/// Async HTTP client for the spreadsheet script.
///
/// Clones share the underlying connection pool.
#[derive(Clone)]
pub struct SheetsClient {
  client: Client,
  config: SheetsConfig,
}

impl SheetsClient {
  pub fn new(config: SheetsConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &SheetsConfig { &self.config }

  fn request(&self, method: Method, action: &'static str) -> RequestBuilder {
    self
      .client
      .request(method, &self.config.script_url)
      .query(&[("action", action)])
  }

  async fn send<T: DeserializeOwned>(
    &self,
    action: &'static str,
    req: RequestBuilder,
  ) -> Result<T> {
    let resp = req
      .send()
      .await
      .map_err(|source| Error::Request { action, source })?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status { action, status });
    }
    debug!(action, %status, "script replied");
    resp
      .json()
      .await
      .map_err(|source| Error::Decode { action, source })
  }
}

// ─── RemoteDirectory impl ────────────────────────────────────────────────────

impl RemoteDirectory for SheetsClient {
  type Error = Error;

  /// `GET ?action=getPendingSubmissions`
  async fn pending_submissions(&self) -> Result<Vec<Submission>> {
    let reply: SubmissionsReply =
      self.send(PENDING, self.request(Method::GET, PENDING)).await?;
    Ok(decode_rows(PENDING, reply.submissions))
  }

  /// `GET ?action=getApprovedLocations`
  async fn approved_locations(&self) -> Result<Vec<Location>> {
    let reply: LocationsReply =
      self.send(APPROVED, self.request(Method::GET, APPROVED)).await?;
    Ok(decode_rows(APPROVED, reply.locations))
  }

  /// `POST ?action=updateSubmissionStatus&rowId=<id>&status=<decision>&reviewedBy=<email>`
  async fn update_submission_status(
    &self,
    id: SubmissionId,
    decision: Decision,
    reviewed_by: &str,
  ) -> Result<DecisionReply> {
    let req = self.request(Method::POST, UPDATE_STATUS).query(&[
      ("rowId", id.to_string()),
      ("status", decision.to_string()),
      ("reviewedBy", reviewed_by.to_owned()),
    ]);
    // An explicit empty body makes the request carry `Content-Length: 0`,
    // which the script's front end requires on POST.
    self.send(UPDATE_STATUS, req.body("")).await
  }
}
