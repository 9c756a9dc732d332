//! The moderation desk: pending submissions and approve/reject decisions.
//!
//! Only administrators may use the desk. Remote failures never surface as
//! errors here: listing degrades to an empty queue, and a failed decision is
//! reported as [`Resolution::Failed`] after the queue has been re-fetched.
//! Approved locations are announced on an [`ApprovalFeed`] rather than handed
//! to the catalogue directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  location::Location,
  session::UserSession,
  store::RemoteDirectory,
  submission::{Submission, SubmissionId},
};

// ─── Wire types ──────────────────────────────────────────────────────────────

/// The verdict on a submission; sent upstream as the literal `status` value.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
  Approved,
  Rejected,
}

/// The remote reply to `updateSubmissionStatus`.
///
/// `approved_location` is kept as raw JSON: the desk decides whether it is a
/// usable [`Location`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionReply {
  #[serde(default)]
  pub success:           bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub approved_location: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error:             Option<String>,
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// What a decision amounted to, from the desk's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
  /// Approved; the new location has been published on the feed.
  Approved(Location),
  /// The remote side reports success but sent no usable location. The
  /// submission is resolved, nothing is published.
  ApprovedWithoutLocation,
  Rejected,
  /// The decision did not go through. The submission is still pending and
  /// the queue has been re-fetched.
  Failed { error: Option<String> },
}

impl Resolution {
  /// Whether the submission left the pending queue.
  pub fn is_resolved(&self) -> bool { !matches!(self, Self::Failed { .. }) }
}

// ─── ApprovalFeed ────────────────────────────────────────────────────────────

/// Broadcast channel announcing newly approved locations as JSON payloads.
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct ApprovalFeed {
  tx: broadcast::Sender<Value>,
}

impl ApprovalFeed {
  pub fn new() -> Self { Self::with_capacity(64) }

  pub fn with_capacity(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity);
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Value> { self.tx.subscribe() }

  /// Announce `payload`. A feed without subscribers drops it.
  pub fn publish(&self, payload: Value) {
    if self.tx.send(payload).is_err() {
      debug!("approval published with no subscribers");
    }
  }
}

impl Default for ApprovalFeed {
  fn default() -> Self { Self::new() }
}

// ─── ModerationDesk ──────────────────────────────────────────────────────────

/// The pending queue plus the operations an administrator performs on it.
pub struct ModerationDesk<R> {
  remote:  R,
  feed:    ApprovalFeed,
  pending: Vec<Submission>,
}

impl<R: RemoteDirectory> ModerationDesk<R> {
  pub fn new(remote: R, feed: ApprovalFeed) -> Self {
    Self {
      remote,
      feed,
      pending: Vec::new(),
    }
  }

  /// The queue as of the last refresh, minus resolved submissions.
  pub fn pending(&self) -> &[Submission] { &self.pending }

  pub fn remote(&self) -> &R { &self.remote }

  /// Re-fetch the pending queue. Remote failures leave an empty queue.
  pub async fn refresh(&mut self, reviewer: &UserSession) -> Result<&[Submission]> {
    require_admin(reviewer)?;
    self.resync().await;
    Ok(&self.pending)
  }

  /// Send `decision` on submission `id` upstream and apply the outcome
  /// locally.
  pub async fn decide(
    &mut self,
    id: SubmissionId,
    decision: Decision,
    reviewer: &UserSession,
  ) -> Result<Resolution> {
    require_admin(reviewer)?;

    let reply = match self
      .remote
      .update_submission_status(id, decision, &reviewer.email)
      .await
    {
      Ok(reply) => reply,
      Err(e) => {
        warn!(submission = id, error = %e, "moderation request failed");
        DecisionReply {
          success: false,
          error: Some(e.to_string()),
          ..DecisionReply::default()
        }
      }
    };

    if !reply.success {
      warn!(
        submission = id,
        error = reply.error.as_deref().unwrap_or("unknown"),
        "decision not accepted; resyncing queue"
      );
      self.resync().await;
      return Ok(Resolution::Failed { error: reply.error });
    }

    self.pending.retain(|s| s.id != id);

    let resolution = match decision {
      Decision::Rejected => Resolution::Rejected,
      Decision::Approved => self.publish_approval(id, reply.approved_location),
    };
    info!(submission = id, %decision, reviewer = %reviewer.email, "submission resolved");
    Ok(resolution)
  }

  fn publish_approval(&self, id: SubmissionId, payload: Option<Value>) -> Resolution {
    let Some(payload) = payload.filter(|p| !p.is_null()) else {
      warn!(submission = id, "approved without location data");
      return Resolution::ApprovedWithoutLocation;
    };
    match serde_json::from_value::<Location>(payload.clone()) {
      Ok(location) => {
        self.feed.publish(payload);
        Resolution::Approved(location)
      }
      Err(e) => {
        warn!(submission = id, error = %e, "approved location is malformed");
        Resolution::ApprovedWithoutLocation
      }
    }
  }

  async fn resync(&mut self) {
    self.pending = match self.remote.pending_submissions().await {
      Ok(submissions) => submissions,
      Err(e) => {
        warn!(error = %e, "could not fetch pending submissions");
        Vec::new()
      }
    };
    debug!(count = self.pending.len(), "pending queue refreshed");
  }
}

fn require_admin(reviewer: &UserSession) -> Result<()> {
  if reviewer.is_admin() {
    Ok(())
  } else {
    Err(Error::AdminRequired(reviewer.email.clone()))
  }
}
