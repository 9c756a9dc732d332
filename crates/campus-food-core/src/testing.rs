//! In-process [`RemoteDirectory`] double for unit tests.

use std::{collections::VecDeque, sync::Mutex};

use thiserror::Error;

use crate::{
  location::Location,
  moderation::{Decision, DecisionReply},
  store::RemoteDirectory,
  submission::{Submission, SubmissionId},
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ScriptError(String);

#[derive(Default)]
struct State {
  pending:         Vec<Submission>,
  approved:        Vec<Location>,
  replies:         VecDeque<DecisionReply>,
  fail_pending:    bool,
  fail_approved:   bool,
  calls:           Vec<(SubmissionId, Decision, String)>,
  pending_fetches: usize,
}

/// Serves canned data and replays scripted decision replies in order. Once
/// the replies run out, decisions fail as a transport error would.
#[derive(Default)]
pub struct ScriptedRemote {
  state: Mutex<State>,
}

impl ScriptedRemote {
  pub fn with_pending(pending: Vec<Submission>) -> Self {
    let remote = Self::default();
    remote.lock().pending = pending;
    remote
  }

  pub fn with_approved(approved: Vec<Location>) -> Self {
    let remote = Self::default();
    remote.lock().approved = approved;
    remote
  }

  pub fn reply(&self, reply: DecisionReply) { self.lock().replies.push_back(reply); }

  pub fn fail_pending(&self) { self.lock().fail_pending = true; }

  pub fn fail_approved(&self) { self.lock().fail_approved = true; }

  pub fn calls(&self) -> Vec<(SubmissionId, Decision, String)> { self.lock().calls.clone() }

  pub fn pending_fetches(&self) -> usize { self.lock().pending_fetches }

  fn lock(&self) -> std::sync::MutexGuard<'_, State> { self.state.lock().unwrap() }
}

impl RemoteDirectory for ScriptedRemote {
  type Error = ScriptError;

  async fn pending_submissions(&self) -> Result<Vec<Submission>, ScriptError> {
    let mut state = self.lock();
    state.pending_fetches += 1;
    if state.fail_pending {
      return Err(ScriptError("pending listing unavailable".into()));
    }
    Ok(state.pending.clone())
  }

  async fn approved_locations(&self) -> Result<Vec<Location>, ScriptError> {
    let state = self.lock();
    if state.fail_approved {
      return Err(ScriptError("approved listing unavailable".into()));
    }
    Ok(state.approved.clone())
  }

  async fn update_submission_status(
    &self,
    id: SubmissionId,
    decision: Decision,
    reviewed_by: &str,
  ) -> Result<DecisionReply, ScriptError> {
    let mut state = self.lock();
    state.calls.push((id, decision, reviewed_by.to_owned()));
    let reply = state
      .replies
      .pop_front()
      .ok_or_else(|| ScriptError("no scripted reply".into()))?;
    if reply.success {
      state.pending.retain(|s| s.id != id);
    }
    Ok(reply)
  }
}

pub fn submission(id: SubmissionId) -> Submission {
  Submission {
    id,
    name: format!("Candidate {id}"),
    address: "Piotrkowska 1".into(),
    recommendation: "Worth a visit".into(),
    kind: "local".into(),
    price_range: "low".into(),
    dietary: "vegetarian".into(),
    meal_times: "lunch".into(),
    recommended_dish: "Pierogi".into(),
    student_discount: String::new(),
    submitted_by: "111111@edu.p.lodz.pl".into(),
    timestamp: None,
  }
}
