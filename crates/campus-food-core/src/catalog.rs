//! The location catalogue: sample entries plus approved remote ones.
//!
//! Two dedup keys guard every insertion: the id, and the exact
//! (case-sensitive) name. Records loaded at startup have their ids rebased
//! against the sample set first; records announced on the approval feed
//! already carry final ids and are merged as they are.

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::{
  location::{Location, LocationId},
  sample::sample_locations,
  store::RemoteDirectory,
};

/// Map a remote id into the space above the sample ids.
///
/// `remote` is kept when it already exceeds `max_sample`, otherwise shifted
/// by `max_sample`. Remote ids near `max_sample` can still collide after the
/// shift; [`LocationCatalog::extend_from_remote`] logs those.
pub fn rebase_id(remote: LocationId, max_sample: LocationId) -> LocationId {
  if remote > max_sample {
    remote
  } else {
    max_sample.saturating_add(remote)
  }
}

/// Append each `incoming` record unless one with the same id or name is
/// already present (including records appended earlier in the same call).
/// Returns how many were added.
pub fn merge(
  existing: &mut Vec<Location>,
  incoming: impl IntoIterator<Item = Location>,
) -> usize {
  let mut added = 0;
  for location in incoming {
    let duplicate = existing
      .iter()
      .any(|l| l.id == location.id || l.name == location.name);
    if duplicate {
      debug!(id = location.id, name = %location.name, "location already listed; skipping");
      continue;
    }
    existing.push(location);
    added += 1;
  }
  added
}

/// The working set of locations shown in the directory.
#[derive(Debug, Clone)]
pub struct LocationCatalog {
  locations:     Vec<Location>,
  max_sample_id: LocationId,
}

impl Default for LocationCatalog {
  fn default() -> Self { Self::new(sample_locations()) }
}

impl LocationCatalog {
  /// A catalogue seeded with `sample`; its highest id becomes the rebasing
  /// offset for remote records.
  pub fn new(sample: Vec<Location>) -> Self {
    let max_sample_id = sample.iter().map(|l| l.id).max().unwrap_or(0);
    let mut locations = Vec::with_capacity(sample.len());
    merge(&mut locations, sample);
    Self {
      locations,
      max_sample_id,
    }
  }

  pub fn locations(&self) -> &[Location] { &self.locations }

  pub fn len(&self) -> usize { self.locations.len() }

  pub fn is_empty(&self) -> bool { self.locations.is_empty() }

  pub fn get(&self, id: LocationId) -> Option<&Location> {
    self.locations.iter().find(|l| l.id == id)
  }

  pub fn max_sample_id(&self) -> LocationId { self.max_sample_id }

  /// Rebase and merge records fetched from the remote directory at startup.
  pub fn extend_from_remote(&mut self, remote: Vec<Location>) -> usize {
    let mut rebased: Vec<Location> = Vec::with_capacity(remote.len());
    for mut location in remote {
      let original = location.id;
      location.id = rebase_id(original, self.max_sample_id);
      let clash = self
        .locations
        .iter()
        .chain(&rebased)
        .find(|l| l.id == location.id);
      if let Some(clash) = clash {
        warn!(
          remote_id = original,
          rebased_id = location.id,
          name = %location.name,
          existing = %clash.name,
          "rebased remote id collides with a listed location; record skipped"
        );
      }
      rebased.push(location);
    }
    merge(&mut self.locations, rebased)
  }

  /// Fetch approved locations from `remote` and merge them. A failed fetch
  /// leaves the catalogue as it was.
  pub async fn load<R: RemoteDirectory>(&mut self, remote: &R) -> usize {
    match remote.approved_locations().await {
      Ok(approved) => {
        let fetched = approved.len();
        let added = self.extend_from_remote(approved);
        info!(fetched, added, total = self.len(), "loaded approved locations");
        added
      }
      Err(e) => {
        warn!(error = %e, "could not load approved locations; using sample set only");
        0
      }
    }
  }

  /// Merge a location approved during this session. No rebasing.
  pub fn merge_approved(&mut self, location: Location) -> bool {
    merge(&mut self.locations, [location]) == 1
  }

  /// Apply one approval-feed payload. Absent or malformed payloads are
  /// ignored. Returns the newly listed location, if any.
  pub fn apply_event(&mut self, payload: &Value) -> Option<&Location> {
    if payload.is_null() {
      warn!("approval event without location data; ignoring");
      return None;
    }
    let location = match Location::deserialize(payload) {
      Ok(location) => location,
      Err(e) => {
        warn!(error = %e, "malformed approval event; ignoring");
        return None;
      }
    };
    let name = location.name.clone();
    if self.merge_approved(location) {
      info!(%name, "approved location added");
      self.locations.last()
    } else {
      None
    }
  }

  /// Drain every event currently queued on `rx`. Returns how many locations
  /// were added.
  pub fn sync(&mut self, rx: &mut broadcast::Receiver<Value>) -> usize {
    let mut added = 0;
    loop {
      match rx.try_recv() {
        Ok(payload) => {
          if self.apply_event(&payload).is_some() {
            added += 1;
          }
        }
        Err(TryRecvError::Lagged(missed)) => {
          warn!(missed, "approval feed overflowed; some approvals were dropped");
        }
        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
      }
    }
    added
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{
    location::{Category, PriceRange},
    moderation::ApprovalFeed,
    testing::ScriptedRemote,
  };

  fn remote(id: LocationId, name: &str) -> Location {
    Location {
      id,
      name: name.to_owned(),
      address: String::new(),
      category: Category::Local,
      price_range: PriceRange::Medium,
      dietary: Vec::new(),
      meal_times: Vec::new(),
      description: String::new(),
      rating: 0.0,
      discount: None,
      top_dish: String::new(),
      coordinates: None,
      nutrition_highlights: Vec::new(),
      image_url: None,
    }
  }

  fn ids(catalog: &LocationCatalog) -> Vec<LocationId> {
    catalog.locations().iter().map(|l| l.id).collect()
  }

  #[test]
  fn rebasing_rule() {
    assert_eq!(rebase_id(2, 5), 7);
    assert_eq!(rebase_id(5, 5), 10);
    assert_eq!(rebase_id(6, 5), 6);
    assert_eq!(rebase_id(40, 5), 40);
    for r in 1..=20 {
      assert!(rebase_id(r, 5) > 5, "rebased {r} landed in sample range");
    }
  }

  #[test]
  fn remote_id_two_becomes_seven() {
    let mut catalog = LocationCatalog::default();
    assert_eq!(catalog.extend_from_remote(vec![remote(2, "Pierogarnia")]), 1);
    assert_eq!(ids(&catalog), vec![1, 2, 3, 4, 5, 7]);
    assert_eq!(catalog.get(2).unwrap().name, "GIÀ pasta bar");
    assert_eq!(catalog.get(7).unwrap().name, "Pierogarnia");
  }

  #[test]
  fn colliding_rebased_ids_keep_the_first() {
    let mut catalog = LocationCatalog::default();
    let added = catalog.extend_from_remote(vec![remote(2, "First"), remote(7, "Second")]);
    assert_eq!(added, 1);
    assert_eq!(catalog.get(7).unwrap().name, "First");
  }

  #[test]
  fn merge_dedups_by_id_and_by_name() {
    let mut locations = sample_locations();
    let same_id = remote(3, "Something New");
    let same_name = remote(99, "Bar Ha Long");
    assert_eq!(merge(&mut locations, [same_id, same_name]), 0);
    assert_eq!(locations.len(), 5);

    // Name comparison is case-sensitive.
    assert_eq!(merge(&mut locations, [remote(99, "bar ha long")]), 1);
    assert_eq!(locations.len(), 6);
  }

  #[test]
  fn merge_is_idempotent() {
    let mut locations = sample_locations();
    let extra = remote(8, "Kebab King");
    assert_eq!(merge(&mut locations, [extra.clone()]), 1);
    assert_eq!(merge(&mut locations, [extra.clone(), extra]), 0);
    assert_eq!(locations.len(), 6);
  }

  #[test]
  fn approved_records_are_not_rebased() {
    let mut catalog = LocationCatalog::default();
    assert!(catalog.merge_approved(remote(6, "Fresh Approval")));
    assert_eq!(catalog.get(6).unwrap().name, "Fresh Approval");
    assert!(!catalog.merge_approved(remote(2, "Would Collide")));
  }

  #[tokio::test]
  async fn load_merges_remote_records() {
    let remote_dir = ScriptedRemote::with_approved(vec![
      remote(2, "Pierogarnia"),
      remote(11, "Sushi Spot"),
      remote(12, "Zatoka Smaku"),
    ]);
    let mut catalog = LocationCatalog::default();
    assert_eq!(catalog.load(&remote_dir).await, 2);
    assert_eq!(ids(&catalog), vec![1, 2, 3, 4, 5, 7, 11]);
  }

  #[tokio::test]
  async fn failed_load_keeps_sample_set() {
    let remote_dir = ScriptedRemote::default();
    remote_dir.fail_approved();
    let mut catalog = LocationCatalog::default();
    assert_eq!(catalog.load(&remote_dir).await, 0);
    assert_eq!(catalog.len(), 5);
  }

  #[test]
  fn feed_events_are_merged_once() {
    let feed = ApprovalFeed::new();
    let mut rx = feed.subscribe();
    let mut catalog = LocationCatalog::default();

    let payload = serde_json::to_value(remote(21, "Late Night Pizza")).unwrap();
    feed.publish(payload.clone());
    feed.publish(payload);
    feed.publish(Value::Null);
    feed.publish(json!({ "name": "missing everything else" }));

    assert_eq!(catalog.sync(&mut rx), 1);
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.get(21).unwrap().name, "Late Night Pizza");
    assert_eq!(catalog.sync(&mut rx), 0);
  }
}
