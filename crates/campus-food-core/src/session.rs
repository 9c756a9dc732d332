//! The signed-in user and the store that owns them.
//!
//! [`SessionStore`] is a two-state machine: anonymous, or authenticated as one
//! [`UserSession`]. Login and registration replace whatever session existed;
//! logout returns to anonymous. Every change is written through to
//! [`SessionStorage`] under [`SESSION_KEY`] before it becomes visible.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  account::{self, Registration, UNIVERSITY_DOMAIN},
  filter::Facet,
  location::{DietaryTag, LocationId, PriceRange},
  store::SessionStorage,
};

/// Storage key holding the serialised [`UserSession`].
pub const SESSION_KEY: &str = "campusFoodFinder_user";

// ─── UserSession ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Student,
  Admin,
}

/// Stored preferences; they act as implicit filters in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
  #[serde(default)]
  pub price_range:   Facet<PriceRange>,
  #[serde(default)]
  pub dietary:       BTreeSet<DietaryTag>,
  #[serde(default = "enabled")]
  pub notifications: bool,
}

fn enabled() -> bool { true }

impl Default for Preferences {
  fn default() -> Self {
    Self {
      price_range:   Facet::All,
      dietary:       BTreeSet::new(),
      notifications: true,
    }
  }
}

/// A partial preferences change. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesUpdate {
  pub price_range:   Option<Facet<PriceRange>>,
  pub dietary:       Option<BTreeSet<DietaryTag>>,
  pub notifications: Option<bool>,
}

impl Preferences {
  /// Shallow merge: each field present in `update` replaces the current one.
  pub fn merge(&mut self, update: PreferencesUpdate) {
    if let Some(price_range) = update.price_range {
      self.price_range = price_range;
    }
    if let Some(dietary) = update.dietary {
      self.dietary = dietary;
    }
    if let Some(notifications) = update.notifications {
      self.notifications = notifications;
    }
  }
}

/// The signed-in user as persisted locally. Never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
  pub id:                 Uuid,
  pub email:              String,
  pub name:               String,
  pub role:               Role,
  #[serde(default)]
  pub preferences:        Preferences,
  #[serde(default)]
  pub favorite_locations: BTreeSet<LocationId>,
}

impl UserSession {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  pub fn is_favorite(&self, id: LocationId) -> bool {
    self.favorite_locations.contains(&id)
  }

  /// Flip `id` in the favorites set. Returns whether it is now a favorite.
  pub fn toggle_favorite(&mut self, id: LocationId) -> bool {
    if self.favorite_locations.remove(&id) {
      false
    } else {
      self.favorite_locations.insert(id);
      true
    }
  }
}

// ─── SessionStore ────────────────────────────────────────────────────────────

/// Invoked after logout so open views can close themselves.
pub type LogoutHook = Box<dyn Fn() + Send + Sync>;

/// Owns the current session and keeps storage in step with it.
pub struct SessionStore<S> {
  storage:   S,
  current:   Option<UserSession>,
  domain:    String,
  on_logout: Option<LogoutHook>,
}

impl<S: SessionStorage> SessionStore<S> {
  /// Load whatever session `storage` holds. A missing key means anonymous;
  /// an undecodable value is logged and treated the same way.
  pub async fn restore(storage: S) -> Result<Self> {
    let raw = storage
      .get_item(SESSION_KEY)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;

    let current = match raw.as_deref().map(serde_json::from_str::<UserSession>) {
      None => None,
      Some(Ok(session)) => {
        info!(email = %session.email, "restored session");
        Some(session)
      }
      Some(Err(e)) => {
        warn!(error = %e, "stored session is unreadable; starting anonymous");
        None
      }
    };

    Ok(Self {
      storage,
      current,
      domain: UNIVERSITY_DOMAIN.to_owned(),
      on_logout: None,
    })
  }

  /// Use `domain` (without the `@`) when validating registrations.
  pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
    self.domain = domain.into();
    self
  }

  /// Register the callback run after every logout.
  pub fn with_logout_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
    self.on_logout = Some(Box::new(hook));
    self
  }

  pub fn current(&self) -> Option<&UserSession> { self.current.as_ref() }

  pub fn storage(&self) -> &S { &self.storage }

  /// Sign in with a demo account, replacing any current session.
  pub async fn login(&mut self, email: &str, password: &str) -> Result<&UserSession> {
    let session = account::authenticate(email, password)?;
    self.replace(session).await
  }

  /// Create a student account from `form`, replacing any current session.
  pub async fn register(&mut self, form: Registration) -> Result<&UserSession> {
    let session = form.into_session(&self.domain)?;
    self.replace(session).await
  }

  /// Forget the current session, clear storage and run the logout hook.
  pub async fn logout(&mut self) -> Result<()> {
    self
      .storage
      .remove_item(SESSION_KEY)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;
    if let Some(old) = self.current.take() {
      info!(email = %old.email, "signed out");
    }
    if let Some(hook) = &self.on_logout {
      hook();
    }
    Ok(())
  }

  pub async fn update_preferences(
    &mut self,
    update: PreferencesUpdate,
  ) -> Result<&UserSession> {
    let mut next = self.current.clone().ok_or(Error::NotAuthenticated)?;
    next.preferences.merge(update);
    self.replace(next).await
  }

  /// Flip `id` in the favorites set. Returns whether it is now a favorite.
  pub async fn toggle_favorite(&mut self, id: LocationId) -> Result<bool> {
    let mut next = self.current.clone().ok_or(Error::NotAuthenticated)?;
    let now_favorite = next.toggle_favorite(id);
    self.replace(next).await?;
    Ok(now_favorite)
  }

  /// Persist `session`, then make it current. On a storage failure the
  /// previous session stays in place.
  async fn replace(&mut self, session: UserSession) -> Result<&UserSession> {
    let json = serde_json::to_string(&session)?;
    self
      .storage
      .set_item(SESSION_KEY, json)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;
    Ok(self.current.insert(session))
  }
}
