//! Application state for one CLI invocation.

use anyhow::{Context as _, anyhow, bail};
use campus_food_core::{
  Error,
  account::Registration,
  catalog::LocationCatalog,
  filter::{FilterState, favorites, with_discounts},
  location::LocationId,
  moderation::{ApprovalFeed, Decision, ModerationDesk},
  session::{PreferencesUpdate, SessionStore, UserSession},
  submission::SubmissionId,
};
use campus_food_sheets::{SheetsClient, SheetsConfig};
use campus_food_store_sqlite::SqliteStorage;
use tracing::debug;

use crate::{render, settings::CliConfig};

/// Which slice of the visible locations to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
  #[default]
  All,
  Discounts,
  Favorites,
}

pub struct App {
  sessions: SessionStore<SqliteStorage>,
  catalog:  LocationCatalog,
  remote:   Option<SheetsClient>,
  settings: CliConfig,
  loaded:   bool,
}

impl App {
  /// Open the session store and build the script client from `settings`.
  pub async fn open(settings: CliConfig) -> anyhow::Result<Self> {
    let store_path = settings.store_path();
    let storage = SqliteStorage::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?;

    let remote = match &settings.script_url {
      Some(url) => {
        let config = SheetsConfig {
          script_url: url.clone(),
          timeout:    settings.timeout(),
        };
        Some(SheetsClient::new(config).context("failed to build HTTP client")?)
      }
      None => None,
    };

    Self::with_parts(storage, remote, settings).await
  }

  pub async fn with_parts(
    storage: SqliteStorage,
    remote: Option<SheetsClient>,
    settings: CliConfig,
  ) -> anyhow::Result<Self> {
    let sessions = SessionStore::restore(storage)
      .await
      .context("failed to restore session")?
      .with_domain(settings.email_domain.clone());
    Ok(Self {
      sessions,
      catalog: LocationCatalog::default(),
      remote,
      settings,
      loaded: false,
    })
  }

  /// Merge approved remote locations into the catalogue, once.
  async fn load_catalog(&mut self) {
    if self.loaded {
      return;
    }
    self.loaded = true;
    match &self.remote {
      Some(remote) => {
        self.catalog.load(remote).await;
      }
      None => debug!("no script URL configured; listing sample locations only"),
    }
  }

  fn remote(&self) -> anyhow::Result<&SheetsClient> {
    self.remote.as_ref().ok_or_else(|| {
      anyhow!("no script URL configured; set `script_url` in the config file or pass --script-url")
    })
  }

  fn signed_in(&self) -> anyhow::Result<&UserSession> {
    self.sessions.current().ok_or_else(|| anyhow!(Error::NotAuthenticated))
  }

  // ── Directory ─────────────────────────────────────────────────────────────

  pub async fn list(&mut self, state: &FilterState, view: View) -> anyhow::Result<String> {
    self.load_catalog().await;
    let user = self.sessions.current();
    let locations = self.catalog.locations();

    let body = match view {
      View::All => render::location_list(&state.apply(locations, user), user),
      View::Discounts => {
        let visible = state.apply(locations, user);
        render::discount_list(&with_discounts(visible), user.map(|u| &u.preferences))
      }
      View::Favorites => {
        let user = self.signed_in()?;
        let favs = favorites(locations, user);
        if favs.is_empty() {
          "You have no favorite locations yet.".to_owned()
        } else {
          render::location_list(&favs, Some(user))
        }
      }
    };

    let filtered_by_prefs = view != View::Favorites
      && !state.override_active()
      && user.is_some_and(|u| {
        !u.preferences.price_range.is_all() || !u.preferences.dietary.is_empty()
      });
    if filtered_by_prefs {
      Ok(format!("{body}\n\n(filtered by your preferences; use --show-all to see everything)"))
    } else {
      Ok(body)
    }
  }

  pub async fn show(&mut self, id: LocationId) -> anyhow::Result<String> {
    self.load_catalog().await;
    let location = self
      .catalog
      .get(id)
      .ok_or_else(|| anyhow!("no location with id {id}"))?;
    Ok(render::location_detail(location, self.sessions.current()))
  }

  // ── Account ───────────────────────────────────────────────────────────────

  pub async fn login(&mut self, email: &str, password: &str) -> anyhow::Result<String> {
    let user = self.sessions.login(email, password).await.map_err(|e| match e {
      Error::InvalidCredentials => anyhow!("Invalid credentials"),
      other => anyhow!(other),
    })?;
    Ok(format!("Signed in as {}.", user.name))
  }

  pub async fn register(&mut self, form: Registration) -> anyhow::Result<String> {
    match self.sessions.register(form).await {
      Ok(user) => Ok(format!("Welcome, {}! Your account is ready.", user.name)),
      Err(Error::Validation(errors)) => {
        bail!("registration rejected:\n{}", render::validation(&errors))
      }
      Err(e) => Err(e.into()),
    }
  }

  pub async fn logout(&mut self) -> anyhow::Result<String> {
    let was_signed_in = self.sessions.current().is_some();
    self.sessions.logout().await?;
    Ok(if was_signed_in { "Signed out." } else { "Not signed in." }.to_owned())
  }

  pub fn whoami(&self) -> String {
    match self.sessions.current() {
      Some(user) => render::session(user),
      None => "Not signed in.".to_owned(),
    }
  }

  /// Apply `update`, or just print the current preferences when it changes
  /// nothing.
  pub async fn prefs(&mut self, update: PreferencesUpdate) -> anyhow::Result<String> {
    if update == PreferencesUpdate::default() {
      return Ok(render::preferences(&self.signed_in()?.preferences));
    }
    let user = self.sessions.update_preferences(update).await?;
    Ok(format!("Preferences saved.\n{}", render::preferences(&user.preferences)))
  }

  pub async fn favorite(&mut self, id: LocationId) -> anyhow::Result<String> {
    self.load_catalog().await;
    let listed = self.catalog.get(id).map(|l| l.name.clone());
    // Unlisted ids may only be removed.
    let name = match (listed, self.signed_in()?.is_favorite(id)) {
      (Some(name), _) => name,
      (None, true) => format!("Location {id}"),
      (None, false) => bail!("no location with id {id}"),
    };
    let now_favorite = self.sessions.toggle_favorite(id).await?;
    Ok(if now_favorite {
      format!("★ {name} added to favorites.")
    } else {
      format!("{name} removed from favorites.")
    })
  }

  pub fn submission_form(&self) -> anyhow::Result<String> {
    let url = self
      .settings
      .submission_form_url
      .as_deref()
      .ok_or_else(|| anyhow!("no submission form configured; set `submission_form_url`"))?;
    Ok(format!("Suggest a new place here: {url}"))
  }

  // ── Moderation ────────────────────────────────────────────────────────────

  pub async fn pending(&self) -> anyhow::Result<String> {
    let reviewer = self.signed_in()?;
    let mut desk = ModerationDesk::new(self.remote()?.clone(), ApprovalFeed::new());
    let pending = desk.refresh(reviewer).await?;
    Ok(render::submission_list(pending))
  }

  /// Decide on submission `id` and merge any approved location announced on
  /// the feed into the catalogue.
  pub async fn decide(&mut self, id: SubmissionId, decision: Decision) -> anyhow::Result<String> {
    let reviewer = self.signed_in()?.clone();
    let remote = self.remote()?.clone();
    self.load_catalog().await;

    let feed = ApprovalFeed::new();
    let mut approvals = feed.subscribe();
    let mut desk = ModerationDesk::new(remote, feed);
    desk.refresh(&reviewer).await?;
    let name = desk
      .pending()
      .iter()
      .find(|s| s.id == id)
      .map(|s| s.name.clone())
      .filter(|n| !n.trim().is_empty())
      .unwrap_or_else(|| format!("Submission {id}"));

    let resolution = desk.decide(id, decision, &reviewer).await?;
    let added = self.catalog.sync(&mut approvals);
    debug!(added, total = self.catalog.len(), "catalogue synced after decision");

    let mut out = render::resolution(&resolution, &name);
    if added > 0 {
      out.push_str(&format!("\n{} locations are now listed.", self.catalog.len()));
    }
    Ok(out)
  }
}
