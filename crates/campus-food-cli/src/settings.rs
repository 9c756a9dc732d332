//! CLI configuration: an optional TOML file layered with `CAMPUS_FOOD_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use campus_food_core::account::UNIVERSITY_DOMAIN;
use serde::Deserialize;

/// Shape of the config file. Every field has a default, so an absent file
/// is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
  /// Deployed spreadsheet script. Without it only the sample locations are
  /// listed and moderation is unavailable.
  pub script_url:           Option<String>,
  /// SQLite file holding the signed-in session. A leading `~/` is expanded.
  pub store_path:           PathBuf,
  pub request_timeout_secs: u64,
  /// External form where students suggest new places.
  pub submission_form_url:  Option<String>,
  /// Accepted e-mail domain for registration, without the `@`.
  pub email_domain:         String,
}

impl Default for CliConfig {
  fn default() -> Self {
    Self {
      script_url:           None,
      store_path:           PathBuf::from("~/.local/share/campus-food/storage.db"),
      request_timeout_secs: 30,
      submission_form_url:  None,
      email_domain:         UNIVERSITY_DOMAIN.to_owned(),
    }
  }
}

impl CliConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CAMPUS_FOOD"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.script_url = cfg.script_url.filter(|u| !u.trim().is_empty());
    cfg.submission_form_url = cfg.submission_form_url.filter(|u| !u.trim().is_empty());
    Ok(cfg)
  }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
      "campus-food-settings-{}-{name}",
      std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = CliConfig::load(Path::new("/nonexistent/campus-food.toml")).unwrap();
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.email_domain, "edu.p.lodz.pl");
    assert!(cfg.submission_form_url.is_none());
  }

  #[test]
  fn file_values_override_defaults() {
    let path = temp_file(
      "override.toml",
      r#"
        script_url = "https://script.example/exec"
        store_path = "/tmp/campus-food/storage.db"
        request_timeout_secs = 5
        submission_form_url = "   "
      "#,
    );
    let cfg = CliConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.script_url.as_deref(), Some("https://script.example/exec"));
    assert_eq!(cfg.store_path(), PathBuf::from("/tmp/campus-food/storage.db"));
    assert_eq!(cfg.timeout(), Duration::from_secs(5));
    assert!(cfg.submission_form_url.is_none(), "blank URL counts as unset");
    assert_eq!(cfg.email_domain, "edu.p.lodz.pl");
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/data/storage.db")),
      PathBuf::from(home).join("data/storage.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }
}
