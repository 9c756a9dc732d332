//! `campus-food`: command-line front end for the Campus Food Finder.
//!
//! # Usage
//!
//! ```
//! campus-food list --price low --meal-time lunch
//! campus-food login 111111@edu.p.lodz.pl --password password123
//! campus-food --script-url https://script.google.com/macros/s/<id>/exec pending
//! ```

mod app;
mod render;
mod settings;

use std::{collections::BTreeSet, path::PathBuf};

use anyhow::Result;
use app::{App, View};
use campus_food_core::{
  account::Registration,
  filter::{Facet, FilterState},
  location::{DietaryTag, LocationId, MealTime, PriceRange},
  moderation::Decision,
  session::PreferencesUpdate,
  submission::SubmissionId,
};
use clap::{Args, Parser, Subcommand};
use settings::CliConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "campus-food", version, about = "Student-friendly food around campus")]
struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "campus-food.toml")]
  config: PathBuf,

  /// Deployed spreadsheet script URL (overrides the config file).
  #[arg(long, value_name = "URL")]
  script_url: Option<String>,

  /// Local session database (overrides the config file).
  #[arg(long, value_name = "PATH")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List locations, narrowed by filters and your stored preferences.
  List(ListArgs),
  /// Show one location in full.
  Show { id: LocationId },
  /// Sign in with a university account.
  Login {
    email:    String,
    #[arg(long, env = "CAMPUS_FOOD_PASSWORD", hide_env_values = true)]
    password: String,
  },
  /// Create a student account and sign in.
  Register {
    #[arg(long)]
    name:             String,
    #[arg(long)]
    email:            String,
    #[arg(long)]
    password:         String,
    #[arg(long)]
    confirm_password: String,
  },
  Logout,
  /// Show the signed-in user.
  Whoami,
  /// Show or change stored preferences.
  Prefs(PrefsArgs),
  /// Add a location to your favorites, or remove it if already there.
  Favorite { id: LocationId },
  /// List submissions awaiting review (administrators only).
  Pending,
  /// Approve a pending submission (administrators only).
  Approve { id: SubmissionId },
  /// Reject a pending submission (administrators only).
  Reject { id: SubmissionId },
  /// Print the link to the form for suggesting a new place.
  Submit,
}

#[derive(Args, Debug, Default)]
struct ListArgs {
  /// Price range: all, low, medium or high.
  #[arg(long, value_name = "RANGE")]
  price: Option<Facet<PriceRange>>,

  /// Dietary option: all, vegetarian, vegan, gluten-free or halal.
  #[arg(long, value_name = "TAG")]
  dietary: Option<Facet<DietaryTag>>,

  /// Meal: all, breakfast, lunch or dinner.
  #[arg(long, value_name = "MEAL")]
  meal_time: Option<Facet<MealTime>>,

  /// Ignore your stored preferences and every filter.
  #[arg(long, conflicts_with_all = ["price", "dietary", "meal_time"])]
  show_all: bool,

  /// Only locations with a student discount.
  #[arg(long)]
  discounts: bool,

  /// Only your favorite locations.
  #[arg(long, conflicts_with = "discounts")]
  favorites: bool,
}

impl ListArgs {
  fn filter_state(&self) -> FilterState {
    let mut state = FilterState::default();
    if self.show_all {
      state.show_everything();
    }
    if let Some(price) = self.price {
      state.set_price_range(price);
    }
    if let Some(dietary) = self.dietary {
      state.set_dietary(dietary);
    }
    if let Some(meal) = self.meal_time {
      state.set_meal_time(meal);
    }
    state
  }

  fn view(&self) -> View {
    if self.favorites {
      View::Favorites
    } else if self.discounts {
      View::Discounts
    } else {
      View::All
    }
  }
}

#[derive(Args, Debug, Default)]
struct PrefsArgs {
  /// Preferred price range, or `all`.
  #[arg(long, value_name = "RANGE")]
  price: Option<Facet<PriceRange>>,

  /// Preferred dietary option; repeat for several.
  #[arg(long, value_name = "TAG", conflicts_with = "clear_dietary")]
  dietary: Vec<DietaryTag>,

  /// Drop every dietary preference.
  #[arg(long)]
  clear_dietary: bool,

  /// Turn notifications on or off.
  #[arg(long, value_name = "BOOL")]
  notifications: Option<bool>,
}

impl PrefsArgs {
  fn into_update(self) -> PreferencesUpdate {
    let dietary = if self.clear_dietary {
      Some(BTreeSet::new())
    } else if self.dietary.is_empty() {
      None
    } else {
      Some(self.dietary.into_iter().collect())
    };
    PreferencesUpdate {
      price_range: self.price,
      dietary,
      notifications: self.notifications,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  // CLI flags override the config file, which overrides defaults.
  let mut settings = CliConfig::load(&cli.config)?;
  if let Some(url) = cli.script_url {
    settings.script_url = Some(url);
  }
  if let Some(store) = cli.store {
    settings.store_path = store;
  }

  let mut app = App::open(settings).await?;
  let output = run(&mut app, cli.command).await?;
  println!("{output}");
  Ok(())
}

async fn run(app: &mut App, command: Command) -> Result<String> {
  match command {
    Command::List(args) => app.list(&args.filter_state(), args.view()).await,
    Command::Show { id } => app.show(id).await,
    Command::Login { email, password } => app.login(&email, &password).await,
    Command::Register {
      name,
      email,
      password,
      confirm_password,
    } => {
      app
        .register(Registration {
          name,
          email,
          password,
          confirm_password,
        })
        .await
    }
    Command::Logout => app.logout().await,
    Command::Whoami => Ok(app.whoami()),
    Command::Prefs(args) => app.prefs(args.into_update()).await,
    Command::Favorite { id } => app.favorite(id).await,
    Command::Pending => app.pending().await,
    Command::Approve { id } => app.decide(id, Decision::Approved).await,
    Command::Reject { id } => app.decide(id, Decision::Rejected).await,
    Command::Submit => app.submission_form(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("campus-food").chain(args.iter().copied()))
  }

  fn list_args(args: &[&str]) -> ListArgs {
    match parse(args).unwrap().command {
      Command::List(list) => list,
      other => panic!("expected list, got {other:?}"),
    }
  }

  #[test]
  fn clap_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
  }

  #[test]
  fn list_flags_become_filters() {
    let args = list_args(&["list", "--price", "low", "--dietary", "gluten-free", "--meal-time", "all"]);
    let state = args.filter_state();
    assert_eq!(state.filters().price_range, Facet::Only(PriceRange::Low));
    assert_eq!(state.filters().dietary, Facet::Only(DietaryTag::GlutenFree));
    assert!(state.filters().meal_time.is_all());
    assert!(!state.override_active());
    assert_eq!(args.view(), View::All);
  }

  #[test]
  fn show_all_raises_the_override() {
    let state = list_args(&["list", "--show-all"]).filter_state();
    assert!(state.override_active());
    assert!(state.filters().is_unrestricted());
  }

  #[test]
  fn show_all_conflicts_with_facets() {
    assert!(parse(&["list", "--show-all", "--price", "high"]).is_err());
    assert!(parse(&["list", "--discounts", "--favorites"]).is_err());
    assert!(parse(&["list", "--price", "cheap"]).is_err());
  }

  #[test]
  fn list_views() {
    assert_eq!(list_args(&["list", "--discounts"]).view(), View::Discounts);
    assert_eq!(list_args(&["list", "--favorites"]).view(), View::Favorites);
  }

  #[test]
  fn prefs_flags_become_a_partial_update() {
    let Command::Prefs(args) = parse(&["prefs", "--dietary", "vegan", "--dietary", "halal"])
      .unwrap()
      .command
    else {
      panic!("expected prefs");
    };
    let update = args.into_update();
    assert_eq!(
      update.dietary,
      Some(BTreeSet::from([DietaryTag::Vegan, DietaryTag::Halal]))
    );
    assert!(update.price_range.is_none());
    assert!(update.notifications.is_none());

    let Command::Prefs(args) = parse(&["prefs", "--clear-dietary", "--price", "all"])
      .unwrap()
      .command
    else {
      panic!("expected prefs");
    };
    let update = args.into_update();
    assert_eq!(update.dietary, Some(BTreeSet::new()));
    assert_eq!(update.price_range, Some(Facet::All));
  }
}
