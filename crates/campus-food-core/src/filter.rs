//! The filter engine: which locations a user sees.
//!
//! Explicit facet filters are applied first. When a user is signed in and has
//! not asked to see everything, their stored preferences act as implicit
//! filters on the facets the explicit filters left at `all`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{
  location::{DietaryTag, Location, MealTime, PriceRange},
  session::{Preferences, UserSession},
};

// ─── Facet ───────────────────────────────────────────────────────────────────

/// One filter dimension: either unrestricted (`all`) or a single value.
///
/// Serialises as the literal string `"all"` or the value's own string form,
/// matching the select boxes of the web client and the stored preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet<T> {
  All,
  Only(T),
}

impl<T> Default for Facet<T> {
  fn default() -> Self { Self::All }
}

impl<T> Facet<T> {
  pub fn is_all(&self) -> bool { matches!(self, Self::All) }

  pub fn value(&self) -> Option<&T> {
    match self {
      Self::All => None,
      Self::Only(v) => Some(v),
    }
  }
}

impl<T> From<Option<T>> for Facet<T> {
  fn from(value: Option<T>) -> Self { value.map_or(Self::All, Self::Only) }
}

impl<T: fmt::Display> fmt::Display for Facet<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str("all"),
      Self::Only(v) => v.fmt(f),
    }
  }
}

impl<T: FromStr> FromStr for Facet<T> {
  type Err = T::Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == "all" {
      Ok(Self::All)
    } else {
      s.parse().map(Self::Only)
    }
  }
}

impl<T: fmt::Display> Serialize for Facet<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de, T> Deserialize<'de> for Facet<T>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(de::Error::custom)
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// The explicit filters picked by the user. Transient; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Filters {
  pub price_range: Facet<PriceRange>,
  pub dietary:     Facet<DietaryTag>,
  pub meal_time:   Facet<MealTime>,
}

impl Filters {
  pub fn is_unrestricted(&self) -> bool {
    self.price_range.is_all() && self.dietary.is_all() && self.meal_time.is_all()
  }
}

/// Whether a single location passes the explicit filters and, unless
/// `override_active`, the implicit preference filters.
pub fn admits(
  location: &Location,
  filters: &Filters,
  preferences: Option<&Preferences>,
  override_active: bool,
) -> bool {
  if let Facet::Only(price) = filters.price_range
    && location.price_range != price
  {
    return false;
  }
  if let Facet::Only(tag) = filters.dietary
    && !location.caters_for(tag)
  {
    return false;
  }
  if let Facet::Only(meal) = filters.meal_time
    && !location.serves(meal)
  {
    return false;
  }

  let Some(prefs) = preferences else { return true };
  if override_active {
    return true;
  }

  // Explicit filters win over preferences on the same facet.
  if filters.price_range.is_all()
    && let Facet::Only(preferred) = prefs.price_range
    && location.price_range != preferred
  {
    return false;
  }
  if filters.dietary.is_all()
    && !prefs.dietary.is_empty()
    && !prefs.dietary.iter().any(|tag| location.caters_for(*tag))
  {
    return false;
  }

  true
}

/// The locations visible to `session` under `filters`, in input order.
pub fn visible<'a>(
  locations: &'a [Location],
  filters: &Filters,
  session: Option<&UserSession>,
  override_active: bool,
) -> Vec<&'a Location> {
  let preferences = session.map(|s| &s.preferences);
  locations
    .iter()
    .filter(|loc| admits(loc, filters, preferences, override_active))
    .collect()
}

// ─── FilterState ─────────────────────────────────────────────────────────────

/// Explicit filters plus the "show all / ignore my preferences" override,
/// with the reset rules the directory views follow:
///
/// - picking a concrete value for any facet clears the override;
/// - "show everything" resets every facet to `all` and raises the override;
/// - changing stored preferences clears the override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
  filters:  Filters,
  show_all: bool,
}

impl FilterState {
  pub fn filters(&self) -> &Filters { &self.filters }

  pub fn override_active(&self) -> bool { self.show_all }

  pub fn set_price_range(&mut self, facet: Facet<PriceRange>) {
    self.filters.price_range = facet;
    self.rearm_if_concrete(facet.is_all());
  }

  pub fn set_dietary(&mut self, facet: Facet<DietaryTag>) {
    self.filters.dietary = facet;
    self.rearm_if_concrete(facet.is_all());
  }

  pub fn set_meal_time(&mut self, facet: Facet<MealTime>) {
    self.filters.meal_time = facet;
    self.rearm_if_concrete(facet.is_all());
  }

  pub fn show_everything(&mut self) {
    self.filters = Filters::default();
    self.show_all = true;
  }

  pub fn preferences_changed(&mut self) { self.show_all = false; }

  /// Run the filter engine with this state.
  pub fn apply<'a>(
    &self,
    locations: &'a [Location],
    session: Option<&UserSession>,
  ) -> Vec<&'a Location> {
    visible(locations, &self.filters, session, self.show_all)
  }

  fn rearm_if_concrete(&mut self, is_all: bool) {
    if !is_all {
      self.show_all = false;
    }
  }
}

// ─── Derived views ───────────────────────────────────────────────────────────

/// Why a discounted location matches the user's stored preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceMatch {
  /// The location is in the user's preferred price band.
  pub price:   Option<PriceRange>,
  /// Preferred dietary tags the location caters for.
  pub dietary: Vec<DietaryTag>,
}

impl PreferenceMatch {
  pub fn is_empty(&self) -> bool { self.price.is_none() && self.dietary.is_empty() }
}

pub fn preference_match(location: &Location, prefs: &Preferences) -> PreferenceMatch {
  PreferenceMatch {
    price:   prefs
      .price_range
      .value()
      .copied()
      .filter(|p| *p == location.price_range),
    dietary: prefs
      .dietary
      .iter()
      .copied()
      .filter(|tag| location.caters_for(*tag))
      .collect(),
  }
}

/// The subset of already-visible locations that advertise a student discount.
pub fn with_discounts<'a>(
  visible: impl IntoIterator<Item = &'a Location>,
) -> Vec<&'a Location> {
  visible
    .into_iter()
    .filter(|loc| loc.student_discount().is_some())
    .collect()
}

/// The user's favorite locations, in catalogue order.
pub fn favorites<'a>(
  locations: &'a [Location],
  session: &UserSession,
) -> Vec<&'a Location> {
  locations
    .iter()
    .filter(|loc| session.favorite_locations.contains(&loc.id))
    .collect()
}
