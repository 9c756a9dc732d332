//! Location types, the entries of the food directory.
//!
//! Field names follow the remote spreadsheet's JSON shape (camelCase, with the
//! category carried under `type`) so records fetched from the script decode
//! directly.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::debug;

/// Stable identifier of a location. Sample records use 1..=5; remote records
/// carry spreadsheet row numbers, rebased on load (see
/// [`crate::catalog::rebase_id`]).
pub type LocationId = u64;

// ─── Facet values ────────────────────────────────────────────────────────────

/// Whether a location sits on campus or in the surrounding neighbourhood.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
  Campus,
  Local,
}

/// Price band of a typical meal.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PriceRange {
  Low,
  Medium,
  High,
}

impl PriceRange {
  /// Human-readable band, as shown next to the price filter.
  pub fn label(self) -> &'static str {
    match self {
      Self::Low => "Budget (Under 10 PLN)",
      Self::Medium => "Mid-Range (10-15 PLN)",
      Self::High => "Premium (15+ PLN)",
    }
  }
}

/// A dietary option a location caters for.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DietaryTag {
  Vegetarian,
  Vegan,
  GlutenFree,
  Halal,
}

/// A meal a location serves.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MealTime {
  Breakfast,
  Lunch,
  Dinner,
}

// ─── Location ────────────────────────────────────────────────────────────────

/// WGS84 position used for the map pin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lng: f64,
}

/// A food location as listed in the directory.
///
/// Only `id`, `name`, `type` and `priceRange` are required on the wire; the
/// remaining fields default so sparse spreadsheet rows still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
  pub id:                   LocationId,
  pub name:                 String,
  #[serde(default)]
  pub address:              String,
  #[serde(rename = "type")]
  pub category:             Category,
  pub price_range:          PriceRange,
  #[serde(default, deserialize_with = "tag_list")]
  pub dietary:              Vec<DietaryTag>,
  #[serde(default, deserialize_with = "tag_list")]
  pub meal_times:           Vec<MealTime>,
  #[serde(default)]
  pub description:          String,
  #[serde(default, deserialize_with = "lenient_rating")]
  pub rating:               f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub discount:             Option<String>,
  #[serde(default)]
  pub top_dish:             String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub coordinates:          Option<Coordinates>,
  #[serde(default)]
  pub nutrition_highlights: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url:            Option<String>,
}

impl Location {
  /// The student discount, if one is advertised. Blank spreadsheet cells
  /// count as no discount.
  pub fn student_discount(&self) -> Option<&str> {
    self
      .discount
      .as_deref()
      .map(str::trim)
      .filter(|d| !d.is_empty())
  }

  pub fn serves(&self, meal: MealTime) -> bool { self.meal_times.contains(&meal) }

  pub fn caters_for(&self, tag: DietaryTag) -> bool { self.dietary.contains(&tag) }
}

/// A tag column as the spreadsheet delivers it: a JSON array, a
/// comma-joined string or nothing. Unknown tags are dropped.
fn tag_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: FromStr,
{
  let raw: Vec<String> = match Value::deserialize(deserializer)? {
    Value::Null => Vec::new(),
    Value::String(s) => s.split(',').map(str::to_owned).collect(),
    Value::Array(items) => items
      .into_iter()
      .filter_map(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
      })
      .collect(),
    other => {
      return Err(de::Error::custom(format!(
        "expected a list or a comma-separated string, got {other}"
      )));
    }
  };

  Ok(
    raw
      .iter()
      .map(|s| s.trim().to_ascii_lowercase())
      .filter(|s| !s.is_empty())
      .filter_map(|s| match s.parse() {
        Ok(tag) => Some(tag),
        Err(_) => {
          debug!(tag = %s, "unknown tag dropped");
          None
        }
      })
      .collect(),
  )
}

/// A number, a numeric string or an empty cell (0).
fn lenient_rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Null => Ok(0.0),
    Value::Number(n) => n
      .as_f64()
      .ok_or_else(|| de::Error::custom(format!("rating {n} out of range"))),
    Value::String(s) if s.trim().is_empty() => Ok(0.0),
    Value::String(s) => s
      .trim()
      .parse()
      .map_err(|_| de::Error::custom(format!("rating {s:?} is not a number"))),
    other => Err(de::Error::custom(format!("rating {other} is not a number"))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_sparse_remote_row() {
    let raw = serde_json::json!({
      "id": 3,
      "name": "Pierogarnia",
      "type": "local",
      "priceRange": "medium",
      "dietary": ["vegetarian", "gluten-free"],
      "discount": "",
    });
    let loc: Location = serde_json::from_value(raw).unwrap();
    assert_eq!(loc.category, Category::Local);
    assert_eq!(loc.dietary, vec![DietaryTag::Vegetarian, DietaryTag::GlutenFree]);
    assert!(loc.meal_times.is_empty());
    assert!(loc.coordinates.is_none());
    assert_eq!(loc.student_discount(), None);
  }

  #[test]
  fn tag_columns_accept_comma_joined_text() {
    let raw = serde_json::json!({
      "id": 14,
      "name": "Bistro Pod Arkadami",
      "type": "local",
      "priceRange": "low",
      "dietary": "Vegetarian, halal, keto",
      "mealTimes": ["lunch", "supper", "dinner"],
      "rating": "4.2",
    });
    let loc: Location = serde_json::from_value(raw).unwrap();
    assert_eq!(loc.dietary, vec![DietaryTag::Vegetarian, DietaryTag::Halal]);
    assert_eq!(loc.meal_times, vec![MealTime::Lunch, MealTime::Dinner]);
    assert_eq!(loc.rating, 4.2);
  }

  #[test]
  fn unusable_rows_still_fail() {
    let bad_price = serde_json::json!({
      "id": 9, "name": "Broken", "type": "local", "priceRange": "cheap",
    });
    assert!(serde_json::from_value::<Location>(bad_price).is_err());

    let bad_rating = serde_json::json!({
      "id": 9, "name": "Broken", "type": "local", "priceRange": "low", "rating": "great",
    });
    assert!(serde_json::from_value::<Location>(bad_rating).is_err());
  }

  #[test]
  fn category_serialises_under_type_key() {
    let loc = crate::sample::sample_locations().remove(0);
    let json = serde_json::to_value(&loc).unwrap();
    assert_eq!(json["type"], "campus");
    assert_eq!(json["priceRange"], "low");
    assert_eq!(json["mealTimes"][0], "breakfast");
  }

  #[test]
  fn facet_values_parse_from_kebab_case() {
    assert_eq!("gluten-free".parse::<DietaryTag>().unwrap(), DietaryTag::GlutenFree);
    assert_eq!(DietaryTag::GlutenFree.to_string(), "gluten-free");
    assert_eq!("dinner".parse::<MealTime>().unwrap(), MealTime::Dinner);
    assert!("cheap".parse::<PriceRange>().is_err());
  }
}
