//! Submissions: candidate locations awaiting moderation.
//!
//! Submissions come from an external form that writes into the spreadsheet,
//! so every field is free text. Checkbox answers may arrive either as a
//! comma-joined string or as a JSON array; both decode to a single string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Spreadsheet row number of a submission; sent back as `rowId` when deciding.
pub type SubmissionId = u64;

/// A pending candidate location as returned by `getPendingSubmissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub id:               SubmissionId,
  #[serde(default, deserialize_with = "form_text")]
  pub name:             String,
  #[serde(default, deserialize_with = "form_text")]
  pub address:          String,
  #[serde(default, deserialize_with = "form_text")]
  pub recommendation:   String,
  /// Campus or local, as typed by the submitter.
  #[serde(rename = "type", default, deserialize_with = "form_text")]
  pub kind:             String,
  #[serde(default, deserialize_with = "form_text")]
  pub price_range:      String,
  #[serde(default, deserialize_with = "form_text")]
  pub dietary:          String,
  #[serde(default, deserialize_with = "form_text")]
  pub meal_times:       String,
  #[serde(default, deserialize_with = "form_text")]
  pub recommended_dish: String,
  #[serde(default, deserialize_with = "form_text")]
  pub student_discount: String,
  #[serde(default, deserialize_with = "form_text")]
  pub submitted_by:     String,
  /// When the form was submitted; `None` if the cell was empty or not a
  /// recognisable timestamp.
  #[serde(default, deserialize_with = "form_timestamp")]
  pub timestamp:        Option<DateTime<Utc>>,
}

fn form_text<'de, D>(de: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  use serde_json::Value;

  fn flatten(value: Value) -> String {
    match value {
      Value::Null => String::new(),
      Value::String(s) => s,
      Value::Array(items) => items
        .into_iter()
        .map(flatten)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", "),
      other => other.to_string(),
    }
  }

  Ok(flatten(Value::deserialize(de)?))
}

fn form_timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  use serde_json::Value;

  Ok(match Value::deserialize(de)? {
    Value::String(s) => DateTime::parse_from_rfc3339(&s)
      .ok()
      .map(|dt| dt.with_timezone(&Utc)),
    Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
    _ => None,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_form_row_with_mixed_shapes() {
    let raw = serde_json::json!({
      "id": 14,
      "name": "Bistro Pod Arkadami",
      "address": "Piotrkowska 12",
      "recommendation": "Great soups",
      "type": "local",
      "priceRange": "low",
      "dietary": ["vegetarian", "halal"],
      "mealTimes": "lunch, dinner",
      "recommendedDish": "Żurek",
      "studentDiscount": null,
      "submittedBy": "222222@edu.p.lodz.pl",
      "timestamp": "2025-03-14T09:30:00.000Z",
    });
    let sub: Submission = serde_json::from_value(raw).unwrap();
    assert_eq!(sub.id, 14);
    assert_eq!(sub.kind, "local");
    assert_eq!(sub.dietary, "vegetarian, halal");
    assert_eq!(sub.meal_times, "lunch, dinner");
    assert_eq!(sub.student_discount, "");
    assert_eq!(
      sub.timestamp.unwrap().to_rfc3339(),
      "2025-03-14T09:30:00+00:00"
    );
  }

  #[test]
  fn unparseable_timestamp_is_dropped_not_fatal() {
    let raw = serde_json::json!({ "id": 2, "timestamp": "last tuesday" });
    let sub: Submission = serde_json::from_value(raw).unwrap();
    assert!(sub.timestamp.is_none());
    assert!(sub.name.is_empty());
  }
}
