//! Plain-text rendering of locations, sessions and moderation results.

use campus_food_core::{
  account::ValidationErrors,
  filter::{Facet, PreferenceMatch, preference_match},
  location::{Coordinates, Location},
  moderation::Resolution,
  sample::CAMPUS_CENTRE,
  session::{Preferences, Role, UserSession},
  submission::Submission,
};

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
  items
    .into_iter()
    .map(|i| i.to_string())
    .collect::<Vec<_>>()
    .join(", ")
}

fn or_dash(s: &str) -> &str { if s.trim().is_empty() { "-" } else { s } }

fn star(favorite: bool) -> &'static str { if favorite { "★" } else { " " } }

// ─── Locations ───────────────────────────────────────────────────────────────

/// One summary line per location.
pub fn location_line(location: &Location, user: Option<&UserSession>) -> String {
  let favorite = user.is_some_and(|u| u.is_favorite(location.id));
  format!(
    "{} {:>3}  {:<28} {:<7} {:<22} {:.1}",
    star(favorite),
    location.id,
    location.name,
    location.category,
    location.price_range.label(),
    location.rating,
  )
}

pub fn location_list(locations: &[&Location], user: Option<&UserSession>) -> String {
  if locations.is_empty() {
    return "No locations match your filters.".to_owned();
  }
  locations
    .iter()
    .map(|l| location_line(l, user))
    .collect::<Vec<_>>()
    .join("\n")
}

/// The discount view: each location with its discount and, for a signed-in
/// user, why it matches their preferences.
pub fn discount_list(locations: &[&Location], prefs: Option<&Preferences>) -> String {
  if locations.is_empty() {
    return "No student discounts match your filters.".to_owned();
  }
  let mut lines = Vec::new();
  for location in locations {
    lines.push(format!(
      "{:>3}  {}: {}",
      location.id,
      location.name,
      location.student_discount().unwrap_or_default()
    ));
    if let Some(prefs) = prefs {
      let matched = preference_match(location, prefs);
      if !matched.is_empty() {
        lines.push(format!("     {}", match_reasons(&matched)));
      }
    }
  }
  lines.join("\n")
}

fn match_reasons(matched: &PreferenceMatch) -> String {
  let mut reasons = Vec::new();
  if matched.price.is_some() {
    reasons.push("matches your budget preference".to_owned());
  }
  if !matched.dietary.is_empty() {
    reasons.push(format!("matches your dietary preference: {}", join(&matched.dietary)));
  }
  reasons.join("; ")
}

pub fn location_detail(location: &Location, user: Option<&UserSession>) -> String {
  let favorite = user.is_some_and(|u| u.is_favorite(location.id));
  let mut lines = vec![
    format!("{} {} (#{})", star(favorite), location.name, location.id).trim_start().to_owned(),
    format!("  address:     {}", or_dash(&location.address)),
    format!("  type:        {}", location.category),
    format!("  price:       {}", location.price_range.label()),
    format!("  rating:      {:.1}", location.rating),
    format!("  dietary:     {}", or_dash(&join(&location.dietary))),
    format!("  meals:       {}", or_dash(&join(&location.meal_times))),
    format!("  top dish:    {}", or_dash(&location.top_dish)),
  ];
  if let Some(discount) = location.student_discount() {
    lines.push(format!("  discount:    {discount}"));
  }
  if !location.nutrition_highlights.is_empty() {
    lines.push(format!("  nutrition:   {}", join(&location.nutrition_highlights)));
  }
  if let Some(at) = location.coordinates {
    lines.push(format!(
      "  location:    {:.5}, {:.5} ({:.1} km from campus)",
      at.lat,
      at.lng,
      distance_km(CAMPUS_CENTRE, at)
    ));
  }
  if !location.description.trim().is_empty() {
    lines.push(String::new());
    lines.push(format!("  {}", location.description.trim()));
  }
  lines.join("\n")
}

/// Great-circle distance between two points.
fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
  const EARTH_RADIUS_KM: f64 = 6371.0;
  let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
  let dlat = lat2 - lat1;
  let dlng = (b.lng - a.lng).to_radians();
  let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
  2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

// ─── Sessions ────────────────────────────────────────────────────────────────

pub fn session(user: &UserSession) -> String {
  let role = match user.role {
    Role::Student => "student",
    Role::Admin => "administrator",
  };
  format!(
    "{} <{}> ({role})\n{}\n  favorites:     {}",
    user.name,
    user.email,
    preferences(&user.preferences),
    or_dash(&join(&user.favorite_locations)),
  )
}

pub fn preferences(prefs: &Preferences) -> String {
  let price = match prefs.price_range {
    Facet::All => "any".to_owned(),
    Facet::Only(p) => p.label().to_owned(),
  };
  let dietary = if prefs.dietary.is_empty() { "any".to_owned() } else { join(&prefs.dietary) };
  format!(
    "  price:         {price}\n  dietary:       {dietary}\n  notifications: {}",
    if prefs.notifications { "on" } else { "off" }
  )
}

pub fn validation(errors: &ValidationErrors) -> String {
  errors
    .iter()
    .map(|(field, message)| format!("  {field}: {message}"))
    .collect::<Vec<_>>()
    .join("\n")
}

// ─── Moderation ──────────────────────────────────────────────────────────────

pub fn submission(s: &Submission) -> String {
  let mut lines = vec![format!("#{} {}", s.id, or_dash(&s.name))];
  let fields = [
    ("address", &s.address),
    ("type", &s.kind),
    ("price", &s.price_range),
    ("dietary", &s.dietary),
    ("meals", &s.meal_times),
    ("dish", &s.recommended_dish),
    ("discount", &s.student_discount),
    ("why", &s.recommendation),
    ("from", &s.submitted_by),
  ];
  for (label, value) in fields {
    if !value.trim().is_empty() {
      lines.push(format!("  {label:<9} {value}"));
    }
  }
  if let Some(at) = s.timestamp {
    lines.push(format!("  {:<9} {}", "sent", at.format("%Y-%m-%d %H:%M")));
  }
  lines.join("\n")
}

pub fn submission_list(pending: &[Submission]) -> String {
  if pending.is_empty() {
    return "No pending submissions.".to_owned();
  }
  pending.iter().map(submission).collect::<Vec<_>>().join("\n\n")
}

/// The outcome of a decision on the submission called `name`.
pub fn resolution(resolution: &Resolution, name: &str) -> String {
  match resolution {
    Resolution::Approved(_) => {
      format!("✅ {name} has been approved and added to the locations!")
    }
    Resolution::ApprovedWithoutLocation => {
      format!("✅ {name} has been approved, but location data is missing.")
    }
    Resolution::Rejected => format!("{name} has been rejected."),
    Resolution::Failed { error } => {
      format!("Error: {}", error.as_deref().unwrap_or("Unknown error occurred"))
    }
  }
}

#[cfg(test)]
mod tests {
  use campus_food_core::{account, sample::sample_locations};

  use super::*;

  #[test]
  fn resolutions_read_distinctly() {
    let loc = sample_locations().remove(0);
    assert_eq!(
      resolution(&Resolution::Approved(loc), "Bistro"),
      "✅ Bistro has been approved and added to the locations!"
    );
    assert!(resolution(&Resolution::ApprovedWithoutLocation, "Bistro").contains("data is missing"));
    assert_eq!(resolution(&Resolution::Rejected, "Bistro"), "Bistro has been rejected.");
    assert_eq!(
      resolution(&Resolution::Failed { error: None }, "Bistro"),
      "Error: Unknown error occurred"
    );
    assert_eq!(
      resolution(&Resolution::Failed { error: Some("Row not found".into()) }, "Bistro"),
      "Error: Row not found"
    );
  }

  #[test]
  fn favorites_are_starred() {
    let user = account::authenticate("111111@edu.p.lodz.pl", "password123").unwrap();
    let locations = sample_locations();
    assert!(location_line(&locations[0], Some(&user)).starts_with('★'));
    assert!(location_line(&locations[1], Some(&user)).starts_with(' '));
    assert!(location_line(&locations[0], None).starts_with(' '));
  }

  #[test]
  fn discount_reasons_follow_preferences() {
    let user = account::authenticate("111111@edu.p.lodz.pl", "password123").unwrap();
    let locations = sample_locations();
    let discounted: Vec<&Location> = locations
      .iter()
      .filter(|l| l.student_discount().is_some())
      .collect();

    let with_reasons = discount_list(&discounted, Some(&user.preferences));
    let without = discount_list(&discounted, None);
    assert!(!without.contains("matches your"));
    assert!(with_reasons.lines().count() >= without.lines().count());
    assert_eq!(discount_list(&[], None), "No student discounts match your filters.");
  }

  #[test]
  fn distance_from_campus_is_small_for_nearby_points() {
    let nearby = Coordinates { lat: 51.7502, lng: 19.4560 };
    let d = distance_km(CAMPUS_CENTRE, nearby);
    assert!(d > 0.1 && d < 1.0, "unexpected distance {d}");
    assert!(distance_km(CAMPUS_CENTRE, CAMPUS_CENTRE).abs() < 1e-9);
  }

  #[test]
  fn blank_submission_fields_are_omitted() {
    let s: Submission = serde_json::from_value(serde_json::json!({
      "id": 4,
      "name": "Kawiarnia",
      "address": "",
      "dietary": ["vegan", "halal"]
    }))
    .unwrap();
    let text = submission(&s);
    assert!(text.starts_with("#4 Kawiarnia"));
    assert!(text.contains("dietary   vegan, halal"));
    assert!(!text.contains("address"));
  }
}
