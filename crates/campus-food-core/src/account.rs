//! Demo accounts and registration rules.
//!
//! Sign-in is a lookup in a fixed table of demo accounts; there is no
//! credential verification worth the name. Registration only checks that the
//! form is well formed and always succeeds otherwise.

use std::{collections::BTreeSet, fmt, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  filter::Facet,
  location::{DietaryTag, LocationId, PriceRange},
  session::{Preferences, Role, UserSession},
};

/// Domain every student address must belong to.
pub const UNIVERSITY_DOMAIN: &str = "edu.p.lodz.pl";

const MIN_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 6;

static LOCAL_PART: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("static regex"));

// ─── Demo accounts ───────────────────────────────────────────────────────────

struct DemoAccount {
  id:        u128,
  email:     &'static str,
  password:  &'static str,
  name:      &'static str,
  role:      Role,
  price:     Option<PriceRange>,
  dietary:   &'static [DietaryTag],
  favorites: &'static [LocationId],
}

const DEMO_ACCOUNTS: [DemoAccount; 2] = [
  DemoAccount {
    id:        1,
    email:     "111111@edu.p.lodz.pl",
    password:  "password123",
    name:      "John Doe",
    role:      Role::Student,
    price:     Some(PriceRange::Low),
    dietary:   &[DietaryTag::Vegetarian],
    favorites: &[1, 3],
  },
  DemoAccount {
    id:        2,
    email:     "admin@edu.p.lodz.pl",
    password:  "admin123",
    name:      "Admin User",
    role:      Role::Admin,
    price:     None,
    dietary:   &[],
    favorites: &[],
  },
];

impl DemoAccount {
  fn session(&self) -> UserSession {
    UserSession {
      id:                 Uuid::from_u128(self.id),
      email:              self.email.to_owned(),
      name:               self.name.to_owned(),
      role:               self.role,
      preferences:        Preferences {
        price_range:   Facet::from(self.price),
        dietary:       self.dietary.iter().copied().collect(),
        notifications: true,
      },
      favorite_locations: self.favorites.iter().copied().collect(),
    }
  }
}

/// Look up a demo account. The returned session never carries the password.
pub fn authenticate(email: &str, password: &str) -> Result<UserSession> {
  DEMO_ACCOUNTS
    .iter()
    .find(|a| a.email == email && a.password == password)
    .map(DemoAccount::session)
    .ok_or(Error::InvalidCredentials)
}

// ─── Registration ────────────────────────────────────────────────────────────

/// The sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
  pub name:             String,
  pub email:            String,
  pub password:         String,
  pub confirm_password: String,
}

/// A form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
  Name,
  Email,
  Password,
  ConfirmPassword,
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Name => "name",
      Self::Email => "email",
      Self::Password => "password",
      Self::ConfirmPassword => "confirm password",
    })
  }
}

/// Every problem found in a [`Registration`], one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<(Field, String)>);

impl ValidationErrors {
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, field: Field) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(f, _)| *f == field)
      .map(|(_, m)| m.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
    self.0.iter().map(|(f, m)| (*f, m.as_str()))
  }

  fn push(&mut self, field: Field, message: impl Into<String>) {
    self.0.push((field, message.into()));
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, (field, message)) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{field}: {message}")?;
    }
    Ok(())
  }
}

impl Registration {
  /// Check the form against the rules for `domain` (without the `@`).
  pub fn validate(&self, domain: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = self.name.trim();
    if name.is_empty() {
      errors.push(Field::Name, "Full name is required");
    } else if name.chars().count() < MIN_NAME_LEN {
      errors.push(Field::Name, "Full name must be at least 2 characters long");
    }

    let suffix = format!("@{domain}");
    let email = self.email.trim();
    if email.is_empty() {
      errors.push(Field::Email, "University email is required");
    } else {
      match email.strip_suffix(&suffix) {
        None => errors.push(
          Field::Email,
          format!("Please use your university email ending with {suffix}"),
        ),
        Some("") => errors.push(Field::Email, "Invalid email format"),
        Some(local) if !LOCAL_PART.is_match(local) => errors.push(
          Field::Email,
          format!("Invalid email format. Use format: 123456{suffix}"),
        ),
        Some(_) => {}
      }
    }

    if self.password.chars().count() < MIN_PASSWORD_LEN {
      errors.push(Field::Password, "Password must be at least 6 characters");
    }
    if self.password != self.confirm_password {
      errors.push(Field::ConfirmPassword, "Passwords do not match");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }

  /// Validate the form and build a fresh student session with default
  /// preferences.
  pub fn into_session(self, domain: &str) -> Result<UserSession> {
    self.validate(domain).map_err(Error::Validation)?;
    Ok(UserSession {
      id:                 Uuid::new_v4(),
      email:              self.email.trim().to_owned(),
      name:               self.name.trim().to_owned(),
      role:               Role::Student,
      preferences:        Preferences::default(),
      favorite_locations: BTreeSet::new(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(name: &str, email: &str, password: &str, confirm: &str) -> Registration {
    Registration {
      name:             name.into(),
      email:            email.into(),
      password:         password.into(),
      confirm_password: confirm.into(),
    }
  }

  #[test]
  fn demo_student_signs_in_with_preferences() {
    let s = authenticate("111111@edu.p.lodz.pl", "password123").unwrap();
    assert_eq!(s.role, Role::Student);
    assert_eq!(s.preferences.price_range, Facet::Only(PriceRange::Low));
    assert!(s.preferences.dietary.contains(&DietaryTag::Vegetarian));
    assert_eq!(s.favorite_locations.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
  }

  #[test]
  fn demo_admin_has_no_preferences() {
    let s = authenticate("admin@edu.p.lodz.pl", "admin123").unwrap();
    assert!(s.is_admin());
    assert!(s.preferences.price_range.is_all());
    assert!(s.preferences.dietary.is_empty());
  }

  #[test]
  fn wrong_password_is_rejected() {
    let err = authenticate("admin@edu.p.lodz.pl", "password123").unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
  }

  #[test]
  fn well_formed_registration_passes() {
    let f = form("Ala Kowalska", "254321@edu.p.lodz.pl", "secret1", "secret1");
    assert!(f.validate(UNIVERSITY_DOMAIN).is_ok());
  }

  #[test]
  fn every_bad_field_is_reported() {
    let f = form(" A ", "ala@gmail.com", "abc", "abd");
    let errors = f.validate(UNIVERSITY_DOMAIN).unwrap_err();
    assert!(errors.get(Field::Name).unwrap().contains("at least 2"));
    assert!(errors.get(Field::Email).unwrap().contains("@edu.p.lodz.pl"));
    assert!(errors.get(Field::Password).is_some());
    assert_eq!(errors.get(Field::ConfirmPassword), Some("Passwords do not match"));
    assert_eq!(errors.iter().count(), 4);
  }

  #[test]
  fn email_local_part_rules() {
    let bare = form("Ala", "@edu.p.lodz.pl", "secret1", "secret1");
    assert_eq!(
      bare.validate(UNIVERSITY_DOMAIN).unwrap_err().get(Field::Email),
      Some("Invalid email format")
    );

    let spaced = form("Ala", "ala kowalska@edu.p.lodz.pl", "secret1", "secret1");
    assert!(
      spaced
        .validate(UNIVERSITY_DOMAIN)
        .unwrap_err()
        .get(Field::Email)
        .unwrap()
        .starts_with("Invalid email format. Use format")
    );

    let empty = form("Ala", "  ", "secret1", "secret1");
    assert_eq!(
      empty.validate(UNIVERSITY_DOMAIN).unwrap_err().get(Field::Email),
      Some("University email is required")
    );
  }

  #[test]
  fn registration_assigns_fresh_ids_and_defaults() {
    let a = form("Ala", "1@edu.p.lodz.pl", "secret1", "secret1")
      .into_session(UNIVERSITY_DOMAIN)
      .unwrap();
    let b = form("Ola", "2@edu.p.lodz.pl", "secret1", "secret1")
      .into_session(UNIVERSITY_DOMAIN)
      .unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.role, Role::Student);
    assert_eq!(a.preferences, Preferences::default());
    assert!(a.favorite_locations.is_empty());
  }

  #[test]
  fn invalid_registration_maps_to_validation_error() {
    let err = form("", "", "", "x").into_session(UNIVERSITY_DOMAIN).unwrap_err();
    assert!(matches!(err, Error::Validation(ref e) if !e.is_empty()));
  }
}
