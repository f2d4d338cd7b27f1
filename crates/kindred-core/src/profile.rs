//! Profile records as held by the profile store.
//!
//! The engine treats these as read-only input. Coded attributes are small
//! integers whose meaning (which code is "brown", which is "Catholic") is
//! owned by the presentation layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Location ────────────────────────────────────────────────────────────────

/// Hierarchical location: a region is only meaningful within its country, a
/// city only within its region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  /// ISO-style country code, e.g. `"MA"`.
  pub country: Option<String>,
  pub region:  Option<i64>,
  pub city:    Option<i64>,
}

// ─── Coded attributes ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
  pub hair_color:     Option<i64>,
  pub eye_color:      Option<i64>,
  pub religion:       Option<i64>,
  pub marital_status: Option<i64>,
  pub smoking:        Option<i64>,
  pub drinking:       Option<i64>,
  #[serde(default)]
  pub languages:      Vec<i64>,
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// A member profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id:  Uuid,
  /// Unique; also the key used by the presence provider.
  pub username:    String,
  pub first_name:  String,
  pub last_name:   String,
  pub birth_date:  NaiveDate,
  /// Centimetres.
  pub height:      Option<i64>,
  /// Kilograms.
  pub weight:      Option<i64>,
  /// Photo identifiers; the first one is the display photo.
  #[serde(default)]
  pub photos:      Vec<String>,
  #[serde(default)]
  pub location:    Location,
  #[serde(default)]
  pub attributes:  Attributes,
  /// Most recent activity, if the member has ever been active.
  pub last_online: Option<DateTime<Utc>>,
}

impl Profile {
  /// A profile with only the required fields set; everything optional is
  /// absent.
  pub fn new(
    username: impl Into<String>,
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    birth_date: NaiveDate,
  ) -> Self {
    Self {
      profile_id:  Uuid::new_v4(),
      username:    username.into(),
      first_name:  first_name.into(),
      last_name:   last_name.into(),
      birth_date,
      height:      None,
      weight:      None,
      photos:      Vec::new(),
      location:    Location::default(),
      attributes:  Attributes::default(),
      last_online: None,
    }
  }
}
