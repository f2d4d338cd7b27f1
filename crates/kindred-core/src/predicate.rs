//! The compiled predicate tree for the primary (stage 1) filter.
//!
//! A [`Predicate`] only refers to stored fields. The age range is not part
//! of it: age is derived later, and is filtered by the engine afterwards.
//!
//! Stores either evaluate the tree in process with [`Predicate::matches`] or
//! translate it into their own query language.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::{
  criteria::{Bounds, FilterCriteria, LocationFilter},
  presence::PresenceSnapshot,
  profile::{Attributes, Profile},
};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// Text fields searched by the name filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
  FirstName,
  LastName,
  Username,
}

impl TextField {
  pub fn get(self, profile: &Profile) -> &str {
    match self {
      Self::FirstName => &profile.first_name,
      Self::LastName => &profile.last_name,
      Self::Username => &profile.username,
    }
  }
}

/// Stored numeric fields that accept a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
  Height,
  Weight,
}

impl NumericField {
  pub fn get(self, profile: &Profile) -> Option<i64> {
    match self {
      Self::Height => profile.height,
      Self::Weight => profile.weight,
    }
  }
}

/// Coded attributes that accept a set of codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeField {
  HairColor,
  EyeColor,
  Religion,
  MaritalStatus,
  Smoking,
  Drinking,
  /// Multi-valued: matches when any spoken language is in the set.
  Languages,
}

impl CodeField {
  pub fn is_multi_valued(self) -> bool { matches!(self, Self::Languages) }

  /// Codes the profile holds for this field (zero or one for scalar fields).
  pub fn values(self, attributes: &Attributes) -> &[i64] {
    let single = match self {
      Self::HairColor => &attributes.hair_color,
      Self::EyeColor => &attributes.eye_color,
      Self::Religion => &attributes.religion,
      Self::MaritalStatus => &attributes.marital_status,
      Self::Smoking => &attributes.smoking,
      Self::Drinking => &attributes.drinking,
      Self::Languages => return &attributes.languages,
    };
    single.as_slice()
  }
}

// ─── Tree ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
  /// True when every child is; an empty `And` is true.
  And(Vec<Predicate>),
  /// True when any child is; an empty `Or` is false.
  Or(Vec<Predicate>),
  /// Excludes exactly one profile.
  NotProfile(Uuid),
  /// Case-insensitive substring match. `needle` is stored lowercased.
  TextContains { field: TextField, needle: String },
  HasPhotos,
  CountryIs(String),
  RegionIs(i64),
  CityIs(i64),
  /// An absent stored value never satisfies a range.
  InRange { field: NumericField, bounds: Bounds },
  /// An absent stored value never satisfies a code set.
  CodeIn { field: CodeField, codes: Vec<i64> },
  UsernameIn(BTreeSet<String>),
}

impl Predicate {
  pub fn matches(&self, profile: &Profile) -> bool {
    match self {
      Self::And(children) => children.iter().all(|p| p.matches(profile)),
      Self::Or(children) => children.iter().any(|p| p.matches(profile)),
      Self::NotProfile(id) => profile.profile_id != *id,
      Self::TextContains { field, needle } => {
        field.get(profile).to_lowercase().contains(needle.as_str())
      }
      Self::HasPhotos => !profile.photos.is_empty(),
      Self::CountryIs(country) => profile.location.country.as_deref() == Some(country.as_str()),
      Self::RegionIs(region) => profile.location.region == Some(*region),
      Self::CityIs(city) => profile.location.city == Some(*city),
      Self::InRange { field, bounds } => field.get(profile).is_some_and(|v| bounds.contains(v)),
      Self::CodeIn { field, codes } => {
        field.values(&profile.attributes).iter().any(|v| codes.contains(v))
      }
      Self::UsernameIn(usernames) => usernames.contains(&profile.username),
    }
  }
}

// ─── Compilation ─────────────────────────────────────────────────────────────

/// Compile criteria into the stage 1 predicate.
///
/// `presence` is only consulted when the criteria ask for online members;
/// pass the same snapshot the engine will use for the `online` flag.
pub fn compile(criteria: &FilterCriteria, viewer: Uuid, presence: &PresenceSnapshot) -> Predicate {
  let mut all = vec![Predicate::NotProfile(viewer)];

  if let Some(name) = &criteria.name {
    let needle = name.to_lowercase();
    all.push(Predicate::Or(
      [TextField::FirstName, TextField::LastName, TextField::Username]
        .into_iter()
        .map(|field| Predicate::TextContains { field, needle: needle.clone() })
        .collect(),
    ));
  }

  if criteria.with_photos {
    all.push(Predicate::HasPhotos);
  }

  match &criteria.location {
    None => {}
    Some(LocationFilter::Country(country)) => {
      all.push(Predicate::CountryIs(country.clone()));
    }
    Some(LocationFilter::Region { country, region }) => {
      all.push(Predicate::CountryIs(country.clone()));
      all.push(Predicate::RegionIs(*region));
    }
    Some(LocationFilter::City { country, region, city }) => {
      all.push(Predicate::CountryIs(country.clone()));
      all.push(Predicate::RegionIs(*region));
      all.push(Predicate::CityIs(*city));
    }
  }

  for (field, bounds) in [
    (NumericField::Height, criteria.height),
    (NumericField::Weight, criteria.weight),
  ] {
    if let Some(bounds) = bounds {
      all.push(Predicate::InRange { field, bounds });
    }
  }

  for (field, codes) in [
    (CodeField::HairColor, &criteria.hair_colors),
    (CodeField::EyeColor, &criteria.eye_colors),
    (CodeField::Religion, &criteria.religions),
    (CodeField::MaritalStatus, &criteria.marital_status),
    (CodeField::Smoking, &criteria.smoking),
    (CodeField::Drinking, &criteria.drinking),
    (CodeField::Languages, &criteria.languages),
  ] {
    if let Some(codes) = codes {
      all.push(Predicate::CodeIn { field, codes: codes.clone() });
    }
  }

  if criteria.online_only {
    all.push(Predicate::UsernameIn(presence.iter().map(str::to_owned).collect()));
  }

  Predicate::And(all)
}
