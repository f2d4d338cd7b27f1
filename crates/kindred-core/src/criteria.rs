//! Request parameters and the typed filter criteria built from them.
//!
//! [`DiscoveryParams`] mirrors the query string exactly: every field is an
//! optional string. [`FilterCriteria::from_params`] normalizes it into a
//! structure where every field that is present is also valid, and where the
//! location hierarchy can only be expressed top-down.

use serde::Deserialize;

use crate::normalize::{to_flag, to_num, to_num_arr, to_text};

// ─── Raw parameters ──────────────────────────────────────────────────────────

/// Discovery parameters as they arrive on the wire.
///
/// List-valued fields are comma-separated code lists, e.g. `hair_colors=1,3`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryParams {
  /// Case-insensitive substring of first name, last name or username.
  pub name:             Option<String>,
  pub partner_age_from: Option<String>,
  pub partner_age_to:   Option<String>,
  pub country:          Option<String>,
  /// Region code; ignored unless `country` is present.
  pub state:            Option<String>,
  /// City code; ignored unless `state` is present and valid.
  pub city:             Option<String>,
  pub height_from:      Option<String>,
  pub height_to:        Option<String>,
  pub weight_from:      Option<String>,
  pub weight_to:        Option<String>,
  pub hair_colors:      Option<String>,
  pub eye_colors:       Option<String>,
  #[serde(alias = "relegions")]
  pub religions:        Option<String>,
  pub marital_status:   Option<String>,
  pub smoking:          Option<String>,
  pub drinking:         Option<String>,
  pub languages:        Option<String>,
  pub online:           Option<String>,
  pub with_photos:      Option<String>,
}

// ─── Bounds ──────────────────────────────────────────────────────────────────

/// An inclusive range with independently optional ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
  pub min: Option<i64>,
  pub max: Option<i64>,
}

impl Bounds {
  /// Build bounds from raw endpoints. Returns `None` when neither end
  /// normalizes to a number, so the caller can skip the filter entirely.
  pub fn from_raw(min: Option<&str>, max: Option<&str>) -> Option<Self> {
    let bounds = Self {
      min: min.and_then(to_num),
      max: max.and_then(to_num),
    };
    (bounds.min.is_some() || bounds.max.is_some()).then_some(bounds)
  }

  pub fn contains(&self, value: i64) -> bool {
    self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
  }
}

// ─── Location ────────────────────────────────────────────────────────────────

/// Location filter. Each variant carries all of its ancestors, so a region
/// without a country cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationFilter {
  Country(String),
  Region { country: String, region: i64 },
  City { country: String, region: i64, city: i64 },
}

impl LocationFilter {
  /// Apply the top-down cascade. A level whose parent is missing (or did not
  /// normalize) is silently dropped.
  pub fn from_raw(
    country: Option<&str>,
    state: Option<&str>,
    city: Option<&str>,
  ) -> Option<Self> {
    let country = country.and_then(to_text)?;

    let Some(region) = state.and_then(to_num) else {
      return Some(Self::Country(country));
    };

    match city.and_then(to_num) {
      Some(city) => Some(Self::City { country, region, city }),
      None => Some(Self::Region { country, region }),
    }
  }
}

// ─── Criteria ────────────────────────────────────────────────────────────────

/// Normalized filter criteria for one discovery request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
  pub name:           Option<String>,
  /// Applied to the derived age, after derivation.
  pub age:            Option<Bounds>,
  pub location:       Option<LocationFilter>,
  pub height:         Option<Bounds>,
  pub weight:         Option<Bounds>,
  pub hair_colors:    Option<Vec<i64>>,
  pub eye_colors:     Option<Vec<i64>>,
  pub religions:      Option<Vec<i64>>,
  pub marital_status: Option<Vec<i64>>,
  pub smoking:        Option<Vec<i64>>,
  pub drinking:       Option<Vec<i64>>,
  pub languages:      Option<Vec<i64>>,
  pub online_only:    bool,
  pub with_photos:    bool,
}

impl FilterCriteria {
  /// Normalize raw parameters. Never fails: anything absent or malformed
  /// imposes no constraint.
  pub fn from_params(params: &DiscoveryParams) -> Self {
    let codes = |v: &Option<String>| v.as_deref().and_then(to_num_arr);

    Self {
      name:           params.name.as_deref().and_then(to_text),
      age:            Bounds::from_raw(
        params.partner_age_from.as_deref(),
        params.partner_age_to.as_deref(),
      ),
      location:       LocationFilter::from_raw(
        params.country.as_deref(),
        params.state.as_deref(),
        params.city.as_deref(),
      ),
      height:         Bounds::from_raw(
        params.height_from.as_deref(),
        params.height_to.as_deref(),
      ),
      weight:         Bounds::from_raw(
        params.weight_from.as_deref(),
        params.weight_to.as_deref(),
      ),
      hair_colors:    codes(&params.hair_colors),
      eye_colors:     codes(&params.eye_colors),
      religions:      codes(&params.religions),
      marital_status: codes(&params.marital_status),
      smoking:        codes(&params.smoking),
      drinking:       codes(&params.drinking),
      languages:      codes(&params.languages),
      online_only:    params.online.as_deref().is_some_and(to_flag),
      with_photos:    params.with_photos.as_deref().is_some_and(to_flag),
    }
  }
}

impl From<&DiscoveryParams> for FilterCriteria {
  fn from(params: &DiscoveryParams) -> Self { Self::from_params(params) }
}
