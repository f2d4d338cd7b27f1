//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, birth dates as `YYYY-MM-DD`.
//! Photo and language lists are stored as compact JSON arrays. UUIDs are
//! stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use kindred_core::profile::{Attributes, Location, Profile};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON lists ───────────────────────────────────────────────────────────────

pub fn encode_photos(photos: &[String]) -> Result<String> { Ok(serde_json::to_string(photos)?) }

pub fn decode_photos(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

pub fn encode_codes(codes: &[i64]) -> Result<String> { Ok(serde_json::to_string(codes)?) }

pub fn decode_codes(s: &str) -> Result<Vec<i64>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawProfile::from_row`].
pub const PROFILE_COLUMNS: &str = "profile_id, username, first_name, last_name, birth_date, \
   height, weight, photos, country, region, city, hair_color, eye_color, religion, \
   marital_status, smoking, drinking, languages, last_online";

/// Values read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id:     String,
  pub username:       String,
  pub first_name:     String,
  pub last_name:      String,
  pub birth_date:     String,
  pub height:         Option<i64>,
  pub weight:         Option<i64>,
  pub photos:         String,
  pub country:        Option<String>,
  pub region:         Option<i64>,
  pub city:           Option<i64>,
  pub hair_color:     Option<i64>,
  pub eye_color:      Option<i64>,
  pub religion:       Option<i64>,
  pub marital_status: Option<i64>,
  pub smoking:        Option<i64>,
  pub drinking:       Option<i64>,
  pub languages:      String,
  pub last_online:    Option<String>,
}

impl RawProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id:     row.get(0)?,
      username:       row.get(1)?,
      first_name:     row.get(2)?,
      last_name:      row.get(3)?,
      birth_date:     row.get(4)?,
      height:         row.get(5)?,
      weight:         row.get(6)?,
      photos:         row.get(7)?,
      country:        row.get(8)?,
      region:         row.get(9)?,
      city:           row.get(10)?,
      hair_color:     row.get(11)?,
      eye_color:      row.get(12)?,
      religion:       row.get(13)?,
      marital_status: row.get(14)?,
      smoking:        row.get(15)?,
      drinking:       row.get(16)?,
      languages:      row.get(17)?,
      last_online:    row.get(18)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id:  decode_uuid(&self.profile_id)?,
      username:    self.username,
      first_name:  self.first_name,
      last_name:   self.last_name,
      birth_date:  decode_date(&self.birth_date)?,
      height:      self.height,
      weight:      self.weight,
      photos:      decode_photos(&self.photos)?,
      location:    Location {
        country: self.country,
        region:  self.region,
        city:    self.city,
      },
      attributes:  Attributes {
        hair_color:     self.hair_color,
        eye_color:      self.eye_color,
        religion:       self.religion,
        marital_status: self.marital_status,
        smoking:        self.smoking,
        drinking:       self.drinking,
        languages:      decode_codes(&self.languages)?,
      },
      last_online: self.last_online.as_deref().map(decode_dt).transpose()?,
    })
  }
}
