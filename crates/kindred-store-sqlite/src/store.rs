//! [`SqliteStore`] — the SQLite implementation of [`ProfileStore`] and
//! [`PresenceProvider`].

use std::path::Path;

use chrono::{DateTime, Utc};
use kindred_core::{
  predicate::Predicate,
  presence::{PresenceProvider, PresenceSnapshot},
  profile::Profile,
  store::ProfileStore,
};
use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    PROFILE_COLUMNS, RawProfile, encode_codes, encode_date, encode_dt, encode_photos,
    encode_uuid,
  },
  filter::{FOLD_FUNCTION, where_clause},
  schema::SCHEMA,
};

/// Lowercase with full Unicode case mapping; SQLite's `lower()` only maps
/// ASCII.
fn register_fold(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_FUNCTION,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.map(|t| t.to_lowercase()))
    },
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Profiles and presence backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_fold(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Seeding ───────────────────────────────────────────────────────────────
  //
  // Profiles are owned by the account service; these writes exist so that a
  // store can be populated for development and tests.

  /// Insert a profile. Fails if the id is already taken.
  pub async fn insert_profile(&self, profile: &Profile) -> Result<()> {
    let id_str = encode_uuid(profile.profile_id);

    let exists: bool = self
      .conn
      .call({
        let id_str = id_str.clone();
        move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM profiles WHERE profile_id = ?1",
                rusqlite::params![id_str],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        }
      })
      .await?;

    if exists {
      return Err(Error::DuplicateProfile(profile.profile_id));
    }

    let username        = profile.username.clone();
    let first_name      = profile.first_name.clone();
    let last_name       = profile.last_name.clone();
    let birth_date_str  = encode_date(profile.birth_date);
    let height          = profile.height;
    let weight          = profile.weight;
    let photos_str      = encode_photos(&profile.photos)?;
    let location        = profile.location.clone();
    let attrs           = profile.attributes.clone();
    let languages_str   = encode_codes(&attrs.languages)?;
    let last_online_str = profile.last_online.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             profile_id, username, first_name, last_name, birth_date,
             height, weight, photos, country, region, city,
             hair_color, eye_color, religion, marital_status, smoking, drinking,
             languages, last_online
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                     ?15, ?16, ?17, ?18, ?19)",
          rusqlite::params![
            id_str,
            username,
            first_name,
            last_name,
            birth_date_str,
            height,
            weight,
            photos_str,
            location.country,
            location.region,
            location.city,
            attrs.hair_color,
            attrs.eye_color,
            attrs.religion,
            attrs.marital_status,
            attrs.smoking,
            attrs.drinking,
            languages_str,
            last_online_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(profile_id = %profile.profile_id, username = %profile.username, "profile inserted");
    Ok(())
  }

  /// Mark `username` as online since `at`.
  pub async fn set_online(&self, username: &str, at: DateTime<Utc>) -> Result<()> {
    let username = username.to_owned();
    let at_str = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO presence (username, since) VALUES (?1, ?2)
           ON CONFLICT(username) DO UPDATE SET since = excluded.since",
          rusqlite::params![username, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn set_offline(&self, username: &str) -> Result<()> {
    let username = username.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM presence WHERE username = ?1", rusqlite::params![username])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = Error;

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE profile_id = ?1"),
              rusqlite::params![id_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn query(&self, predicate: &Predicate) -> Result<Vec<Profile>> {
    let filter = where_clause(predicate);
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE {}", filter.clause);
    tracing::trace!(%sql, params = filter.params.len(), "profile query");

    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(filter.params.iter()), RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }
}

// ─── PresenceProvider impl ───────────────────────────────────────────────────

impl PresenceProvider for SqliteStore {
  type Error = Error;

  async fn snapshot(&self) -> Result<PresenceSnapshot> {
    let usernames: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT username FROM presence")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(usernames.into_iter().collect())
  }
}
