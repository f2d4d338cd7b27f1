//! Kindred discovery server: configuration, seeding and router assembly.
//!
//! The binary in `main.rs` is a thin wrapper around these pieces.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use chrono::Utc;
use kindred_core::{
  engine::{DEFAULT_PHOTO, DiscoveryEngine},
  profile::Profile,
};
use kindred_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `KINDRED_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_path:    PathBuf,
  pub default_photo: String,
}

impl ServerConfig {
  /// Load from `path` (optional) with environment overrides on top.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 3000)?
      .set_default("store_path", "kindred.db")?
      .set_default("default_photo", DEFAULT_PHOTO)?
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("KINDRED"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Seeding ──────────────────────────────────────────────────────────────────

/// Contents of a `--seed` file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
  pub profiles: Vec<Profile>,
  /// Usernames to mark online.
  #[serde(default)]
  pub online:   Vec<String>,
}

/// Load profiles (and optionally presence) from a JSON seed file. Returns
/// the number of profiles inserted.
pub async fn seed(store: &SqliteStore, path: &Path) -> anyhow::Result<usize> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read seed file {path:?}"))?;
  let file: SeedFile = serde_json::from_str(&raw)
    .with_context(|| format!("failed to parse seed file {path:?}"))?;

  for profile in &file.profiles {
    store
      .insert_profile(profile)
      .await
      .with_context(|| format!("failed to insert profile {:?}", profile.username))?;
  }

  let now = Utc::now();
  for username in &file.online {
    store.set_online(username, now).await?;
  }

  tracing::info!(profiles = file.profiles.len(), online = file.online.len(), "seeded store");
  Ok(file.profiles.len())
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the HTTP application over `store`, which serves both profiles and
/// presence.
pub fn app(store: SqliteStore, config: &ServerConfig) -> Router {
  let store = Arc::new(store);
  let engine = DiscoveryEngine::new(store.clone(), store)
    .with_default_photo(config.default_photo.clone());

  Router::new()
    .merge(kindred_api::api_router(Arc::new(engine)))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
