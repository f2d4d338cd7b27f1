//! The `ProfileStore` trait and an in-memory implementation.
//!
//! The trait is implemented by storage backends (e.g.
//! `kindred-store-sqlite`). The engine and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::{
  convert::Infallible,
  future::Future,
  sync::{PoisonError, RwLock},
};

use uuid::Uuid;

use crate::{predicate::Predicate, profile::Profile};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read access to profile records.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ProfileStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a profile by id. Returns `None` if not found.
  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Return every profile satisfying `predicate`, in no particular order.
  fn query<'a>(
    &'a self,
    predicate: &'a Predicate,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + 'a;
}

// ─── In-memory store ─────────────────────────────────────────────────────────

/// Profiles held in a `Vec`, filtered with [`Predicate::matches`].
#[derive(Debug, Default)]
pub struct MemoryStore {
  profiles: RwLock<Vec<Profile>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Add a profile, replacing any existing one with the same id.
  pub fn insert_profile(&self, profile: Profile) {
    let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
    profiles.retain(|p| p.profile_id != profile.profile_id);
    profiles.push(profile);
  }
}

impl FromIterator<Profile> for MemoryStore {
  fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
    let store = Self::new();
    for profile in iter {
      store.insert_profile(profile);
    }
    store
  }
}

impl ProfileStore for MemoryStore {
  type Error = Infallible;

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, Infallible> {
    let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
    Ok(profiles.iter().find(|p| p.profile_id == id).cloned())
  }

  async fn query(&self, predicate: &Predicate) -> Result<Vec<Profile>, Infallible> {
    let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
    Ok(profiles.iter().filter(|p| predicate.matches(p)).cloned().collect())
  }
}
