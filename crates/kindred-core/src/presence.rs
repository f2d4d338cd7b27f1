//! Presence snapshots and the provider trait.
//!
//! The engine never writes presence. It reads one [`PresenceSnapshot`] per
//! request and uses that same view for both the online-only filter and the
//! `online` flag, so the two cannot disagree within a response.

use std::{
  collections::BTreeSet,
  convert::Infallible,
  future::Future,
  sync::{PoisonError, RwLock},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Usernames considered online at the moment of capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSnapshot {
  online: BTreeSet<String>,
}

impl PresenceSnapshot {
  pub fn contains(&self, username: &str) -> bool { self.online.contains(username) }

  pub fn len(&self) -> usize { self.online.len() }

  pub fn is_empty(&self) -> bool { self.online.is_empty() }

  /// Usernames in ascending order.
  pub fn iter(&self) -> impl Iterator<Item = &str> { self.online.iter().map(String::as_str) }
}

impl<T: Into<String>> FromIterator<T> for PresenceSnapshot {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    Self { online: iter.into_iter().map(Into::into).collect() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Source of "who is online right now".
///
/// No staleness guarantee is expected beyond "recent".
pub trait PresenceProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Capture the current set of online usernames.
  fn snapshot(&self) -> impl Future<Output = Result<PresenceSnapshot, Self::Error>> + Send + '_;
}

// ─── In-memory provider ──────────────────────────────────────────────────────

/// A presence registry held in process memory.
///
/// The write methods stand in for whatever connection layer marks members
/// online; the engine only calls [`PresenceProvider::snapshot`].
#[derive(Debug, Default)]
pub struct MemoryPresence {
  online: RwLock<BTreeSet<String>>,
}

impl MemoryPresence {
  pub fn new() -> Self { Self::default() }

  pub fn set_online(&self, username: impl Into<String>) {
    self
      .online
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(username.into());
  }

  pub fn set_offline(&self, username: &str) {
    self
      .online
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(username);
  }
}

impl PresenceProvider for MemoryPresence {
  type Error = Infallible;

  async fn snapshot(&self) -> Result<PresenceSnapshot, Infallible> {
    let online = self.online.read().unwrap_or_else(PoisonError::into_inner).clone();
    Ok(PresenceSnapshot { online })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn snapshot_is_detached_from_later_writes() {
    let presence = MemoryPresence::new();
    presence.set_online("ann");
    presence.set_online("bob");

    let snap = presence.snapshot().await.unwrap();
    presence.set_offline("ann");
    presence.set_online("cyd");

    assert!(snap.contains("ann"));
    assert!(!snap.contains("cyd"));
    assert_eq!(snap.iter().collect::<Vec<_>>(), vec!["ann", "bob"]);

    let later = presence.snapshot().await.unwrap();
    assert!(!later.contains("ann"));
    assert!(later.contains("cyd"));
  }

  #[test]
  fn collects_from_strs() {
    let snap: PresenceSnapshot = ["b", "a", "b"].into_iter().collect();
    assert_eq!(snap.len(), 2);
    assert!(!snap.is_empty());
  }
}
