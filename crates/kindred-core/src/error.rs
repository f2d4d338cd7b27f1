//! Error types for `kindred-core`.

use thiserror::Error;

/// A failure of one of the engine's collaborators.
///
/// Input problems never show up here: malformed request parameters degrade
/// to "no constraint", and an empty result is [`Discovery::NoMatches`]
/// rather than an error.
///
/// [`Discovery::NoMatches`]: crate::result::Discovery::NoMatches
#[derive(Debug, Error)]
pub enum Error {
  #[error("profile store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("presence provider error: {0}")]
  Presence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
