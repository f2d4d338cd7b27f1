//! Candidate results and the final assembly step.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One discovered member, as shown to the viewer.
///
/// Only these fields leave the engine; birth date and the filter-only
/// attributes are dropped at projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
  pub profile_id:    Uuid,
  pub first_name:    String,
  pub last_name:     String,
  pub last_online:   Option<DateTime<Utc>>,
  pub age:           i32,
  pub online:        bool,
  pub profile_photo: String,
}

/// Outcome of a discovery request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
  Matches(Vec<Candidate>),
  /// Nothing survived the filters. Not an error: callers should render a
  /// "no one matches your search" message.
  NoMatches,
}

impl Discovery {
  /// Wrap projected candidates, turning an empty list into
  /// [`Discovery::NoMatches`]. Order is kept as given.
  pub fn assemble(candidates: Vec<Candidate>) -> Self {
    if candidates.is_empty() { Self::NoMatches } else { Self::Matches(candidates) }
  }

  pub fn candidates(&self) -> &[Candidate] {
    match self {
      Self::Matches(c) => c,
      Self::NoMatches => &[],
    }
  }

  pub fn is_empty(&self) -> bool { matches!(self, Self::NoMatches) }
}
