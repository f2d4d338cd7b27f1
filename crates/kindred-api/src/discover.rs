//! Handler for `GET /discover`.
//!
//! Query params map to [`DiscoveryParams`]; every one is optional and
//! list-valued params are comma-separated code lists. Malformed values are
//! ignored rather than rejected.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use kindred_core::{
  criteria::{DiscoveryParams, FilterCriteria},
  engine::DiscoveryEngine,
  presence::PresenceProvider,
  result::{Candidate, Discovery},
  store::ProfileStore,
};

use crate::{
  error::{ApiError, NO_MATCHES},
  viewer::Viewer,
};

/// `GET /discover[?name=...][&partner_age_from=...][&country=...&state=...&city=...][&online=1]...`
///
/// Returns the candidates as a JSON array, or 404 when nobody matches.
pub async fn handler<S, P>(
  State(engine): State<Arc<DiscoveryEngine<S, P>>>,
  Viewer(viewer): Viewer,
  Query(params): Query<DiscoveryParams>,
) -> Result<Json<Vec<Candidate>>, ApiError>
where
  S: ProfileStore,
  P: PresenceProvider,
{
  let criteria = FilterCriteria::from_params(&params);

  match engine.discover(viewer, &criteria).await? {
    Discovery::Matches(candidates) => Ok(Json(candidates)),
    Discovery::NoMatches => Err(ApiError::NotFound(NO_MATCHES.to_owned())),
  }
}
