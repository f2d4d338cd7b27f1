//! Handler for `GET /profiles/{id}`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use kindred_core::{
  engine::{Derived, DiscoveryEngine},
  presence::PresenceProvider,
  store::ProfileStore,
};
use uuid::Uuid;

use crate::{error::ApiError, viewer::Viewer};

/// `GET /profiles/{id}` — one profile with its derived age, online flag and
/// display photo. 400 for the viewer's own id, 404 if unknown.
pub async fn get_one<S, P>(
  State(engine): State<Arc<DiscoveryEngine<S, P>>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<Derived>, ApiError>
where
  S: ProfileStore,
  P: PresenceProvider,
{
  if id == viewer {
    return Err(ApiError::BadRequest("cannot view your own profile here".to_owned()));
  }

  let profile = engine
    .view(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("profile {id} not found")))?;
  Ok(Json(profile))
}
