//! The requesting member, as established by the authentication layer.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated member's profile id.
///
/// Session handling happens upstream; by the time a request reaches this
/// router the header has been set (and stripped from client input) by the
/// gateway.
pub const VIEWER_HEADER: &str = "x-viewer-id";

/// The profile id of the member making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer(pub Uuid);

impl<S> FromRequestParts<S> for Viewer
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get(VIEWER_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|s| Uuid::parse_str(s.trim()).ok())
      .map(Viewer)
      .ok_or(ApiError::Unauthorized)
  }
}
