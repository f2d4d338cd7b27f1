//! JSON API for Kindred member discovery.
//!
//! Exposes an axum [`Router`] backed by a [`DiscoveryEngine`] over any
//! [`ProfileStore`] and [`PresenceProvider`]. Authentication, TLS and
//! transport concerns are the caller's responsibility; the viewer arrives in
//! the [`VIEWER_HEADER`](viewer::VIEWER_HEADER) header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kindred_api::api_router(engine.clone()))
//! ```

pub mod discover;
pub mod error;
pub mod profiles;
pub mod viewer;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use kindred_core::{engine::DiscoveryEngine, presence::PresenceProvider, store::ProfileStore};
use serde_json::{Value, json};

pub use error::ApiError;

/// Build the API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, P>(engine: Arc<DiscoveryEngine<S, P>>) -> Router<()>
where
  S: ProfileStore + 'static,
  P: PresenceProvider + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/discover", get(discover::handler::<S, P>))
    .route("/profiles/{id}", get(profiles::get_one::<S, P>))
    .with_state(engine)
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
