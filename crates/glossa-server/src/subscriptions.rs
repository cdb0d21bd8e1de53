//! Handlers for subscription endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/:userid/subscriptions` | All records, ascending id; empty for a malformed userid |
//! | `PUT`  | `/subscriptions/:id` | Body: `{"active":true\|false}` |

use axum::{
  Json,
  extract::{Path, State},
};
use glossa_core::{identity::UserId, subscription::Subscription};
use serde::Deserialize;

use crate::{AppState, Backend, error::ApiError};

/// `GET /users/:userid/subscriptions`
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
  Path(userid): Path<String>,
) -> Result<Json<Vec<Subscription>>, ApiError> {
  let Ok(userid) = UserId::parse(&userid) else {
    return Ok(Json(Vec::new()));
  };
  let subs = state
    .store
    .list_subscriptions(&userid)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subs))
}

#[derive(Debug, Deserialize)]
pub struct SetActiveBody {
  pub active: bool,
}

/// `PUT /subscriptions/:id`
pub async fn set_active<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<SetActiveBody>,
) -> Result<Json<Subscription>, ApiError> {
  let sub = state
    .store
    .set_active(id, body.active)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subscription {id} not found")))?;
  tracing::info!(id, target = %sub.target, active = sub.active, "subscription updated");
  Ok(Json(sub))
}
