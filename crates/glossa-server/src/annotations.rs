//! Handlers for `/annotations` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/annotations` | Body: [`CreateBody`]; returns 201 + stored annotation |
//! | `GET`    | `/annotations/:id` | 404 if not found |
//! | `PATCH`  | `/annotations/:id` | Body: `{"text":"..."}` |
//! | `DELETE` | `/annotations/:id` | 204 |
//!
//! Each write publishes an annotation event with the matching action.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use glossa_core::{
  annotation::{Annotation, DocumentMetadata, NewAnnotation, Permissions},
  events::{Action, AnnotationEvent, Event},
  identity::UserId,
};
use serde::Deserialize;

use crate::{AppState, Backend, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBody {
  /// Author identity, `acct:<username>@<authority>`.
  pub user:       UserId,
  pub uri:        String,
  pub text:       Option<String>,
  /// Thread ancestry, root first. The last entry is the annotation being
  /// replied to and must exist.
  #[serde(default)]
  pub references: Vec<String>,
  /// World-readable when `true` (the default), author-only otherwise.
  #[serde(default = "default_shared")]
  pub shared:     bool,
  pub document:   Option<DocumentMetadata>,
}

fn default_shared() -> bool { true }

/// `POST /annotations`
pub async fn create<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  if state
    .store
    .fetch_user(&body.user)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::BadRequest(format!("unknown user {}", body.user)));
  }

  if let Some(parent_id) = body.references.last()
    && state
      .store
      .fetch_annotation(parent_id)
      .await
      .map_err(ApiError::store)?
      .is_none()
  {
    return Err(ApiError::BadRequest(format!("unknown parent annotation {parent_id}")));
  }

  let mut input = NewAnnotation::new(body.user, body.uri);
  input.references = body.references;
  input.text = body.text;
  input.permissions = Permissions::for_owner(&input.userid, body.shared);
  input.document = body.document;

  let annotation = state
    .store
    .create_annotation(input)
    .await
    .map_err(ApiError::store)?;

  publish(&state, &annotation, Action::Create).await;
  Ok((StatusCode::CREATED, Json(annotation)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /annotations/:id`
pub async fn get_one<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Annotation>, ApiError> {
  let annotation = state
    .store
    .fetch_annotation(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(&id))?;
  Ok(Json(annotation))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub text: Option<String>,
}

/// `PATCH /annotations/:id`
pub async fn update<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Annotation>, ApiError> {
  let annotation = state
    .store
    .update_annotation_text(&id, body.text)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(&id))?;

  publish(&state, &annotation, Action::Update).await;
  Ok(Json(annotation))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /annotations/:id`
pub async fn delete_one<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  let annotation = state
    .store
    .delete_annotation(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(&id))?;

  publish(&state, &annotation, Action::Delete).await;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn not_found(id: &str) -> ApiError { ApiError::NotFound(format!("annotation {id} not found")) }

async fn publish<S: Backend>(state: &AppState<S>, annotation: &Annotation, action: Action) {
  let event = AnnotationEvent { annotation: annotation.clone(), action };
  state.publish(Event::Annotation(event)).await;
}
