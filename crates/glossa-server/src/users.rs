//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: `{"username":"...","email":"..."}`; 409 if taken |
//! | `GET`  | `/users/:userid` | `acct:` form; 404 if not found or malformed |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use glossa_core::{
  events::{Event, RegistrationEvent},
  identity::UserId,
  user::{NewUser, User},
};
use serde::Deserialize;

use crate::{AppState, Backend, error::ApiError};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username:     String,
  pub email:        String,
  pub display_name: Option<String>,
}

/// `POST /users`. The account is created under the configured authority.
pub async fn register<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
  let authority = state.config.authority.clone();
  let mut new = NewUser::new(body.username, authority.clone(), body.email)?;
  new.display_name = body.display_name;

  if state
    .store
    .get_user_by_username(new.username())
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!("username {:?} is taken", new.username())));
  }
  if state
    .store
    .get_user_by_email(new.email())
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict("email is already registered".to_owned()));
  }

  // A concurrent registration can still win the race past the checks above.
  let user = state
    .store
    .add_user(new)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Conflict("username or email is already registered".to_owned()))?;
  tracing::info!(userid = %user.userid(), "registered user");

  state
    .publish(Event::UserRegistered(RegistrationEvent { user: user.clone(), authority }))
    .await;

  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:userid`. A malformed userid names nobody, so it is a 404.
pub async fn get_one<S: Backend>(
  State(state): State<AppState<S>>,
  Path(raw): Path<String>,
) -> Result<Json<User>, ApiError> {
  let not_found = || ApiError::NotFound(format!("user {raw} not found"));
  let userid = UserId::parse(&raw).map_err(|_| not_found())?;
  let user = state
    .store
    .fetch_user(&userid)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  Ok(Json(user))
}
