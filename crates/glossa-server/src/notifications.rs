//! `GET /notifications`: reply notifications delivered to the outbox, oldest
//! first.

use axum::{Json, extract::State};
use glossa_core::notification::ReplyNotification;

use crate::{AppState, Backend};

pub async fn list<S: Backend>(State(state): State<AppState<S>>) -> Json<Vec<ReplyNotification>> {
  Json(state.outbox.recent())
}
