//! JSON API for Glossa.
//!
//! Exposes an axum [`Router`] backed by any store implementing the Glossa
//! storage traits. Every write is followed by a domain event handed to the
//! [`Dispatcher`], which creates subscriptions on registration and delivers
//! reply notifications to the [`Outbox`].
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Register; creates default subscriptions |
//! | `GET`  | `/users/{userid}` | 404 if not found |
//! | `GET`  | `/users/{userid}/subscriptions` | |
//! | `PUT`  | `/subscriptions/{id}` | Body: `{"active":false}` |
//! | `POST` | `/annotations` | May notify the parent's author |
//! | `GET`, `PATCH`, `DELETE` | `/annotations/{id}` | |
//! | `GET`  | `/notifications` | Recently delivered notifications |

pub mod annotations;
pub mod error;
pub mod notifications;
pub mod outbox;
pub mod subscriptions;
pub mod users;

pub use error::ApiError;
pub use outbox::Outbox;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use glossa_core::{
  events::{Dispatcher, Event},
  permission::AclOracle,
  store::{AnnotationStore, SubscriptionRegistry, UserDirectory},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GLOSSA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  /// Namespace new accounts are registered under.
  #[serde(default = "default_authority")]
  pub authority:       String,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// How many delivered notifications the outbox keeps.
  #[serde(default = "default_outbox_capacity")]
  pub outbox_capacity: usize,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5000 }

fn default_authority() -> String { "localhost".to_owned() }

fn default_store_path() -> PathBuf { PathBuf::from("glossa.db") }

fn default_outbox_capacity() -> usize { 100 }

// ─── Application state ────────────────────────────────────────────────────────

/// Everything a handler needs from the storage layer.
pub trait Backend:
  AnnotationStore + UserDirectory + SubscriptionRegistry + Clone + 'static
{
}

impl<T> Backend for T where
  T: AnnotationStore + UserDirectory + SubscriptionRegistry + Clone + 'static
{
}

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: Backend> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub outbox: Arc<Outbox>,
}

impl<S: Backend> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    let outbox = Outbox::new(config.outbox_capacity);
    Self { store: Arc::new(store), config: Arc::new(config), outbox: Arc::new(outbox) }
  }

  /// Route an event to its handler, logging rather than failing the request
  /// if the handler's store access fails.
  pub async fn publish(&self, event: Event) {
    let dispatcher = Dispatcher::new(&*self.store, &AclOracle, &*self.outbox);
    if let Err(e) = dispatcher.dispatch(event).await {
      tracing::error!(error = %e, "event handler failed");
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S: Backend>(state: AppState<S>) -> Router {
  Router::new()
    // Users
    .route("/users", post(users::register::<S>))
    .route("/users/{userid}", get(users::get_one::<S>))
    .route("/users/{userid}/subscriptions", get(subscriptions::list::<S>))
    // Subscriptions
    .route("/subscriptions/{id}", put(subscriptions::set_active::<S>))
    // Annotations
    .route("/annotations", post(annotations::create::<S>))
    .route(
      "/annotations/{id}",
      get(annotations::get_one::<S>)
        .patch(annotations::update::<S>)
        .delete(annotations::delete_one::<S>),
    )
    // Notifications
    .route("/notifications", get(notifications::list::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
