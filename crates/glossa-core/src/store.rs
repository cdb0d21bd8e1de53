//! Collaborator traits for storage backends.
//!
//! The traits are implemented by storage backends (e.g. `glossa-store-sqlite`).
//! The notification core and the HTTP layer depend on these abstractions, not
//! on any concrete backend.
//!
//! All three share the [`Store`] supertrait so that a single backend type has a
//! single error type, whichever of its roles is being used.

use std::future::Future;

use crate::{
  annotation::{Annotation, NewAnnotation},
  identity::UserId,
  subscription::{NewSubscription, Subscription, SubscriptionType},
  user::{NewUser, User},
};

/// Common base for all storage roles.
///
/// All methods on the role traits return `Send` futures so they can be used
/// in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Annotations ─────────────────────────────────────────────────────────────

pub trait AnnotationStore: Store {
  /// Fetch an annotation by id. Returns `None` if it does not exist (for
  /// instance because it was deleted).
  fn fetch_annotation<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send + 'a;

  /// Persist a new annotation. The id and timestamps are set by the store.
  fn create_annotation(
    &self,
    input: NewAnnotation,
  ) -> impl Future<Output = Result<Annotation, Self::Error>> + Send + '_;

  /// Replace the body of an annotation and bump `updated`. Returns `None` if
  /// the annotation does not exist.
  fn update_annotation_text<'a>(
    &'a self,
    id: &'a str,
    text: Option<String>,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send + 'a;

  /// Delete an annotation, returning the deleted record if there was one.
  fn delete_annotation<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send + 'a;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserDirectory: Store {
  /// Resolve an identity to a user. Matches on username and authority
  /// separately; returns `None` if no such user exists.
  fn fetch_user<'a>(
    &'a self,
    userid: &'a UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Look a user up by username, ignoring dots and case.
  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Look a user up by email address, ignoring case.
  fn get_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Persist a new user. `registered_at` is set by the store.
  ///
  /// Returns `None`, writing nothing, when the normalised username or the
  /// case-folded email already belongs to someone.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

pub trait SubscriptionRegistry: Store {
  /// Insert a subscription record. Performs no uniqueness check: calling this
  /// twice for the same target and type leaves two records.
  fn create_subscription(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// The first active subscription (lowest id) for `target` and `kind`.
  fn find_active<'a>(
    &'a self,
    target: &'a UserId,
    kind: SubscriptionType,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + 'a;

  /// All subscriptions for `target`, ascending by id.
  fn list_subscriptions<'a>(
    &'a self,
    target: &'a UserId,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + 'a;

  /// Toggle a subscription. Returns `None` if `id` is unknown.
  fn set_active(
    &self,
    id: i64,
    active: bool,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;
}
