//! Domain events and the table of handlers they are routed to.
//!
//! Handlers are plain async functions ([`crate::notification::reply::evaluate`],
//! [`on_user_registered`]) that can be called directly; the [`Dispatcher`] only
//! decides which one an event goes to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  annotation::Annotation,
  identity::UserId,
  notification::{NotificationSink, reply},
  permission::PermissionOracle,
  store::{AnnotationStore, SubscriptionRegistry, UserDirectory},
  subscription::{NewSubscription, Subscription, SubscriptionType},
  user::User,
};

// ─── Events ──────────────────────────────────────────────────────────────────

/// What happened to an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Create,
  Update,
  Delete,
}

impl Action {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Create => "create",
      Self::Update => "update",
      Self::Delete => "delete",
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone)]
pub struct AnnotationEvent {
  pub annotation: Annotation,
  pub action:     Action,
}

/// Emitted once when a user account is created.
#[derive(Debug, Clone)]
pub struct RegistrationEvent {
  pub user:      User,
  /// The authority the account was registered under.
  pub authority: String,
}

#[derive(Debug, Clone)]
pub enum Event {
  Annotation(AnnotationEvent),
  UserRegistered(RegistrationEvent),
}

// ─── Registration handler ────────────────────────────────────────────────────

/// Give a newly registered user an active subscription for every known
/// notification type.
///
/// Not idempotent: running it twice for the same user leaves duplicate
/// records.
pub async fn on_user_registered<R>(
  registry: &R,
  event: &RegistrationEvent,
) -> Result<Vec<Subscription>, R::Error>
where
  R: SubscriptionRegistry,
{
  let target = UserId::new(&event.user.username, &event.authority);
  let mut created = Vec::with_capacity(SubscriptionType::ALL.len());
  for &kind in SubscriptionType::ALL {
    let sub = registry
      .create_subscription(NewSubscription { target: target.clone(), kind, active: true })
      .await?;
    created.push(sub);
  }
  Ok(created)
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// What the dispatcher did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  /// A reply notification was handed to the sink.
  Notified,
  /// The event did not qualify for a notification.
  Skipped,
  /// The registration handler created this many subscriptions.
  Subscribed(usize),
}

/// Routes each [`Event`] to its handler.
pub struct Dispatcher<'a, S, P: ?Sized, N: ?Sized> {
  store:       &'a S,
  permissions: &'a P,
  sink:        &'a N,
}

impl<'a, S, P, N> Dispatcher<'a, S, P, N>
where
  S: AnnotationStore + UserDirectory + SubscriptionRegistry,
  P: PermissionOracle + ?Sized,
  N: NotificationSink + ?Sized,
{
  pub fn new(store: &'a S, permissions: &'a P, sink: &'a N) -> Self {
    Self { store, permissions, sink }
  }

  pub async fn dispatch(&self, event: Event) -> Result<Outcome, S::Error> {
    match event {
      Event::Annotation(event) => {
        let notification = reply::evaluate(self.store, self.permissions, &event).await?;
        match notification {
          Some(notification) => {
            tracing::debug!(
              reply = %event.annotation.id,
              parent_user = %notification.parent_user.userid(),
              "reply notification due"
            );
            self.sink.deliver(notification);
            Ok(Outcome::Notified)
          }
          None => {
            tracing::debug!(
              annotation = %event.annotation.id,
              action = %event.action,
              "no notification due"
            );
            Ok(Outcome::Skipped)
          }
        }
      }
      Event::UserRegistered(event) => {
        let created = on_user_registered(self.store, &event).await?;
        tracing::debug!(
          username = %event.user.username,
          count = created.len(),
          "created default subscriptions"
        );
        Ok(Outcome::Subscribed(created.len()))
      }
    }
  }
}
