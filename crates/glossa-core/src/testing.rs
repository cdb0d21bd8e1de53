//! In-memory store used by the unit tests in this crate.

use std::sync::Mutex;

use chrono::Utc;

use crate::{
  annotation::{Annotation, NewAnnotation},
  identity::UserId,
  store::{AnnotationStore, Store, SubscriptionRegistry, UserDirectory},
  subscription::{NewSubscription, Subscription, SubscriptionType},
  user::{NewUser, User, normalize_username},
};

#[derive(Default)]
pub struct MemoryStore {
  annotations:   Mutex<Vec<Annotation>>,
  users:         Mutex<Vec<User>>,
  subscriptions: Mutex<Vec<Subscription>>,
}

impl MemoryStore {
  pub fn subscriptions(&self) -> Vec<Subscription> {
    self.subscriptions.lock().unwrap().clone()
  }
}

impl Store for MemoryStore {
  type Error = std::convert::Infallible;
}

impl AnnotationStore for MemoryStore {
  async fn fetch_annotation(&self, id: &str) -> Result<Option<Annotation>, Self::Error> {
    Ok(self.annotations.lock().unwrap().iter().find(|a| a.id == id).cloned())
  }

  async fn create_annotation(&self, input: NewAnnotation) -> Result<Annotation, Self::Error> {
    let mut annotations = self.annotations.lock().unwrap();
    let now = Utc::now();
    let annotation = Annotation {
      id:          format!("ann-{}", annotations.len() + 1),
      userid:      input.userid,
      created:     now,
      updated:     now,
      uri:         input.uri,
      text:        input.text,
      references:  input.references,
      permissions: input.permissions,
      document:    input.document,
    };
    annotations.push(annotation.clone());
    Ok(annotation)
  }

  async fn update_annotation_text(
    &self,
    id: &str,
    text: Option<String>,
  ) -> Result<Option<Annotation>, Self::Error> {
    let mut annotations = self.annotations.lock().unwrap();
    Ok(annotations.iter_mut().find(|a| a.id == id).map(|a| {
      a.text = text;
      a.updated = Utc::now();
      a.clone()
    }))
  }

  async fn delete_annotation(&self, id: &str) -> Result<Option<Annotation>, Self::Error> {
    let mut annotations = self.annotations.lock().unwrap();
    let pos = annotations.iter().position(|a| a.id == id);
    Ok(pos.map(|i| annotations.remove(i)))
  }
}

impl UserDirectory for MemoryStore {
  async fn fetch_user(&self, userid: &UserId) -> Result<Option<User>, Self::Error> {
    let users = self.users.lock().unwrap();
    Ok(users.iter().find(|u| u.userid() == *userid).cloned())
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, Self::Error> {
    let uid = normalize_username(username);
    Ok(self.users.lock().unwrap().iter().find(|u| u.uid() == uid).cloned())
  }

  async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error> {
    let users = self.users.lock().unwrap();
    let email = email.to_lowercase();
    Ok(users.iter().find(|u| u.email.to_lowercase() == email).cloned())
  }

  async fn add_user(&self, input: NewUser) -> Result<Option<User>, Self::Error> {
    let mut users = self.users.lock().unwrap();
    let uid = normalize_username(input.username());
    let email = input.email().to_lowercase();
    if users.iter().any(|u| u.uid() == uid || u.email.to_lowercase() == email) {
      return Ok(None);
    }
    let user = User {
      id:            users.len() as i64 + 1,
      username:      input.username().to_owned(),
      authority:     input.authority().to_owned(),
      email:         input.email().to_owned(),
      display_name:  input.display_name,
      admin:         false,
      staff:         false,
      registered_at: Utc::now(),
    };
    users.push(user.clone());
    Ok(Some(user))
  }
}

impl SubscriptionRegistry for MemoryStore {
  async fn create_subscription(
    &self,
    input: NewSubscription,
  ) -> Result<Subscription, Self::Error> {
    let mut subs = self.subscriptions.lock().unwrap();
    let sub = Subscription {
      id:     subs.len() as i64 + 1,
      target: input.target,
      kind:   input.kind,
      active: input.active,
    };
    subs.push(sub.clone());
    Ok(sub)
  }

  async fn find_active(
    &self,
    target: &UserId,
    kind: SubscriptionType,
  ) -> Result<Option<Subscription>, Self::Error> {
    let subs = self.subscriptions.lock().unwrap();
    Ok(
      subs
        .iter()
        .find(|s| s.active && s.kind == kind && s.target == *target)
        .cloned(),
    )
  }

  async fn list_subscriptions(&self, target: &UserId) -> Result<Vec<Subscription>, Self::Error> {
    let subs = self.subscriptions.lock().unwrap();
    Ok(subs.iter().filter(|s| s.target == *target).cloned().collect())
  }

  async fn set_active(&self, id: i64, active: bool) -> Result<Option<Subscription>, Self::Error> {
    let mut subs = self.subscriptions.lock().unwrap();
    Ok(subs.iter_mut().find(|s| s.id == id).map(|s| {
      s.active = active;
      s.clone()
    }))
  }
}
