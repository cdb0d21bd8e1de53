//! Reply notifications: deciding whether a newly created annotation should
//! notify the author of the annotation it replies to.

use serde::{Deserialize, Serialize};

use crate::{
  annotation::{Annotation, DocumentMetadata},
  events::{Action, AnnotationEvent},
  permission::{Permission, PermissionOracle},
  store::{AnnotationStore, SubscriptionRegistry, UserDirectory},
  subscription::SubscriptionType,
  user::User,
};

/// A reply to an annotation, with everything needed to tell the parent's
/// author about it. Only ever built fully populated by [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyNotification {
  pub reply:       Annotation,
  pub reply_user:  User,
  pub parent:      Annotation,
  pub parent_user: User,
  /// Metadata for the page the reply was made on.
  pub document:    DocumentMetadata,
}

/// Decide whether `event` should produce a reply notification.
///
/// Every failed check yields `Ok(None)`; only backend failures are errors.
/// The checks run in a fixed order and stop at the first failure.
pub async fn evaluate<S, P>(
  store: &S,
  permissions: &P,
  event: &AnnotationEvent,
) -> Result<Option<ReplyNotification>, S::Error>
where
  S: AnnotationStore + UserDirectory + SubscriptionRegistry,
  P: PermissionOracle + ?Sized,
{
  if event.action != Action::Create {
    return Ok(None);
  }

  let reply = &event.annotation;
  let Some(parent_id) = reply.parent_id() else {
    return Ok(None);
  };

  // The parent may have been deleted since the reply was written.
  let Some(parent) = store.fetch_annotation(parent_id).await? else {
    return Ok(None);
  };

  let Some(parent_user) = store.fetch_user(&parent.userid).await? else {
    return Ok(None);
  };

  let Some(reply_user) = store.fetch_user(&reply.userid).await? else {
    tracing::warn!(userid = %reply.userid, "user who just replied no longer exists");
    return Ok(None);
  };

  if parent_user.userid() == reply_user.userid() {
    return Ok(None);
  }

  if !permissions.has_permission(&parent.userid, reply, Permission::Read) {
    return Ok(None);
  }

  // FIXME: the document should come from the root of the thread, not the
  // reply; a reply to a reply may carry no metadata of its own.
  let Some(document) = reply.document.clone() else {
    return Ok(None);
  };

  if store
    .find_active(&parent.userid, SubscriptionType::Reply)
    .await?
    .is_none()
  {
    return Ok(None);
  }

  Ok(Some(ReplyNotification {
    reply: reply.clone(),
    reply_user,
    parent,
    parent_user,
    document,
  }))
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::{
    annotation::{NewAnnotation, Permissions},
    identity::UserId,
    permission::AclOracle,
    subscription::NewSubscription,
    testing::MemoryStore,
    user::NewUser,
  };

  struct Deny;

  impl PermissionOracle for Deny {
    fn has_permission(&self, _: &UserId, _: &Annotation, _: Permission) -> bool { false }
  }

  const URI: &str = "https://example.com/article";

  fn alice() -> UserId { UserId::new("alice", "example.org") }

  fn bob() -> UserId { UserId::new("bob", "example.org") }

  fn document() -> DocumentMetadata {
    DocumentMetadata {
      title: Some("An Article".into()),
      link:  Some(URI.into()),
    }
  }

  async fn register(store: &MemoryStore, userid: &UserId) {
    let email = format!("{}@example.org", userid.username());
    let new = NewUser::new(userid.username(), userid.authority(), email).unwrap();
    store.add_user(new).await.unwrap();
  }

  async fn subscribe(store: &MemoryStore, userid: &UserId, active: bool) {
    store
      .create_subscription(NewSubscription {
        target: userid.clone(),
        kind: SubscriptionType::Reply,
        active,
      })
      .await
      .unwrap();
  }

  async fn reply_to(store: &MemoryStore, author: UserId, parent: &Annotation) -> Annotation {
    let mut reply = NewAnnotation::new(author, URI).reply_to(parent);
    reply.text = Some("I disagree".into());
    reply.document = Some(document());
    store.create_annotation(reply).await.unwrap()
  }

  /// Alice wrote `parent`; Bob replied with `reply`.
  struct Thread {
    store:  MemoryStore,
    parent: Annotation,
    reply:  Annotation,
  }

  /// Both users registered; Alice's reply subscription in the given state.
  async fn thread(subscription: Option<bool>) -> Thread {
    let store = MemoryStore::default();
    register(&store, &alice()).await;
    register(&store, &bob()).await;
    if let Some(active) = subscription {
      subscribe(&store, &alice(), active).await;
    }

    let parent = store
      .create_annotation(NewAnnotation::new(alice(), URI))
      .await
      .unwrap();
    let reply = reply_to(&store, bob(), &parent).await;

    Thread { store, parent, reply }
  }

  fn created(annotation: &Annotation) -> AnnotationEvent {
    AnnotationEvent { annotation: annotation.clone(), action: Action::Create }
  }

  async fn decide(store: &MemoryStore, annotation: &Annotation) -> Option<ReplyNotification> {
    evaluate(store, &AclOracle, &created(annotation)).await.unwrap()
  }

  #[tokio::test]
  async fn notifies_parent_author_of_reply() {
    let t = thread(Some(true)).await;
    let n = decide(&t.store, &t.reply).await.expect("notification");

    assert_eq!(n.parent, t.parent);
    assert_eq!(n.parent_user.userid(), alice());
    assert_eq!(n.reply, t.reply);
    assert_eq!(n.reply_user.userid(), bob());
    assert_eq!(n.document, document());
  }

  #[tokio::test]
  async fn only_create_actions_notify() {
    let t = thread(Some(true)).await;
    for action in [Action::Update, Action::Delete] {
      let event = AnnotationEvent { annotation: t.reply.clone(), action };
      assert!(evaluate(&t.store, &AclOracle, &event).await.unwrap().is_none());
    }
  }

  #[tokio::test]
  async fn top_level_annotation_does_not_notify() {
    let t = thread(Some(true)).await;
    assert!(decide(&t.store, &t.parent).await.is_none());
  }

  #[tokio::test]
  async fn deleted_parent_does_not_notify() {
    let t = thread(Some(true)).await;
    t.store.delete_annotation(&t.parent.id).await.unwrap();
    assert!(decide(&t.store, &t.reply).await.is_none());
  }

  #[tokio::test]
  async fn unknown_parent_author_does_not_notify() {
    let store = MemoryStore::default();
    register(&store, &bob()).await;
    subscribe(&store, &alice(), true).await;
    let parent = store
      .create_annotation(NewAnnotation::new(alice(), URI))
      .await
      .unwrap();
    let reply = reply_to(&store, bob(), &parent).await;

    assert!(decide(&store, &reply).await.is_none());
  }

  #[tokio::test]
  async fn unknown_reply_author_does_not_notify() {
    let t = thread(Some(true)).await;
    let mut ghost = t.reply.clone();
    ghost.userid = UserId::new("ghost", "example.org");
    ghost.permissions = Permissions::for_owner(&ghost.userid, true);

    let logs = LogCapture::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(move || writer.clone())
      .with_ansi(false)
      .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    assert!(decide(&t.store, &ghost).await.is_none());
    let output = logs.contents();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("acct:ghost@example.org"), "{output}");
  }

  /// Collects formatted log lines for inspection.
  #[derive(Clone, Default)]
  struct LogCapture(Arc<Mutex<Vec<u8>>>);

  impl LogCapture {
    fn contents(&self) -> String { String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned() }
  }

  impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
  }

  #[tokio::test]
  async fn self_reply_does_not_notify() {
    let t = thread(Some(true)).await;
    let own = reply_to(&t.store, alice(), &t.parent).await;
    assert!(decide(&t.store, &own).await.is_none());
  }

  #[tokio::test]
  async fn unreadable_reply_does_not_notify() {
    let t = thread(Some(true)).await;
    let event = created(&t.reply);
    assert!(evaluate(&t.store, &Deny, &event).await.unwrap().is_none());

    let mut private = NewAnnotation::new(bob(), URI).reply_to(&t.parent);
    private.permissions = Permissions::for_owner(&bob(), false);
    private.document = Some(document());
    let private = t.store.create_annotation(private).await.unwrap();
    assert!(decide(&t.store, &private).await.is_none());
  }

  #[tokio::test]
  async fn reply_without_document_does_not_notify() {
    let t = thread(Some(true)).await;
    let mut bare = t.reply.clone();
    bare.document = None;
    assert!(decide(&t.store, &bare).await.is_none());
  }

  #[tokio::test]
  async fn document_is_not_inherited_from_root() {
    let store = MemoryStore::default();
    register(&store, &alice()).await;
    register(&store, &bob()).await;
    subscribe(&store, &alice(), true).await;

    let mut root = NewAnnotation::new(alice(), URI);
    root.document = Some(document());
    let root = store.create_annotation(root).await.unwrap();
    let nested = store
      .create_annotation(NewAnnotation::new(bob(), URI).reply_to(&root))
      .await
      .unwrap();

    assert!(decide(&store, &nested).await.is_none());
  }

  #[tokio::test]
  async fn missing_subscription_does_not_notify() {
    let t = thread(None).await;
    assert!(decide(&t.store, &t.reply).await.is_none());
  }

  #[tokio::test]
  async fn inactive_subscription_does_not_notify() {
    let t = thread(Some(false)).await;
    assert!(decide(&t.store, &t.reply).await.is_none());
  }

  #[tokio::test]
  async fn deactivated_subscription_stops_notifications() {
    let t = thread(Some(true)).await;
    let sub = t.store.subscriptions()[0].clone();
    t.store.set_active(sub.id, false).await.unwrap();
    assert!(decide(&t.store, &t.reply).await.is_none());
  }
}
