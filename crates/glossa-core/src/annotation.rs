//! Annotations and their thread structure.
//!
//! A reply is an annotation whose `references` list is non-empty. The list is
//! ordered root first, so the parent is always the last entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// Principal granting an action to everyone.
pub const WORLD_PRINCIPAL: &str = "group:__world__";

// ─── Document ────────────────────────────────────────────────────────────────

/// Metadata about the page an annotation was made on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
  pub title: Option<String>,
  /// Canonical link for the document, if known.
  pub link:  Option<String>,
}

// ─── Permissions ─────────────────────────────────────────────────────────────

/// Principal lists per action. A principal is either a userid string or
/// [`WORLD_PRINCIPAL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
  #[serde(default)]
  pub read:   Vec<String>,
  #[serde(default)]
  pub update: Vec<String>,
  #[serde(default)]
  pub delete: Vec<String>,
  #[serde(default)]
  pub admin:  Vec<String>,
}

impl Permissions {
  /// Owner-only write access; readable by the world when `shared`, otherwise
  /// by the owner alone.
  pub fn for_owner(owner: &UserId, shared: bool) -> Self {
    let owner = vec![owner.to_string()];
    let read = if shared { vec![WORLD_PRINCIPAL.to_owned()] } else { owner.clone() };
    Self { read, update: owner.clone(), delete: owner.clone(), admin: owner }
  }
}

// ─── Annotation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
  pub id:          String,
  pub userid:      UserId,
  pub created:     DateTime<Utc>,
  pub updated:     DateTime<Utc>,
  pub uri:         String,
  pub text:        Option<String>,
  /// Ancestor annotation ids, root first.
  #[serde(default)]
  pub references:  Vec<String>,
  pub permissions: Permissions,
  pub document:    Option<DocumentMetadata>,
}

impl Annotation {
  /// The annotation this one replies to, if any.
  pub fn parent_id(&self) -> Option<&str> { self.references.last().map(String::as_str) }

  /// The top of the thread this annotation belongs to, if it is a reply.
  pub fn root_id(&self) -> Option<&str> { self.references.first().map(String::as_str) }

  pub fn is_reply(&self) -> bool { !self.references.is_empty() }
}

/// Input to [`crate::store::AnnotationStore::create_annotation`].
/// `id`, `created` and `updated` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAnnotation {
  pub userid:      UserId,
  pub uri:         String,
  pub text:        Option<String>,
  pub references:  Vec<String>,
  pub permissions: Permissions,
  pub document:    Option<DocumentMetadata>,
}

impl NewAnnotation {
  /// A shared top-level annotation with no body or document metadata.
  pub fn new(userid: UserId, uri: impl Into<String>) -> Self {
    let permissions = Permissions::for_owner(&userid, true);
    Self {
      userid,
      uri: uri.into(),
      text: None,
      references: Vec::new(),
      permissions,
      document: None,
    }
  }

  /// Make this a reply to `parent`, inheriting its thread.
  pub fn reply_to(mut self, parent: &Annotation) -> Self {
    self.references = parent.references.clone();
    self.references.push(parent.id.clone());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn annotation(references: &[&str]) -> Annotation {
    let userid = UserId::new("alice", "example.org");
    Annotation {
      id:          "a1".into(),
      permissions: Permissions::for_owner(&userid, true),
      userid,
      created:     Utc::now(),
      updated:     Utc::now(),
      uri:         "https://example.com/article".into(),
      text:        None,
      references:  references.iter().map(|s| s.to_string()).collect(),
      document:    None,
    }
  }

  #[test]
  fn top_level_has_no_parent() {
    let a = annotation(&[]);
    assert!(!a.is_reply());
    assert_eq!(a.parent_id(), None);
    assert_eq!(a.root_id(), None);
  }

  #[test]
  fn parent_is_last_reference_root_is_first() {
    let a = annotation(&["root", "middle", "parent"]);
    assert!(a.is_reply());
    assert_eq!(a.parent_id(), Some("parent"));
    assert_eq!(a.root_id(), Some("root"));
  }

  #[test]
  fn reply_to_extends_thread() {
    let parent = annotation(&["root"]);
    let reply = NewAnnotation::new(UserId::new("bob", "example.org"), "u")
      .reply_to(&parent);
    assert_eq!(reply.references, vec!["root".to_string(), "a1".to_string()]);
  }

  #[test]
  fn private_permissions_are_owner_only() {
    let owner = UserId::new("alice", "example.org");
    let p = Permissions::for_owner(&owner, false);
    assert_eq!(p.read, vec!["acct:alice@example.org".to_string()]);
    let p = Permissions::for_owner(&owner, true);
    assert_eq!(p.read, vec![WORLD_PRINCIPAL.to_string()]);
    assert_eq!(p.delete, vec!["acct:alice@example.org".to_string()]);
  }
}
