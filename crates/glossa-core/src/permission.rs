//! The permission oracle: "may this actor perform this action on this
//! annotation?"

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  annotation::{Annotation, WORLD_PRINCIPAL},
  identity::UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
  Read,
  Update,
  Delete,
  Admin,
}

impl Permission {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Read => "read",
      Self::Update => "update",
      Self::Delete => "delete",
      Self::Admin => "admin",
    }
  }
}

impl fmt::Display for Permission {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Capability check consulted before notifying anyone about an annotation.
pub trait PermissionOracle: Send + Sync {
  fn has_permission(&self, actor: &UserId, object: &Annotation, action: Permission) -> bool;
}

/// Checks the annotation's own principal lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct AclOracle;

impl PermissionOracle for AclOracle {
  fn has_permission(&self, actor: &UserId, object: &Annotation, action: Permission) -> bool {
    let principals = match action {
      Permission::Read => &object.permissions.read,
      Permission::Update => &object.permissions.update,
      Permission::Delete => &object.permissions.delete,
      Permission::Admin => &object.permissions.admin,
    };
    let actor = actor.to_string();
    principals.iter().any(|p| p == WORLD_PRINCIPAL || *p == actor)
  }
}
