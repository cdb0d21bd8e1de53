//! Per-user opt-in records for notification types.
//!
//! Uniqueness of (target, kind) is not enforced anywhere; lookups take the
//! first match.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, identity::UserId};

/// A notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
  /// Someone replied to one of the user's annotations.
  Reply,
}

impl SubscriptionType {
  /// Every known type; a new user gets one subscription per entry.
  pub const ALL: &'static [SubscriptionType] = &[SubscriptionType::Reply];

  /// The tag stored in the `type` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Reply => "reply",
    }
  }
}

impl fmt::Display for SubscriptionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for SubscriptionType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "reply" => Ok(Self::Reply),
      other => Err(Error::UnknownSubscriptionType(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub id:     i64,
  /// The user being notified.
  pub target: UserId,
  #[serde(rename = "type")]
  pub kind:   SubscriptionType,
  pub active: bool,
}

/// Input to [`crate::store::SubscriptionRegistry::create_subscription`].
#[derive(Debug, Clone)]
pub struct NewSubscription {
  pub target: UserId,
  pub kind:   SubscriptionType,
  pub active: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn type_tag_round_trips() {
    for kind in SubscriptionType::ALL {
      assert_eq!(kind.as_str().parse::<SubscriptionType>().unwrap(), *kind);
    }
    assert!(matches!(
      "mention".parse::<SubscriptionType>(),
      Err(Error::UnknownSubscriptionType(_))
    ));
  }

  #[test]
  fn serialises_kind_as_type() {
    let sub = Subscription {
      id:     7,
      target: UserId::new("alice", "example.org"),
      kind:   SubscriptionType::Reply,
      active: true,
    };
    let json = serde_json::to_value(&sub).unwrap();
    assert_eq!(json["type"], "reply");
    assert_eq!(json["target"], "acct:alice@example.org");
  }
}
