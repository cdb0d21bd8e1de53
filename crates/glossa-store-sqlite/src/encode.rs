//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Structured fields
//! (references, permissions, document metadata) are stored as compact JSON.
//! Identities are stored in their `acct:` string form.

use chrono::{DateTime, Utc};
use glossa_core::{
  annotation::{Annotation, DocumentMetadata, Permissions},
  identity::UserId,
  subscription::{Subscription, SubscriptionType},
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── UserId ──────────────────────────────────────────────────────────────────

pub fn decode_userid(s: &str) -> Result<UserId> { Ok(UserId::parse(s)?) }

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_references(references: &[String]) -> Result<String> {
  Ok(serde_json::to_string(references)?)
}

pub fn encode_permissions(permissions: &Permissions) -> Result<String> {
  Ok(serde_json::to_string(permissions)?)
}

pub fn encode_document(document: &DocumentMetadata) -> Result<String> {
  Ok(serde_json::to_string(document)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "id, username, authority, email, display_name, admin, staff, registered_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub authority:     String,
  pub email:         String,
  pub display_name:  Option<String>,
  pub admin:         bool,
  pub staff:         bool,
  pub registered_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      authority:     row.get(2)?,
      email:         row.get(3)?,
      display_name:  row.get(4)?,
      admin:         row.get(5)?,
      staff:         row.get(6)?,
      registered_at: row.get(7)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      username:      self.username,
      authority:     self.authority,
      email:         self.email,
      display_name:  self.display_name,
      admin:         self.admin,
      staff:         self.staff,
      registered_at: decode_dt(&self.registered_at)?,
    })
  }
}

/// Column list matching [`RawAnnotation::from_row`].
pub const ANNOTATION_COLUMNS: &str = "id, userid, created, updated, uri, text, \
   references_json, permissions_json, document_json";

/// Raw values read directly from an `annotations` row.
pub struct RawAnnotation {
  pub id:               String,
  pub userid:           String,
  pub created:          String,
  pub updated:          String,
  pub uri:              String,
  pub text:             Option<String>,
  pub references_json:  String,
  pub permissions_json: String,
  pub document_json:    Option<String>,
}

impl RawAnnotation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      userid:           row.get(1)?,
      created:          row.get(2)?,
      updated:          row.get(3)?,
      uri:              row.get(4)?,
      text:             row.get(5)?,
      references_json:  row.get(6)?,
      permissions_json: row.get(7)?,
      document_json:    row.get(8)?,
    })
  }

  pub fn into_annotation(self) -> Result<Annotation> {
    let document = self
      .document_json
      .as_deref()
      .map(serde_json::from_str::<DocumentMetadata>)
      .transpose()?;

    Ok(Annotation {
      id: self.id,
      userid: decode_userid(&self.userid)?,
      created: decode_dt(&self.created)?,
      updated: decode_dt(&self.updated)?,
      uri: self.uri,
      text: self.text,
      references: serde_json::from_str(&self.references_json)?,
      permissions: serde_json::from_str(&self.permissions_json)?,
      document,
    })
  }
}

/// Column list matching [`RawSubscription::from_row`].
pub const SUBSCRIPTION_COLUMNS: &str = "id, target, type, active";

/// Raw values read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub id:     i64,
  pub target: String,
  pub kind:   String,
  pub active: bool,
}

impl RawSubscription {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:     row.get(0)?,
      target: row.get(1)?,
      kind:   row.get(2)?,
      active: row.get(3)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      id:     self.id,
      target: decode_userid(&self.target)?,
      kind:   self.kind.parse::<SubscriptionType>()?,
      active: self.active,
    })
  }
}
