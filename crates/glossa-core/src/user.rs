//! User accounts as seen by the notification core.
//!
//! Passwords, activation and login are deliberately absent: the directory is
//! only consulted to resolve identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, identity::UserId};

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 30;
pub const EMAIL_MAX_LENGTH: usize = 100;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:            i64,
  /// Username as chosen on registration.
  pub username:      String,
  /// The namespace the user lives in.
  pub authority:     String,
  pub email:         String,
  pub display_name:  Option<String>,
  pub admin:         bool,
  pub staff:         bool,
  pub registered_at: DateTime<Utc>,
}

impl User {
  /// The user's identity, derived from `username` and `authority`.
  pub fn userid(&self) -> UserId { UserId::new(&self.username, &self.authority) }

  /// Normalised form of the username; see [`normalize_username`].
  pub fn uid(&self) -> String { normalize_username(&self.username) }
}

/// Input to [`crate::store::UserDirectory::add_user`].
///
/// Only constructible through [`NewUser::new`], which validates the fields.
#[derive(Debug, Clone)]
pub struct NewUser {
  username:         String,
  authority:        String,
  email:            String,
  pub display_name: Option<String>,
}

impl NewUser {
  pub fn new(
    username: impl Into<String>,
    authority: impl Into<String>,
    email: impl Into<String>,
  ) -> Result<Self> {
    let username = username.into();
    let email = email.into();
    validate_username(&username)?;
    validate_email(&email)?;
    Ok(Self { username, authority: authority.into(), email, display_name: None })
  }

  pub fn username(&self) -> &str { &self.username }

  pub fn authority(&self) -> &str { &self.authority }

  pub fn email(&self) -> &str { &self.email }

  pub fn userid(&self) -> UserId { UserId::new(&self.username, &self.authority) }
}

/// Strip dots and lower-case, so that look-alike usernames collide.
pub fn normalize_username(username: &str) -> String {
  username.replace('.', "").to_lowercase()
}

pub fn validate_username(username: &str) -> Result<()> {
  let len = username.chars().count();
  if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
    return Err(Error::InvalidUsername(format!(
      "username must be between {USERNAME_MIN_LENGTH} and {USERNAME_MAX_LENGTH} characters long"
    )));
  }
  let allowed = |c: char| c.is_ascii_alphanumeric() || c == '.' || c == '_';
  if !username.chars().all(allowed) {
    return Err(Error::InvalidUsername(
      "username must contain only letters, numbers, periods, and underscores".to_owned(),
    ));
  }
  Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
  if email.chars().count() > EMAIL_MAX_LENGTH {
    return Err(Error::InvalidEmail(format!(
      "email must be less than {EMAIL_MAX_LENGTH} characters long"
    )));
  }
  Ok(())
}
