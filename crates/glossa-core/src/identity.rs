//! User identities of the form `acct:<username>@<authority>`.
//!
//! The identity is stored split into its two parts so that backends can match
//! on indexed `username` / `authority` columns instead of concatenating
//! strings inside a query.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Scheme prefix of every identity string.
const ACCT_PREFIX: &str = "acct:";

/// A parsed user identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId {
  username:  String,
  authority: String,
}

impl UserId {
  pub fn new(username: impl Into<String>, authority: impl Into<String>) -> Self {
    Self { username: username.into(), authority: authority.into() }
  }

  /// Split an `acct:<username>@<authority>` string.
  ///
  /// The username runs up to the first `@`; everything after it is the
  /// authority (which may be empty).
  pub fn parse(s: &str) -> Result<Self> {
    let rest = s
      .strip_prefix(ACCT_PREFIX)
      .ok_or_else(|| Error::InvalidUserId(s.to_owned()))?;
    let (username, authority) = rest
      .split_once('@')
      .ok_or_else(|| Error::InvalidUserId(s.to_owned()))?;
    if username.is_empty() {
      return Err(Error::InvalidUserId(s.to_owned()));
    }
    Ok(Self::new(username, authority))
  }

  pub fn username(&self) -> &str { &self.username }

  pub fn authority(&self) -> &str { &self.authority }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{ACCT_PREFIX}{}@{}", self.username, self.authority)
  }
}

impl FromStr for UserId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for UserId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<UserId> for String {
  fn from(id: UserId) -> Self { id.to_string() }
}
