//! Error types for `glossa-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid userid: {0:?}")]
  InvalidUserId(String),

  #[error("invalid username: {0}")]
  InvalidUsername(String),

  #[error("invalid email: {0}")]
  InvalidEmail(String),

  #[error("unknown subscription type: {0:?}")]
  UnknownSubscriptionType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
