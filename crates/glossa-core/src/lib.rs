//! Core types and trait definitions for Glossa reply notifications.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod annotation;
pub mod error;
pub mod events;
pub mod identity;
pub mod notification;
pub mod permission;
pub mod store;
pub mod subscription;
pub mod user;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
