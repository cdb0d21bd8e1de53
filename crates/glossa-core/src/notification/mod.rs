//! Notifications and their delivery seam.

pub mod reply;

pub use reply::ReplyNotification;

/// Receives notifications that passed every eligibility check. Delivery
/// (mail, push, an outbox) is the sink's business.
pub trait NotificationSink: Send + Sync {
  fn deliver(&self, notification: ReplyNotification);
}
