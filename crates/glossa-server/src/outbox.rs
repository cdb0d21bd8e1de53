//! A bounded, in-memory record of delivered reply notifications.

use std::{
  collections::VecDeque,
  sync::{Mutex, PoisonError},
};

use glossa_core::notification::{NotificationSink, ReplyNotification};

/// Keeps the most recent `capacity` notifications, oldest first.
#[derive(Debug)]
pub struct Outbox {
  capacity: usize,
  entries:  Mutex<VecDeque<ReplyNotification>>,
}

impl Outbox {
  pub fn new(capacity: usize) -> Self {
    Self { capacity, entries: Mutex::new(VecDeque::with_capacity(capacity)) }
  }

  /// Snapshot of the retained notifications, oldest first.
  pub fn recent(&self) -> Vec<ReplyNotification> {
    let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.iter().cloned().collect()
  }
}

impl NotificationSink for Outbox {
  fn deliver(&self, notification: ReplyNotification) {
    tracing::info!(
      to = %notification.parent_user.userid(),
      from = %notification.reply_user.userid(),
      reply = %notification.reply.id,
      parent = %notification.parent.id,
      "delivering reply notification"
    );

    if self.capacity == 0 {
      return;
    }
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    if entries.len() == self.capacity {
      entries.pop_front();
    }
    entries.push_back(notification);
  }
}
