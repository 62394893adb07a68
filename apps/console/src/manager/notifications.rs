use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

const MAX_QUEUED: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// A transient user-facing message (the front end renders these as toasts).
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Bounded FIFO of notifications waiting to be picked up by the client.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) {
        if self.pending.len() == MAX_QUEUED {
            self.pending.pop_front();
        }
        self.pending.push_back(Notification {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message);
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Notification> {
        self.pending.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_in_order() {
        let mut queue = NotificationQueue::default();
        queue.success("first");
        queue.error("second");
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].level, NotificationLevel::Error);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_queue_drops_oldest_past_capacity() {
        let mut queue = NotificationQueue::default();
        for i in 0..(MAX_QUEUED + 3) {
            queue.warning(format!("n{i}"));
        }
        assert_eq!(queue.len(), MAX_QUEUED);
        assert_eq!(queue.drain()[0].message, "n3");
    }
}
