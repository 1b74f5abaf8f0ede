//! Time-bounded notification queue
//!
//! Insertion-ordered; the display takes a suffix of the most recent
//! entries, not a priority sort. Expiry and manual dismissal race
//! harmlessly since removing an absent entry is a no-op.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Kind of a transient alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A mutation succeeded
    Success,
    /// Newly-arrived critical incidents were detected
    Critical,
}

/// One transient alert entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Monotonic identifier, strictly increasing per queue
    pub id: u64,

    /// Display message
    pub message: String,

    /// Alert kind
    pub kind: NotificationKind,

    /// When the entry was created; expiry is relative to this
    pub created_at: DateTime<Utc>,
}

/// Queue of auto-expiring notifications
#[derive(Debug)]
pub struct NotificationQueue {
    entries: RwLock<Vec<Notification>>,
    ttl: chrono::Duration,
    visible_limit: usize,
    next_id: AtomicU64,
}

impl NotificationQueue {
    /// Create a queue with the given TTL and display limit
    ///
    /// Identifiers are seeded from the current epoch milliseconds so ids
    /// stay unique across queue restarts within one run.
    #[must_use]
    pub fn new(ttl: Duration, visible_limit: usize) -> Self {
        #[allow(clippy::cast_sign_loss)]
        let seed = Utc::now().timestamp_millis().max(0) as u64;
        Self {
            entries: RwLock::new(Vec::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(20)),
            visible_limit,
            next_id: AtomicU64::new(seed),
        }
    }

    /// Append an entry, returning its id
    pub fn push(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.push_at(message, kind, Utc::now())
    }

    /// Append an entry with an explicit creation time
    pub fn push_at(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: DateTime<Utc>,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            message: message.into(),
            kind,
            created_at: now,
        };

        tracing::debug!(notification_id = id, message = %notification.message, "notification pushed");
        self.entries.write().push(notification);
        id
    }

    /// Remove an entry immediately; unknown ids are a no-op
    pub fn dismiss(&self, id: u64) {
        self.entries.write().retain(|n| n.id != id);
    }

    /// Drop every entry whose TTL elapsed at `now`, returning how many
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|n| now.signed_duration_since(n.created_at) < ttl);
        let removed = before - entries.len();
        drop(entries);

        if removed > 0 {
            tracing::debug!(removed, "expired notifications purged");
        }
        removed
    }

    /// The most recent unexpired entries, in insertion order
    ///
    /// Only the display suffix is returned; older unexpired entries stay
    /// queued internally.
    #[must_use]
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let entries = self.entries.read();
        let unexpired: Vec<&Notification> = entries
            .iter()
            .filter(|n| now.signed_duration_since(n.created_at) < self.ttl)
            .collect();

        unexpired
            .iter()
            .skip(unexpired.len().saturating_sub(self.visible_limit))
            .map(|n| (*n).clone())
            .collect()
    }

    /// Total queued entries, expired or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the queue holds no entries at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
