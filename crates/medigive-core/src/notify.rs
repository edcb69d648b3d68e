//! Transient user notifications.
//!
//! Notices are queued in emission order and each one disappears on its own
//! after a fixed time-to-live. When a tokio runtime is available an expiry
//! timer is spawned per notice; otherwise expired entries are pruned lazily on
//! the next read.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{info, warn};
use tokio::runtime::Handle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::models::{Notice, Notification, NotificationKind};

struct Entry {
    notification: Notification,
    expires_at: Instant,
}

/// FIFO of live notifications, cheap to clone and share.
#[derive(Clone)]
pub struct Notifier {
    queue: Arc<Mutex<VecDeque<Entry>>>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            ttl,
        }
    }

    /// Queue a notice and schedule its removal. Returns the notification ID.
    pub fn push(&self, notice: Notice) -> String {
        match notice.kind {
            NotificationKind::Warning => warn!("{}", notice.message),
            NotificationKind::Success | NotificationKind::Info => info!("{}", notice.message),
        }

        let id = Uuid::new_v4().to_string();
        let entry = Entry {
            notification: Notification {
                id: id.clone(),
                message: notice.message,
                kind: notice.kind,
            },
            expires_at: Instant::now() + self.ttl,
        };
        self.lock().push_back(entry);

        if let Ok(handle) = Handle::try_current() {
            let queue = Arc::downgrade(&self.queue);
            let ttl = self.ttl;
            let expired = id.clone();
            handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                if let Some(queue) = queue.upgrade() {
                    let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
                    queue.retain(|e| e.notification.id != expired);
                }
            });
        }
        id
    }

    /// Live notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        let mut queue = self.lock();
        let now = Instant::now();
        queue.retain(|e| e.expires_at > now);
        queue.iter().map(|e| e.notification.clone()).collect()
    }

    /// Remove a notification early. Returns `false` if it had already gone.
    pub fn dismiss(&self, id: &str) -> bool {
        let mut queue = self.lock();
        let before = queue.len();
        queue.retain(|e| e.notification.id != id);
        queue.len() < before
    }

    pub fn len(&self) -> usize {
        self.active().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the queue inconsistent.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Entry>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}
