//! In-memory transient notification channel.
//!
//! Each authenticated principal has its own list of active notifications.
//! A notification with a positive duration is removed automatically by its
//! own timer; dismissing an id that is already gone is a safe no-op. There
//! is no de-duplication, no priority, and no persistence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use helpnet_core::{AdminUserId, ClientId, NotificationKind, VendorId};
use serde::Serialize;
use uuid::Uuid;

/// Notifications disappear after five seconds unless the caller overrides.
pub const DEFAULT_DURATION_MS: u64 = 5000;

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    Client(ClientId),
    Vendor(VendorId),
    Admin(AdminUserId),
}

/// One active notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Shared store of active notifications, cloneable into spawned tasks.
#[derive(Clone, Default)]
pub struct NotificationHub {
    inner: Arc<Mutex<HashMap<Recipient, Vec<Notification>>>>,
}

impl NotificationHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Recipient, Vec<Notification>>> {
        // The map holds plain data, a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a notification with the default five-second duration.
    pub fn notify(
        &self,
        recipient: Recipient,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Uuid {
        self.notify_with_duration(recipient, message, kind, DEFAULT_DURATION_MS)
    }

    /// Push a notification. A positive `duration_ms` arms an independent
    /// removal timer; zero means the notification stays until dismissed.
    pub fn notify_with_duration(
        &self,
        recipient: Recipient,
        message: impl Into<String>,
        kind: NotificationKind,
        duration_ms: u64,
    ) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            duration_ms,
            created_at: Utc::now(),
        };
        let id = notification.id;
        self.lock().entry(recipient).or_default().push(notification);

        if duration_ms > 0 {
            let hub = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(duration_ms)).await;
                hub.remove(recipient, id);
            });
        }

        id
    }

    /// Active notifications for one recipient, oldest first.
    #[must_use]
    pub fn list(&self, recipient: Recipient) -> Vec<Notification> {
        self.lock().get(&recipient).cloned().unwrap_or_default()
    }

    /// Dismiss one notification. Unknown ids are ignored.
    pub fn remove(&self, recipient: Recipient, id: Uuid) {
        let mut map = self.lock();
        if let Some(list) = map.get_mut(&recipient) {
            list.retain(|n| n.id != id);
            if list.is_empty() {
                map.remove(&recipient);
            }
        }
    }

    /// Dismiss everything addressed to one recipient.
    pub fn clear_all(&self, recipient: Recipient) {
        self.lock().remove(&recipient);
    }
}
