//! Blocking iterator over broadcast notifications
//!
//! Provides various iteration patterns for consuming notifications:
//! - Blocking: `recv()`, `for notification in iter`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`, `timeout_iter()`

use std::sync::mpsc;
use std::time::Duration;

use crate::notification::Notification;

/// Blocking iterator over notifications published by a registry
///
/// Each iterator owns its own channel. Dropping it unsubscribes the
/// observer on the next dispatch.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use locus_model::AuthorizationStatus;
/// use locus_registry::{kinds, NotificationName, SubscriptionRegistry};
///
/// let mut registry = SubscriptionRegistry::new();
/// let notifications = registry.notifications();
///
/// registry.dispatch::<kinds::Authorization>(&AuthorizationStatus::Denied);
///
/// let notification = notifications.recv_timeout(Duration::from_millis(10)).unwrap();
/// assert_eq!(notification.name, NotificationName::DidChangeAuthorization);
/// assert!(notifications.try_recv().is_none());
/// ```
pub struct NotificationIterator {
    rx: mpsc::Receiver<Notification>,
}

impl NotificationIterator {
    pub(crate) fn new(rx: mpsc::Receiver<Notification>) -> Self {
        Self { rx }
    }

    /// Block until the next notification is available
    ///
    /// Returns `None` once the registry has been dropped or cleared.
    pub fn recv(&self) -> Option<Notification> {
        self.rx.recv().ok()
    }

    /// Block until the next notification or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Notification> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Try to receive a notification without blocking
    pub fn try_recv(&self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }

    /// Non-blocking iterator over the notifications currently queued
    pub fn try_iter(&self) -> TryIter<'_> {
        TryIter { inner: self }
    }

    /// Iterator that waits up to `timeout` for each notification and stops
    /// at the first timeout
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_> {
        TimeoutIter {
            inner: self,
            timeout,
        }
    }
}

impl Iterator for NotificationIterator {
    type Item = Notification;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

/// Non-blocking iterator over currently queued notifications
pub struct TryIter<'a> {
    inner: &'a NotificationIterator,
}

impl<'a> Iterator for TryIter<'a> {
    type Item = Notification;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with timeout
pub struct TimeoutIter<'a> {
    inner: &'a NotificationIterator,
    timeout: Duration,
}

impl<'a> Iterator for TimeoutIter<'a> {
    type Item = Notification;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}
