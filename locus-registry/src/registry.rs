//! Subscription registry: per-category handler storage and ordered fan-out
//!
//! The registry never talks to a provider. It stores handlers and delegates
//! and delivers payloads to them in a fixed order:
//!
//! 1. delegates, in the order they were added
//! 2. one-shot handlers of the category, in registration order
//! 3. persistent handlers of the category, in registration order
//!
//! One-shot handlers are moved out of their slot before they are invoked
//! and the surviving ones are put back afterwards, so the sequence being
//! iterated is never the one being mutated.

use std::sync::mpsc;
use std::sync::Arc;

use crate::category::{Category, EventKind};
use crate::delegate::LocationDelegate;
use crate::iter::NotificationIterator;
use crate::notification::Notification;
use crate::slots::{CategoryHandlers, OneShotLifetime};

/// Handler registry for the seven event categories
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use locus_model::{Coordinate, Location};
/// use locus_registry::{kinds, Category, SubscriptionRegistry};
///
/// let mut registry = SubscriptionRegistry::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let log = Arc::clone(&seen);
/// registry.add_one_shot::<kinds::Location>(move |_| log.lock().unwrap().push("one-shot"));
/// let log = Arc::clone(&seen);
/// registry.add_persistent::<kinds::Location>(move |_| log.lock().unwrap().push("persistent"));
///
/// let fix = Location::new(Coordinate::new(0.0, 0.0));
/// registry.dispatch::<kinds::Location>(&fix);
/// registry.dispatch::<kinds::Location>(&fix);
///
/// assert_eq!(*seen.lock().unwrap(), vec!["one-shot", "persistent", "persistent"]);
/// assert_eq!(registry.one_shot_count(Category::Location), 0);
/// ```
#[derive(Default)]
pub struct SubscriptionRegistry {
    handlers: CategoryHandlers,
    delegates: Vec<Arc<dyn LocationDelegate>>,
    observers: Vec<mpsc::Sender<Notification>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler that stays until the category is cleared
    pub fn add_persistent<K: EventKind>(
        &mut self,
        handler: impl FnMut(&K::Payload) + Send + 'static,
    ) {
        K::slots_mut(&mut self.handlers).push_persistent(Box::new(handler));
    }

    /// Register a handler for the next delivery of the category
    ///
    /// Region one-shots are kept until cleared and authorization one-shots
    /// until a determined status is delivered; see [`EventKind`].
    pub fn add_one_shot<K: EventKind>(
        &mut self,
        handler: impl FnMut(&K::Payload) + Send + 'static,
    ) {
        K::slots_mut(&mut self.handlers)
            .push_one_shot(OneShotLifetime::NextDelivery, Box::new(handler));
    }

    /// Register a one-shot handler that fires on every delivery until the
    /// category's one-shots are cleared
    ///
    /// This is how continuous streams attach their per-call handler: it is
    /// removed by the stop operation, not by a delivery.
    pub fn add_continuous<K: EventKind>(
        &mut self,
        handler: impl FnMut(&K::Payload) + Send + 'static,
    ) {
        K::slots_mut(&mut self.handlers)
            .push_one_shot(OneShotLifetime::UntilCleared, Box::new(handler));
    }

    /// Remove every one-shot handler of a category
    pub fn clear_one_shot(&mut self, category: Category) {
        self.handlers.clear_one_shot(category);
    }

    /// Remove every persistent handler of a category
    pub fn clear_persistent(&mut self, category: Category) {
        self.handlers.clear_persistent(category);
    }

    /// Move the one-shot handlers of a category out of the registry
    ///
    /// Used to re-attach handlers to a replacement subscription.
    pub fn take_one_shots<K: EventKind>(&mut self) -> Vec<Box<dyn FnMut(&K::Payload) + Send>> {
        K::slots_mut(&mut self.handlers).take_one_shots()
    }

    /// Append a delegate; delegates cannot be removed individually
    pub fn add_delegate(&mut self, delegate: Arc<dyn LocationDelegate>) {
        self.delegates.push(delegate);
    }

    pub fn one_shot_count(&self, category: Category) -> usize {
        self.handlers.lens(category).1
    }

    pub fn persistent_count(&self, category: Category) -> usize {
        self.handlers.lens(category).0
    }

    pub fn delegate_count(&self) -> usize {
        self.delegates.len()
    }

    /// Remove every handler, delegate and notification observer
    pub fn clear_all(&mut self) {
        self.handlers = CategoryHandlers::default();
        self.delegates.clear();
        self.observers.clear();
    }

    /// Subscribe to the notification channel
    ///
    /// Every later dispatch is also broadcast as a [`Notification`]. Any
    /// number of observers may subscribe; an observer is dropped once its
    /// iterator is dropped.
    pub fn notifications(&mut self) -> NotificationIterator {
        let (tx, rx) = mpsc::channel();
        self.observers.push(tx);
        NotificationIterator::new(rx)
    }

    /// Deliver `payload` to delegates, one-shots and persistent handlers
    ///
    /// Never fails. A panicking handler is not caught.
    pub fn dispatch<K: EventKind>(&mut self, payload: &K::Payload) {
        let category = K::CATEGORY;
        tracing::trace!(
            "Dispatching {} to {} delegates, {} one-shots, {} persistent handlers",
            category,
            self.delegates.len(),
            self.one_shot_count(category),
            self.persistent_count(category)
        );

        self.broadcast::<K>(payload);

        let delegates = self.delegates.clone();
        for delegate in &delegates {
            K::notify(delegate.as_ref(), payload);
        }

        let mut snapshot = std::mem::take(&mut K::slots_mut(&mut self.handlers).one_shot);
        for one_shot in snapshot.iter_mut() {
            (one_shot.handler)(payload);
        }

        let retain_all = K::retains_one_shots(payload);
        let before = snapshot.len();
        snapshot.retain(|one_shot| retain_all || one_shot.lifetime == OneShotLifetime::UntilCleared);
        if snapshot.len() != before {
            tracing::debug!(
                "Removed {} delivered one-shot handlers for {}",
                before - snapshot.len(),
                category
            );
        }

        let slots = K::slots_mut(&mut self.handlers);
        snapshot.append(&mut slots.one_shot);
        slots.one_shot = snapshot;

        for handler in slots.persistent.iter_mut() {
            handler(payload);
        }
    }

    fn broadcast<K: EventKind>(&mut self, payload: &K::Payload) {
        if self.observers.is_empty() {
            return;
        }

        let notification = Notification::new(K::NOTIFICATION, K::to_event(payload));
        self.observers
            .retain(|observer| observer.send(notification.clone()).is_ok());
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("handlers", &self.handlers)
            .field("delegates", &self.delegates.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
