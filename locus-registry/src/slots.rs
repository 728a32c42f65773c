//! Handler storage for a single category
//!
//! A category owns two ordered sequences: persistent handlers, which live
//! until the caller removes them, and one-shot handlers, which are removed
//! by the registry. Insertion order is delivery order and the same closure
//! may be registered more than once.

use std::fmt;

use locus_model::{AuthorizationStatus, Heading, Location, LocationError, RegionUpdate, VisitUpdate};

use crate::category::Category;

/// How long a one-shot handler stays registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShotLifetime {
    /// Removed after the next delivery allowed by the category policy
    NextDelivery,
    /// Removed only when the category's one-shots are cleared explicitly
    UntilCleared,
}

pub(crate) struct OneShot<T: ?Sized> {
    pub(crate) lifetime: OneShotLifetime,
    pub(crate) handler: Box<dyn FnMut(&T) + Send>,
}

/// Persistent and one-shot handlers of one category
pub struct HandlerSlots<T: ?Sized> {
    pub(crate) persistent: Vec<Box<dyn FnMut(&T) + Send>>,
    pub(crate) one_shot: Vec<OneShot<T>>,
}

impl<T: ?Sized> HandlerSlots<T> {
    pub fn new() -> Self {
        Self {
            persistent: Vec::new(),
            one_shot: Vec::new(),
        }
    }

    pub fn persistent_len(&self) -> usize {
        self.persistent.len()
    }

    pub fn one_shot_len(&self) -> usize {
        self.one_shot.len()
    }

    pub(crate) fn push_persistent(&mut self, handler: Box<dyn FnMut(&T) + Send>) {
        self.persistent.push(handler);
    }

    pub(crate) fn push_one_shot(
        &mut self,
        lifetime: OneShotLifetime,
        handler: Box<dyn FnMut(&T) + Send>,
    ) {
        self.one_shot.push(OneShot { lifetime, handler });
    }

    pub(crate) fn clear_persistent(&mut self) {
        self.persistent.clear();
    }

    pub(crate) fn clear_one_shot(&mut self) {
        self.one_shot.clear();
    }

    /// Move every one-shot handler out, in registration order
    pub(crate) fn take_one_shots(&mut self) -> Vec<Box<dyn FnMut(&T) + Send>> {
        std::mem::take(&mut self.one_shot)
            .into_iter()
            .map(|one_shot| one_shot.handler)
            .collect()
    }
}

impl<T: ?Sized> Default for HandlerSlots<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for HandlerSlots<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSlots")
            .field("persistent", &self.persistent.len())
            .field("one_shot", &self.one_shot.len())
            .finish()
    }
}

/// Handler slots for all seven categories
#[derive(Default, Debug)]
pub struct CategoryHandlers {
    pub(crate) location: HandlerSlots<Location>,
    pub(crate) location_batch: HandlerSlots<[Location]>,
    pub(crate) heading: HandlerSlots<Heading>,
    pub(crate) region: HandlerSlots<RegionUpdate>,
    pub(crate) authorization: HandlerSlots<AuthorizationStatus>,
    pub(crate) visit: HandlerSlots<VisitUpdate>,
    pub(crate) error: HandlerSlots<LocationError>,
}

impl CategoryHandlers {
    /// (persistent, one-shot) handler counts for a category
    pub(crate) fn lens(&self, category: Category) -> (usize, usize) {
        match category {
            Category::Location => (self.location.persistent_len(), self.location.one_shot_len()),
            Category::LocationBatch => (
                self.location_batch.persistent_len(),
                self.location_batch.one_shot_len(),
            ),
            Category::Heading => (self.heading.persistent_len(), self.heading.one_shot_len()),
            Category::Region => (self.region.persistent_len(), self.region.one_shot_len()),
            Category::Authorization => (
                self.authorization.persistent_len(),
                self.authorization.one_shot_len(),
            ),
            Category::Visit => (self.visit.persistent_len(), self.visit.one_shot_len()),
            Category::Error => (self.error.persistent_len(), self.error.one_shot_len()),
        }
    }

    pub(crate) fn clear_one_shot(&mut self, category: Category) {
        match category {
            Category::Location => self.location.clear_one_shot(),
            Category::LocationBatch => self.location_batch.clear_one_shot(),
            Category::Heading => self.heading.clear_one_shot(),
            Category::Region => self.region.clear_one_shot(),
            Category::Authorization => self.authorization.clear_one_shot(),
            Category::Visit => self.visit.clear_one_shot(),
            Category::Error => self.error.clear_one_shot(),
        }
    }

    pub(crate) fn clear_persistent(&mut self, category: Category) {
        match category {
            Category::Location => self.location.clear_persistent(),
            Category::LocationBatch => self.location_batch.clear_persistent(),
            Category::Heading => self.heading.clear_persistent(),
            Category::Region => self.region.clear_persistent(),
            Category::Authorization => self.authorization.clear_persistent(),
            Category::Visit => self.visit.clear_persistent(),
            Category::Error => self.error.clear_persistent(),
        }
    }
}
