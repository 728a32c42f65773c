//! Event categories and their typed markers
//!
//! Each of the seven categories is represented twice: as a value of
//! [`Category`] (for counting and clearing) and as a zero-sized marker type
//! in [`kinds`] implementing [`EventKind`] (for typed registration and
//! dispatch).
//!
//! ```rust
//! use locus_registry::{kinds, Category, EventKind, SubscriptionRegistry};
//!
//! let mut registry = SubscriptionRegistry::new();
//! registry.add_persistent::<kinds::Heading>(|heading| {
//!     println!("heading {}", heading.magnetic_heading);
//! });
//! assert_eq!(kinds::Heading::CATEGORY, Category::Heading);
//! assert_eq!(registry.persistent_count(Category::Heading), 1);
//! ```

use std::fmt;

use locus_model::AuthorizationStatus;

use crate::delegate::LocationDelegate;
use crate::notification::{LocationEvent, NotificationName};
use crate::slots::{CategoryHandlers, HandlerSlots};

/// The seven event categories fanned out by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Location,
    LocationBatch,
    Heading,
    Region,
    Authorization,
    Visit,
    Error,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Location,
        Category::LocationBatch,
        Category::Heading,
        Category::Region,
        Category::Authorization,
        Category::Visit,
        Category::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Location => "location",
            Category::LocationBatch => "location_batch",
            Category::Heading => "heading",
            Category::Region => "region",
            Category::Authorization => "authorization",
            Category::Visit => "visit",
            Category::Error => "error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Typed description of a category
///
/// Ties a category to its payload type, the delegate capability that
/// receives it, the policy deciding whether one-shot handlers survive a
/// delivery, and the notification it is broadcast as.
///
/// Implemented only by the markers in [`kinds`].
pub trait EventKind: sealed::Sealed + 'static {
    /// Value handed to handlers of this category
    type Payload: ?Sized + 'static;

    const CATEGORY: Category;

    const NOTIFICATION: NotificationName;

    #[doc(hidden)]
    fn slots(handlers: &CategoryHandlers) -> &HandlerSlots<Self::Payload>;

    #[doc(hidden)]
    fn slots_mut(handlers: &mut CategoryHandlers) -> &mut HandlerSlots<Self::Payload>;

    /// Invoke the delegate capability for this category
    fn notify(delegate: &dyn LocationDelegate, payload: &Self::Payload);

    /// Whether single-delivery one-shots stay registered after `payload`
    /// has been delivered
    fn retains_one_shots(_payload: &Self::Payload) -> bool {
        false
    }

    /// Owned copy of the payload for the notification channel
    fn to_event(payload: &Self::Payload) -> LocationEvent;
}

/// Marker types for the seven categories
pub mod kinds {
    use super::*;
    use locus_model as model;

    /// Latest position, the last element of each batch
    pub struct Location;

    /// Full batch of positions as reported by the provider
    pub struct LocationBatch;

    pub struct Heading;

    /// Region state changes. One-shots are kept until explicitly cleared.
    pub struct Region;

    /// Authorization changes. One-shots are kept while the status is
    /// still undetermined.
    pub struct Authorization;

    pub struct Visit;

    pub struct Error;

    impl sealed::Sealed for Location {}
    impl sealed::Sealed for LocationBatch {}
    impl sealed::Sealed for Heading {}
    impl sealed::Sealed for Region {}
    impl sealed::Sealed for Authorization {}
    impl sealed::Sealed for Visit {}
    impl sealed::Sealed for Error {}

    impl EventKind for Location {
        type Payload = model::Location;
        const CATEGORY: Category = Category::Location;
        const NOTIFICATION: NotificationName = NotificationName::DidUpdateLocation;

        fn slots(handlers: &CategoryHandlers) -> &HandlerSlots<Self::Payload> {
            &handlers.location
        }

        fn slots_mut(handlers: &mut CategoryHandlers) -> &mut HandlerSlots<Self::Payload> {
            &mut handlers.location
        }

        fn notify(delegate: &dyn LocationDelegate, payload: &Self::Payload) {
            delegate.did_update_location(payload);
        }

        fn to_event(payload: &Self::Payload) -> LocationEvent {
            LocationEvent::Location(payload.clone())
        }
    }

    impl EventKind for LocationBatch {
        type Payload = [model::Location];
        const CATEGORY: Category = Category::LocationBatch;
        const NOTIFICATION: NotificationName = NotificationName::DidUpdateLocations;

        fn slots(handlers: &CategoryHandlers) -> &HandlerSlots<Self::Payload> {
            &handlers.location_batch
        }

        fn slots_mut(handlers: &mut CategoryHandlers) -> &mut HandlerSlots<Self::Payload> {
            &mut handlers.location_batch
        }

        fn notify(delegate: &dyn LocationDelegate, payload: &Self::Payload) {
            delegate.did_update_locations(payload);
        }

        fn to_event(payload: &Self::Payload) -> LocationEvent {
            LocationEvent::Locations(payload.to_vec())
        }
    }

    impl EventKind for Heading {
        type Payload = model::Heading;
        const CATEGORY: Category = Category::Heading;
        const NOTIFICATION: NotificationName = NotificationName::DidUpdateHeading;

        fn slots(handlers: &CategoryHandlers) -> &HandlerSlots<Self::Payload> {
            &handlers.heading
        }

        fn slots_mut(handlers: &mut CategoryHandlers) -> &mut HandlerSlots<Self::Payload> {
            &mut handlers.heading
        }

        fn notify(delegate: &dyn LocationDelegate, payload: &Self::Payload) {
            delegate.did_update_heading(payload);
        }

        fn to_event(payload: &Self::Payload) -> LocationEvent {
            LocationEvent::Heading(payload.clone())
        }
    }

    impl EventKind for Region {
        type Payload = model::RegionUpdate;
        const CATEGORY: Category = Category::Region;
        const NOTIFICATION: NotificationName = NotificationName::DidUpdateRegion;

        fn slots(handlers: &CategoryHandlers) -> &HandlerSlots<Self::Payload> {
            &handlers.region
        }

        fn slots_mut(handlers: &mut CategoryHandlers) -> &mut HandlerSlots<Self::Payload> {
            &mut handlers.region
        }

        fn notify(delegate: &dyn LocationDelegate, payload: &Self::Payload) {
            delegate.did_update_region(&payload.region, payload.state);
        }

        fn retains_one_shots(_payload: &Self::Payload) -> bool {
            true
        }

        fn to_event(payload: &Self::Payload) -> LocationEvent {
            LocationEvent::Region(payload.clone())
        }
    }

    impl EventKind for Authorization {
        type Payload = AuthorizationStatus;
        const CATEGORY: Category = Category::Authorization;
        const NOTIFICATION: NotificationName = NotificationName::DidChangeAuthorization;

        fn slots(handlers: &CategoryHandlers) -> &HandlerSlots<Self::Payload> {
            &handlers.authorization
        }

        fn slots_mut(handlers: &mut CategoryHandlers) -> &mut HandlerSlots<Self::Payload> {
            &mut handlers.authorization
        }

        fn notify(delegate: &dyn LocationDelegate, payload: &Self::Payload) {
            delegate.did_change_authorization(*payload);
        }

        fn retains_one_shots(payload: &Self::Payload) -> bool {
            !payload.is_determined()
        }

        fn to_event(payload: &Self::Payload) -> LocationEvent {
            LocationEvent::Authorization(*payload)
        }
    }

    impl EventKind for Visit {
        type Payload = model::VisitUpdate;
        const CATEGORY: Category = Category::Visit;
        const NOTIFICATION: NotificationName = NotificationName::DidVisit;

        fn slots(handlers: &CategoryHandlers) -> &HandlerSlots<Self::Payload> {
            &handlers.visit
        }

        fn slots_mut(handlers: &mut CategoryHandlers) -> &mut HandlerSlots<Self::Payload> {
            &mut handlers.visit
        }

        fn notify(delegate: &dyn LocationDelegate, payload: &Self::Payload) {
            delegate.did_visit(&payload.visit, payload.visiting);
        }

        fn to_event(payload: &Self::Payload) -> LocationEvent {
            LocationEvent::Visit(payload.clone())
        }
    }

    impl EventKind for Error {
        type Payload = model::LocationError;
        const CATEGORY: Category = Category::Error;
        const NOTIFICATION: NotificationName = NotificationName::DidFail;

        fn slots(handlers: &CategoryHandlers) -> &HandlerSlots<Self::Payload> {
            &handlers.error
        }

        fn slots_mut(handlers: &mut CategoryHandlers) -> &mut HandlerSlots<Self::Payload> {
            &mut handlers.error
        }

        fn notify(delegate: &dyn LocationDelegate, payload: &Self::Payload) {
            delegate.did_fail(payload);
        }

        fn to_event(payload: &Self::Payload) -> LocationEvent {
            LocationEvent::Error(payload.clone())
        }
    }
}
