//! Broadcast notifications mirroring every dispatch
//!
//! Besides handlers and delegates, each dispatched payload is published as a
//! [`Notification`] to every observer obtained from
//! [`SubscriptionRegistry::notifications`](crate::SubscriptionRegistry::notifications).

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use locus_model::{AuthorizationStatus, Heading, Location, LocationError, RegionUpdate, VisitUpdate};

use crate::category::Category;

/// `user_info` key carrying the region state of a region notification
pub const REGION_STATE_KEY: &str = "LocusRegionStateKey";

/// `user_info` key carrying the visiting flag of a visit notification
pub const VISITING_KEY: &str = "LocusVisitingKey";

/// Owned payload of a notification
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Location(Location),
    Locations(Vec<Location>),
    Heading(Heading),
    Region(RegionUpdate),
    Authorization(AuthorizationStatus),
    Visit(VisitUpdate),
    Error(LocationError),
}

impl LocationEvent {
    pub fn category(&self) -> Category {
        match self {
            LocationEvent::Location(_) => Category::Location,
            LocationEvent::Locations(_) => Category::LocationBatch,
            LocationEvent::Heading(_) => Category::Heading,
            LocationEvent::Region(_) => Category::Region,
            LocationEvent::Authorization(_) => Category::Authorization,
            LocationEvent::Visit(_) => Category::Visit,
            LocationEvent::Error(_) => Category::Error,
        }
    }
}

/// Name a notification is published under, one per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationName {
    DidUpdateLocation,
    DidUpdateLocations,
    DidUpdateHeading,
    DidUpdateRegion,
    DidFail,
    DidChangeAuthorization,
    DidVisit,
}

impl NotificationName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DidUpdateLocation => "LocusDidUpdateLocationNotification",
            Self::DidUpdateLocations => "LocusDidUpdateLocationsNotification",
            Self::DidUpdateHeading => "LocusDidUpdateHeadingNotification",
            Self::DidUpdateRegion => "LocusDidUpdateRegionNotification",
            Self::DidFail => "LocusDidFailNotification",
            Self::DidChangeAuthorization => "LocusDidChangeAuthorizationNotification",
            Self::DidVisit => "LocusDidVisitNotification",
        }
    }
}

impl fmt::Display for NotificationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatched payload as seen by a notification observer
#[derive(Debug, Clone)]
pub struct Notification {
    pub name: NotificationName,
    pub event: LocationEvent,
    /// When the dispatch happened
    pub timestamp: Instant,
}

impl Notification {
    pub fn new(name: NotificationName, event: LocationEvent) -> Self {
        Self {
            name,
            event,
            timestamp: Instant::now(),
        }
    }

    /// Auxiliary values that do not fit the main payload
    ///
    /// Region notifications carry [`REGION_STATE_KEY`], visit notifications
    /// carry [`VISITING_KEY`]. Other notifications have none.
    pub fn user_info(&self) -> HashMap<&'static str, String> {
        let mut info = HashMap::new();
        match &self.event {
            LocationEvent::Region(update) => {
                info.insert(REGION_STATE_KEY, update.state.to_string());
            }
            LocationEvent::Visit(update) => {
                info.insert(VISITING_KEY, update.visiting.to_string());
            }
            _ => {}
        }
        info
    }
}
