//! Delegate objects subscribed to every category at once

use locus_model::{AuthorizationStatus, Heading, Location, LocationError, Region, RegionState, Visit};

/// An object interested in several categories at once
///
/// Every capability has an empty default body, so implementors only
/// override what they care about. Delegates run before any handler of the
/// dispatched category, in the order they were added.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use locus_model::Location;
/// use locus_registry::LocationDelegate;
///
/// #[derive(Default)]
/// struct FixCounter(AtomicUsize);
///
/// impl LocationDelegate for FixCounter {
///     fn did_update_location(&self, _location: &Location) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait LocationDelegate: Send + Sync {
    fn did_update_location(&self, _location: &Location) {}

    fn did_update_locations(&self, _locations: &[Location]) {}

    fn did_update_heading(&self, _heading: &Heading) {}

    fn did_update_region(&self, _region: &Region, _state: RegionState) {}

    fn did_fail(&self, _error: &LocationError) {}

    fn did_change_authorization(&self, _status: AuthorizationStatus) {}

    /// `visiting` is computed at delivery time
    fn did_visit(&self, _visit: &Visit, _visiting: bool) {}
}
