//! Boundary with the platform positioning service
//!
//! A [`LocationProvider`] exposes synchronous queries and fire-and-forget
//! primitives. Everything it learns later (fixes, region transitions,
//! authorization answers, failures) is reported as a [`ProviderEvent`]
//! through the single [`EventSink`] handed to it by the facade.

use std::sync::mpsc;
use std::time::Duration;

use locus_model::{
    AuthorizationLevel, AuthorizationStatus, Heading, Location, ProviderError, Region, RegionKind,
    RegionState, Visit,
};

use crate::config::ProviderSettings;

/// Asynchronous callback from the provider
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// A batch of fixes, oldest first
    LocationsUpdated(Vec<Location>),
    HeadingUpdated(Heading),
    /// Answer to a state request, or a spontaneous state determination
    RegionStateDetermined { region: Region, state: RegionState },
    RegionEntered(Region),
    RegionExited(Region),
    MonitoringStarted(Region),
    Failed(ProviderError),
    MonitoringFailed {
        region: Option<Region>,
        error: ProviderError,
    },
    /// Deferred mode ended, with the reason if it ended abnormally
    DeferredUpdatesFinished(Option<ProviderError>),
    AuthorizationChanged(AuthorizationStatus),
    Visited(Visit),
    UpdatesPaused,
    UpdatesResumed,
}

/// Write end of the facade's event queue
///
/// Cheap to clone and `Send`, so a provider may report from any thread. The
/// facade drains the queue on its own thread.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<ProviderEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::Sender<ProviderEvent>) -> Self {
        Self { tx }
    }

    /// Queue an event; returns `false` once the facade has been dropped
    pub fn send(&self, event: ProviderEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::SendError(event)) => {
                tracing::debug!("Dropping provider event, facade is gone: {:?}", event);
                false
            }
        }
    }
}

/// Platform positioning service as seen by the facade
///
/// Queries must answer from cached state without blocking. Mutating
/// primitives return immediately; their outcome arrives later through the
/// attached [`EventSink`].
pub trait LocationProvider {
    /// Called once by the facade before any other mutating primitive
    fn attach(&mut self, sink: EventSink);

    fn authorization_status(&self) -> AuthorizationStatus;

    fn location_services_enabled(&self) -> bool;

    fn heading_available(&self) -> bool;

    fn significant_location_available(&self) -> bool;

    fn deferred_location_available(&self) -> bool;

    fn single_location_request_available(&self) -> bool;

    fn background_updates_supported(&self) -> bool;

    fn region_monitoring_available(&self, kind: RegionKind) -> bool;

    /// Last known fix, if any
    fn location(&self) -> Option<Location>;

    /// Last known heading, if any
    fn heading(&self) -> Option<Heading>;

    fn monitored_regions(&self) -> Vec<Region>;

    /// Largest circular region radius, in meters, that can be monitored
    fn maximum_region_distance(&self) -> f64;

    /// Show the authorization prompt; the answer arrives as
    /// [`ProviderEvent::AuthorizationChanged`]
    fn request_authorization(&mut self, level: AuthorizationLevel);

    fn start_location_updates(&mut self);

    fn stop_location_updates(&mut self);

    fn request_location(&mut self);

    fn start_heading_updates(&mut self);

    fn stop_heading_updates(&mut self);

    fn start_significant_location_updates(&mut self);

    fn stop_significant_location_updates(&mut self);

    /// Monitoring a region replaces any region with the same identifier
    fn start_monitoring(&mut self, region: &Region);

    fn stop_monitoring(&mut self, region: &Region);

    /// Ask for the cached state of a region; answered with
    /// [`ProviderEvent::RegionStateDetermined`]
    fn request_state(&mut self, region: &Region);

    fn allow_deferred_updates(&mut self, distance: f64, timeout: Duration);

    fn disallow_deferred_updates(&mut self);

    fn start_visit_monitoring(&mut self);

    fn stop_visit_monitoring(&mut self);

    fn apply_settings(&mut self, settings: &ProviderSettings);

    fn set_background_updates(&mut self, enabled: bool);

    fn dismiss_heading_calibration(&mut self);
}
