//! In-memory provider for tests and demos
//!
//! [`SimulatedProvider`] answers queries from shared state and records
//! every primitive the facade invokes. Nothing happens on its own: tests
//! play the platform's part with [`grant`](SimulatedProvider::grant),
//! [`deliver`](SimulatedProvider::deliver),
//! [`exit_region`](SimulatedProvider::exit_region) and friends, then drain
//! the facade with `process_events`.
//!
//! Clones share state, so a test keeps one handle while the facade owns
//! another.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use locus_model::{
    AuthorizationLevel, AuthorizationStatus, Coordinate, Heading, Location, ProviderError, Region,
    RegionKind, RegionState, Visit,
};

use crate::config::ProviderSettings;
use crate::provider::{EventSink, LocationProvider, ProviderEvent};

/// A primitive invoked on the provider
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    RequestAuthorization(AuthorizationLevel),
    StartLocationUpdates,
    StopLocationUpdates,
    RequestLocation,
    StartHeadingUpdates,
    StopHeadingUpdates,
    StartSignificantLocationUpdates,
    StopSignificantLocationUpdates,
    StartMonitoring(Region),
    StopMonitoring(Region),
    RequestState(Region),
    AllowDeferredUpdates { distance: f64, timeout: Duration },
    DisallowDeferredUpdates,
    StartVisitMonitoring,
    StopVisitMonitoring,
    ApplySettings(ProviderSettings),
    SetBackgroundUpdates(bool),
    DismissHeadingCalibration,
}

/// Capability flags reported by a [`SimulatedProvider`]
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub location_services: bool,
    pub heading: bool,
    pub significant_location: bool,
    pub deferred_location: bool,
    pub single_location_request: bool,
    pub background_updates: bool,
    pub circular_regions: bool,
    pub polygon_regions: bool,
    /// Meters
    pub maximum_region_distance: f64,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            location_services: true,
            heading: true,
            significant_location: true,
            deferred_location: true,
            single_location_request: true,
            background_updates: true,
            circular_regions: true,
            polygon_regions: true,
            maximum_region_distance: 10_000.0,
        }
    }
}

#[derive(Debug, Default)]
struct SimulatedState {
    status: AuthorizationStatus,
    capabilities: Capabilities,
    location: Option<Location>,
    heading: Option<Heading>,
    monitored: Vec<Region>,
    settings: ProviderSettings,
    background_updates: bool,
    calls: Vec<ProviderCall>,
    sink: Option<EventSink>,
}

/// Scriptable [`LocationProvider`]
#[derive(Debug, Clone, Default)]
pub struct SimulatedProvider {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedProvider {
    /// Undetermined authorization, every capability available
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: AuthorizationStatus) -> Self {
        let provider = Self::new();
        provider.set_authorization(status);
        provider
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        let provider = Self::new();
        provider.set_capabilities(capabilities);
        provider
    }

    // ========================================================================
    // Scripting
    // ========================================================================

    /// Change the status without telling the facade
    pub fn set_authorization(&self, status: AuthorizationStatus) {
        self.state.lock().status = status;
    }

    pub fn set_capabilities(&self, capabilities: Capabilities) {
        self.state.lock().capabilities = capabilities;
    }

    /// Change the last known fix without telling the facade
    pub fn move_to(&self, coordinate: Coordinate) {
        self.state.lock().location = Some(Location::new(coordinate));
    }

    /// Answer an authorization prompt
    pub fn grant(&self, status: AuthorizationStatus) {
        self.set_authorization(status);
        self.emit(ProviderEvent::AuthorizationChanged(status));
    }

    /// Report a batch of fixes; the last one becomes the known location
    pub fn deliver(&self, locations: Vec<Location>) {
        if let Some(last) = locations.last() {
            self.state.lock().location = Some(last.clone());
        }
        self.emit(ProviderEvent::LocationsUpdated(locations));
    }

    pub fn deliver_heading(&self, heading: Heading) {
        self.state.lock().heading = Some(heading.clone());
        self.emit(ProviderEvent::HeadingUpdated(heading));
    }

    /// Confirm that monitoring of `region` has started
    pub fn confirm_monitoring(&self, region: &Region) {
        self.emit(ProviderEvent::MonitoringStarted(region.clone()));
    }

    pub fn enter_region(&self, region: &Region) {
        self.emit(ProviderEvent::RegionEntered(region.clone()));
    }

    pub fn exit_region(&self, region: &Region) {
        self.emit(ProviderEvent::RegionExited(region.clone()));
    }

    pub fn determine_state(&self, region: &Region, state: RegionState) {
        self.emit(ProviderEvent::RegionStateDetermined {
            region: region.clone(),
            state,
        });
    }

    pub fn fail(&self, error: ProviderError) {
        self.emit(ProviderEvent::Failed(error));
    }

    pub fn fail_monitoring(&self, region: Option<&Region>, error: ProviderError) {
        self.emit(ProviderEvent::MonitoringFailed {
            region: region.cloned(),
            error,
        });
    }

    pub fn finish_deferred(&self, error: Option<ProviderError>) {
        self.emit(ProviderEvent::DeferredUpdatesFinished(error));
    }

    pub fn visit(&self, visit: Visit) {
        self.emit(ProviderEvent::Visited(visit));
    }

    pub fn pause(&self) {
        self.emit(ProviderEvent::UpdatesPaused);
    }

    pub fn resume(&self) {
        self.emit(ProviderEvent::UpdatesResumed);
    }

    /// Send any event through the attached sink
    ///
    /// Returns `false` when no facade is attached or it has been dropped.
    pub fn emit(&self, event: ProviderEvent) -> bool {
        let sink = self.state.lock().sink.clone();
        match sink {
            Some(sink) => sink.send(event),
            None => {
                tracing::debug!("No sink attached, dropping {:?}", event);
                false
            }
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().calls.clone()
    }

    /// Return and forget the recorded calls
    pub fn take_calls(&self) -> Vec<ProviderCall> {
        std::mem::take(&mut self.state.lock().calls)
    }

    /// How many recorded calls satisfy `predicate`
    pub fn count_calls(&self, predicate: impl Fn(&ProviderCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn monitored(&self) -> Vec<Region> {
        self.state.lock().monitored.clone()
    }

    /// Last settings pushed by the facade
    pub fn settings(&self) -> ProviderSettings {
        self.state.lock().settings.clone()
    }

    pub fn background_updates(&self) -> bool {
        self.state.lock().background_updates
    }

    fn record(&self, call: ProviderCall) {
        tracing::trace!("Simulated provider call: {:?}", call);
        self.state.lock().calls.push(call);
    }
}

impl LocationProvider for SimulatedProvider {
    fn attach(&mut self, sink: EventSink) {
        self.state.lock().sink = Some(sink);
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.state.lock().status
    }

    fn location_services_enabled(&self) -> bool {
        self.state.lock().capabilities.location_services
    }

    fn heading_available(&self) -> bool {
        self.state.lock().capabilities.heading
    }

    fn significant_location_available(&self) -> bool {
        self.state.lock().capabilities.significant_location
    }

    fn deferred_location_available(&self) -> bool {
        self.state.lock().capabilities.deferred_location
    }

    fn single_location_request_available(&self) -> bool {
        self.state.lock().capabilities.single_location_request
    }

    fn background_updates_supported(&self) -> bool {
        self.state.lock().capabilities.background_updates
    }

    fn region_monitoring_available(&self, kind: RegionKind) -> bool {
        let state = self.state.lock();
        match kind {
            RegionKind::Circular => state.capabilities.circular_regions,
            RegionKind::Polygon => state.capabilities.polygon_regions,
        }
    }

    fn location(&self) -> Option<Location> {
        self.state.lock().location.clone()
    }

    fn heading(&self) -> Option<Heading> {
        self.state.lock().heading.clone()
    }

    fn monitored_regions(&self) -> Vec<Region> {
        self.monitored()
    }

    fn maximum_region_distance(&self) -> f64 {
        self.state.lock().capabilities.maximum_region_distance
    }

    fn request_authorization(&mut self, level: AuthorizationLevel) {
        self.record(ProviderCall::RequestAuthorization(level));
    }

    fn start_location_updates(&mut self) {
        self.record(ProviderCall::StartLocationUpdates);
    }

    fn stop_location_updates(&mut self) {
        self.record(ProviderCall::StopLocationUpdates);
    }

    fn request_location(&mut self) {
        self.record(ProviderCall::RequestLocation);
    }

    fn start_heading_updates(&mut self) {
        self.record(ProviderCall::StartHeadingUpdates);
    }

    fn stop_heading_updates(&mut self) {
        self.record(ProviderCall::StopHeadingUpdates);
    }

    fn start_significant_location_updates(&mut self) {
        self.record(ProviderCall::StartSignificantLocationUpdates);
    }

    fn stop_significant_location_updates(&mut self) {
        self.record(ProviderCall::StopSignificantLocationUpdates);
    }

    fn start_monitoring(&mut self, region: &Region) {
        self.record(ProviderCall::StartMonitoring(region.clone()));
        let mut state = self.state.lock();
        state.monitored.retain(|monitored| !monitored.same_identity(region));
        state.monitored.push(region.clone());
    }

    fn stop_monitoring(&mut self, region: &Region) {
        self.record(ProviderCall::StopMonitoring(region.clone()));
        self.state
            .lock()
            .monitored
            .retain(|monitored| !monitored.same_identity(region));
    }

    fn request_state(&mut self, region: &Region) {
        self.record(ProviderCall::RequestState(region.clone()));
    }

    fn allow_deferred_updates(&mut self, distance: f64, timeout: Duration) {
        self.record(ProviderCall::AllowDeferredUpdates { distance, timeout });
    }

    fn disallow_deferred_updates(&mut self) {
        self.record(ProviderCall::DisallowDeferredUpdates);
    }

    fn start_visit_monitoring(&mut self) {
        self.record(ProviderCall::StartVisitMonitoring);
    }

    fn stop_visit_monitoring(&mut self) {
        self.record(ProviderCall::StopVisitMonitoring);
    }

    fn apply_settings(&mut self, settings: &ProviderSettings) {
        self.record(ProviderCall::ApplySettings(settings.clone()));
        self.state.lock().settings = settings.clone();
    }

    fn set_background_updates(&mut self, enabled: bool) {
        self.record(ProviderCall::SetBackgroundUpdates(enabled));
        self.state.lock().background_updates = enabled;
    }

    fn dismiss_heading_calibration(&mut self) {
        self.record(ProviderCall::DismissHeadingCalibration);
    }
}
