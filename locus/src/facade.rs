//! The location facade
//!
//! [`LocationFacade`] owns a [`LocationProvider`] and a
//! [`SubscriptionRegistry`]. Operations check authorization and capability
//! before touching the provider; when the check fails the operation is
//! parked until the provider reports an authorization answer. Provider
//! callbacks are drained from the event queue and fanned out by the
//! registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use locus_model::{
    AuthorizationStatus, Heading, Location, LocationError, Region, RegionKind,
};
use locus_registry::{
    kinds, AuthorizationHandler, Category, HeadingHandler, LocationDelegate, LocationHandler,
    NotificationIterator, RegionHandler, SubscriptionRegistry, VisitHandler,
};

use crate::config::{Accuracy, ActivityType, DeviceOrientation, FacadeConfig, ProviderSettings};
use crate::provider::{EventSink, LocationProvider, ProviderEvent};

/// Continuous activities the facade can start and stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Location,
    Heading,
    SignificantLocation,
    DeferredLocation,
    Region,
    Visit,
}

impl Stream {
    pub const ALL: [Stream; 6] = [
        Stream::Location,
        Stream::Heading,
        Stream::SignificantLocation,
        Stream::DeferredLocation,
        Stream::Region,
        Stream::Visit,
    ];
}

/// Lifecycle of a [`Stream`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    /// Waiting for the user to answer an authorization prompt
    AuthorizationPending,
    /// The provider primitive has been invoked
    Active,
}

/// An operation parked until authorization is granted
///
/// Running it registers the caller's handler and invokes the provider
/// primitive, without checking authorization again.
pub(crate) enum Resume {
    LocationUpdates(Option<LocationHandler>),
    SignificantLocationUpdates(Option<LocationHandler>),
    DeferredLocationUpdates {
        distance: f64,
        timeout: Duration,
        handler: Option<LocationHandler>,
    },
    RequestLocation(Option<LocationHandler>),
    HeadingUpdates(Option<HeadingHandler>),
    RegionUpdates {
        region: Region,
        sequential: bool,
        handler: Option<RegionHandler>,
    },
    RequestRegion {
        region: Option<Region>,
        handler: Option<RegionHandler>,
    },
    VisitUpdates(Option<VisitHandler>),
}

impl Resume {
    /// Stream this operation activates, if it is a continuous one
    pub(crate) fn stream(&self) -> Option<Stream> {
        match self {
            Resume::LocationUpdates(_) => Some(Stream::Location),
            Resume::SignificantLocationUpdates(_) => Some(Stream::SignificantLocation),
            Resume::DeferredLocationUpdates { .. } => Some(Stream::DeferredLocation),
            Resume::HeadingUpdates(_) => Some(Stream::Heading),
            Resume::RegionUpdates { .. } => Some(Stream::Region),
            Resume::VisitUpdates(_) => Some(Stream::Visit),
            Resume::RequestLocation(_) | Resume::RequestRegion { .. } => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Resume::LocationUpdates(_) => "location updates",
            Resume::SignificantLocationUpdates(_) => "significant location updates",
            Resume::DeferredLocationUpdates { .. } => "deferred location updates",
            Resume::RequestLocation(_) => "location request",
            Resume::HeadingUpdates(_) => "heading updates",
            Resume::RegionUpdates { .. } => "region updates",
            Resume::RequestRegion { .. } => "region state request",
            Resume::VisitUpdates(_) => "visit updates",
        }
    }
}

impl fmt::Debug for Resume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What to do once an authorization request has an answer
enum Continuation {
    Handler(Option<AuthorizationHandler>),
    Resume(Resume),
}

/// Multiplexes one provider into per-category handlers and delegates
///
/// Driven from a single thread through `&mut self`. Provider callbacks are
/// queued through the [`EventSink`] and take effect when
/// [`process_events`](Self::process_events) or
/// [`process_next_event`](Self::process_next_event) runs.
///
/// # Example
///
/// ```rust
/// use locus::simulated::SimulatedProvider;
/// use locus::{FacadeConfig, LocationFacade};
/// use locus_model::{AuthorizationStatus, Coordinate, Location};
///
/// let provider = SimulatedProvider::new();
/// let mut facade = LocationFacade::new(provider.clone(), FacadeConfig::default());
///
/// facade.start_location_updates(Some(Box::new(|location: &Location| {
///     println!("fix at {}", location.coordinate);
/// })));
///
/// provider.grant(AuthorizationStatus::AuthorizedWhenInUse);
/// provider.deliver(vec![Location::new(Coordinate::new(52.52, 13.40))]);
/// assert_eq!(facade.process_events(), 2);
/// ```
pub struct LocationFacade<P: LocationProvider> {
    pub(crate) provider: P,
    pub(crate) config: FacadeConfig,
    pub(crate) registry: SubscriptionRegistry,
    pub(crate) pending: Vec<Resume>,
    pub(crate) streams: HashMap<Stream, StreamState>,
    pub(crate) sequential: bool,
    pub(crate) sink: EventSink,
    pub(crate) events: mpsc::Receiver<ProviderEvent>,
}

impl<P: LocationProvider> LocationFacade<P> {
    /// Attach to `provider` and push the configured settings to it
    pub fn new(mut provider: P, config: FacadeConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let sink = EventSink::new(tx);

        provider.attach(sink.clone());
        provider.apply_settings(&config.settings);

        let background = config.background_updates;
        let mut facade = Self {
            provider,
            config,
            registry: SubscriptionRegistry::new(),
            pending: Vec::new(),
            streams: HashMap::new(),
            sequential: false,
            sink,
            events: rx,
        };

        if background {
            facade.set_background_updates(true);
        }

        tracing::debug!("Location facade created: {:?}", facade.config);
        facade
    }

    // ========================================================================
    // Registry access
    // ========================================================================

    /// Handlers and delegates
    pub fn handlers(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Register or clear persistent handlers directly
    pub fn handlers_mut(&mut self) -> &mut SubscriptionRegistry {
        &mut self.registry
    }

    pub fn add_delegate(&mut self, delegate: Arc<dyn LocationDelegate>) {
        self.registry.add_delegate(delegate);
    }

    pub fn notifications(&mut self) -> NotificationIterator {
        self.registry.notifications()
    }

    /// Another handle on the event queue the provider reports into
    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn location(&self) -> Option<Location> {
        self.provider.location()
    }

    pub fn heading(&self) -> Option<Heading> {
        self.provider.heading()
    }

    pub fn authorization(&self) -> AuthorizationStatus {
        self.provider.authorization_status()
    }

    pub fn is_authorized(&self) -> bool {
        self.authorization().is_authorized()
    }

    /// Whether `status` grants access to location data
    pub fn is_authorized_status(status: AuthorizationStatus) -> bool {
        status.is_authorized()
    }

    pub fn location_services_enabled(&self) -> bool {
        self.provider.location_services_enabled()
    }

    pub fn heading_available(&self) -> bool {
        self.provider.heading_available()
    }

    pub fn significant_location_available(&self) -> bool {
        self.provider.significant_location_available()
    }

    pub fn deferred_location_available(&self) -> bool {
        self.provider.deferred_location_available()
    }

    pub fn is_region_monitoring_available(&self, kind: RegionKind) -> bool {
        self.provider.region_monitoring_available(kind)
    }

    pub fn regions(&self) -> Vec<Region> {
        self.provider.monitored_regions()
    }

    pub fn maximum_region_distance(&self) -> f64 {
        self.provider.maximum_region_distance()
    }

    pub fn stream_state(&self, stream: Stream) -> StreamState {
        self.streams.get(&stream).copied().unwrap_or_default()
    }

    /// Whether exits re-center monitored circular regions
    pub fn is_sequential(&self) -> bool {
        self.sequential
    }

    // ========================================================================
    // Provider settings
    // ========================================================================

    pub fn settings(&self) -> &ProviderSettings {
        &self.config.settings
    }

    pub fn activity_type(&self) -> ActivityType {
        self.config.settings.activity_type
    }

    pub fn set_activity_type(&mut self, activity_type: ActivityType) {
        self.update_settings(|settings| settings.activity_type = activity_type);
    }

    pub fn distance_filter(&self) -> Option<f64> {
        self.config.settings.distance_filter
    }

    pub fn set_distance_filter(&mut self, meters: Option<f64>) {
        self.update_settings(|settings| settings.distance_filter = meters);
    }

    pub fn desired_accuracy(&self) -> Accuracy {
        self.config.settings.desired_accuracy
    }

    pub fn set_desired_accuracy(&mut self, accuracy: Accuracy) {
        self.update_settings(|settings| settings.desired_accuracy = accuracy);
    }

    pub fn pauses_automatically(&self) -> bool {
        self.config.settings.pauses_automatically
    }

    pub fn set_pauses_automatically(&mut self, pauses: bool) {
        self.update_settings(|settings| settings.pauses_automatically = pauses);
    }

    pub fn heading_filter(&self) -> Option<f64> {
        self.config.settings.heading_filter
    }

    pub fn set_heading_filter(&mut self, degrees: Option<f64>) {
        self.update_settings(|settings| settings.heading_filter = degrees);
    }

    pub fn heading_orientation(&self) -> DeviceOrientation {
        self.config.settings.heading_orientation
    }

    pub fn set_heading_orientation(&mut self, orientation: DeviceOrientation) {
        self.update_settings(|settings| settings.heading_orientation = orientation);
    }

    pub fn should_display_heading_calibration(&mut self, display: bool) {
        self.update_settings(|settings| settings.display_heading_calibration = display);
    }

    pub fn displays_heading_calibration(&self) -> bool {
        self.config.settings.display_heading_calibration
    }

    pub fn dismiss_heading_calibration(&mut self) {
        self.provider.dismiss_heading_calibration();
    }

    pub fn background_updates(&self) -> bool {
        self.config.background_updates
    }

    /// Allow updates while the application is in the background
    ///
    /// Dispatches a `CapabilityUnavailable` error, and changes nothing, when
    /// the provider is not set up for background updates.
    pub fn set_background_updates(&mut self, enabled: bool) {
        if !self.provider.background_updates_supported() {
            self.fail(LocationError::capability_unavailable(
                "background location updates are not enabled for this application",
            ));
            return;
        }

        self.config.background_updates = enabled;
        self.provider.set_background_updates(enabled);
    }

    fn update_settings(&mut self, update: impl FnOnce(&mut ProviderSettings)) {
        update(&mut self.config.settings);
        self.provider.apply_settings(&self.config.settings);
    }

    // ========================================================================
    // Authorization
    // ========================================================================

    /// Ask for `status`, calling `handler` with the answer
    ///
    /// - `status` equal to the current status: `handler` runs immediately
    ///   and the result is whether that status is authorized.
    /// - `AuthorizedWhenInUse` / `AuthorizedAlways`: the prompt is requested,
    ///   `handler` waits for the answer and the result is `true`.
    /// - any other status cannot be requested: an `AuthorizationDenied`
    ///   error is dispatched and the result is `false`.
    pub fn authorize(
        &mut self,
        status: AuthorizationStatus,
        handler: Option<AuthorizationHandler>,
    ) -> bool {
        self.request_authorization(status, Continuation::Handler(handler))
    }

    fn request_authorization(
        &mut self,
        status: AuthorizationStatus,
        continuation: Continuation,
    ) -> bool {
        let current = self.authorization();
        if status == current {
            match continuation {
                Continuation::Handler(Some(mut handler)) => handler(&current),
                Continuation::Handler(None) => {}
                Continuation::Resume(resume) => self.resolve(resume, current),
            }
            return current.is_authorized();
        }

        let Some(level) = status.requestable_level() else {
            if let Continuation::Resume(resume) = continuation {
                self.abandon(resume, current);
            }
            self.fail(LocationError::authorization_denied());
            return false;
        };

        match continuation {
            Continuation::Handler(Some(handler)) => {
                self.registry.add_one_shot::<kinds::Authorization>(handler);
            }
            Continuation::Handler(None) => {}
            Continuation::Resume(resume) => {
                if let Some(stream) = resume.stream() {
                    if self.stream_state(stream) != StreamState::Active {
                        self.set_stream(stream, StreamState::AuthorizationPending);
                    }
                }
                tracing::debug!("Parking {:?} until authorization is answered", resume);
                self.pending.push(resume);
            }
        }

        tracing::info!("Requesting {:?} location authorization", level);
        self.provider.request_authorization(level);
        true
    }

    /// Run `resume` now if authorized and `capability` holds, otherwise go
    /// through the authorization path
    ///
    /// When already authorized, the current status is requested again, so
    /// the operation runs right away even though `capability` failed.
    pub(crate) fn gate(&mut self, capability: bool, resume: Resume) {
        let current = self.authorization();
        if current.is_authorized() && capability {
            self.activate(resume);
            return;
        }

        let requested = if current.is_authorized() {
            current
        } else {
            self.config.requested_authorization.into()
        };
        tracing::debug!(
            "{:?} needs authorization (current {}, capability {})",
            resume,
            current,
            capability
        );
        self.request_authorization(requested, Continuation::Resume(resume));
    }

    /// Run or drop parked operations now that `status` is known
    pub(crate) fn resume_pending(&mut self, status: AuthorizationStatus) {
        if !status.is_determined() {
            return;
        }

        for resume in std::mem::take(&mut self.pending) {
            self.resolve(resume, status);
        }
    }

    fn resolve(&mut self, resume: Resume, status: AuthorizationStatus) {
        if status.is_authorized() {
            self.activate(resume);
        } else {
            self.abandon(resume, status);
        }
    }

    fn abandon(&mut self, resume: Resume, status: AuthorizationStatus) {
        tracing::warn!("Dropping {:?}: authorization is {}", resume, status);
        if let Some(stream) = resume.stream() {
            if self.stream_state(stream) == StreamState::AuthorizationPending {
                self.set_stream(stream, StreamState::Idle);
            }
        }
    }

    /// Register the handler and invoke the provider primitive
    pub(crate) fn activate(&mut self, resume: Resume) {
        tracing::info!("Starting {:?}", resume);
        match resume {
            Resume::LocationUpdates(handler) => {
                if let Some(handler) = handler {
                    self.registry.add_continuous::<kinds::Location>(handler);
                }
                self.provider.start_location_updates();
                self.set_stream(Stream::Location, StreamState::Active);
            }
            Resume::SignificantLocationUpdates(handler) => {
                if let Some(handler) = handler {
                    self.registry.add_continuous::<kinds::Location>(handler);
                }
                self.provider.start_significant_location_updates();
                self.set_stream(Stream::SignificantLocation, StreamState::Active);
            }
            Resume::DeferredLocationUpdates {
                distance,
                timeout,
                handler,
            } => {
                if let Some(handler) = handler {
                    self.registry.add_continuous::<kinds::Location>(handler);
                }
                self.provider.allow_deferred_updates(distance, timeout);
                self.set_stream(Stream::DeferredLocation, StreamState::Active);
            }
            Resume::RequestLocation(handler) => {
                if let Some(handler) = handler {
                    self.registry.add_one_shot::<kinds::Location>(handler);
                }
                self.provider.request_location();
            }
            Resume::HeadingUpdates(handler) => {
                if let Some(handler) = handler {
                    self.registry.add_continuous::<kinds::Heading>(handler);
                }
                self.provider.start_heading_updates();
                self.set_stream(Stream::Heading, StreamState::Active);
            }
            Resume::RegionUpdates {
                region,
                sequential,
                handler,
            } => {
                self.sequential = sequential;
                if let Some(handler) = handler {
                    self.registry.add_one_shot::<kinds::Region>(handler);
                }
                self.provider.start_monitoring(&region);
                self.set_stream(Stream::Region, StreamState::Active);
            }
            Resume::RequestRegion { region, handler } => {
                if let Some(handler) = handler {
                    self.registry.add_one_shot::<kinds::Region>(handler);
                }
                match region {
                    Some(region) => self.provider.request_state(&region),
                    None => {
                        for region in self.provider.monitored_regions() {
                            self.provider.request_state(&region);
                        }
                    }
                }
            }
            Resume::VisitUpdates(handler) => {
                if let Some(handler) = handler {
                    self.registry.add_continuous::<kinds::Visit>(handler);
                }
                self.provider.start_visit_monitoring();
                self.set_stream(Stream::Visit, StreamState::Active);
            }
        }
    }

    pub(crate) fn set_stream(&mut self, stream: Stream, state: StreamState) {
        let previous = self.streams.insert(stream, state).unwrap_or_default();
        if previous != state {
            tracing::debug!("{:?} stream: {:?} -> {:?}", stream, previous, state);
        }
    }

    /// Return `stream` to idle and forget any parked start for it
    pub(crate) fn idle(&mut self, stream: Stream) {
        self.pending.retain(|resume| resume.stream() != Some(stream));
        self.set_stream(stream, StreamState::Idle);
    }

    pub(crate) fn fail(&mut self, error: LocationError) {
        tracing::warn!("Location error: {}", error);
        self.registry.dispatch::<kinds::Error>(&error);
    }

    // ========================================================================
    // Location streams
    // ========================================================================

    /// Start continuous location updates
    ///
    /// `handler` receives the latest fix of every batch until the stream is
    /// stopped.
    pub fn start_location_updates(&mut self, handler: Option<LocationHandler>) {
        let capability = self.provider.location_services_enabled();
        self.gate(capability, Resume::LocationUpdates(handler));
    }

    pub fn stop_location_updates(&mut self) {
        self.clear_location_one_shots();
        self.provider.stop_location_updates();
        self.idle(Stream::Location);
        tracing::info!("Stopped location updates");
    }

    /// Request a single fix, delivered to `handler` once
    ///
    /// Does not cancel running streams. When the provider cannot serve
    /// single requests a `CapabilityUnavailable` error is dispatched and
    /// nothing else happens.
    pub fn request_location(&mut self, handler: Option<LocationHandler>) {
        if !self.provider.single_location_request_available() {
            self.fail(LocationError::capability_unavailable(
                "single location requests are not supported by this provider",
            ));
            return;
        }

        let capability = self.provider.location_services_enabled();
        self.gate(capability, Resume::RequestLocation(handler));
    }

    pub fn start_significant_location_updates(&mut self, handler: Option<LocationHandler>) {
        let capability = self.provider.significant_location_available();
        self.gate(capability, Resume::SignificantLocationUpdates(handler));
    }

    pub fn stop_significant_location_updates(&mut self) {
        self.clear_location_one_shots();
        self.provider.stop_significant_location_updates();
        self.idle(Stream::SignificantLocation);
        tracing::info!("Stopped significant location updates");
    }

    /// Let the provider hold fixes back until `distance` meters have been
    /// travelled or `timeout` has elapsed
    ///
    /// Deferred mode and continuous updates exclude each other at the
    /// provider; nothing here enforces it.
    pub fn start_deferred_location_updates(
        &mut self,
        distance: f64,
        timeout: Duration,
        handler: Option<LocationHandler>,
    ) {
        let capability = self.provider.deferred_location_available();
        self.gate(
            capability,
            Resume::DeferredLocationUpdates {
                distance,
                timeout,
                handler,
            },
        );
    }

    pub fn stop_deferred_location_updates(&mut self) {
        self.clear_location_one_shots();
        self.provider.disallow_deferred_updates();
        self.idle(Stream::DeferredLocation);
        tracing::info!("Stopped deferred location updates");
    }

    fn clear_location_one_shots(&mut self) {
        self.registry.clear_one_shot(Category::LocationBatch);
        self.registry.clear_one_shot(Category::Location);
    }

    // ========================================================================
    // Heading and visits
    // ========================================================================

    pub fn start_heading_updates(&mut self, handler: Option<HeadingHandler>) {
        let capability = self.provider.heading_available();
        self.gate(capability, Resume::HeadingUpdates(handler));
    }

    pub fn stop_heading_updates(&mut self) {
        self.registry.clear_one_shot(Category::Heading);
        self.provider.stop_heading_updates();
        self.idle(Stream::Heading);
        tracing::info!("Stopped heading updates");
    }

    /// Start visit monitoring; only authorization is required
    pub fn start_visit_updates(&mut self, handler: Option<VisitHandler>) {
        self.gate(true, Resume::VisitUpdates(handler));
    }

    pub fn stop_visit_updates(&mut self) {
        self.registry.clear_one_shot(Category::Visit);
        self.provider.stop_visit_monitoring();
        self.idle(Stream::Visit);
        tracing::info!("Stopped visit updates");
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Drop every handler, delegate, observer and parked operation
    ///
    /// The provider is left untouched; stop streams first if it should go
    /// quiet too.
    pub fn teardown(&mut self) {
        self.registry.clear_all();
        self.pending.clear();
        self.streams.clear();
        self.sequential = false;
        tracing::info!("Location facade torn down");
    }
}

impl<P: LocationProvider> fmt::Debug for LocationFacade<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationFacade")
            .field("registry", &self.registry)
            .field("pending", &self.pending)
            .field("streams", &self.streams)
            .field("sequential", &self.sequential)
            .finish()
    }
}
