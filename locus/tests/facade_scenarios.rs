//! End-to-end behavior of the facade against the simulated provider

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use proptest::prelude::*;
use rstest::rstest;

use locus::simulated::{Capabilities, ProviderCall, SimulatedProvider};
use locus::{Accuracy, ActivityType, FacadeConfig, LocationFacade, Stream, StreamState};
use locus_model::{
    AuthorizationLevel, AuthorizationStatus, Coordinate, ErrorKind, Heading, Location,
    LocationError, ProviderError, Region, RegionState, RegionUpdate, Visit, VisitUpdate,
};
use locus_registry::{kinds, Category, LocationDelegate, NotificationName, VISITING_KEY};

// ============================================================================
// Test Helpers
// ============================================================================

type Seen<T> = Arc<Mutex<Vec<T>>>;

/// Handler recording clones of everything it receives
fn recorder<T: Clone + Send + 'static>() -> (Seen<T>, Box<dyn FnMut(&T) + Send>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    (seen, Box::new(move |value: &T| log.lock().push(value.clone())))
}

fn facade_with(provider: &SimulatedProvider) -> LocationFacade<SimulatedProvider> {
    LocationFacade::new(provider.clone(), FacadeConfig::default())
}

fn authorized() -> (SimulatedProvider, LocationFacade<SimulatedProvider>) {
    let provider = SimulatedProvider::with_status(AuthorizationStatus::AuthorizedWhenInUse);
    let facade = facade_with(&provider);
    provider.take_calls();
    (provider, facade)
}

fn record_errors(facade: &mut LocationFacade<SimulatedProvider>) -> Seen<LocationError> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    facade
        .handlers_mut()
        .add_persistent::<kinds::Error>(move |error| log.lock().push(error.clone()));
    seen
}

/// Fix with a fixed timestamp, so equal coordinates compare equal
fn fix(latitude: f64, longitude: f64) -> Location {
    let timestamp = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
    Location::at(Coordinate::new(latitude, longitude), timestamp)
}

struct OrderDelegate {
    log: Seen<&'static str>,
}

impl LocationDelegate for OrderDelegate {
    fn did_update_location(&self, _location: &Location) {
        self.log.lock().push("delegate");
    }
}

// ============================================================================
// Dispatch order and one-shot lifetimes
// ============================================================================

#[test]
fn test_delegates_before_one_shots_before_persistent() {
    let (provider, mut facade) = authorized();
    let log: Seen<&'static str> = Arc::new(Mutex::new(Vec::new()));

    let l = Arc::clone(&log);
    facade
        .handlers_mut()
        .add_persistent::<kinds::Location>(move |_| l.lock().push("persistent"));
    facade.add_delegate(Arc::new(OrderDelegate {
        log: Arc::clone(&log),
    }));
    let l = Arc::clone(&log);
    facade.request_location(Some(Box::new(move |_: &Location| l.lock().push("one-shot"))));

    provider.deliver(vec![fix(1.0, 1.0)]);
    facade.process_events();

    assert_eq!(*log.lock(), vec!["delegate", "one-shot", "persistent"]);
}

#[test]
fn test_request_location_fires_once() {
    let (provider, mut facade) = authorized();
    let (seen, handler) = recorder::<Location>();

    facade.request_location(Some(handler));
    assert_eq!(provider.calls(), vec![ProviderCall::RequestLocation]);

    provider.deliver(vec![fix(1.0, 1.0)]);
    provider.deliver(vec![fix(2.0, 2.0)]);
    facade.process_events();

    assert_eq!(*seen.lock(), vec![fix(1.0, 1.0)]);
    assert_eq!(facade.handlers().one_shot_count(Category::Location), 0);
}

#[test]
fn test_request_location_unsupported() {
    let provider = SimulatedProvider::with_capabilities(Capabilities {
        single_location_request: false,
        ..Default::default()
    });
    provider.set_authorization(AuthorizationStatus::AuthorizedAlways);
    let mut facade = facade_with(&provider);
    let errors = record_errors(&mut facade);
    provider.take_calls();

    let (seen, handler) = recorder::<Location>();
    facade.request_location(Some(handler));

    assert!(provider.calls().is_empty());
    assert!(seen.lock().is_empty());
    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), ErrorKind::CapabilityUnavailable);
}

#[test]
fn test_request_location_does_not_cancel_stream() {
    let (provider, mut facade) = authorized();
    let (stream_seen, stream_handler) = recorder::<Location>();
    let (request_seen, request_handler) = recorder::<Location>();

    facade.start_location_updates(Some(stream_handler));
    facade.request_location(Some(request_handler));
    provider.deliver(vec![fix(1.0, 1.0)]);
    provider.deliver(vec![fix(2.0, 2.0)]);
    facade.process_events();

    assert_eq!(stream_seen.lock().len(), 2);
    assert_eq!(request_seen.lock().len(), 1);
    assert_eq!(facade.stream_state(Stream::Location), StreamState::Active);
}

// ============================================================================
// Authorization
// ============================================================================

#[test]
fn test_authorization_one_shot_survives_not_determined() {
    let provider = SimulatedProvider::new();
    let mut facade = facade_with(&provider);
    provider.take_calls();
    let (seen, handler) = recorder::<AuthorizationStatus>();

    assert!(facade.authorize(AuthorizationStatus::AuthorizedAlways, Some(handler)));
    assert_eq!(
        provider.calls(),
        vec![ProviderCall::RequestAuthorization(AuthorizationLevel::Always)]
    );

    provider.grant(AuthorizationStatus::NotDetermined);
    facade.process_events();
    assert_eq!(facade.handlers().one_shot_count(Category::Authorization), 1);

    provider.grant(AuthorizationStatus::AuthorizedAlways);
    provider.grant(AuthorizationStatus::Denied);
    facade.process_events();

    assert_eq!(
        *seen.lock(),
        vec![
            AuthorizationStatus::NotDetermined,
            AuthorizationStatus::AuthorizedAlways
        ]
    );
    assert_eq!(facade.handlers().one_shot_count(Category::Authorization), 0);
}

#[rstest]
#[case(AuthorizationStatus::AuthorizedWhenInUse, true)]
#[case(AuthorizationStatus::Denied, false)]
#[case(AuthorizationStatus::NotDetermined, false)]
fn test_authorize_current_status_runs_immediately(
    #[case] status: AuthorizationStatus,
    #[case] expected: bool,
) {
    let provider = SimulatedProvider::with_status(status);
    let mut facade = facade_with(&provider);
    provider.take_calls();
    let (seen, handler) = recorder::<AuthorizationStatus>();

    assert_eq!(facade.authorize(status, Some(handler)), expected);

    assert_eq!(*seen.lock(), vec![status]);
    assert!(provider.calls().is_empty());
    assert_eq!(facade.handlers().one_shot_count(Category::Authorization), 0);
}

#[rstest]
#[case(AuthorizationStatus::NotDetermined)]
#[case(AuthorizationStatus::Restricted)]
#[case(AuthorizationStatus::Denied)]
fn test_unrequestable_status_dispatches_denied(#[case] status: AuthorizationStatus) {
    let provider = SimulatedProvider::with_status(AuthorizationStatus::AuthorizedWhenInUse);
    let mut facade = facade_with(&provider);
    let errors = record_errors(&mut facade);
    provider.take_calls();
    let (seen, handler) = recorder::<AuthorizationStatus>();

    assert!(!facade.authorize(status, Some(handler)));

    assert!(seen.lock().is_empty());
    assert!(provider.calls().is_empty());
    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), ErrorKind::AuthorizationDenied);
}

#[test]
fn test_stream_waits_for_authorization() {
    let provider = SimulatedProvider::new();
    let mut facade = facade_with(&provider);
    provider.take_calls();

    let (seen, handler) = recorder::<Location>();
    let batches: Seen<Vec<Location>> = Arc::new(Mutex::new(Vec::new()));
    let persistent: Seen<Location> = Arc::new(Mutex::new(Vec::new()));
    let b = Arc::clone(&batches);
    facade
        .handlers_mut()
        .add_persistent::<kinds::LocationBatch>(move |batch| b.lock().push(batch.to_vec()));
    let p = Arc::clone(&persistent);
    facade
        .handlers_mut()
        .add_persistent::<kinds::Location>(move |location| p.lock().push(location.clone()));

    facade.start_location_updates(Some(handler));
    assert_eq!(
        facade.stream_state(Stream::Location),
        StreamState::AuthorizationPending
    );
    assert_eq!(
        provider.take_calls(),
        vec![ProviderCall::RequestAuthorization(AuthorizationLevel::WhenInUse)]
    );

    provider.grant(AuthorizationStatus::AuthorizedAlways);
    facade.process_events();
    assert_eq!(facade.stream_state(Stream::Location), StreamState::Active);
    assert_eq!(provider.take_calls(), vec![ProviderCall::StartLocationUpdates]);

    let (p1, p2) = (fix(10.0, 10.0), fix(10.1, 10.1));
    provider.deliver(vec![p1.clone(), p2.clone()]);
    facade.process_events();

    assert_eq!(*seen.lock(), vec![p2.clone()]);
    assert_eq!(*persistent.lock(), vec![p2.clone()]);
    assert_eq!(*batches.lock(), vec![vec![p1, p2]]);
}

#[test]
fn test_denied_answer_drops_parked_operations() {
    let provider = SimulatedProvider::new();
    let mut facade = facade_with(&provider);
    let (statuses, status_handler) = recorder::<AuthorizationStatus>();
    facade
        .handlers_mut()
        .add_persistent::<kinds::Authorization>(status_handler);
    provider.take_calls();

    let (seen, handler) = recorder::<Heading>();
    facade.start_heading_updates(Some(handler));
    assert_eq!(
        facade.stream_state(Stream::Heading),
        StreamState::AuthorizationPending
    );

    provider.grant(AuthorizationStatus::Denied);
    facade.process_events();
    provider.grant(AuthorizationStatus::AuthorizedAlways);
    facade.process_events();

    assert_eq!(facade.stream_state(Stream::Heading), StreamState::Idle);
    assert_eq!(provider.count_calls(|call| *call == ProviderCall::StartHeadingUpdates), 0);
    assert!(seen.lock().is_empty());
    assert_eq!(
        *statuses.lock(),
        vec![AuthorizationStatus::Denied, AuthorizationStatus::AuthorizedAlways]
    );
}

#[test]
fn test_configured_level_is_requested() {
    let provider = SimulatedProvider::new();
    let config = FacadeConfig {
        requested_authorization: AuthorizationLevel::Always,
        ..Default::default()
    };
    let mut facade = LocationFacade::new(provider.clone(), config);
    provider.take_calls();

    facade.start_visit_updates(None);

    assert_eq!(
        provider.calls(),
        vec![ProviderCall::RequestAuthorization(AuthorizationLevel::Always)]
    );
}

#[test]
fn test_missing_capability_while_authorized_starts_immediately() {
    let provider = SimulatedProvider::with_capabilities(Capabilities {
        heading: false,
        ..Default::default()
    });
    provider.set_authorization(AuthorizationStatus::AuthorizedWhenInUse);
    let mut facade = facade_with(&provider);
    provider.take_calls();

    facade.start_heading_updates(None);

    assert_eq!(provider.calls(), vec![ProviderCall::StartHeadingUpdates]);
    assert_eq!(facade.stream_state(Stream::Heading), StreamState::Active);
}

#[test]
fn test_stop_while_pending_cancels_start() {
    let provider = SimulatedProvider::new();
    let mut facade = facade_with(&provider);

    facade.start_significant_location_updates(None);
    facade.stop_significant_location_updates();
    provider.take_calls();

    provider.grant(AuthorizationStatus::AuthorizedAlways);
    facade.process_events();

    assert!(provider.calls().is_empty());
    assert_eq!(
        facade.stream_state(Stream::SignificantLocation),
        StreamState::Idle
    );
}

#[test]
fn test_region_stop_without_regions_cancels_parked_start() {
    let provider = SimulatedProvider::new();
    let mut facade = facade_with(&provider);
    let errors = record_errors(&mut facade);

    facade.start_region_updates(
        Region::circular("porch", Coordinate::new(0.0, 0.0), 40.0),
        false,
        None,
        None,
    );
    assert_eq!(
        facade.stream_state(Stream::Region),
        StreamState::AuthorizationPending
    );

    assert!(!facade.stop_region_updates(None));
    assert_eq!(facade.stream_state(Stream::Region), StreamState::Idle);

    provider.grant(AuthorizationStatus::AuthorizedWhenInUse);
    facade.process_events();

    assert!(provider.monitored().is_empty());
    assert_eq!(facade.stream_state(Stream::Region), StreamState::Idle);
    assert_eq!(errors.lock().len(), 1);
}

#[test]
fn test_parked_start_runs_after_authorization_handlers() {
    let provider = SimulatedProvider::new();
    let mut facade = facade_with(&provider);
    let starts_seen: Seen<usize> = Arc::new(Mutex::new(Vec::new()));

    let watcher = provider.clone();
    let log = Arc::clone(&starts_seen);
    facade
        .handlers_mut()
        .add_persistent::<kinds::Authorization>(move |_| {
            log.lock()
                .push(watcher.count_calls(|call| *call == ProviderCall::StartLocationUpdates));
        });

    facade.start_location_updates(None);
    provider.grant(AuthorizationStatus::AuthorizedWhenInUse);
    facade.process_events();

    assert_eq!(*starts_seen.lock(), vec![0]);
    assert_eq!(
        provider.count_calls(|call| *call == ProviderCall::StartLocationUpdates),
        1
    );
}

// ============================================================================
// Streams
// ============================================================================

#[test]
fn test_stop_clears_stream_handlers() {
    let (provider, mut facade) = authorized();
    let (seen, handler) = recorder::<Location>();

    facade.start_location_updates(Some(handler));
    provider.deliver(vec![fix(1.0, 1.0)]);
    facade.process_events();

    facade.stop_location_updates();
    provider.deliver(vec![fix(2.0, 2.0)]);
    facade.process_events();

    assert_eq!(seen.lock().len(), 1);
    assert_eq!(facade.stream_state(Stream::Location), StreamState::Idle);
    assert_eq!(
        provider.calls(),
        vec![
            ProviderCall::StartLocationUpdates,
            ProviderCall::StopLocationUpdates
        ]
    );
}

#[test]
fn test_deferred_updates_and_failure() {
    let (provider, mut facade) = authorized();
    let errors = record_errors(&mut facade);

    facade.start_deferred_location_updates(500.0, Duration::from_secs(60), None);
    assert_eq!(
        provider.take_calls(),
        vec![ProviderCall::AllowDeferredUpdates {
            distance: 500.0,
            timeout: Duration::from_secs(60)
        }]
    );

    provider.finish_deferred(None);
    provider.finish_deferred(Some(ProviderError::new("platform.location", 11, "deferred failed")));
    facade.process_events();

    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), ErrorKind::DeferredUpdatesFailure);
    assert_eq!(errors[0].code(), 11);

    drop(errors);
    facade.stop_deferred_location_updates();
    assert_eq!(provider.calls(), vec![ProviderCall::DisallowDeferredUpdates]);
}

#[test]
fn test_heading_stream_fires_until_stopped() {
    let (provider, mut facade) = authorized();
    let (seen, handler) = recorder::<Heading>();

    facade.start_heading_updates(Some(handler));
    provider.deliver_heading(Heading::new(10.0, 12.0));
    provider.deliver_heading(Heading::new(20.0, 22.0));
    facade.process_events();
    facade.stop_heading_updates();
    provider.deliver_heading(Heading::new(30.0, 32.0));
    facade.process_events();

    assert_eq!(seen.lock().len(), 2);
    assert_eq!(facade.heading(), Some(Heading::new(30.0, 32.0)));
}

#[test]
fn test_visit_flag_evaluated_on_delivery() {
    let (provider, mut facade) = authorized();
    let (seen, handler) = recorder::<VisitUpdate>();
    let notifications = facade.notifications();

    facade.start_visit_updates(Some(handler));

    let now = Utc::now();
    let ongoing = Visit::new(Coordinate::new(0.0, 0.0), Some(now - ChronoDuration::hours(1)), None);
    let finished = Visit::new(
        Coordinate::new(0.0, 0.0),
        Some(now - ChronoDuration::hours(3)),
        Some(now - ChronoDuration::hours(2)),
    );
    provider.visit(ongoing);
    provider.visit(finished);
    facade.process_events();

    let visiting: Vec<bool> = seen.lock().iter().map(|update| update.visiting).collect();
    assert_eq!(visiting, vec![true, false]);

    let notification = notifications.try_recv().unwrap();
    assert_eq!(notification.name, NotificationName::DidVisit);
    assert_eq!(
        notification.user_info().get(VISITING_KEY).map(String::as_str),
        Some("true")
    );
}

#[test]
fn test_pause_and_resume_dispatch_nothing() {
    let (provider, mut facade) = authorized();
    let notifications = facade.notifications();

    provider.pause();
    provider.resume();

    assert_eq!(facade.process_events(), 2);
    assert!(notifications.try_recv().is_none());
}

#[test]
fn test_generic_failure_reaches_error_one_shot_once() {
    let (provider, mut facade) = authorized();
    let (seen, handler) = recorder::<LocationError>();
    facade.handlers_mut().add_one_shot::<kinds::Error>(handler);

    provider.fail(ProviderError::new("platform.location", 0, "location unknown"));
    provider.fail(ProviderError::new("platform.location", 1, "denied"));
    facade.process_events();

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind(), ErrorKind::ProviderFailure);
    assert_eq!(seen[0].domain(), "platform.location");
    assert!(seen[0].underlying_error().is_some());
}

#[test]
fn test_process_next_event_times_out() {
    let (provider, mut facade) = authorized();

    assert!(!facade.process_next_event(Duration::from_millis(10)));

    provider.pause();
    assert!(facade.process_next_event(Duration::from_millis(10)));
}

#[test]
fn test_events_from_another_thread() {
    let (_provider, mut facade) = authorized();
    let (seen, handler) = recorder::<Location>();
    facade.request_location(Some(handler));

    let sink = facade.sink();
    std::thread::spawn(move || {
        sink.send(locus::ProviderEvent::LocationsUpdated(vec![fix(5.0, 5.0)]));
    })
    .join()
    .unwrap();

    assert!(facade.process_next_event(Duration::from_millis(100)));
    assert_eq!(*seen.lock(), vec![fix(5.0, 5.0)]);
}

// ============================================================================
// Regions
// ============================================================================

#[test]
fn test_request_region_without_regions() {
    let (provider, mut facade) = authorized();
    let errors = record_errors(&mut facade);
    let (seen, handler) = recorder::<RegionUpdate>();

    assert!(!facade.request_region(None, Some(handler)));

    assert!(seen.lock().is_empty());
    assert!(provider.calls().is_empty());
    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), ErrorKind::NoMonitoredRegions);
}

#[test]
fn test_stop_region_updates_without_regions() {
    let (provider, mut facade) = authorized();
    let errors = record_errors(&mut facade);

    assert!(!facade.stop_region_updates(None));

    assert!(provider.calls().is_empty());
    assert_eq!(errors.lock().len(), 1);
}

#[rstest]
#[case(1)]
#[case(3)]
fn test_stop_region_updates_stops_every_region(#[case] count: usize) {
    let (provider, mut facade) = authorized();
    for index in 0..count {
        let region = Region::circular(format!("r{index}"), Coordinate::new(0.0, index as f64), 100.0);
        facade.start_region_updates(region, false, None, None);
    }
    provider.take_calls();

    assert!(facade.stop_region_updates(None));

    assert_eq!(
        provider.count_calls(|call| matches!(call, ProviderCall::StopMonitoring(_))),
        count
    );
    assert!(facade.regions().is_empty());
    assert_eq!(facade.stream_state(Stream::Region), StreamState::Idle);
}

#[test]
fn test_request_region_queries_every_region() {
    let (provider, mut facade) = authorized();
    let home = Region::circular("home", Coordinate::new(0.0, 0.0), 100.0);
    let work = Region::polygon(
        "work",
        vec![
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 2.0),
            Coordinate::new(2.0, 2.0),
        ],
    );
    facade.start_region_updates(home.clone(), false, None, None);
    facade.start_region_updates(work.clone(), false, None, None);
    provider.take_calls();

    let (seen, handler) = recorder::<RegionUpdate>();
    assert!(facade.request_region(None, Some(handler)));
    assert_eq!(
        provider.calls(),
        vec![ProviderCall::RequestState(home.clone()), ProviderCall::RequestState(work)]
    );

    provider.determine_state(&home, RegionState::Inside);
    facade.process_events();
    assert_eq!(*seen.lock(), vec![RegionUpdate::new(home, RegionState::Inside)]);
}

#[test]
fn test_notify_override_applies_to_both_flags() {
    let (provider, mut facade) = authorized();
    let region = Region::circular("quiet", Coordinate::new(0.0, 0.0), 100.0);

    facade.start_region_updates(region, false, Some(false), None);

    let monitored = provider.monitored();
    assert!(!monitored[0].notify_on_entry);
    assert!(!monitored[0].notify_on_exit);
}

#[test]
fn test_oversized_region_takes_authorization_path() {
    let provider = SimulatedProvider::new();
    let mut facade = facade_with(&provider);
    provider.take_calls();
    let region = Region::circular("huge", Coordinate::new(0.0, 0.0), 50_000.0);

    facade.start_region_updates(region, false, None, None);

    assert_eq!(
        provider.calls(),
        vec![ProviderCall::RequestAuthorization(AuthorizationLevel::WhenInUse)]
    );
    assert_eq!(
        facade.stream_state(Stream::Region),
        StreamState::AuthorizationPending
    );
}

#[test]
fn test_region_failure_carries_region() {
    let (provider, mut facade) = authorized();
    let errors = record_errors(&mut facade);
    let region = Region::circular("gym", Coordinate::new(0.0, 0.0), 30.0);

    provider.fail_monitoring(Some(&region), ProviderError::new("platform.location", 5, "failed"));
    facade.process_events();

    assert_eq!(errors.lock()[0].region(), Some(&region));
}

#[test]
fn test_region_events_map_to_states() {
    let (provider, mut facade) = authorized();
    let (seen, handler) = recorder::<RegionUpdate>();
    facade.handlers_mut().add_persistent::<kinds::Region>(handler);
    let region = Region::circular("park", Coordinate::new(0.0, 0.0), 80.0);

    provider.confirm_monitoring(&region);
    provider.enter_region(&region);
    provider.exit_region(&region);
    facade.process_events();

    let states: Vec<RegionState> = seen.lock().iter().map(|update| update.state).collect();
    assert_eq!(
        states,
        vec![RegionState::Unknown, RegionState::Inside, RegionState::Outside]
    );
}

// ============================================================================
// Handlers, settings and teardown
// ============================================================================

#[test]
fn test_cleared_persistent_handlers_stay_silent() {
    let (provider, mut facade) = authorized();
    let log: Seen<&'static str> = Arc::new(Mutex::new(Vec::new()));
    let l = Arc::clone(&log);
    facade
        .handlers_mut()
        .add_persistent::<kinds::Location>(move |_| l.lock().push("persistent"));
    facade.add_delegate(Arc::new(OrderDelegate {
        log: Arc::clone(&log),
    }));

    facade.handlers_mut().clear_persistent(Category::Location);
    provider.deliver(vec![fix(1.0, 1.0)]);
    facade.process_events();

    assert_eq!(*log.lock(), vec!["delegate"]);
}

#[test]
fn test_settings_are_pushed_to_provider() {
    let (provider, mut facade) = authorized();

    facade.set_activity_type(ActivityType::Fitness);
    facade.set_desired_accuracy(Accuracy::HundredMeters);
    facade.set_distance_filter(Some(20.0));
    facade.should_display_heading_calibration(true);
    facade.dismiss_heading_calibration();

    let settings = provider.settings();
    assert_eq!(settings.activity_type, ActivityType::Fitness);
    assert_eq!(settings.desired_accuracy, Accuracy::HundredMeters);
    assert_eq!(settings.distance_filter, Some(20.0));
    assert!(facade.displays_heading_calibration());
    assert_eq!(
        provider.count_calls(|call| matches!(call, ProviderCall::ApplySettings(_))),
        4
    );
    assert_eq!(
        provider.calls().last(),
        Some(&ProviderCall::DismissHeadingCalibration)
    );
}

#[test]
fn test_background_updates_require_support() {
    let provider = SimulatedProvider::with_capabilities(Capabilities {
        background_updates: false,
        ..Default::default()
    });
    let mut facade = facade_with(&provider);
    let errors = record_errors(&mut facade);

    facade.set_background_updates(true);

    assert!(!facade.background_updates());
    assert!(!provider.background_updates());
    assert_eq!(errors.lock()[0].kind(), ErrorKind::CapabilityUnavailable);
}

#[test]
fn test_navigation_config_enables_background_updates() {
    let provider = SimulatedProvider::new();
    let facade = LocationFacade::new(provider.clone(), FacadeConfig::navigation());

    assert!(facade.background_updates());
    assert!(provider.background_updates());
    assert_eq!(provider.settings(), FacadeConfig::navigation().settings);
}

#[test]
fn test_teardown_clears_everything() {
    let provider = SimulatedProvider::new();
    let mut facade = facade_with(&provider);
    let (seen, handler) = recorder::<Location>();
    facade.handlers_mut().add_persistent::<kinds::Location>(handler);
    facade.add_delegate(Arc::new(OrderDelegate {
        log: Arc::new(Mutex::new(Vec::new())),
    }));
    facade.start_location_updates(None);

    facade.teardown();
    provider.grant(AuthorizationStatus::AuthorizedAlways);
    provider.deliver(vec![fix(1.0, 1.0)]);
    facade.process_events();

    assert!(seen.lock().is_empty());
    assert_eq!(facade.handlers().delegate_count(), 0);
    assert_eq!(facade.stream_state(Stream::Location), StreamState::Idle);
    assert_eq!(
        provider.count_calls(|call| *call == ProviderCall::StartLocationUpdates),
        0
    );
}

// ============================================================================
// Batch mapping
// ============================================================================

fn location_strategy() -> impl Strategy<Value = Location> {
    (-90.0..90.0f64, -180.0..180.0f64).prop_map(|(latitude, longitude)| fix(latitude, longitude))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// *For any* batch, batch handlers receive the whole batch and location
    /// handlers receive only its last element, and only when it is non-empty.
    #[test]
    fn prop_batch_then_last(batch in prop::collection::vec(location_strategy(), 0..6)) {
        let (provider, mut facade) = authorized();
        let (latest, latest_handler) = recorder::<Location>();
        let batches: Seen<Vec<Location>> = Arc::new(Mutex::new(Vec::new()));
        let b = Arc::clone(&batches);
        facade.handlers_mut().add_persistent::<kinds::LocationBatch>(move |batch| b.lock().push(batch.to_vec()));
        facade.handlers_mut().add_persistent::<kinds::Location>(latest_handler);

        provider.deliver(batch.clone());
        facade.process_events();

        prop_assert_eq!(batches.lock().clone(), vec![batch.clone()]);
        prop_assert_eq!(latest.lock().clone(), batch.last().cloned().into_iter().collect::<Vec<_>>());
    }
}
