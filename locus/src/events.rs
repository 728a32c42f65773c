//! Provider callbacks to registry dispatches
//!
//! | Provider event              | Dispatched as                                   |
//! |-----------------------------|-------------------------------------------------|
//! | `LocationsUpdated(batch)`   | `LocationBatch(batch)`, then `Location(last)`   |
//! | `HeadingUpdated`            | `Heading`                                       |
//! | `RegionStateDetermined`     | `Region` with the reported state                |
//! | `RegionEntered`             | `Region` / `Inside`                             |
//! | `RegionExited`              | `Region` / `Outside`                            |
//! | `MonitoringStarted`         | `Region` / `Unknown`                            |
//! | `Failed`, `MonitoringFailed`| `Error` (provider failure)                      |
//! | `DeferredUpdatesFinished`   | `Error` (deferred failure) when it carries one  |
//! | `AuthorizationChanged`      | `Authorization`, then parked operations resume  |
//!
//! Parked operations resume only after the whole `Authorization` dispatch,
//! persistent handlers included, so every authorization handler observes
//! the provider before the resumed primitives are invoked.
//! | `Visited`                   | `Visit` with `visiting` evaluated now           |
//! | `UpdatesPaused` / `Resumed` | nothing                                         |

use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use chrono::Utc;
use locus_model::{LocationError, RegionState, VisitUpdate};
use locus_registry::kinds;

use crate::facade::LocationFacade;
use crate::provider::{LocationProvider, ProviderEvent};

impl<P: LocationProvider> LocationFacade<P> {
    /// Handle every queued provider event without blocking
    ///
    /// Returns how many events were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait up to `timeout` for one provider event and handle it
    ///
    /// Returns `false` if nothing arrived in time.
    pub fn process_next_event(&mut self, timeout: Duration) -> bool {
        match self.events.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            // The facade holds a sender itself, so the queue never closes
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Classify one provider event and dispatch it
    ///
    /// On `AuthorizationChanged`, operations parked for authorization run
    /// after delegates, one-shot and persistent authorization handlers.
    pub fn handle_event(&mut self, event: ProviderEvent) {
        tracing::trace!("Provider event: {:?}", event);

        match event {
            ProviderEvent::LocationsUpdated(locations) => {
                self.registry.dispatch::<kinds::LocationBatch>(&locations);
                if let Some(last) = locations.last() {
                    self.registry.dispatch::<kinds::Location>(last);
                }
            }
            ProviderEvent::HeadingUpdated(heading) => {
                self.registry.dispatch::<kinds::Heading>(&heading);
            }
            ProviderEvent::RegionStateDetermined { region, state } => {
                self.region_update(region, state);
            }
            ProviderEvent::RegionEntered(region) => {
                self.region_update(region, RegionState::Inside);
            }
            ProviderEvent::RegionExited(region) => {
                self.region_update(region, RegionState::Outside);
            }
            ProviderEvent::MonitoringStarted(region) => {
                self.region_update(region, RegionState::Unknown);
            }
            ProviderEvent::Failed(error) => {
                self.fail(LocationError::provider(error));
            }
            ProviderEvent::MonitoringFailed { region, error } => {
                self.fail(LocationError::region_monitoring(error, region));
            }
            ProviderEvent::DeferredUpdatesFinished(Some(error)) => {
                self.fail(LocationError::deferred_updates(error));
            }
            ProviderEvent::DeferredUpdatesFinished(None) => {
                tracing::debug!("Deferred updates finished");
            }
            ProviderEvent::AuthorizationChanged(status) => {
                tracing::info!("Authorization changed to {}", status);
                self.registry.dispatch::<kinds::Authorization>(&status);
                self.resume_pending(status);
            }
            ProviderEvent::Visited(visit) => {
                let update = VisitUpdate::at(visit, Utc::now());
                self.registry.dispatch::<kinds::Visit>(&update);
            }
            ProviderEvent::UpdatesPaused => {
                tracing::info!("Location updates paused by the provider");
            }
            ProviderEvent::UpdatesResumed => {
                tracing::info!("Location updates resumed by the provider");
            }
        }
    }
}
