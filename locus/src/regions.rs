//! Region monitoring and the follow-me state machine
//!
//! With sequential mode armed, every exit from a circular region moves the
//! region to the current position: the old region is stopped and a region
//! with the same identifier, radius and flags is started around the last
//! known fix, carrying over the region handler of the previous one.

use locus_model::{LocationError, Region, RegionState, RegionUpdate};
use locus_registry::{kinds, Category, RegionHandler};

use crate::facade::{LocationFacade, Resume, Stream};
use crate::provider::LocationProvider;

impl<P: LocationProvider> LocationFacade<P> {
    /// Start monitoring `region`
    ///
    /// `notify` overrides both entry and exit flags. Circular regions must
    /// be smaller than [`maximum_region_distance`](Self::maximum_region_distance);
    /// a larger one is handled like a missing authorization. `sequential`
    /// arms follow-me mode for every monitored circular region.
    pub fn start_region_updates(
        &mut self,
        region: Region,
        sequential: bool,
        notify: Option<bool>,
        handler: Option<RegionHandler>,
    ) {
        let region = match notify {
            Some(notify) => region.with_notify(notify),
            None => region,
        };

        let capability = self.provider.region_monitoring_available(region.kind())
            && region.radius().unwrap_or(0.0) < self.provider.maximum_region_distance();

        self.gate(
            capability,
            Resume::RegionUpdates {
                region,
                sequential,
                handler,
            },
        );
    }

    /// Stop monitoring `region`, or every monitored region when `None`
    ///
    /// Returns `false`, after dispatching a `NoMonitoredRegions` error, when
    /// nothing is monitored; a region start still waiting for authorization
    /// is dropped either way. Otherwise disarms sequential mode, clears the
    /// region one-shot handlers and returns `true`.
    pub fn stop_region_updates(&mut self, region: Option<&Region>) -> bool {
        let monitored = self.provider.monitored_regions();
        if monitored.is_empty() {
            self.idle(Stream::Region);
            self.fail(LocationError::no_monitored_regions());
            return false;
        }

        self.sequential = false;
        self.registry.clear_one_shot(Category::Region);

        let remaining = match region {
            Some(region) => {
                self.provider.stop_monitoring(region);
                monitored
                    .iter()
                    .filter(|monitored| !monitored.same_identity(region))
                    .count()
            }
            None => {
                for region in &monitored {
                    self.provider.stop_monitoring(region);
                }
                0
            }
        };

        if remaining == 0 {
            self.idle(Stream::Region);
        }
        tracing::info!(
            "Stopped region updates for {}",
            region.map_or_else(|| "all regions".to_string(), |region| region.to_string())
        );
        true
    }

    /// Ask for the current state of `region`, or of every monitored region
    /// when `None`
    ///
    /// Fails like [`stop_region_updates`](Self::stop_region_updates) when
    /// nothing is monitored. Returns `true` once the request has been issued
    /// or parked for authorization.
    pub fn request_region(&mut self, region: Option<Region>, handler: Option<RegionHandler>) -> bool {
        if self.provider.monitored_regions().is_empty() {
            self.fail(LocationError::no_monitored_regions());
            return false;
        }

        let capability = match &region {
            Some(region) => self.provider.region_monitoring_available(region.kind()),
            None => self
                .provider
                .monitored_regions()
                .iter()
                .all(|monitored| self.provider.region_monitoring_available(monitored.kind())),
        };

        self.gate(capability, Resume::RequestRegion { region, handler });
        true
    }

    /// Dispatch a region update and re-center the region if follow-me
    /// mode asks for it
    pub(crate) fn region_update(&mut self, region: Region, state: RegionState) {
        let update = RegionUpdate::new(region, state);
        self.registry.dispatch::<kinds::Region>(&update);

        if state == RegionState::Outside {
            self.follow(&update.region);
        }
    }

    fn follow(&mut self, region: &Region) {
        if !self.sequential || region.radius().is_none() {
            return;
        }
        let Some(location) = self.provider.location() else {
            tracing::debug!("No known location, {} stays where it is", region.identifier);
            return;
        };

        let mut handlers = self.registry.take_one_shots::<kinds::Region>();
        if !self.stop_region_updates(Some(region)) {
            for handler in handlers {
                self.registry.add_one_shot::<kinds::Region>(handler);
            }
            return;
        }

        let next = region.recentered(location.coordinate);
        tracing::info!("Re-centering region {} on {}", next.identifier, location.coordinate);
        self.start_region_updates(next, true, None, handlers.pop());
    }
}
