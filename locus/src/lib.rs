//! # Locus
//!
//! Sync-first facade over a platform location service. One-shot requests,
//! continuous streams, geofencing, heading and visit detection all feed a
//! single handler registry with seven event categories.
//!
//! ## Quick Start
//!
//! ```rust
//! use locus::simulated::SimulatedProvider;
//! use locus::{FacadeConfig, LocationFacade};
//! use locus_model::{AuthorizationStatus, Coordinate, Location};
//! use locus_registry::kinds;
//!
//! let provider = SimulatedProvider::new();
//! let mut facade = LocationFacade::new(provider.clone(), FacadeConfig::default());
//!
//! // Persistent handler, stays until cleared
//! facade.handlers_mut().add_persistent::<kinds::Location>(|location| {
//!     println!("now at {}", location.coordinate);
//! });
//!
//! // Not authorized yet: the stream waits for the user's answer
//! facade.start_location_updates(None);
//! provider.grant(AuthorizationStatus::AuthorizedWhenInUse);
//! provider.deliver(vec![Location::new(Coordinate::new(35.68, 139.69))]);
//!
//! facade.process_events();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! LocationFacade<P: LocationProvider>
//!     │
//!     ├── provider: P ──────────── attach(EventSink)
//!     │                                   │
//!     ├── events: mpsc::Receiver <────────┘  ProviderEvent
//!     │       │
//!     │       └── handle_event() ── SubscriptionRegistry::dispatch::<K>()
//!     │                                   ├── delegates
//!     │                                   ├── one-shot handlers
//!     │                                   └── persistent handlers
//!     │
//!     └── pending: Vec<Resume>   operations parked for authorization
//! ```

pub mod config;
pub mod error;
mod events;
pub mod facade;
pub mod logging;
pub mod provider;
mod regions;
pub mod simulated;

pub use config::{Accuracy, ActivityType, DeviceOrientation, FacadeConfig, ProviderSettings};
pub use error::{ConfigError, LocusError, Result};
pub use facade::{LocationFacade, Stream, StreamState};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use provider::{EventSink, LocationProvider, ProviderEvent};

pub use locus_model;
pub use locus_registry;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::FacadeConfig;
    pub use crate::facade::{LocationFacade, Stream, StreamState};
    pub use crate::provider::{EventSink, LocationProvider, ProviderEvent};
    pub use locus_model::prelude::*;
    pub use locus_registry::prelude::*;
    pub use locus_registry::{
        AuthorizationHandler, ErrorHandler, HeadingHandler, LocationHandler, LocationsHandler,
        RegionHandler, VisitHandler,
    };
}
