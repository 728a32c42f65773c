//! # Locus Model
//!
//! Passive data types shared by the locus crates: positions, headings,
//! monitored regions, visits, authorization status and the uniform
//! [`LocationError`] delivered through the error channel.
//!
//! Nothing in this crate talks to a positioning service. Values are produced
//! by a provider implementation and consumed by handlers registered with
//! `locus-registry`.
//!
//! ```rust
//! use locus_model::{Coordinate, Region, RegionShape};
//!
//! let home = Region::circular("home", Coordinate::new(40.4168, -3.7038), 150.0);
//! assert!(matches!(home.shape, RegionShape::Circular { .. }));
//!
//! // Follow-me regions are rebuilt around the latest position
//! let moved = home.recentered(Coordinate::new(40.42, -3.70));
//! assert_eq!(moved.identifier, "home");
//! assert_eq!(moved.radius(), Some(150.0));
//! ```

pub mod authorization;
pub mod error;
pub mod location;
pub mod region;
pub mod visit;

pub use authorization::{AuthorizationLevel, AuthorizationStatus};
pub use error::{ErrorKind, LocationError, ProviderError, LOCATION_ERROR_DOMAIN};
pub use location::{Coordinate, Heading, Location};
pub use region::{Region, RegionKind, RegionShape, RegionState, RegionUpdate};
pub use visit::{Visit, VisitUpdate};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AuthorizationLevel, AuthorizationStatus, Coordinate, ErrorKind, Heading, Location,
        LocationError, ProviderError, Region, RegionKind, RegionShape, RegionState, RegionUpdate,
        Visit, VisitUpdate,
    };
}
