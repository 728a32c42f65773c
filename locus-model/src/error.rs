//! Uniform error model for the error category
//!
//! Every failure the facade observes, whether synthesized locally (missing
//! authorization, unavailable capability, no monitored regions) or reported
//! by the provider, is wrapped in a [`LocationError`] and delivered through
//! the error category. None of them is returned from the operation that
//! triggered it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::region::Region;

/// Domain of errors synthesized by locus itself
pub const LOCATION_ERROR_DOMAIN: &str = "locus.location";

/// Classification of a [`LocationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Authorization is missing or cannot be requested
    AuthorizationDenied,
    /// The platform does not offer the capability, or it is misconfigured
    CapabilityUnavailable,
    /// A region operation was issued with no monitored regions
    NoMonitoredRegions,
    /// The provider reported a failure, optionally tied to a region
    ProviderFailure,
    /// The provider could not deliver deferred updates
    DeferredUpdatesFailure,
}

impl ErrorKind {
    /// Code used for errors synthesized in [`LOCATION_ERROR_DOMAIN`]
    pub fn code(self) -> i64 {
        match self {
            ErrorKind::AuthorizationDenied => 1,
            ErrorKind::CapabilityUnavailable => 2,
            ErrorKind::NoMonitoredRegions => 4,
            ErrorKind::ProviderFailure => 5,
            ErrorKind::DeferredUpdatesFailure => 11,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::AuthorizationDenied => "authorization denied",
            ErrorKind::CapabilityUnavailable => "capability unavailable",
            ErrorKind::NoMonitoredRegions => "no monitored regions",
            ErrorKind::ProviderFailure => "provider failure",
            ErrorKind::DeferredUpdatesFailure => "deferred updates failure",
        };
        f.write_str(name)
    }
}

/// Opaque error reported by the positioning provider
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{domain} error {code}: {message}")]
pub struct ProviderError {
    pub domain: String,
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(domain: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: message.into(),
        }
    }
}

/// Error delivered through the error category
///
/// Immutable once built. Provider failures keep the provider's domain and
/// code, and expose the original [`ProviderError`] as their source.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct LocationError {
    kind: ErrorKind,
    domain: String,
    code: i64,
    message: String,
    region: Option<Region>,
    #[source]
    underlying: Option<ProviderError>,
}

impl LocationError {
    fn synthesized(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            domain: LOCATION_ERROR_DOMAIN.to_string(),
            code: kind.code(),
            message: message.into(),
            region: None,
            underlying: None,
        }
    }

    fn wrapping(kind: ErrorKind, error: ProviderError, region: Option<Region>) -> Self {
        Self {
            kind,
            domain: error.domain.clone(),
            code: error.code,
            message: error.message.clone(),
            region,
            underlying: Some(error),
        }
    }

    pub fn authorization_denied() -> Self {
        Self::synthesized(
            ErrorKind::AuthorizationDenied,
            "location data was requested without the user's authorization",
        )
    }

    pub fn capability_unavailable(message: impl Into<String>) -> Self {
        Self::synthesized(ErrorKind::CapabilityUnavailable, message)
    }

    pub fn no_monitored_regions() -> Self {
        Self::synthesized(
            ErrorKind::NoMonitoredRegions,
            "there are no monitored regions",
        )
    }

    /// Wrap a generic provider failure
    pub fn provider(error: ProviderError) -> Self {
        Self::wrapping(ErrorKind::ProviderFailure, error, None)
    }

    /// Wrap a region monitoring failure, keeping the region it concerns
    pub fn region_monitoring(error: ProviderError, region: Option<Region>) -> Self {
        Self::wrapping(ErrorKind::ProviderFailure, error, region)
    }

    pub fn deferred_updates(error: ProviderError) -> Self {
        Self::wrapping(ErrorKind::DeferredUpdatesFailure, error, None)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Region the failure concerns, for region monitoring failures
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn underlying_error(&self) -> Option<&ProviderError> {
        self.underlying.as_ref()
    }
}
