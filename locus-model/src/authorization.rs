//! Authorization status of the calling application

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current authorization of the application to use location services
///
/// Only [`AuthorizedWhenInUse`](Self::AuthorizedWhenInUse) and
/// [`AuthorizedAlways`](Self::AuthorizedAlways) grant access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// The user has not been asked yet
    NotDetermined,
    /// Access is blocked by policy (parental controls, MDM)
    Restricted,
    /// The user refused access or location services are off
    Denied,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse | Self::AuthorizedAlways)
    }

    /// Whether the user has answered the prompt, either way
    pub fn is_determined(self) -> bool {
        self != Self::NotDetermined
    }

    /// The level a prompt can ask for to reach this status, if any
    pub fn requestable_level(self) -> Option<AuthorizationLevel> {
        match self {
            Self::AuthorizedWhenInUse => Some(AuthorizationLevel::WhenInUse),
            Self::AuthorizedAlways => Some(AuthorizationLevel::Always),
            _ => None,
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotDetermined => "not_determined",
            Self::Restricted => "restricted",
            Self::Denied => "denied",
            Self::AuthorizedWhenInUse => "authorized_when_in_use",
            Self::AuthorizedAlways => "authorized_always",
        };
        f.write_str(name)
    }
}

impl Default for AuthorizationStatus {
    fn default() -> Self {
        Self::NotDetermined
    }
}

/// An authorization level that can be requested from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationLevel {
    WhenInUse,
    Always,
}

impl From<AuthorizationLevel> for AuthorizationStatus {
    fn from(level: AuthorizationLevel) -> Self {
        match level {
            AuthorizationLevel::WhenInUse => AuthorizationStatus::AuthorizedWhenInUse,
            AuthorizationLevel::Always => AuthorizationStatus::AuthorizedAlways,
        }
    }
}

impl Default for AuthorizationLevel {
    fn default() -> Self {
        Self::WhenInUse
    }
}
