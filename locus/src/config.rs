//! Configuration types for the locus facade
//!
//! [`FacadeConfig`] controls which authorization level the facade asks for
//! when an operation needs one, and the [`ProviderSettings`] pushed to the
//! provider on construction and on every setter call.

use std::path::Path;

use locus_model::AuthorizationLevel;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Kind of user activity, used by the provider to decide when updates may
/// be paused automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[default]
    Other,
    AutomotiveNavigation,
    Fitness,
    OtherNavigation,
    Airborne,
}

/// Desired accuracy of location updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    BestForNavigation,
    #[default]
    Best,
    NearestTenMeters,
    HundredMeters,
    Kilometer,
    ThreeKilometers,
}

impl Accuracy {
    /// Nominal accuracy in meters, `None` for the best-effort levels
    pub fn meters(self) -> Option<f64> {
        match self {
            Accuracy::BestForNavigation | Accuracy::Best => None,
            Accuracy::NearestTenMeters => Some(10.0),
            Accuracy::HundredMeters => Some(100.0),
            Accuracy::Kilometer => Some(1_000.0),
            Accuracy::ThreeKilometers => Some(3_000.0),
        }
    }
}

/// Physical device orientation headings are referenced to
///
/// `Unknown`, `FaceUp` and `FaceDown` are accepted but ignored by providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceOrientation {
    Unknown,
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
}

/// Provider tuning forwarded through `LocationProvider::apply_settings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Default: [`ActivityType::Other`]
    pub activity_type: ActivityType,

    /// Minimum movement in meters before a new location is reported,
    /// `None` to report every movement
    /// Default: None
    pub distance_filter: Option<f64>,

    /// Default: [`Accuracy::Best`]
    pub desired_accuracy: Accuracy,

    /// Default: true
    pub pauses_automatically: bool,

    /// Minimum heading change in degrees, `None` to report every change
    /// Default: 1 degree
    pub heading_filter: Option<f64>,

    /// Default: [`DeviceOrientation::Portrait`]
    pub heading_orientation: DeviceOrientation,

    /// Whether the provider may show its heading calibration prompt
    /// Default: false
    pub display_heading_calibration: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            activity_type: ActivityType::Other,
            distance_filter: None,
            desired_accuracy: Accuracy::Best,
            pauses_automatically: true,
            heading_filter: Some(1.0),
            heading_orientation: DeviceOrientation::Portrait,
            display_heading_calibration: false,
        }
    }
}

/// Configuration for [`LocationFacade`](crate::LocationFacade)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// Level asked for when an operation finds the application unauthorized
    /// Default: when in use
    pub requested_authorization: AuthorizationLevel,

    pub settings: ProviderSettings,

    /// Request background updates on construction
    /// Default: false
    pub background_updates: bool,
}

impl FacadeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn-by-turn navigation: best accuracy, no pausing, background
    /// updates and `Always` authorization
    pub fn navigation() -> Self {
        Self {
            requested_authorization: AuthorizationLevel::Always,
            settings: ProviderSettings {
                activity_type: ActivityType::AutomotiveNavigation,
                desired_accuracy: Accuracy::BestForNavigation,
                pauses_automatically: false,
                display_heading_calibration: true,
                ..Default::default()
            },
            background_updates: true,
        }
    }

    /// Coarse updates for battery-sensitive applications
    pub fn low_power() -> Self {
        Self {
            settings: ProviderSettings {
                distance_filter: Some(500.0),
                desired_accuracy: Accuracy::Kilometer,
                heading_filter: Some(10.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Parse a JSON document; missing fields take their default values
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(distance) = self.settings.distance_filter {
            if !distance.is_finite() || distance < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "distance_filter must be a non-negative distance, got {distance}"
                )));
            }
        }

        if let Some(degrees) = self.settings.heading_filter {
            if !(0.0..=360.0).contains(&degrees) {
                return Err(ConfigError::Invalid(format!(
                    "heading_filter must be between 0 and 360 degrees, got {degrees}"
                )));
            }
        }

        Ok(())
    }
}
