//! Positions and headings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the WGS 84 ellipsoid, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are inside their valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A position fix reported by the provider
///
/// Negative accuracies, course or speed mean the provider could not
/// determine that component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub coordinate: Coordinate,
    /// Meters above sea level
    pub altitude: f64,
    /// Radius of uncertainty in meters
    pub horizontal_accuracy: f64,
    pub vertical_accuracy: f64,
    /// Degrees relative to true north
    pub course: f64,
    /// Meters per second
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
}

impl Location {
    /// Create a fix at `coordinate` timestamped now, with unknown
    /// altitude, course and speed
    pub fn new(coordinate: Coordinate) -> Self {
        Self::at(coordinate, Utc::now())
    }

    /// Create a fix with an explicit timestamp
    pub fn at(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            altitude: 0.0,
            horizontal_accuracy: 0.0,
            vertical_accuracy: -1.0,
            course: -1.0,
            speed: -1.0,
            timestamp,
        }
    }

    pub fn with_accuracy(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_accuracy = horizontal;
        self.vertical_accuracy = vertical;
        self
    }

    pub fn with_motion(mut self, course: f64, speed: f64) -> Self {
        self.course = course;
        self.speed = speed;
        self
    }

    /// Whether the horizontal position is usable
    pub fn has_valid_position(&self) -> bool {
        self.horizontal_accuracy >= 0.0 && self.coordinate.is_valid()
    }
}

/// A compass reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Degrees relative to magnetic north
    pub magnetic_heading: f64,
    /// Degrees relative to true north, negative when invalid
    pub true_heading: f64,
    /// Maximum deviation in degrees, negative when invalid
    pub heading_accuracy: f64,
    pub timestamp: DateTime<Utc>,
}

impl Heading {
    pub fn new(magnetic_heading: f64, true_heading: f64) -> Self {
        Self {
            magnetic_heading,
            true_heading,
            heading_accuracy: 0.0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.heading_accuracy = accuracy;
        self
    }

    pub fn is_calibrated(&self) -> bool {
        self.heading_accuracy >= 0.0
    }
}
