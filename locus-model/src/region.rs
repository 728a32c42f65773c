//! Monitored regions (geofences)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::Coordinate;

/// Geometry of a monitored region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionShape {
    Circular {
        center: Coordinate,
        /// Meters
        radius: f64,
    },
    Polygon { vertices: Vec<Coordinate> },
}

/// Kind of region, used to ask the provider whether it can monitor it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Circular,
    Polygon,
}

/// A region the provider can monitor for entry and exit
///
/// The provider owns the set of monitored regions. A region is identified by
/// its `identifier`: starting to monitor a region with an identifier that is
/// already monitored replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub identifier: String,
    pub shape: RegionShape,
    pub notify_on_entry: bool,
    pub notify_on_exit: bool,
}

impl Region {
    /// Circular region notifying on both entry and exit
    pub fn circular(identifier: impl Into<String>, center: Coordinate, radius: f64) -> Self {
        Self {
            identifier: identifier.into(),
            shape: RegionShape::Circular { center, radius },
            notify_on_entry: true,
            notify_on_exit: true,
        }
    }

    /// Polygonal region notifying on both entry and exit
    pub fn polygon(identifier: impl Into<String>, vertices: Vec<Coordinate>) -> Self {
        Self {
            identifier: identifier.into(),
            shape: RegionShape::Polygon { vertices },
            notify_on_entry: true,
            notify_on_exit: true,
        }
    }

    pub fn kind(&self) -> RegionKind {
        match self.shape {
            RegionShape::Circular { .. } => RegionKind::Circular,
            RegionShape::Polygon { .. } => RegionKind::Polygon,
        }
    }

    /// Radius in meters for circular regions
    pub fn radius(&self) -> Option<f64> {
        match self.shape {
            RegionShape::Circular { radius, .. } => Some(radius),
            RegionShape::Polygon { .. } => None,
        }
    }

    pub fn center(&self) -> Option<Coordinate> {
        match self.shape {
            RegionShape::Circular { center, .. } => Some(center),
            RegionShape::Polygon { .. } => None,
        }
    }

    /// Set both notification flags at once
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify_on_entry = notify;
        self.notify_on_exit = notify;
        self
    }

    /// Same identifier, radius and notification flags, centered on `center`
    ///
    /// Polygonal regions have no center and are returned unchanged.
    pub fn recentered(&self, center: Coordinate) -> Self {
        let shape = match self.shape {
            RegionShape::Circular { radius, .. } => RegionShape::Circular { center, radius },
            RegionShape::Polygon { .. } => self.shape.clone(),
        };
        Self {
            identifier: self.identifier.clone(),
            shape,
            notify_on_entry: self.notify_on_entry,
            notify_on_exit: self.notify_on_exit,
        }
    }

    /// Whether `other` refers to the same monitored region
    pub fn same_identity(&self, other: &Region) -> bool {
        self.identifier == other.identifier && self.kind() == other.kind()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            RegionShape::Circular { center, radius } => {
                write!(f, "{} [circle {} r={}m]", self.identifier, center, radius)
            }
            RegionShape::Polygon { vertices } => {
                write!(f, "{} [polygon {} vertices]", self.identifier, vertices.len())
            }
        }
    }
}

/// Position of the device relative to a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionState {
    Unknown,
    Inside,
    Outside,
}

impl fmt::Display for RegionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Inside => "inside",
            Self::Outside => "outside",
        };
        f.write_str(name)
    }
}

/// Payload of the region category: a region and its state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionUpdate {
    pub region: Region,
    pub state: RegionState,
}

impl RegionUpdate {
    pub fn new(region: Region, state: RegionState) -> Self {
        Self { region, state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recentered_keeps_identity() {
        let region = Region::circular("x", Coordinate::new(0.0, 0.0), 100.0).with_notify(false);
        let moved = region.recentered(Coordinate::new(1.0, 2.0));

        assert_eq!(moved.identifier, "x");
        assert_eq!(moved.radius(), Some(100.0));
        assert_eq!(moved.center(), Some(Coordinate::new(1.0, 2.0)));
        assert!(!moved.notify_on_entry);
        assert!(!moved.notify_on_exit);
        assert!(moved.same_identity(&region));
        assert_ne!(moved, region);
    }

    #[test]
    fn test_polygon_has_no_center() {
        let region = Region::polygon(
            "block",
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.0, 1.0),
                Coordinate::new(1.0, 1.0),
            ],
        );
        assert_eq!(region.kind(), RegionKind::Polygon);
        assert_eq!(region.radius(), None);
        assert_eq!(region.recentered(Coordinate::new(5.0, 5.0)), region);
    }

    #[test]
    fn test_display() {
        let region = Region::circular("home", Coordinate::new(1.0, 2.0), 50.0);
        assert!(region.to_string().starts_with("home [circle"));
        assert_eq!(RegionState::Outside.to_string(), "outside");
    }
}
