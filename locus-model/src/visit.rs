//! Visits: places where the device stayed for a while

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Coordinate;

/// A visit detected by the provider
///
/// A missing `arrival` means the arrival was not observed; a missing
/// `departure` means the device has not left yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub coordinate: Coordinate,
    pub horizontal_accuracy: f64,
    pub arrival: Option<DateTime<Utc>>,
    pub departure: Option<DateTime<Utc>>,
}

impl Visit {
    pub fn new(
        coordinate: Coordinate,
        arrival: Option<DateTime<Utc>>,
        departure: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            coordinate,
            horizontal_accuracy: 0.0,
            arrival,
            departure,
        }
    }

    /// Whether `now` falls strictly between arrival and departure
    pub fn is_visiting_at(&self, now: DateTime<Utc>) -> bool {
        let arrived = self.arrival.map_or(true, |arrival| arrival < now);
        let not_departed = self.departure.map_or(true, |departure| departure > now);
        arrived && not_departed
    }
}

/// Payload of the visit category
///
/// `visiting` is computed when the visit is dispatched and is not stored by
/// the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitUpdate {
    pub visit: Visit,
    pub visiting: bool,
}

impl VisitUpdate {
    /// Evaluate the visiting flag against `now`
    pub fn at(visit: Visit, now: DateTime<Utc>) -> Self {
        let visiting = visit.is_visiting_at(now);
        Self { visit, visiting }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn origin() -> Coordinate {
        Coordinate::new(0.0, 0.0)
    }

    #[test]
    fn test_visiting_between_arrival_and_departure() {
        let now = Utc::now();
        let visit = Visit::new(
            origin(),
            Some(now - Duration::minutes(10)),
            Some(now + Duration::minutes(10)),
        );
        assert!(VisitUpdate::at(visit, now).visiting);
    }

    #[test]
    fn test_not_visiting_after_departure() {
        let now = Utc::now();
        let visit = Visit::new(
            origin(),
            Some(now - Duration::hours(2)),
            Some(now - Duration::hours(1)),
        );
        assert!(!visit.is_visiting_at(now));
    }

    #[test]
    fn test_open_ended_visit() {
        let now = Utc::now();
        let arrived = Visit::new(origin(), Some(now - Duration::minutes(5)), None);
        assert!(arrived.is_visiting_at(now));

        let future = Visit::new(origin(), Some(now + Duration::minutes(5)), None);
        assert!(!future.is_visiting_at(now));
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let now = Utc::now();
        let visit = Visit::new(origin(), Some(now), Some(now + Duration::minutes(1)));
        assert!(!visit.is_visiting_at(now));
    }
}
