//! Test-only utilities for `wayfarer-solver-local`.
//!
//! The helpers in this module are available to unit tests and behavioural
//! tests. They are gated behind the `test-support` feature (and `cfg(test)`).

use chrono::TimeDelta;
use geo::Coord;
use wayfarer_core::test_support::{location, timestamp};
use wayfarer_core::{
    GeoError, Location, ModeSelection, OptimizationPreference, OptimizeRequest, SegmentEstimate,
    TravelEstimator, TravelMode, compute_distance,
};

/// Always-open attraction at (`x`, `y`) with a 30 minute visit.
///
/// # Panics
/// Panics if the coordinate is invalid.
///
/// # Examples
/// ```rust
/// use wayfarer_solver_local::test_support::stop;
///
/// let museum = stop("museum", 0.01, 0.0);
/// assert_eq!(museum.dwell_minutes(), 30);
/// ```
#[must_use]
#[expect(
    clippy::expect_used,
    reason = "test helper fails loudly on invalid fixtures"
)]
pub fn stop(id: &str, x: f64, y: f64) -> Location {
    location(id, x, y)
        .dwell_minutes(30)
        .build()
        .expect("fixture coordinates should be valid")
}

/// Request starting at the origin at 09:00 on foot with a generous budget.
#[must_use]
pub fn request(locations: Vec<Location>, preference: OptimizationPreference) -> OptimizeRequest {
    OptimizeRequest {
        locations,
        start: Coord { x: 0.0, y: 0.0 },
        start_time: timestamp(9, 0),
        modes: ModeSelection::default(),
        preference,
        budget: 1_000.0,
    }
}

/// A [`TravelEstimator`] returning travel times from a fixed matrix.
///
/// Points are matched by exact coordinate. Unknown points are rejected as
/// invalid coordinates. Distances are great-circle and every leg is free.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use wayfarer_core::{ModeKind, TravelEstimator, TravelMode};
/// use wayfarer_solver_local::test_support::FixedMatrixEstimator;
///
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 0.001, y: 0.0 };
/// let estimator = FixedMatrixEstimator::from_minutes(vec![a, b], vec![vec![0, 7], vec![3, 0]]);
/// let leg = estimator.estimate(a, b, &TravelMode::of(ModeKind::Walking)).unwrap();
/// assert_eq!(leg.duration.num_minutes(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct FixedMatrixEstimator {
    points: Vec<Coord<f64>>,
    minutes: Vec<Vec<i64>>,
}

impl FixedMatrixEstimator {
    /// Build from whole minutes; `minutes[i][j]` is the time from `points[i]`
    /// to `points[j]`.
    #[must_use]
    pub const fn from_minutes(points: Vec<Coord<f64>>, minutes: Vec<Vec<i64>>) -> Self {
        Self { points, minutes }
    }

    fn index_of(&self, coord: Coord<f64>) -> Result<usize, GeoError> {
        self.points
            .iter()
            .position(|point| *point == coord)
            .ok_or(GeoError::InvalidCoordinate {
                lon: coord.x,
                lat: coord.y,
            })
    }
}

impl TravelEstimator for FixedMatrixEstimator {
    fn estimate(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
        _mode: &TravelMode,
    ) -> Result<SegmentEstimate, GeoError> {
        let row = self.index_of(from)?;
        let column = self.index_of(to)?;
        let minutes = self
            .minutes
            .get(row)
            .and_then(|cells| cells.get(column))
            .copied()
            .unwrap_or_default();
        Ok(SegmentEstimate {
            distance_km: compute_distance(from, to)?,
            duration: TimeDelta::minutes(minutes),
            cost: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wayfarer_core::ModeKind;

    #[rstest]
    fn reads_matrix_by_point() {
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 0.001, y: 0.0 };
        let estimator =
            FixedMatrixEstimator::from_minutes(vec![a, b], vec![vec![0, 5], vec![9, 0]]);
        let walking = TravelMode::of(ModeKind::Walking);
        let back = estimator.estimate(b, a, &walking).expect("known points");
        assert_eq!(back.duration, TimeDelta::minutes(9));
        assert_eq!(back.cost, 0.0);
    }

    #[rstest]
    fn rejects_unknown_points() {
        let estimator = FixedMatrixEstimator::from_minutes(vec![Coord { x: 0.0, y: 0.0 }], vec![vec![0]]);
        let err = estimator
            .estimate(
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
                &TravelMode::of(ModeKind::Walking),
            )
            .expect_err("unknown destination");
        assert!(matches!(err, GeoError::InvalidCoordinate { .. }));
    }
}
