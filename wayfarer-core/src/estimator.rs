//! Pairwise travel estimates between the start point and candidate stops.
//!
//! The [`TravelEstimator`] trait abstracts how a single leg is priced and
//! timed. [`TravelMatrix`] evaluates it once for every ordered pair of points
//! so optimizers and schedulers can look legs up by index.

use geo::Coord;

use crate::{GeoError, ModeSelection, SegmentEstimate, SegmentEstimator, TravelMode, compute_distance};

/// Estimate distance, duration and cost of a single leg.
///
/// Implementations must be deterministic for a given input and `Send + Sync`
/// so that one estimator can serve several optimizations.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{ModeKind, SegmentEstimator, TravelEstimator, TravelMode};
///
/// let estimator = SegmentEstimator::default();
/// let est = estimator.estimate(
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 0.0, y: 0.0 },
///     &TravelMode::from(ModeKind::Walking),
/// )?;
/// assert_eq!(est.distance_km, 0.0);
/// # Ok::<(), wayfarer_core::GeoError>(())
/// ```
pub trait TravelEstimator: Send + Sync {
    /// Estimate travel from `from` to `to` using `mode`.
    fn estimate(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
        mode: &TravelMode,
    ) -> Result<SegmentEstimate, GeoError>;
}

impl TravelEstimator for SegmentEstimator {
    fn estimate(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
        mode: &TravelMode,
    ) -> Result<SegmentEstimate, GeoError> {
        self.segment(from, to, mode)
    }
}

impl<T: TravelEstimator + ?Sized> TravelEstimator for std::sync::Arc<T> {
    fn estimate(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
        mode: &TravelMode,
    ) -> Result<SegmentEstimate, GeoError> {
        (**self).estimate(from, to, mode)
    }
}

/// A leg between two matrix points with the mode chosen for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    /// Mode used for the leg.
    pub mode: TravelMode,
    /// Estimated distance, duration and cost.
    pub estimate: SegmentEstimate,
}

impl Leg {
    const STAY: Self = Self {
        mode: TravelMode::of(crate::ModeKind::Walking),
        estimate: SegmentEstimate::ZERO,
    };
}

/// Square matrix of [`Leg`]s over a list of points.
///
/// Point `0` is conventionally the trip start and point `i + 1` the `i`th
/// candidate location.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrix {
    size: usize,
    legs: Vec<Leg>,
}

impl TravelMatrix {
    /// Evaluate `estimator` for every ordered pair of `points`.
    ///
    /// The mode for each leg comes from `modes` applied to the leg's
    /// great-circle distance. Diagonal entries are zero-cost stays.
    ///
    /// # Errors
    /// Returns [`GeoError::InvalidCoordinate`] if any point is invalid.
    pub fn build<E>(
        estimator: &E,
        points: &[Coord<f64>],
        modes: ModeSelection,
    ) -> Result<Self, GeoError>
    where
        E: TravelEstimator + ?Sized,
    {
        let size = points.len();
        let mut legs = Vec::with_capacity(size * size);
        for (i, from) in points.iter().enumerate() {
            for (j, to) in points.iter().enumerate() {
                if i == j {
                    crate::validate_coord(*from)?;
                    legs.push(Leg::STAY);
                    continue;
                }
                let mode = modes.select(compute_distance(*from, *to)?);
                let estimate = estimator.estimate(*from, *to, &mode)?;
                legs.push(Leg { mode, estimate });
            }
        }
        log::debug!("built {size}x{size} travel matrix");
        Ok(Self { size, legs })
    }

    /// Number of points on each side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the matrix has no points.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Leg from point `from` to point `to`, if both are in range.
    pub fn leg(&self, from: usize, to: usize) -> Option<&Leg> {
        if from >= self.size || to >= self.size {
            return None;
        }
        self.legs.get(from * self.size + to)
    }
}
