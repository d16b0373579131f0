//! Great-circle distances and per-mode segment estimates.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, in degrees.
//! Distances are kilometres; durations are rounded up to whole seconds.

use std::time::Duration;

use chrono::TimeDelta;
use geo::Coord;
use thiserror::Error;

use crate::TravelMode;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Walking pace every [`TravelMode::speed_factor`] multiplies, in km/h.
pub const BASELINE_SPEED_KMH: f64 = 5.0;

/// Upper bound on a single leg's estimated duration: 366 days, in seconds.
pub const MAX_SEGMENT_SECONDS: i64 = 366 * 24 * 60 * 60;

/// Errors raised for coordinates that cannot be placed on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    /// A component was NaN, infinite or outside the WGS84 range.
    #[error("invalid coordinate (lon {lon}, lat {lat})")]
    InvalidCoordinate {
        /// Offending longitude in degrees.
        lon: f64,
        /// Offending latitude in degrees.
        lat: f64,
    },
}

/// Reject coordinates with non-finite components or out-of-range degrees.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{GeoError, validate_coord};
///
/// assert!(validate_coord(Coord { x: 13.4, y: 52.5 }).is_ok());
/// assert!(matches!(
///     validate_coord(Coord { x: f64::NAN, y: 0.0 }),
///     Err(GeoError::InvalidCoordinate { .. })
/// ));
/// ```
pub fn validate_coord(coord: Coord<f64>) -> Result<Coord<f64>, GeoError> {
    let Coord { x: lon, y: lat } = coord;
    let in_range = lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat);
    if in_range {
        Ok(coord)
    } else {
        Err(GeoError::InvalidCoordinate { lon, lat })
    }
}

/// Great-circle distance between two coordinates in kilometres.
///
/// The haversine terms use absolute deltas so the result does not depend on
/// argument order.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::compute_distance;
///
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 1.0, y: 0.0 };
/// let km = compute_distance(a, b)?;
/// assert!((km - 111.19).abs() < 0.01);
/// assert_eq!(compute_distance(a, a)?, 0.0);
/// # Ok::<(), wayfarer_core::GeoError>(())
/// ```
pub fn compute_distance(a: Coord<f64>, b: Coord<f64>) -> Result<f64, GeoError> {
    let a = validate_coord(a)?;
    let b = validate_coord(b)?;
    let lat_a = a.y.to_radians();
    let lat_b = b.y.to_radians();
    let d_lat = (b.y - a.y).abs().to_radians();
    let d_lon = (b.x - a.x).abs().to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    Ok(2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin())
}

/// Distance, duration and cost of travelling between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentEstimate {
    /// Great-circle distance in kilometres.
    pub distance_km: f64,
    /// Travel time at the mode's effective speed.
    pub duration: TimeDelta,
    /// Monetary cost of the leg.
    pub cost: f64,
}

impl SegmentEstimate {
    /// Estimate with zero distance, duration and cost.
    pub const ZERO: Self = Self {
        distance_km: 0.0,
        duration: TimeDelta::zero(),
        cost: 0.0,
    };
}

/// Converts coordinates into [`SegmentEstimate`]s for a mode.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{ModeKind, SegmentEstimator, TravelMode};
///
/// let estimator = SegmentEstimator::default();
/// let walk = TravelMode::from(ModeKind::Walking);
/// let est = estimator.segment(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.045 }, &walk)?;
/// assert_eq!(est.duration.num_minutes(), 60);
/// assert_eq!(est.cost, 0.0);
/// # Ok::<(), wayfarer_core::GeoError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SegmentEstimator {
    /// Walking speed in km/h that mode speed factors scale.
    pub baseline_speed_kmh: f64,
}

impl Default for SegmentEstimator {
    fn default() -> Self {
        Self {
            baseline_speed_kmh: BASELINE_SPEED_KMH,
        }
    }
}

impl SegmentEstimator {
    /// Create an estimator with a custom baseline speed.
    ///
    /// Non-positive or non-finite speeds fall back to [`BASELINE_SPEED_KMH`].
    pub fn new(baseline_speed_kmh: f64) -> Self {
        if baseline_speed_kmh.is_finite() && baseline_speed_kmh > 0.0 {
            Self { baseline_speed_kmh }
        } else {
            Self::default()
        }
    }

    /// Estimate travel between `from` and `to` using `mode`.
    pub fn segment(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
        mode: &TravelMode,
    ) -> Result<SegmentEstimate, GeoError> {
        let distance_km = compute_distance(from, to)?;
        Ok(self.for_distance(distance_km, mode))
    }

    /// Estimate travel over a known distance.
    pub fn for_distance(&self, distance_km: f64, mode: &TravelMode) -> SegmentEstimate {
        let speed = mode.effective_speed_kmh(self.baseline_speed_kmh);
        SegmentEstimate {
            distance_km,
            duration: duration_for(distance_km, speed),
            cost: distance_km * mode.cost_per_km,
        }
    }
}

/// Estimate a segment with the default walking baseline.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{ModeKind, TravelMode, estimate_segment};
///
/// let taxi = TravelMode::from(ModeKind::Taxi);
/// let est = estimate_segment(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.09 }, &taxi)?;
/// assert!((est.cost - est.distance_km * 2.5).abs() < 1e-9);
/// # Ok::<(), wayfarer_core::GeoError>(())
/// ```
pub fn estimate_segment(
    from: Coord<f64>,
    to: Coord<f64>,
    mode: &TravelMode,
) -> Result<SegmentEstimate, GeoError> {
    SegmentEstimator::default().segment(from, to, mode)
}

fn duration_for(distance_km: f64, speed_kmh: f64) -> TimeDelta {
    if distance_km <= 0.0 || !distance_km.is_finite() {
        return TimeDelta::zero();
    }
    let longest = TimeDelta::seconds(MAX_SEGMENT_SECONDS);
    Duration::try_from_secs_f64((distance_km / speed_kmh * 3600.0).ceil())
        .ok()
        .and_then(|span| TimeDelta::from_std(span).ok())
        .map_or(longest, |span| span.min(longest))
}
