//! The optimizer boundary: requests, errors and the [`Optimizer`] trait.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use geo::Coord;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    GeoError, Itinerary, Location, LocationId, ModeSelection, OptimizationPreference,
    validate_coord,
};

/// Parameters for an optimization run.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use wayfarer_core::{ModeSelection, OptimizationPreference, OptimizeRequest};
///
/// let request = OptimizeRequest {
///     locations: Vec::new(),
///     start: Coord { x: 2.35, y: 48.85 },
///     start_time: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
///     modes: ModeSelection::ByDistance,
///     preference: OptimizationPreference::TimeEfficient,
///     budget: 200.0,
/// };
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizeRequest {
    /// Candidate stops in the traveller's preferred order.
    pub locations: Vec<Location>,
    /// Where the trip begins.
    pub start: Coord<f64>,
    /// When the trip begins.
    pub start_time: NaiveDateTime,
    /// Mode used for each leg.
    #[cfg_attr(feature = "serde", serde(default))]
    pub modes: ModeSelection,
    /// What to minimise.
    #[cfg_attr(feature = "serde", serde(default))]
    pub preference: OptimizationPreference,
    /// Spending ceiling.
    pub budget: f64,
}

/// Reasons an [`OptimizeRequest`] is rejected before optimizing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeRequestValidationError {
    /// The start coordinate is not a valid position.
    #[error("start point is invalid: {0}")]
    InvalidStart(GeoError),
    /// The budget is negative or not finite.
    #[error("budget must be a finite, non-negative amount (got {0})")]
    InvalidBudget(f64),
    /// Two locations share an identifier.
    #[error("location {0} appears more than once")]
    DuplicateLocation(LocationId),
}

impl OptimizeRequest {
    /// Validate the request parameters.
    ///
    /// # Errors
    /// Returns [`OptimizeError::InvalidRequest`] when validation fails.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        self.validate_detailed().map_err(OptimizeError::from)
    }

    /// Validate the request and report which rule failed.
    pub fn validate_detailed(&self) -> Result<(), OptimizeRequestValidationError> {
        validate_coord(self.start).map_err(OptimizeRequestValidationError::InvalidStart)?;
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(OptimizeRequestValidationError::InvalidBudget(self.budget));
        }
        let mut seen = HashSet::with_capacity(self.locations.len());
        for location in &self.locations {
            if !seen.insert(location.id()) {
                return Err(OptimizeRequestValidationError::DuplicateLocation(
                    location.id().clone(),
                ));
            }
        }
        Ok(())
    }

    /// An itinerary with no stops for this request.
    pub fn empty_itinerary(&self) -> Itinerary {
        Itinerary::empty(self.start, self.start_time, self.budget, self.preference)
    }
}

/// Errors returned by [`Optimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// Request parameters were invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] OptimizeRequestValidationError),
    /// A coordinate could not be used for distance estimation.
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),
    /// The run was cancelled; no partial result is returned.
    #[error("optimization cancelled")]
    Cancelled,
}

/// Order stops and time the resulting itinerary.
///
/// Implementations return an empty itinerary for an empty request, poll
/// `cancel` between units of work and return [`OptimizeError::Cancelled`]
/// once it fires. They must be `Send + Sync` so a session can run them on a
/// background thread.
pub trait Optimizer: Send + Sync {
    /// Produce an itinerary for `request`.
    fn optimize(
        &self,
        request: &OptimizeRequest,
        cancel: &CancellationToken,
    ) -> Result<Itinerary, OptimizeError>;
}

impl<T: Optimizer + ?Sized> Optimizer for std::sync::Arc<T> {
    fn optimize(
        &self,
        request: &OptimizeRequest,
        cancel: &CancellationToken,
    ) -> Result<Itinerary, OptimizeError> {
        (**self).optimize(request, cancel)
    }
}
