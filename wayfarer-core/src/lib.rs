//! Core domain types and planning rules for the Wayfarer itinerary engine.
//!
//! The crate models travel locations, transport modes and itineraries, and
//! provides the pure building blocks the optimizer and the presentation layer
//! share:
//!
//! - [`compute_distance`] and [`SegmentEstimator`] turn coordinates into
//!   great-circle distances, durations and costs for a [`TravelMode`].
//! - [`OpeningHours`] answers whether a venue is open on arrival and when a
//!   visit must end.
//! - [`Scheduler`] assigns arrival and departure timestamps to an ordered
//!   visiting sequence.
//! - [`ConflictDetector`] scans an [`Itinerary`] for rule violations and
//!   attaches a deterministic [`Remediation`] to each one.
//! - [`ItinerarySession`] holds the editable stop list and always hands out
//!   an itinerary together with its matching conflicts.
//!
//! Route ordering itself is delegated to an [`Optimizer`] implementation,
//! such as the local-search optimizer in `wayfarer-solver-local`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod category;
mod conflict;
mod detector;
mod distance;
mod estimator;
mod hours;
mod itinerary;
mod location;
mod mode;
mod optimizer;
mod provider;
mod schedule;
mod session;
mod summary;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use category::Category;
pub use conflict::{Conflict, ConflictKind, Magnitude, Remediation, Severity};
pub use detector::{ConflictDetector, DetectorConfig, PeakWindow, detect_conflicts};
pub use distance::{
    BASELINE_SPEED_KMH, EARTH_RADIUS_KM, GeoError, MAX_SEGMENT_SECONDS, SegmentEstimate,
    SegmentEstimator, compute_distance, estimate_segment, validate_coord,
};
pub use estimator::{Leg, TravelEstimator, TravelMatrix};
pub use hours::{Availability, ConstraintError, OpeningHours, OpeningHoursError, departure_time};
pub use itinerary::{
    Itinerary, ItineraryError, ItineraryStop, OptimizationPreference, ScheduleFlag,
    TransportSegment, VisitStatus,
};
pub use location::{Location, LocationBuilder, LocationError, LocationId, MAX_DWELL_MINUTES};
pub use mode::{ModeKind, ModeSelection, TravelMode};
pub use optimizer::{OptimizeError, OptimizeRequest, OptimizeRequestValidationError, Optimizer};
pub use provider::{LocationProvider, LocationStyle, StyleHint};
pub use schedule::{PlannedVisit, Scheduler, Timeline, TimelineEntry, plan_visit};
pub use session::{ItinerarySession, OptimizeJob, OptimizeOutcome, SessionError, SessionSnapshot};
pub use summary::{ItinerarySummary, MapRegion};

/// Cooperative cancellation token accepted by [`Optimizer::optimize`].
pub use tokio_util::sync::CancellationToken;
