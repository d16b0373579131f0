//! Facade crate for the Wayfarer itinerary engine.
//!
//! This crate re-exports the core domain types, the conflict detector and the
//! itinerary session, and exposes the default optimizer behind a feature flag.

#![forbid(unsafe_code)]

pub use wayfarer_core::{
    CancellationToken, Category, Conflict, ConflictDetector, ConflictKind, DetectorConfig,
    GeoError, Itinerary, ItinerarySession, ItineraryStop, ItinerarySummary, Location,
    LocationBuilder, LocationId, MapRegion, ModeKind, ModeSelection, OpeningHours,
    OptimizationPreference, OptimizeError, OptimizeRequest, Optimizer, Remediation,
    SegmentEstimator, SessionError, SessionSnapshot, Severity, TransportSegment, TravelEstimator,
    TravelMode, VisitStatus, compute_distance, detect_conflicts,
};

#[cfg(feature = "solver-local")]
pub use wayfarer_solver_local::{LocalSearchConfig, LocalSearchOptimizer};
