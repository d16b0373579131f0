//! Local-search itinerary optimizer for Wayfarer.
//!
//! This crate provides [`LocalSearchOptimizer`], the default implementation of
//! the [`Optimizer`](wayfarer_core::Optimizer) trait. Ordering stops under
//! opening hours is a travelling-salesman problem with time windows, so the
//! optimizer trades optimality for a bounded running time:
//!
//! 1. A [`TravelMatrix`](wayfarer_core::TravelMatrix) is built once over the
//!    start point and every stop.
//! 2. A nearest-neighbour tour seeds the search, pulling priority stops into
//!    the first half of the day whenever their opening hours allow it.
//! 3. Segment reversals (2-opt) refine the tour until no reversal improves the
//!    objective or the evaluation budget runs out.
//!
//! The objective follows the request's
//! [`OptimizationPreference`](wayfarer_core::OptimizationPreference). Ties keep
//! the ordering closest to the order the traveller supplied.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod objective;
mod seed;
mod solver;
mod two_opt;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use objective::ObjectiveWeights;
pub use solver::{LocalSearchConfig, LocalSearchOptimizer};
