//! Detected itinerary violations and their suggested fixes.

use std::fmt;

use crate::{LocationId, ModeKind};

/// Rule that produced a conflict, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ConflictKind {
    /// A stop starts before the traveller can get there.
    TimeOverlap,
    /// No available mode covers the distance in the time allowed.
    DistanceInfeasibility,
    /// A visit cannot complete inside the opening window.
    OpeningHours,
    /// Spending passes the budget.
    BudgetExceeded,
    /// A road or transit leg departs in rush hour.
    TrafficDelay,
}

impl ConflictKind {
    /// Kebab-case label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TimeOverlap => "time-overlap",
            Self::DistanceInfeasibility => "distance-infeasibility",
            Self::OpeningHours => "opening-hours",
            Self::BudgetExceeded => "budget-exceeded",
            Self::TrafficDelay => "traffic-delay",
        }
    }

    /// Severity of conflicts of this kind.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::TrafficDelay => Severity::Informational,
            _ => Severity::Blocking,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a conflict makes the plan unworkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Severity {
    /// The plan cannot be followed as written.
    Blocking,
    /// Worth knowing; the plan still works.
    Informational,
}

/// Size of a violation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Magnitude {
    /// A shortfall in whole minutes.
    Minutes(i64),
    /// An overspend.
    Money(f64),
}

/// A concrete change that removes a conflict.
///
/// # Examples
/// ```
/// use wayfarer_core::{LocationId, ModeKind, Remediation};
///
/// let fix = Remediation::ShiftEarlier { stop: LocationId::new("louvre"), minutes: 20 };
/// assert_eq!(fix.to_string(), "shift stop louvre earlier by 20 minutes");
///
/// let fix = Remediation::SwapMode { stop: LocationId::new("louvre"), mode: ModeKind::Taxi };
/// assert_eq!(fix.to_string(), "swap mode to taxi for the leg into louvre");
///
/// assert_eq!(Remediation::IncreaseBudget { amount: 50.0 }.to_string(), "increase budget by 50.00");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "action", rename_all = "snake_case")
)]
pub enum Remediation {
    /// Start the stop this many minutes earlier.
    ShiftEarlier {
        /// Stop to move.
        stop: LocationId,
        /// Minutes to move it by.
        minutes: i64,
    },
    /// Start the stop this many minutes later.
    ShiftLater {
        /// Stop to move.
        stop: LocationId,
        /// Minutes to move it by.
        minutes: i64,
    },
    /// Use a faster mode for the leg into the stop.
    SwapMode {
        /// Stop whose inbound leg changes.
        stop: LocationId,
        /// Replacement mode.
        mode: ModeKind,
    },
    /// Shorten the visit so it fits the window.
    ShortenVisit {
        /// Stop to shorten.
        stop: LocationId,
        /// Minutes to cut.
        minutes: i64,
    },
    /// Raise the spending ceiling.
    IncreaseBudget {
        /// Additional money required.
        amount: f64,
    },
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShiftEarlier { stop, minutes } => {
                write!(f, "shift stop {stop} earlier by {minutes} minutes")
            }
            Self::ShiftLater { stop, minutes } => {
                write!(f, "shift stop {stop} later by {minutes} minutes")
            }
            Self::SwapMode { stop, mode } => {
                write!(f, "swap mode to {mode} for the leg into {stop}")
            }
            Self::ShortenVisit { stop, minutes } => {
                write!(f, "shorten the visit to {stop} by {minutes} minutes")
            }
            Self::IncreaseBudget { amount } => write!(f, "increase budget by {amount:.2}"),
        }
    }
}

/// A rule violation found in an itinerary.
///
/// Conflicts are data: they are recomputed for every itinerary and never
/// stop one from being produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conflict {
    /// Rule violated.
    pub kind: ConflictKind,
    /// Whether the plan still works.
    pub severity: Severity,
    /// Human-readable explanation.
    pub description: String,
    /// Stops involved, earliest first.
    pub stops: Vec<LocationId>,
    /// Position of the earliest involved stop.
    pub position: usize,
    /// Size of the violation.
    pub magnitude: Magnitude,
    /// Fix derived from the magnitude.
    pub remediation: Remediation,
}

impl Conflict {
    /// The remediation as display text.
    pub fn suggested_remediation(&self) -> String {
        self.remediation.to_string()
    }

    /// Whether the conflict blocks the plan.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.kind, self.description, self.remediation)
    }
}
