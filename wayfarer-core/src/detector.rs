//! Rule-based conflict detection over a finished itinerary.
//!
//! Five rules run in one pass over the active stops (skipped stops are
//! ignored, and the stop before a skipped one becomes the predecessor of the
//! stop after it). Every conflict carries a remediation computed from the
//! size of the violation. Output is sorted by kind, then by stop position, so
//! repeated detection over the same itinerary returns the same list.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use crate::hours::later_by;
use crate::{
    Conflict, ConflictKind, Itinerary, ItineraryStop, LocationId, Magnitude, OpeningHours,
    OpeningHoursError, Remediation, SegmentEstimator, TravelMode, BASELINE_SPEED_KMH,
};

const MONEY_EPSILON: f64 = 1e-9;

/// A daily rush-hour interval `[start, end)`.
///
/// # Examples
/// ```
/// use chrono::NaiveTime;
/// use wayfarer_core::PeakWindow;
///
/// let rush: PeakWindow = "07:30-09:30".parse()?;
/// assert!(rush.contains(NaiveTime::from_hms_opt(8, 15, 0).unwrap()));
/// assert!(!rush.contains(NaiveTime::from_hms_opt(9, 30, 0).unwrap()));
/// # Ok::<(), wayfarer_core::OpeningHoursError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct PeakWindow(OpeningHours);

impl PeakWindow {
    /// Build a window, rejecting `end <= start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, OpeningHoursError> {
        OpeningHours::new(start, end).map(Self)
    }

    /// Start of the window.
    pub fn start(&self) -> NaiveTime {
        self.0.open()
    }

    /// End of the window.
    pub fn end(&self) -> NaiveTime {
        self.0.close()
    }

    /// Whether `time` falls within the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start() <= time && time < self.end()
    }
}

impl fmt::Display for PeakWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PeakWindow {
    type Err = OpeningHoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl TryFrom<String> for PeakWindow {
    type Error = OpeningHoursError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeakWindow> for String {
    fn from(window: PeakWindow) -> Self {
        window.to_string()
    }
}

/// Tunables for [`ConflictDetector`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DetectorConfig {
    /// Rush-hour windows checked by the traffic rule.
    pub peak_hours: Vec<PeakWindow>,
    /// Walking speed used to derive mode speeds, in km/h.
    pub baseline_speed_kmh: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let window = |(sh, sm), (eh, em)| {
            let start = NaiveTime::from_hms_opt(sh, sm, 0)?;
            let end = NaiveTime::from_hms_opt(eh, em, 0)?;
            PeakWindow::new(start, end).ok()
        };
        Self {
            peak_hours: [((7, 30), (9, 30)), ((17, 0), (19, 0))]
                .into_iter()
                .filter_map(|(start, end)| window(start, end))
                .collect(),
            baseline_speed_kmh: BASELINE_SPEED_KMH,
        }
    }
}

/// Scans itineraries for violations.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use wayfarer_core::{ConflictDetector, Itinerary, OptimizationPreference};
///
/// let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let trip = Itinerary::empty(Coord { x: 0.0, y: 0.0 }, start, 0.0, OptimizationPreference::Balanced);
/// assert!(ConflictDetector::default().detect(&trip).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictDetector {
    config: DetectorConfig,
}

/// Detect conflicts with the default configuration.
pub fn detect_conflicts(itinerary: &Itinerary) -> Vec<Conflict> {
    ConflictDetector::default().detect(itinerary)
}

impl ConflictDetector {
    /// Create a detector with `config`.
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Every conflict in `itinerary`, sorted by kind then position.
    pub fn detect(&self, itinerary: &Itinerary) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let mut previous: Option<(&LocationId, NaiveDateTime)> = None;
        let mut spent = 0.0;
        let mut budget_reported = false;
        let total = itinerary.total_cost();

        for (position, stop) in itinerary.stops.iter().enumerate() {
            if !stop.is_active() {
                continue;
            }
            let left_at = previous.map_or(itinerary.start_time, |(_, at)| at);
            let context = StopContext {
                position,
                stop,
                previous: previous.map(|(id, _)| id),
                left_at,
            };
            conflicts.extend(self.time_overlap(&context));
            conflicts.extend(self.distance_infeasibility(&context));
            conflicts.extend(opening_hours(&context));
            conflicts.extend(self.traffic_delay(&context));

            spent += stop.cost_with_inbound();
            if !budget_reported && spent > itinerary.budget + MONEY_EPSILON {
                budget_reported = true;
                conflicts.push(budget_exceeded(&context, total, itinerary.budget));
            }
            previous = Some((stop.location.id(), stop.departure));
        }

        conflicts.sort_by_key(|conflict| (conflict.kind, conflict.position));
        log::debug!(
            "detected {} conflicts over {} stops",
            conflicts.len(),
            itinerary.len()
        );
        conflicts
    }

    fn estimator(&self) -> SegmentEstimator {
        SegmentEstimator::new(self.config.baseline_speed_kmh)
    }

    fn time_overlap(&self, ctx: &StopContext<'_>) -> Option<Conflict> {
        let travel = ctx.travel_time();
        let ready = later_by(ctx.left_at, travel);
        if ctx.stop.arrival >= ready {
            return None;
        }
        let shortfall = ceil_minutes(ready - ctx.stop.arrival);
        let gap = ctx.stop.arrival - ctx.left_at;
        let id = ctx.stop.location.id();
        let remediation = self
            .faster_mode_within(ctx, gap)
            .map(|mode| Remediation::SwapMode {
                stop: id.clone(),
                mode: mode.kind,
            })
            .unwrap_or_else(|| match ctx.previous {
                Some(prev) => Remediation::ShiftEarlier {
                    stop: prev.clone(),
                    minutes: shortfall,
                },
                None => Remediation::ShiftLater {
                    stop: id.clone(),
                    minutes: shortfall,
                },
            });
        Some(Conflict {
            kind: ConflictKind::TimeOverlap,
            severity: ConflictKind::TimeOverlap.severity(),
            description: format!(
                "{} starts {shortfall} minutes before the traveller can arrive",
                ctx.stop.location.name()
            ),
            stops: ctx.involved(),
            position: ctx.position,
            magnitude: Magnitude::Minutes(shortfall),
            remediation,
        })
    }

    /// Slowest catalog mode faster than the current one that covers the leg in `gap`.
    fn faster_mode_within(&self, ctx: &StopContext<'_>, gap: TimeDelta) -> Option<TravelMode> {
        let leg = ctx.stop.inbound.as_ref()?;
        let current = leg.mode().speed_factor;
        let estimator = self.estimator();
        let mut candidates: Vec<TravelMode> = TravelMode::CATALOG
            .into_iter()
            .filter(|mode| mode.speed_factor > current)
            .collect();
        candidates.sort_by(|a, b| a.speed_factor.total_cmp(&b.speed_factor));
        candidates
            .into_iter()
            .find(|mode| estimator.for_distance(leg.distance_km(), mode).duration <= gap)
    }

    fn distance_infeasibility(&self, ctx: &StopContext<'_>) -> Option<Conflict> {
        let leg = ctx.stop.inbound.as_ref()?;
        if leg.distance_km() <= 0.0 {
            return None;
        }
        let gap = ctx.stop.arrival - ctx.left_at;
        let fastest = TravelMode::fastest();
        let needed = self.estimator().for_distance(leg.distance_km(), &fastest).duration;
        if gap >= needed {
            return None;
        }
        let shortfall = ceil_minutes(needed - gap);
        let id = ctx.stop.location.id();
        Some(Conflict {
            kind: ConflictKind::DistanceInfeasibility,
            severity: ConflictKind::DistanceInfeasibility.severity(),
            description: format!(
                "{:.1} km to {} cannot be covered in {} minutes even by {}",
                leg.distance_km(),
                ctx.stop.location.name(),
                gap.num_minutes().max(0),
                fastest.name.to_lowercase()
            ),
            stops: ctx.involved(),
            position: ctx.position,
            magnitude: Magnitude::Minutes(shortfall),
            remediation: Remediation::ShiftLater {
                stop: id.clone(),
                minutes: shortfall,
            },
        })
    }

    fn traffic_delay(&self, ctx: &StopContext<'_>) -> Option<Conflict> {
        let leg = ctx.stop.inbound.as_ref()?;
        if !leg.mode().is_traffic_sensitive() {
            return None;
        }
        let departs = leg.departure();
        let window = self
            .config
            .peak_hours
            .iter()
            .find(|window| window.contains(departs.time()))?;
        let wait = ceil_minutes(departs.date().and_time(window.end()) - departs);
        let id = ctx.stop.location.id();
        Some(Conflict {
            kind: ConflictKind::TrafficDelay,
            severity: ConflictKind::TrafficDelay.severity(),
            description: format!(
                "{} leg into {} departs {} inside rush hour {window}",
                leg.mode(),
                ctx.stop.location.name(),
                departs.format("%H:%M")
            ),
            stops: ctx.involved(),
            position: ctx.position,
            magnitude: Magnitude::Minutes(wait),
            remediation: Remediation::ShiftLater {
                stop: id.clone(),
                minutes: wait,
            },
        })
    }
}

struct StopContext<'a> {
    position: usize,
    stop: &'a ItineraryStop,
    previous: Option<&'a LocationId>,
    left_at: NaiveDateTime,
}

impl StopContext<'_> {
    fn travel_time(&self) -> TimeDelta {
        self.stop
            .inbound
            .as_ref()
            .map_or_else(TimeDelta::zero, |leg| leg.duration())
    }

    fn involved(&self) -> Vec<LocationId> {
        self.previous
            .into_iter()
            .chain(std::iter::once(self.stop.location.id()))
            .cloned()
            .collect()
    }
}

fn opening_hours(ctx: &StopContext<'_>) -> Option<Conflict> {
    let location = &ctx.stop.location;
    let hours = location.opening_hours()?;
    let day = ctx.stop.arrival.date();
    let begins = ctx.stop.arrival.max(hours.opens_on(day));
    let closes_at = hours.closes_on(day);
    let overrun = later_by(begins, location.dwell()) - closes_at;
    if overrun <= TimeDelta::zero() {
        return None;
    }
    let minutes = ceil_minutes(overrun);
    let id = location.id().clone();
    let remediation = if hours.can_accommodate(location.dwell()) {
        Remediation::ShiftEarlier { stop: id, minutes }
    } else {
        Remediation::ShortenVisit {
            stop: id,
            minutes: ceil_minutes(location.dwell() - hours.window()),
        }
    };
    Some(Conflict {
        kind: ConflictKind::OpeningHours,
        severity: ConflictKind::OpeningHours.severity(),
        description: format!(
            "{} is open {hours} but the visit runs {minutes} minutes past closing",
            location.name()
        ),
        stops: vec![location.id().clone()],
        position: ctx.position,
        magnitude: Magnitude::Minutes(minutes),
        remediation,
    })
}

fn budget_exceeded(ctx: &StopContext<'_>, total: f64, budget: f64) -> Conflict {
    let over = total - budget;
    Conflict {
        kind: ConflictKind::BudgetExceeded,
        severity: ConflictKind::BudgetExceeded.severity(),
        description: format!(
            "spending reaches {total:.2} against a budget of {budget:.2}, first passed at {}",
            ctx.stop.location.name()
        ),
        stops: vec![ctx.stop.location.id().clone()],
        position: ctx.position,
        magnitude: Magnitude::Money(over),
        remediation: Remediation::IncreaseBudget { amount: over },
    }
}

fn ceil_minutes(delta: TimeDelta) -> i64 {
    let seconds = delta.num_seconds().max(0);
    (seconds + 59) / 60
}
