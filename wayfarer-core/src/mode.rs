//! The fixed travel-mode catalog and per-leg mode selection.

use std::fmt;
use std::str::FromStr;

/// Identifier of a catalog travel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ModeKind {
    /// On foot.
    Walking,
    /// Buses, trams and metro.
    PublicTransit,
    /// Taxi or ride-hail.
    Taxi,
    /// Bicycle.
    Bicycle,
    /// Intercity high-speed rail.
    HighSpeedRail,
    /// Scheduled flight.
    Flight,
}

impl ModeKind {
    /// Every mode in catalog order.
    pub const ALL: [Self; 6] = [
        Self::Walking,
        Self::PublicTransit,
        Self::Taxi,
        Self::Bicycle,
        Self::HighSpeedRail,
        Self::Flight,
    ];

    /// Return the identifier as a snake-case `&str`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::PublicTransit => "public_transit",
            Self::Taxi => "taxi",
            Self::Bicycle => "bicycle",
            Self::HighSpeedRail => "high_speed_rail",
            Self::Flight => "flight",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown travel mode '{s}'"))
    }
}

/// A catalog entry describing how a mode moves and what it costs.
///
/// Speed factors multiply the walking baseline. Modes are compared and
/// serialized by their [`ModeKind`] alone.
///
/// # Examples
/// ```
/// use wayfarer_core::{ModeKind, TravelMode};
///
/// let rail = TravelMode::from(ModeKind::HighSpeedRail);
/// assert_eq!(rail.speed_factor, 15.0);
/// assert_eq!(rail.effective_speed_kmh(5.0), 75.0);
/// assert!(rail.is_long_distance());
/// ```
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(into = "ModeKind")
)]
pub struct TravelMode {
    /// Catalog identifier.
    pub kind: ModeKind,
    /// Human-readable label.
    pub name: &'static str,
    /// Multiplier applied to the walking baseline speed.
    pub speed_factor: f64,
    /// Cost per kilometre travelled.
    pub cost_per_km: f64,
    /// Relative carbon footprint from 0 (none) to 1 (highest).
    pub carbon_footprint: f64,
    /// Comfort from 1 (lowest) to 5 (highest).
    pub comfort_rank: u8,
}

impl TravelMode {
    /// The catalog, local modes first.
    pub const CATALOG: [Self; 6] = [
        Self::entry(ModeKind::Walking, "Walking", 1.0, 0.0, 0.0, 3),
        Self::entry(ModeKind::PublicTransit, "Public transit", 3.0, 0.5, 0.3, 2),
        Self::entry(ModeKind::Taxi, "Taxi", 4.0, 2.5, 0.7, 4),
        Self::entry(ModeKind::Bicycle, "Bicycle", 2.0, 0.1, 0.1, 3),
        Self::entry(ModeKind::HighSpeedRail, "High-speed rail", 15.0, 0.5, 0.2, 4),
        Self::entry(ModeKind::Flight, "Flight", 25.0, 1.2, 1.0, 3),
    ];

    const fn entry(
        kind: ModeKind,
        name: &'static str,
        speed_factor: f64,
        cost_per_km: f64,
        carbon_footprint: f64,
        comfort_rank: u8,
    ) -> Self {
        Self {
            kind,
            name,
            speed_factor,
            cost_per_km,
            carbon_footprint,
            comfort_rank,
        }
    }

    /// Look up a catalog entry.
    pub const fn of(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Walking => Self::CATALOG[0],
            ModeKind::PublicTransit => Self::CATALOG[1],
            ModeKind::Taxi => Self::CATALOG[2],
            ModeKind::Bicycle => Self::CATALOG[3],
            ModeKind::HighSpeedRail => Self::CATALOG[4],
            ModeKind::Flight => Self::CATALOG[5],
        }
    }

    /// Modes suited to getting around within a city.
    pub fn local_modes() -> impl Iterator<Item = Self> {
        Self::CATALOG.into_iter().filter(|mode| !mode.is_long_distance())
    }

    /// Modes suited to travel between cities.
    pub fn long_distance_modes() -> impl Iterator<Item = Self> {
        Self::CATALOG.into_iter().filter(Self::is_long_distance)
    }

    /// The mode with the highest speed factor.
    pub const fn fastest() -> Self {
        Self::of(ModeKind::Flight)
    }

    /// Whether the mode is rail or air.
    pub const fn is_long_distance(&self) -> bool {
        matches!(self.kind, ModeKind::HighSpeedRail | ModeKind::Flight)
    }

    /// Whether departures are exposed to road or transit rush hours.
    pub const fn is_traffic_sensitive(&self) -> bool {
        matches!(self.kind, ModeKind::PublicTransit | ModeKind::Taxi)
    }

    /// Cruising speed given a walking baseline in km/h.
    pub fn effective_speed_kmh(&self, baseline_kmh: f64) -> f64 {
        baseline_kmh * self.speed_factor
    }
}

impl Default for TravelMode {
    fn default() -> Self {
        Self::of(ModeKind::Walking)
    }
}

impl From<ModeKind> for TravelMode {
    fn from(kind: ModeKind) -> Self {
        Self::of(kind)
    }
}

// The borrowed `name` would tie a derived impl to `'de: 'static`.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TravelMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <ModeKind as serde::Deserialize>::deserialize(deserializer).map(Self::of)
    }
}

impl From<TravelMode> for ModeKind {
    fn from(mode: TravelMode) -> Self {
        mode.kind
    }
}

impl PartialEq for TravelMode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for TravelMode {}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// How a mode is chosen for each leg of an itinerary.
///
/// # Examples
/// ```
/// use wayfarer_core::{ModeKind, ModeSelection};
///
/// let by_distance = ModeSelection::ByDistance;
/// assert_eq!(by_distance.select(0.8).kind, ModeKind::Walking);
/// assert_eq!(by_distance.select(30.0).kind, ModeKind::PublicTransit);
/// assert_eq!(by_distance.select(1200.0).kind, ModeKind::Flight);
///
/// let fixed = ModeSelection::Fixed(ModeKind::Taxi);
/// assert_eq!(fixed.select(1200.0).kind, ModeKind::Taxi);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ModeSelection {
    /// Use one mode for every leg.
    Fixed(ModeKind),
    /// Pick a mode from the leg's great-circle distance.
    ByDistance,
}

impl ModeSelection {
    const WALK_MAX_KM: f64 = 1.5;
    const BICYCLE_MAX_KM: f64 = 5.0;
    const TRANSIT_MAX_KM: f64 = 50.0;
    const RAIL_MAX_KM: f64 = 800.0;

    /// Mode to use for a leg of `distance_km`.
    pub fn select(&self, distance_km: f64) -> TravelMode {
        let kind = match self {
            Self::Fixed(kind) => *kind,
            Self::ByDistance if distance_km <= Self::WALK_MAX_KM => ModeKind::Walking,
            Self::ByDistance if distance_km <= Self::BICYCLE_MAX_KM => ModeKind::Bicycle,
            Self::ByDistance if distance_km <= Self::TRANSIT_MAX_KM => ModeKind::PublicTransit,
            Self::ByDistance if distance_km <= Self::RAIL_MAX_KM => ModeKind::HighSpeedRail,
            Self::ByDistance => ModeKind::Flight,
        };
        TravelMode::of(kind)
    }
}

impl Default for ModeSelection {
    fn default() -> Self {
        Self::Fixed(ModeKind::Walking)
    }
}

impl From<ModeKind> for ModeSelection {
    fn from(kind: ModeKind) -> Self {
        Self::Fixed(kind)
    }
}
