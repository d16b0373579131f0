//! Places a traveller can visit.

use std::fmt;

use chrono::TimeDelta;
use geo::Coord;
use thiserror::Error;

use crate::{Category, GeoError, OpeningHours, validate_coord};

/// Stable identifier of a [`Location`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct LocationId(String);

impl LocationId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LocationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Longest dwell a location may ask for: one week.
pub const MAX_DWELL_MINUTES: u32 = 7 * 24 * 60;

/// Errors raised by [`LocationBuilder::build`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// The identifier was empty or whitespace.
    #[error("location id must not be empty")]
    EmptyId,
    /// The coordinate is not a valid WGS84 position.
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),
    /// Dwell duration must be at least one minute.
    #[error("location {0} has zero dwell duration")]
    ZeroDwell(LocationId),
    /// Dwell duration exceeds [`MAX_DWELL_MINUTES`].
    #[error("location {id} dwell of {minutes} minutes exceeds {MAX_DWELL_MINUTES}")]
    DwellTooLong {
        /// Location carrying the dwell.
        id: LocationId,
        /// Requested dwell in minutes.
        minutes: u32,
    },
    /// Cost must be finite and non-negative.
    #[error("location {id} has invalid cost {cost}")]
    InvalidCost {
        /// Location carrying the cost.
        id: LocationId,
        /// Offending value.
        cost: f64,
    },
}

/// A place to visit together with its visiting constraints.
///
/// Locations are immutable once built; edit one by building a replacement.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{Category, Location};
///
/// let cafe = Location::builder("cafe", "Corner Cafe", Coord { x: -0.12, y: 51.5 })
///     .category(Category::Restaurant)
///     .dwell_minutes(45)
///     .cost(12.5)
///     .build()?;
/// assert_eq!(cafe.dwell().num_minutes(), 45);
/// assert!(!cafe.is_priority());
/// # Ok::<(), wayfarer_core::LocationError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "LocationBuilder", into = "LocationBuilder")
)]
pub struct Location {
    id: LocationId,
    name: String,
    coord: Coord<f64>,
    category: Category,
    dwell_minutes: u32,
    opening_hours: Option<OpeningHours>,
    notes: String,
    cost: f64,
    priority: bool,
}

impl Location {
    /// Start building a location with a one-hour dwell.
    pub fn builder(
        id: impl Into<LocationId>,
        name: impl Into<String>,
        coord: Coord<f64>,
    ) -> LocationBuilder {
        LocationBuilder::new(id, name, coord)
    }

    /// Identifier.
    pub fn id(&self) -> &LocationId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position (`x = longitude`, `y = latitude`).
    pub fn coord(&self) -> Coord<f64> {
        self.coord
    }

    /// Category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Expected visit length in minutes.
    pub fn dwell_minutes(&self) -> u32 {
        self.dwell_minutes
    }

    /// Expected visit length.
    pub fn dwell(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.dwell_minutes))
    }

    /// Daily opening window; `None` means always open.
    pub fn opening_hours(&self) -> Option<&OpeningHours> {
        self.opening_hours.as_ref()
    }

    /// Free-text notes.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Admission or spend at the location.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Whether the traveller marked this location as a must-see.
    pub fn is_priority(&self) -> bool {
        self.priority
    }

    /// Builder pre-filled with this location, for producing a replacement.
    pub fn to_builder(&self) -> LocationBuilder {
        LocationBuilder::from(self.clone())
    }
}

/// Validating builder for [`Location`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationBuilder {
    id: LocationId,
    name: String,
    coord: Coord<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    category: Category,
    #[cfg_attr(feature = "serde", serde(default = "default_dwell"))]
    dwell_minutes: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    opening_hours: Option<OpeningHours>,
    #[cfg_attr(feature = "serde", serde(default))]
    notes: String,
    #[cfg_attr(feature = "serde", serde(default))]
    cost: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    priority: bool,
}

const DEFAULT_DWELL_MINUTES: u32 = 60;

#[cfg(feature = "serde")]
fn default_dwell() -> u32 {
    DEFAULT_DWELL_MINUTES
}

impl LocationBuilder {
    /// Begin a builder with required fields.
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>, coord: Coord<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coord,
            category: Category::default(),
            dwell_minutes: DEFAULT_DWELL_MINUTES,
            opening_hours: None,
            notes: String::new(),
            cost: 0.0,
            priority: false,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the coordinate.
    #[must_use]
    pub fn coord(mut self, coord: Coord<f64>) -> Self {
        self.coord = coord;
        self
    }

    /// Set the category.
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the dwell duration in minutes.
    #[must_use]
    pub fn dwell_minutes(mut self, minutes: u32) -> Self {
        self.dwell_minutes = minutes;
        self
    }

    /// Restrict visits to a daily window.
    #[must_use]
    pub fn opening_hours(mut self, hours: OpeningHours) -> Self {
        self.opening_hours = Some(hours);
        self
    }

    /// Mark the location as always open.
    #[must_use]
    pub fn always_open(mut self) -> Self {
        self.opening_hours = None;
        self
    }

    /// Attach notes.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Set the cost.
    #[must_use]
    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Set the priority flag.
    #[must_use]
    pub fn priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// Validate and produce the location.
    pub fn build(self) -> Result<Location, LocationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(LocationError::EmptyId);
        }
        let coord = validate_coord(self.coord)?;
        if self.dwell_minutes == 0 {
            return Err(LocationError::ZeroDwell(self.id));
        }
        if self.dwell_minutes > MAX_DWELL_MINUTES {
            return Err(LocationError::DwellTooLong {
                id: self.id,
                minutes: self.dwell_minutes,
            });
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(LocationError::InvalidCost {
                id: self.id,
                cost: self.cost,
            });
        }
        Ok(Location {
            id: self.id,
            name: self.name,
            coord,
            category: self.category,
            dwell_minutes: self.dwell_minutes,
            opening_hours: self.opening_hours,
            notes: self.notes,
            cost: self.cost,
            priority: self.priority,
        })
    }
}

impl From<Location> for LocationBuilder {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            name: location.name,
            coord: location.coord,
            category: location.category,
            dwell_minutes: location.dwell_minutes,
            opening_hours: location.opening_hours,
            notes: location.notes,
            cost: location.cost,
            priority: location.priority,
        }
    }
}

impl TryFrom<LocationBuilder> for Location {
    type Error = LocationError;

    fn try_from(builder: LocationBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn origin() -> Coord<f64> {
        Coord { x: 0.0, y: 0.0 }
    }

    #[rstest]
    fn builds_with_defaults() {
        let location = Location::builder("a", "A", origin()).build().expect("valid");
        assert_eq!(location.dwell_minutes(), 60);
        assert_eq!(location.category(), Category::Other);
        assert!(location.opening_hours().is_none());
        assert_eq!(location.cost(), 0.0);
    }

    #[rstest]
    fn rejects_zero_dwell() {
        let err = Location::builder("a", "A", origin())
            .dwell_minutes(0)
            .build()
            .expect_err("zero dwell");
        assert_eq!(err, LocationError::ZeroDwell(LocationId::new("a")));
    }

    #[rstest]
    #[case(MAX_DWELL_MINUTES + 1)]
    #[case(u32::MAX)]
    fn rejects_dwell_beyond_a_week(#[case] minutes: u32) {
        let err = Location::builder("a", "A", origin())
            .dwell_minutes(minutes)
            .build()
            .expect_err("dwell too long");
        assert_eq!(
            err,
            LocationError::DwellTooLong {
                id: LocationId::new("a"),
                minutes,
            }
        );
        let week = Location::builder("a", "A", origin())
            .dwell_minutes(MAX_DWELL_MINUTES)
            .build();
        assert!(week.is_ok());
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_bad_cost(#[case] cost: f64) {
        let err = Location::builder("a", "A", origin())
            .cost(cost)
            .build()
            .expect_err("bad cost");
        assert!(matches!(err, LocationError::InvalidCost { .. }));
    }

    #[rstest]
    fn rejects_empty_id() {
        let err = Location::builder("  ", "A", origin())
            .build()
            .expect_err("empty id");
        assert_eq!(err, LocationError::EmptyId);
    }

    #[rstest]
    fn rejects_invalid_coordinate() {
        let err = Location::builder("a", "A", Coord { x: 0.0, y: 95.0 })
            .build()
            .expect_err("bad latitude");
        assert!(matches!(err, LocationError::InvalidCoordinate(_)));
    }

    #[rstest]
    fn replacement_keeps_unchanged_fields() {
        let original = Location::builder("a", "A", origin())
            .priority(true)
            .cost(4.0)
            .build()
            .expect("valid");
        let replaced = original.to_builder().name("Renamed").build().expect("valid");
        assert_eq!(replaced.name(), "Renamed");
        assert!(replaced.is_priority());
        assert_eq!(replaced.cost(), 4.0);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserializes_with_defaults_and_validates() {
        let json = r#"{"id":"tower","name":"Tower","coord":{"x":-0.07,"y":51.5},"opening_hours":"09:00-17:30","priority":true}"#;
        let location: Location = serde_json::from_str(json).expect("valid json");
        assert_eq!(location.dwell_minutes(), 60);
        assert!(location.is_priority());
        assert_eq!(
            location.opening_hours().map(ToString::to_string).as_deref(),
            Some("09:00-17:30")
        );

        let bad = r#"{"id":"x","name":"X","coord":{"x":0.0,"y":0.0},"dwell_minutes":0}"#;
        assert!(serde_json::from_str::<Location>(bad).is_err());
    }
}
