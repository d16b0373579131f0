//! Opening-hours windows and the visit-timing rules built on them.
//!
//! Windows are same-day intervals `[open, close)`. Windows that would cross
//! midnight are rejected when constructed.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use thiserror::Error;

use crate::Location;

const TIME_FORMAT: &str = "%H:%M";

/// Errors building an [`OpeningHours`] window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpeningHoursError {
    /// The text was not of the form `HH:MM-HH:MM`.
    #[error("malformed opening hours '{0}', expected HH:MM-HH:MM")]
    Malformed(String),
    /// Closing time does not come after opening time on the same day.
    #[error("window {open}-{close} crosses midnight or is empty")]
    CrossesMidnight {
        /// Requested opening time.
        open: NaiveTime,
        /// Requested closing time.
        close: NaiveTime,
    },
}

/// Signals raised while timing a visit.
///
/// These are not fatal: callers decide whether to shorten the visit or flag a
/// conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// The venue closes before the dwell duration elapses.
    #[error("venue closes at {closes_at} before the visit completes ({} min short)", .shortfall.num_minutes())]
    ClosesBeforeDwellComplete {
        /// Closing time on the visit day.
        closes_at: NaiveDateTime,
        /// How much of the dwell does not fit before closing.
        shortfall: TimeDelta,
    },
}

/// Whether a venue can be entered at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Open now.
    Open,
    /// Closed; the next opening instant is given.
    Closed {
        /// Earliest instant at or after the query when the venue opens.
        next_opening: NaiveDateTime,
    },
}

/// A daily opening window.
///
/// # Examples
/// ```
/// use chrono::NaiveTime;
/// use wayfarer_core::OpeningHours;
///
/// let hours: OpeningHours = "09:00-17:30".parse()?;
/// assert_eq!(hours.open(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
/// assert_eq!(hours.to_string(), "09:00-17:30");
/// assert!("22:00-02:00".parse::<OpeningHours>().is_err());
/// # Ok::<(), wayfarer_core::OpeningHoursError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct OpeningHours {
    open: NaiveTime,
    close: NaiveTime,
}

impl OpeningHours {
    /// Construct a window, rejecting `close <= open`.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, OpeningHoursError> {
        if close <= open {
            return Err(OpeningHoursError::CrossesMidnight { open, close });
        }
        Ok(Self { open, close })
    }

    /// Opening time of day.
    pub fn open(&self) -> NaiveTime {
        self.open
    }

    /// Closing time of day.
    pub fn close(&self) -> NaiveTime {
        self.close
    }

    /// Length of the window.
    pub fn window(&self) -> TimeDelta {
        self.close - self.open
    }

    /// Whether a visit of `dwell` fits inside the window at all.
    pub fn can_accommodate(&self, dwell: TimeDelta) -> bool {
        dwell <= self.window()
    }

    /// Opening instant on `date`.
    pub fn opens_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.open)
    }

    /// Closing instant on `date`.
    pub fn closes_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.close)
    }

    /// Whether `at` falls within `[open, close)`.
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        let time = at.time();
        self.open <= time && time < self.close
    }

    /// Earliest instant at or after `at` when the venue is open.
    ///
    /// Before opening this is the same day's opening; after closing it is the
    /// next day's.
    pub fn next_opening(&self, at: NaiveDateTime) -> NaiveDateTime {
        let date = at.date();
        if self.is_open_at(at) {
            at
        } else if at.time() < self.open {
            self.opens_on(date)
        } else {
            date.succ_opt()
                .map_or(NaiveDateTime::MAX, |next| self.opens_on(next))
        }
    }

    /// Availability at `at`.
    pub fn availability(&self, at: NaiveDateTime) -> Availability {
        if self.is_open_at(at) {
            Availability::Open
        } else {
            Availability::Closed {
                next_opening: self.next_opening(at),
            }
        }
    }

    /// Departure after a visit of `dwell` starting at `arrival`.
    ///
    /// Returns [`ConstraintError::ClosesBeforeDwellComplete`] when the visit
    /// would run past the closing time of the arrival day.
    pub fn departure(
        &self,
        arrival: NaiveDateTime,
        dwell: TimeDelta,
    ) -> Result<NaiveDateTime, ConstraintError> {
        let departure = later_by(arrival, dwell);
        let closes_at = self.closes_on(arrival.date());
        if departure > closes_at {
            return Err(ConstraintError::ClosesBeforeDwellComplete {
                closes_at,
                shortfall: departure - closes_at,
            });
        }
        Ok(departure)
    }
}

impl fmt::Display for OpeningHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.open.format(TIME_FORMAT),
            self.close.format(TIME_FORMAT)
        )
    }
}

impl FromStr for OpeningHours {
    type Err = OpeningHoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || OpeningHoursError::Malformed(s.to_owned());
        let (open, close) = s.trim().split_once('-').ok_or_else(malformed)?;
        let open = NaiveTime::parse_from_str(open.trim(), TIME_FORMAT).map_err(|_| malformed())?;
        let close =
            NaiveTime::parse_from_str(close.trim(), TIME_FORMAT).map_err(|_| malformed())?;
        Self::new(open, close)
    }
}

impl TryFrom<String> for OpeningHours {
    type Error = OpeningHoursError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OpeningHours> for String {
    fn from(hours: OpeningHours) -> Self {
        hours.to_string()
    }
}

/// Departure from `location` for a visit beginning at `arrival`.
///
/// Locations without opening hours never signal a constraint.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use wayfarer_core::{ConstraintError, Location, departure_time};
///
/// let museum = Location::builder("museum", "Museum", Coord { x: 0.0, y: 0.0 })
///     .dwell_minutes(90)
///     .opening_hours("09:00-10:00".parse()?)
///     .build()?;
/// let arrival = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let err = departure_time(&museum, arrival).unwrap_err();
/// assert!(matches!(err, ConstraintError::ClosesBeforeDwellComplete { .. }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn departure_time(
    location: &Location,
    arrival: NaiveDateTime,
) -> Result<NaiveDateTime, ConstraintError> {
    match location.opening_hours() {
        Some(hours) => hours.departure(arrival, location.dwell()),
        None => Ok(later_by(arrival, location.dwell())),
    }
}

/// `at + by`, pinned to [`NaiveDateTime::MAX`] instead of overflowing.
pub(crate) fn later_by(at: NaiveDateTime, by: TimeDelta) -> NaiveDateTime {
    at.checked_add_signed(by).unwrap_or(NaiveDateTime::MAX)
}
