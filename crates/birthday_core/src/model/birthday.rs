//! Birthday domain model.
//!
//! # Responsibility
//! - Define the canonical birthday record and its calendar kind.
//! - Validate records before they reach storage or resolution.
//! - Parse user-facing `MM-DD` and calendar name inputs.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - `name` is non-empty after trimming.
//! - `leap_month` is `false` whenever `calendar == CalendarKind::Solar`.
//! - Empty notes are stored as `None`.

use crate::calendar::{BirthdayDescriptor, CalendarError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

static MONTH_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2})-(\d{1,2})\s*$").expect("valid month-day regex"));

/// Stable identifier of a birthday record.
pub type RecordId = Uuid;

/// Calendar a birthday is recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    /// Gregorian calendar.
    Solar,
    /// Traditional Chinese lunisolar calendar.
    Lunar,
}

impl CalendarKind {
    /// Stable string id used in storage and wire formats.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::Lunar => "lunar",
        }
    }

    /// Short label for display (`阳历` / `农历`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Solar => "阳历",
            Self::Lunar => "农历",
        }
    }
}

impl FromStr for CalendarKind {
    type Err = BirthdayValidationError;

    /// Accepts `solar|gregorian|阳历|公历` and `lunar|农历|阴历`, case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "solar" | "gregorian" | "阳历" | "公历" => Ok(Self::Solar),
            "lunar" | "农历" | "阴历" => Ok(Self::Lunar),
            other => Err(BirthdayValidationError::UnknownCalendar(other.to_string())),
        }
    }
}

/// Record-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthdayValidationError {
    NilId,
    EmptyName,
    UnknownCalendar(String),
    MalformedMonthDay(String),
    Date(CalendarError),
}

impl Display for BirthdayValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "birthday id must not be nil"),
            Self::EmptyName => write!(f, "birthday name must not be empty"),
            Self::UnknownCalendar(value) => {
                write!(f, "unknown calendar `{value}`; expected solar|lunar")
            }
            Self::MalformedMonthDay(value) => {
                write!(f, "date must be formatted as MM-DD, got `{value}`")
            }
            Self::Date(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BirthdayValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Date(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CalendarError> for BirthdayValidationError {
    fn from(value: CalendarError) -> Self {
        Self::Date(value)
    }
}

/// Canonical birthday record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BirthdayRecordWire")]
pub struct BirthdayRecord {
    /// Stable ID assigned at creation.
    pub id: RecordId,
    /// Display label.
    pub name: String,
    pub calendar: CalendarKind,
    pub month: u32,
    pub day: u32,
    /// Meaningful only when `calendar == CalendarKind::Lunar`.
    pub leap_month: bool,
    pub note: Option<String>,
}

impl BirthdayRecord {
    /// Creates a validated record with a generated ID.
    ///
    /// `name` and `note` are trimmed; a blank note becomes `None`.
    pub fn new(
        name: impl Into<String>,
        descriptor: BirthdayDescriptor,
        note: Option<String>,
    ) -> Result<Self, BirthdayValidationError> {
        Self::with_id(Uuid::new_v4(), name, descriptor, note)
    }

    /// Creates a validated record with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: RecordId,
        name: impl Into<String>,
        descriptor: BirthdayDescriptor,
        note: Option<String>,
    ) -> Result<Self, BirthdayValidationError> {
        let record = Self {
            id,
            name: name.into().trim().to_string(),
            calendar: descriptor.calendar,
            month: descriptor.month,
            day: descriptor.day,
            leap_month: descriptor.leap_month,
            note: normalize_note(note),
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks record invariants.
    ///
    /// # Errors
    /// - `NilId` for a nil UUID.
    /// - `EmptyName` for a blank name.
    /// - `Date` when month/day/leap flag are outside the calendar's domain.
    pub fn validate(&self) -> Result<(), BirthdayValidationError> {
        if self.id.is_nil() {
            return Err(BirthdayValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(BirthdayValidationError::EmptyName);
        }
        self.descriptor().validate()?;
        Ok(())
    }

    /// Calendar part of the record consumed by the converter.
    pub fn descriptor(&self) -> BirthdayDescriptor {
        BirthdayDescriptor {
            calendar: self.calendar,
            month: self.month,
            day: self.day,
            leap_month: self.leap_month,
        }
    }

    /// Human-readable birthday, e.g. `农历 04-12 (闰月)`.
    pub fn birthday_label(&self) -> String {
        let leap = if self.calendar == CalendarKind::Lunar && self.leap_month {
            " (闰月)"
        } else {
            ""
        };
        format!(
            "{} {:02}-{:02}{leap}",
            self.calendar.label(),
            self.month,
            self.day
        )
    }
}

#[derive(Deserialize)]
struct BirthdayRecordWire {
    id: RecordId,
    name: String,
    calendar: CalendarKind,
    month: u32,
    day: u32,
    #[serde(default)]
    leap_month: bool,
    #[serde(default)]
    note: Option<String>,
}

impl TryFrom<BirthdayRecordWire> for BirthdayRecord {
    type Error = BirthdayValidationError;

    fn try_from(value: BirthdayRecordWire) -> Result<Self, Self::Error> {
        Self::with_id(
            value.id,
            value.name,
            BirthdayDescriptor {
                calendar: value.calendar,
                month: value.month,
                day: value.day,
                leap_month: value.leap_month,
            },
            value.note,
        )
    }
}

/// Parses `MM-DD` input for the given calendar.
///
/// Solar input is checked against a leap year so `02-29` is accepted; lunar
/// input accepts months `1..=12` and days `1..=30`.
pub fn parse_month_day(
    value: &str,
    calendar: CalendarKind,
) -> Result<(u32, u32), BirthdayValidationError> {
    let captures = MONTH_DAY_RE
        .captures(value)
        .ok_or_else(|| BirthdayValidationError::MalformedMonthDay(value.trim().to_string()))?;
    let month: u32 = captures[1]
        .parse()
        .map_err(|_| BirthdayValidationError::MalformedMonthDay(value.trim().to_string()))?;
    let day: u32 = captures[2]
        .parse()
        .map_err(|_| BirthdayValidationError::MalformedMonthDay(value.trim().to_string()))?;

    BirthdayDescriptor {
        calendar,
        month,
        day,
        leap_month: false,
    }
    .validate()?;
    Ok((month, day))
}

pub(crate) fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
