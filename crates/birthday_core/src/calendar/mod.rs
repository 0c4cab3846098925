//! Birthday calendar conversion.
//!
//! # Responsibility
//! - Turn a birthday descriptor plus a target year into a concrete solar date.
//! - Apply the Feb 29, missing leap month and lunar day overflow fallbacks.
//!
//! # Invariants
//! - Conversion is a pure function of `(descriptor, year, table)`.
//! - Fallbacks never surface as errors; only out-of-domain descriptors and
//!   years outside the lunar table do.

use crate::model::birthday::CalendarKind;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod lunar_table;

pub use lunar_table::{ChineseLunarTable, LunarMonth, LunarTable, LunarYear};

/// Lunar day overflow handling used by [`resolve_solar_date`].
///
/// Day 30 of a lunar month that only has 29 days in the target year is
/// observed on day 29 of that month.
pub const DAY_OVERFLOW_POLICY: DayOverflowPolicy = DayOverflowPolicy::Clamp;

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Conversion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarError {
    /// Month/day outside the legal domain of the calendar kind.
    InvalidDescriptor {
        calendar: CalendarKind,
        month: u32,
        day: u32,
        leap_month: bool,
    },
    /// Target year outside the range the calendar data covers.
    UnsupportedYear { year: i32, min: i32, max: i32 },
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDescriptor {
                calendar,
                month,
                day,
                leap_month,
            } => write!(
                f,
                "invalid {} birthday {month:02}-{day:02}{}",
                calendar.as_str(),
                if *leap_month { " (leap month)" } else { "" }
            ),
            Self::UnsupportedYear { year, min, max } => {
                write!(f, "year {year} is outside supported range {min}..={max}")
            }
        }
    }
}

impl Error for CalendarError {}

/// How a lunar day beyond the end of its month is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOverflowPolicy {
    /// Use the last day of the same month.
    Clamp,
    /// Use day 1 of the month that follows.
    NextMonth,
}

/// Calendar-independent part of a birthday record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BirthdayDescriptor {
    pub calendar: CalendarKind,
    pub month: u32,
    pub day: u32,
    /// Only meaningful for [`CalendarKind::Lunar`].
    pub leap_month: bool,
}

impl BirthdayDescriptor {
    pub fn solar(month: u32, day: u32) -> Self {
        Self {
            calendar: CalendarKind::Solar,
            month,
            day,
            leap_month: false,
        }
    }

    pub fn lunar(month: u32, day: u32, leap_month: bool) -> Self {
        Self {
            calendar: CalendarKind::Lunar,
            month,
            day,
            leap_month,
        }
    }

    /// Checks month/day against the calendar's legal domain.
    ///
    /// Solar dates are checked against a leap year so Feb 29 is accepted.
    /// Lunar dates accept months `1..=12` and days `1..=30`.
    ///
    /// # Errors
    /// - [`CalendarError::InvalidDescriptor`] for out-of-domain values, and for
    ///   a solar descriptor carrying the leap month flag.
    pub fn validate(&self) -> CalendarResult<()> {
        let valid = match self.calendar {
            CalendarKind::Solar => {
                !self.leap_month
                    && (1..=12).contains(&self.month)
                    && self.day >= 1
                    && self.day <= days_in_solar_month(2000, self.month)
            }
            CalendarKind::Lunar => (1..=12).contains(&self.month) && (1..=30).contains(&self.day),
        };
        if valid {
            Ok(())
        } else {
            Err(CalendarError::InvalidDescriptor {
                calendar: self.calendar,
                month: self.month,
                day: self.day,
                leap_month: self.leap_month,
            })
        }
    }
}

/// A date expressed in the lunar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LunarDate {
    /// Lunar year, numbered by the solar year in which it begins.
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub leap_month: bool,
}

impl Display for LunarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{}{:02}-{:02}",
            self.year,
            if self.leap_month { "L" } else { "" },
            self.month,
            self.day
        )
    }
}

/// Resolves the solar date on which `descriptor` is observed in `year`,
/// using the built-in lunar table.
///
/// For lunar birthdays `year` names the lunar year, so months 11 and 12 can
/// land in January or February of `year + 1`.
///
/// # Errors
/// - [`CalendarError::InvalidDescriptor`] when `descriptor` fails validation.
/// - [`CalendarError::UnsupportedYear`] when `year` is outside the table.
pub fn resolve_solar_date(descriptor: &BirthdayDescriptor, year: i32) -> CalendarResult<NaiveDate> {
    resolve_solar_date_with(&ChineseLunarTable, descriptor, year)
}

/// Same as [`resolve_solar_date`] with an explicit lunar table.
pub fn resolve_solar_date_with<T: LunarTable + ?Sized>(
    table: &T,
    descriptor: &BirthdayDescriptor,
    year: i32,
) -> CalendarResult<NaiveDate> {
    descriptor.validate()?;
    match descriptor.calendar {
        CalendarKind::Solar => solar_on_year(descriptor.month, descriptor.day, year),
        CalendarKind::Lunar => {
            let layout = lunar_year(table, year)?;
            Ok(lunar_on_year(
                layout,
                descriptor.month,
                descriptor.day,
                descriptor.leap_month,
                DAY_OVERFLOW_POLICY,
            ))
        }
    }
}

/// Converts a solar date into the lunar calendar using the built-in table.
///
/// # Errors
/// - [`CalendarError::UnsupportedYear`] when `date` is outside the table.
pub fn solar_to_lunar(date: NaiveDate) -> CalendarResult<LunarDate> {
    solar_to_lunar_with(&ChineseLunarTable, date)
}

/// Same as [`solar_to_lunar`] with an explicit lunar table.
pub fn solar_to_lunar_with<T: LunarTable + ?Sized>(
    table: &T,
    date: NaiveDate,
) -> CalendarResult<LunarDate> {
    let layout = match table.year(date.year()) {
        Some(layout) if date >= layout.new_year => layout,
        _ => lunar_year(table, date.year() - 1)?,
    };

    let mut offset = (date - layout.new_year).num_days();
    for month in layout.months() {
        let days = i64::from(month.days);
        if offset < days {
            return Ok(LunarDate {
                year: layout.year,
                month: month.number,
                // offset < 30 here
                day: offset as u32 + 1,
                leap_month: month.is_leap,
            });
        }
        offset -= days;
    }

    // Past the end of the last lunar year in the table.
    let range = table.supported_years();
    Err(CalendarError::UnsupportedYear {
        year: date.year(),
        min: *range.start(),
        max: *range.end(),
    })
}

/// Gregorian leap year, as chrono sees it.
pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Number of days of solar `month` in `year`; `0` for an invalid month.
pub fn days_in_solar_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map_or(0, |last| last.day())
}

fn solar_on_year(month: u32, day: u32, year: i32) -> CalendarResult<NaiveDate> {
    let day = if month == 2 && day == 29 && !is_leap_year(year) {
        28
    } else {
        day
    };
    NaiveDate::from_ymd_opt(year, month, day).ok_or(CalendarError::UnsupportedYear {
        year,
        min: NaiveDate::MIN.year(),
        max: NaiveDate::MAX.year(),
    })
}

fn lunar_year<T: LunarTable + ?Sized>(table: &T, year: i32) -> CalendarResult<&LunarYear> {
    table.year(year).ok_or_else(|| {
        let range = table.supported_years();
        CalendarError::UnsupportedYear {
            year,
            min: *range.start(),
            max: *range.end(),
        }
    })
}

/// Lunar conversion inside one lunar year. `month` and `day` are validated.
fn lunar_on_year(
    layout: &LunarYear,
    month: u32,
    day: u32,
    leap_month: bool,
    policy: DayOverflowPolicy,
) -> NaiveDate {
    // A leap-month birthday is observed in the ordinary month when the year
    // has no matching leap month.
    let is_leap = leap_month && layout.has_leap(month);
    let month_start = layout
        .month_offset(month, is_leap)
        .map_or(0, u64::from);
    let month_days = layout.month_days(month, is_leap).unwrap_or(29);

    let day_offset = if day <= month_days {
        u64::from(day - 1)
    } else {
        match policy {
            DayOverflowPolicy::Clamp => u64::from(month_days - 1),
            DayOverflowPolicy::NextMonth => u64::from(month_days),
        }
    };
    layout.new_year + Days::new(month_start + day_offset)
}
