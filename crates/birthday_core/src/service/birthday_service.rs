//! Birthday use-case service.
//!
//! # Responsibility
//! - Provide add/edit/remove/list entry points over the record store.
//! - Resolve due and upcoming birthdays for a caller-supplied date.
//! - Build the dashboard summary (counts and monthly buckets).
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - The reference date is always an explicit parameter.
//! - A record that fails conversion is reported, never silently dropped.
//! - A stored row that cannot be read is reported in `rejected` and never
//!   hides the remaining records.

use crate::calendar::BirthdayDescriptor;
use crate::model::birthday::{
    normalize_note, BirthdayRecord, BirthdayValidationError, CalendarKind, RecordId,
};
use crate::repo::birthday_repo::{BirthdayRepository, RecordListing, RejectedRow, RepoError};
use crate::resolver::{self, RecordFailure, Resolution, ResolvedOccurrence};
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Window used by [`BirthdayService::summary`] for monthly buckets.
pub const SUMMARY_WINDOW_DAYS: u32 = 365;
/// Number of monthly buckets in a summary, starting at the reference month.
pub const SUMMARY_MONTHS: usize = 12;

/// Service error for birthday use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed record validation.
    Validation(BirthdayValidationError),
    /// Target record does not exist.
    NotFound(RecordId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "birthday not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent birthday state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<BirthdayValidationError> for ServiceError {
    fn from(value: BirthdayValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Request model for adding one birthday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBirthday {
    pub name: String,
    pub calendar: CalendarKind,
    pub month: u32,
    pub day: u32,
    /// Ignored for solar birthdays.
    pub leap_month: bool,
    pub note: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BirthdayPatch {
    pub name: Option<String>,
    pub calendar: Option<CalendarKind>,
    pub month_day: Option<(u32, u32)>,
    pub leap_month: Option<bool>,
    /// `Some(None)` clears the note.
    pub note: Option<Option<String>>,
}

/// Owned occurrence returned by service queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayOccurrence {
    pub record: BirthdayRecord,
    pub solar_date: NaiveDate,
    pub year: i32,
    pub days_until: i64,
}

impl From<&ResolvedOccurrence<'_>> for BirthdayOccurrence {
    fn from(value: &ResolvedOccurrence<'_>) -> Self {
        Self {
            record: value.record.clone(),
            solar_date: value.solar_date,
            year: value.year,
            days_until: value.days_until,
        }
    }
}

/// Due/upcoming query result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    /// Ordered by `days_until`, then name, then id.
    pub occurrences: Vec<BirthdayOccurrence>,
    /// Records whose date could not be resolved.
    pub failures: Vec<RecordFailure>,
    /// Stored rows that could not be read as records.
    pub rejected: Vec<RejectedRow>,
}

impl ScheduleReport {
    /// Occurrence names joined by `、`, in output order.
    pub fn joined_names(&self) -> String {
        self.occurrences
            .iter()
            .map(|occurrence| occurrence.record.name.as_str())
            .collect::<Vec<_>>()
            .join("、")
    }
}

impl From<Resolution<'_>> for ScheduleReport {
    fn from(value: Resolution<'_>) -> Self {
        Self {
            occurrences: value.occurrences.iter().map(BirthdayOccurrence::from).collect(),
            failures: value.failures,
            rejected: Vec::new(),
        }
    }
}

/// Occurrence count for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

/// Dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdaySummary {
    /// Readable records only; see `rejected`.
    pub total: usize,
    pub solar: usize,
    pub lunar: usize,
    /// `SUMMARY_MONTHS` buckets starting at the reference month.
    pub months: Vec<MonthBucket>,
    pub failures: Vec<RecordFailure>,
    pub rejected: Vec<RejectedRow>,
}

/// Birthday service facade over repository implementations.
pub struct BirthdayService<R: BirthdayRepository> {
    repo: R,
}

impl<R: BirthdayRepository> BirthdayService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds one birthday and returns the stored record.
    ///
    /// The leap month flag is dropped for solar birthdays.
    pub fn add(&self, request: NewBirthday) -> Result<BirthdayRecord, ServiceError> {
        let descriptor = BirthdayDescriptor {
            calendar: request.calendar,
            month: request.month,
            day: request.day,
            leap_month: request.calendar == CalendarKind::Lunar && request.leap_month,
        };
        let record = BirthdayRecord::new(request.name, descriptor, request.note)?;
        let id = self.repo.create(&record)?;
        info!(
            "event=birthday_add module=service status=ok calendar={}",
            record.calendar.as_str()
        );

        self.repo
            .get(id)?
            .ok_or(ServiceError::InconsistentState(
                "created birthday not found in read-back",
            ))
    }

    /// Applies `patch` to an existing birthday and returns the stored record.
    ///
    /// Switching to the solar calendar clears the leap month flag.
    pub fn edit(&self, id: RecordId, patch: BirthdayPatch) -> Result<BirthdayRecord, ServiceError> {
        let current = self.repo.get(id)?.ok_or(ServiceError::NotFound(id))?;

        let calendar = patch.calendar.unwrap_or(current.calendar);
        let (month, day) = patch.month_day.unwrap_or((current.month, current.day));
        let leap_month = calendar == CalendarKind::Lunar
            && patch.leap_month.unwrap_or(current.leap_month);
        let note = match patch.note {
            Some(note) => normalize_note(note),
            None => current.note,
        };

        let updated = BirthdayRecord::with_id(
            id,
            patch.name.unwrap_or(current.name),
            BirthdayDescriptor {
                calendar,
                month,
                day,
                leap_month,
            },
            note,
        )?;
        self.repo.update(&updated)?;
        info!("event=birthday_edit module=service status=ok");

        self.repo
            .get(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated birthday not found in read-back",
            ))
    }

    /// Removes one birthday by ID.
    pub fn remove(&self, id: RecordId) -> Result<(), ServiceError> {
        self.repo.delete(id)?;
        info!("event=birthday_remove module=service status=ok");
        Ok(())
    }

    /// Gets one birthday by ID.
    pub fn get(&self, id: RecordId) -> Result<Option<BirthdayRecord>, ServiceError> {
        Ok(self.repo.get(id)?)
    }

    /// Lists all readable birthdays in insertion order, plus unreadable rows.
    pub fn list(&self) -> Result<RecordListing, ServiceError> {
        Ok(self.repo.list_readable()?)
    }

    /// Birthdays observed on `date`.
    pub fn due_on(&self, date: NaiveDate) -> Result<ScheduleReport, ServiceError> {
        let RecordListing { records, rejected } = self.repo.list_readable()?;
        let report = ScheduleReport {
            rejected,
            ..ScheduleReport::from(resolver::due_today(&records, date))
        };
        log_failures("due", &report.failures);
        Ok(report)
    }

    /// Birthdays observed within `days` days from `date`, inclusive.
    pub fn upcoming_from(&self, date: NaiveDate, days: u32) -> Result<ScheduleReport, ServiceError> {
        let RecordListing { records, rejected } = self.repo.list_readable()?;
        let report = ScheduleReport {
            rejected,
            ..ScheduleReport::from(resolver::upcoming(&records, date, days))
        };
        log_failures("upcoming", &report.failures);
        Ok(report)
    }

    /// Counts by calendar and monthly occurrence buckets for the next year.
    pub fn summary(&self, date: NaiveDate) -> Result<BirthdaySummary, ServiceError> {
        let RecordListing { records, rejected } = self.repo.list_readable()?;
        let lunar = records
            .iter()
            .filter(|record| record.calendar == CalendarKind::Lunar)
            .count();

        let mut months = month_buckets(date);
        let resolution = resolver::upcoming(&records, date, SUMMARY_WINDOW_DAYS);
        for occurrence in &resolution.occurrences {
            let key = (occurrence.solar_date.year(), occurrence.solar_date.month());
            if let Some(bucket) = months
                .iter_mut()
                .find(|bucket| (bucket.year, bucket.month) == key)
            {
                bucket.count += 1;
            }
        }
        log_failures("summary", &resolution.failures);

        Ok(BirthdaySummary {
            total: records.len(),
            solar: records.len() - lunar,
            lunar,
            months,
            failures: resolution.failures,
            rejected,
        })
    }
}

fn month_buckets(start: NaiveDate) -> Vec<MonthBucket> {
    let mut year = start.year();
    let mut month = start.month();
    let mut buckets = Vec::with_capacity(SUMMARY_MONTHS);
    for _ in 0..SUMMARY_MONTHS {
        buckets.push(MonthBucket {
            year,
            month,
            count: 0,
        });
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    buckets
}

fn log_failures(query: &str, failures: &[RecordFailure]) {
    for failure in failures {
        warn!(
            "event=birthday_resolve module=service status=error query={} record_id={} error={}",
            query, failure.record_id, failure.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::month_buckets;
    use chrono::NaiveDate;

    #[test]
    fn month_buckets_wrap_into_next_year() {
        let buckets = month_buckets(NaiveDate::from_ymd_opt(2024, 11, 20).unwrap());
        assert_eq!(buckets.len(), 12);
        assert_eq!((buckets[0].year, buckets[0].month), (2024, 11));
        assert_eq!((buckets[2].year, buckets[2].month), (2025, 1));
        assert_eq!((buckets[11].year, buckets[11].month), (2025, 10));
        assert!(buckets.iter().all(|bucket| bucket.count == 0));
    }
}
