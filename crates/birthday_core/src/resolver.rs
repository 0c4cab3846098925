//! Due and upcoming birthday resolution.
//!
//! # Responsibility
//! - Compute each record's next observed solar date from a reference date.
//! - Classify records into "due today" and "upcoming within N days".
//!
//! # Invariants
//! - `reference + days_until == solar_date` for every occurrence.
//! - Output order is deterministic: `days_until`, then name, then id.
//! - A record that fails conversion is reported in `failures` and never hides
//!   the other records.

use crate::calendar::{
    resolve_solar_date_with, CalendarError, CalendarResult, ChineseLunarTable, LunarTable,
};
use crate::model::birthday::{BirthdayRecord, CalendarKind, RecordId};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;

/// One record's occurrence relative to a reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOccurrence<'a> {
    pub record: &'a BirthdayRecord,
    /// Observed solar date.
    pub solar_date: NaiveDate,
    /// Target year passed to the converter (the lunar year for lunar records).
    pub year: i32,
    /// Whole days from the reference date to `solar_date`.
    pub days_until: i64,
}

/// Conversion failure isolated to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFailure {
    pub record_id: RecordId,
    pub error: CalendarError,
}

/// Result of a batch resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub occurrences: Vec<ResolvedOccurrence<'a>>,
    pub failures: Vec<RecordFailure>,
}

/// Computes the first occurrence of `record` on or after `reference`.
///
/// Candidates come from `reference.year` and `reference.year + 1`. Lunar
/// records also consider lunar year `reference.year - 1`, whose last months
/// fall in January or February of `reference.year`.
///
/// # Errors
/// - [`CalendarError::InvalidDescriptor`] for a malformed record.
/// - [`CalendarError::UnsupportedYear`] when no candidate year is convertible.
pub fn next_occurrence(
    record: &BirthdayRecord,
    reference: NaiveDate,
) -> CalendarResult<ResolvedOccurrence<'_>> {
    next_occurrence_with(&ChineseLunarTable, record, reference)
}

/// Same as [`next_occurrence`] with an explicit lunar table.
pub fn next_occurrence_with<'a, T: LunarTable + ?Sized>(
    table: &T,
    record: &'a BirthdayRecord,
    reference: NaiveDate,
) -> CalendarResult<ResolvedOccurrence<'a>> {
    let descriptor = record.descriptor();
    descriptor.validate()?;

    let first_year = match record.calendar {
        CalendarKind::Solar => reference.year(),
        CalendarKind::Lunar => reference.year() - 1,
    };

    let mut last_error = None;
    for year in first_year..=reference.year() + 1 {
        match resolve_solar_date_with(table, &descriptor, year) {
            Ok(solar_date) if solar_date >= reference => {
                return Ok(ResolvedOccurrence {
                    record,
                    solar_date,
                    year,
                    days_until: (solar_date - reference).num_days(),
                });
            }
            Ok(_) => {}
            Err(err) => last_error = Some(err),
        }
    }

    // Every convertible candidate lies before `reference`, so the year that
    // would hold the next occurrence is out of range.
    Err(last_error.unwrap_or(CalendarError::UnsupportedYear {
        year: reference.year() + 1,
        min: *table.supported_years().start(),
        max: *table.supported_years().end(),
    }))
}

/// Records observed on `reference`, ordered by name then id.
pub fn due_today(records: &[BirthdayRecord], reference: NaiveDate) -> Resolution<'_> {
    due_today_with(&ChineseLunarTable, records, reference)
}

/// Same as [`due_today`] with an explicit lunar table.
pub fn due_today_with<'a, T: LunarTable + ?Sized>(
    table: &T,
    records: &'a [BirthdayRecord],
    reference: NaiveDate,
) -> Resolution<'a> {
    upcoming_with(table, records, reference, 0)
}

/// Records observed within `window_days` days of `reference` (inclusive),
/// ordered by `days_until`, then name, then id.
pub fn upcoming(
    records: &[BirthdayRecord],
    reference: NaiveDate,
    window_days: u32,
) -> Resolution<'_> {
    upcoming_with(&ChineseLunarTable, records, reference, window_days)
}

/// Same as [`upcoming`] with an explicit lunar table.
pub fn upcoming_with<'a, T: LunarTable + ?Sized>(
    table: &T,
    records: &'a [BirthdayRecord],
    reference: NaiveDate,
    window_days: u32,
) -> Resolution<'a> {
    let mut resolution = Resolution::default();
    for record in records {
        match next_occurrence_with(table, record, reference) {
            Ok(occurrence) if occurrence.days_until <= i64::from(window_days) => {
                resolution.occurrences.push(occurrence);
            }
            Ok(_) => {}
            Err(error) => resolution.failures.push(RecordFailure {
                record_id: record.id,
                error,
            }),
        }
    }
    resolution.occurrences.sort_by(compare_occurrences);
    resolution
}

fn compare_occurrences(a: &ResolvedOccurrence<'_>, b: &ResolvedOccurrence<'_>) -> Ordering {
    a.days_until
        .cmp(&b.days_until)
        .then_with(|| a.record.name.cmp(&b.record.name))
        .then_with(|| a.record.id.cmp(&b.record.id))
}

#[cfg(test)]
mod tests {
    use super::{compare_occurrences, ResolvedOccurrence};
    use crate::calendar::BirthdayDescriptor;
    use crate::model::birthday::BirthdayRecord;
    use chrono::NaiveDate;
    use std::cmp::Ordering;
    use uuid::Uuid;

    fn occurrence(record: &BirthdayRecord, days_until: i64) -> ResolvedOccurrence<'_> {
        ResolvedOccurrence {
            record,
            solar_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            year: 2024,
            days_until,
        }
    }

    #[test]
    fn ordering_uses_days_then_name_then_id() {
        let low_id = Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap();
        let high_id = Uuid::parse_str("00000000-0000-4000-8000-000000000002").unwrap();
        let alice =
            BirthdayRecord::with_id(high_id, "Alice", BirthdayDescriptor::solar(1, 1), None)
                .unwrap();
        let alice_twin =
            BirthdayRecord::with_id(low_id, "Alice", BirthdayDescriptor::solar(1, 1), None)
                .unwrap();
        let bob = BirthdayRecord::new("Bob", BirthdayDescriptor::solar(1, 1), None).unwrap();

        assert_eq!(
            compare_occurrences(&occurrence(&bob, 1), &occurrence(&alice, 2)),
            Ordering::Less
        );
        assert_eq!(
            compare_occurrences(&occurrence(&alice, 1), &occurrence(&bob, 1)),
            Ordering::Less
        );
        assert_eq!(
            compare_occurrences(&occurrence(&alice_twin, 1), &occurrence(&alice, 1)),
            Ordering::Less
        );
    }
}
