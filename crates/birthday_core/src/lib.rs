//! Core domain logic for the birthday reminder.
//!
//! Converts solar and lunar birthdays into observed solar dates and resolves
//! which birthdays are due or upcoming relative to a reference date.

pub mod calendar;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod resolver;
pub mod service;

pub use calendar::{
    is_leap_year, resolve_solar_date, resolve_solar_date_with, solar_to_lunar, BirthdayDescriptor,
    CalendarError, CalendarResult, ChineseLunarTable, DayOverflowPolicy, LunarDate, LunarTable,
    LunarYear, DAY_OVERFLOW_POLICY,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::birthday::{
    parse_month_day, BirthdayRecord, BirthdayValidationError, CalendarKind, RecordId,
};
pub use notify::{Notification, NotificationSink, NotifyError};
pub use repo::birthday_repo::{
    BirthdayRepository, RecordListing, RejectedRow, RepoError, RepoResult, SqliteBirthdayRepository,
};
pub use repo::notify_repo::{NotifyStateRepository, SqliteNotifyStateRepository};
pub use resolver::{
    due_today, next_occurrence, upcoming, RecordFailure, Resolution, ResolvedOccurrence,
};
pub use service::birthday_service::{
    BirthdayOccurrence, BirthdayPatch, BirthdayService, BirthdaySummary, MonthBucket,
    NewBirthday, ScheduleReport, ServiceError,
};
pub use service::reminder_service::{NotifyOutcome, ReminderError, ReminderService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
