//! Due-birthday notification use-case.
//!
//! # Responsibility
//! - Send one reminder listing every birthday observed on a given day.
//! - Optionally enforce at-most-once-per-day delivery per record.
//!
//! # Invariants
//! - With `once_per_day`, a record is marked before the sink is called, so a
//!   failed delivery is not retried the same day.
//! - Without `once_per_day`, notify state is neither read nor written.

use crate::notify::{Notification, NotificationSink, NotifyError};
use crate::repo::birthday_repo::{BirthdayRepository, RepoError};
use crate::repo::notify_repo::NotifyStateRepository;
use crate::service::birthday_service::{BirthdayService, ScheduleReport, ServiceError};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result of a reminder attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Nobody is due on the requested day.
    NothingDue,
    /// Everyone due was already notified that day.
    AlreadyNotified,
    /// A reminder naming these people was delivered.
    Sent { names: String },
}

/// Reminder use-case failure.
#[derive(Debug)]
pub enum ReminderError {
    Service(ServiceError),
    Delivery(NotifyError),
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Delivery(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReminderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Delivery(err) => Some(err),
        }
    }
}

impl From<ServiceError> for ReminderError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<RepoError> for ReminderError {
    fn from(value: RepoError) -> Self {
        Self::Service(value.into())
    }
}

impl From<NotifyError> for ReminderError {
    fn from(value: NotifyError) -> Self {
        Self::Delivery(value)
    }
}

/// Reminder service over a record store, notify state and a sink.
pub struct ReminderService<R, N, S>
where
    R: BirthdayRepository,
    N: NotifyStateRepository,
    S: NotificationSink,
{
    birthdays: BirthdayService<R>,
    state: N,
    sink: S,
}

impl<R, N, S> ReminderService<R, N, S>
where
    R: BirthdayRepository,
    N: NotifyStateRepository,
    S: NotificationSink,
{
    pub fn new(repo: R, state: N, sink: S) -> Self {
        Self {
            birthdays: BirthdayService::new(repo),
            state,
            sink,
        }
    }

    /// Due report for `date`, without notifying.
    pub fn due_on(&self, date: NaiveDate) -> Result<ScheduleReport, ServiceError> {
        self.birthdays.due_on(date)
    }

    /// Notifies about birthdays observed on `date`.
    ///
    /// With `once_per_day`, records already notified on `date` are skipped;
    /// the reminder names only newly claimed records.
    pub fn notify_due(
        &self,
        date: NaiveDate,
        once_per_day: bool,
    ) -> Result<NotifyOutcome, ReminderError> {
        let report = self.birthdays.due_on(date)?;
        if report.occurrences.is_empty() {
            return Ok(NotifyOutcome::NothingDue);
        }

        let names = if once_per_day {
            let ids: Vec<_> = report
                .occurrences
                .iter()
                .map(|occurrence| occurrence.record.id)
                .collect();
            let claimed = self.state.claim(&ids, date)?;
            if claimed.is_empty() {
                info!(
                    "event=notify_due module=service status=skipped reason=already_notified due_count={}",
                    ids.len()
                );
                return Ok(NotifyOutcome::AlreadyNotified);
            }
            report
                .occurrences
                .iter()
                .filter(|occurrence| claimed.contains(&occurrence.record.id))
                .map(|occurrence| occurrence.record.name.as_str())
                .collect::<Vec<_>>()
                .join("、")
        } else {
            report.joined_names()
        };

        if let Err(err) = self.sink.send(&Notification::birthday_reminder(&names)) {
            warn!("event=notify_due module=service status=error error={err}");
            return Err(err.into());
        }
        info!(
            "event=notify_due module=service status=ok due_count={} once_per_day={}",
            report.occurrences.len(),
            once_per_day
        );
        Ok(NotifyOutcome::Sent { names })
    }
}
