//! Notification sink contract.
//!
//! Delivery transport (OS notifications, mail, chat) lives outside the core;
//! the core only hands a finished [`Notification`] to a [`NotificationSink`].

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Title used for birthday reminders.
pub const REMINDER_TITLE: &str = "生日提醒";

/// Message handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    /// Reminder for the given joined names.
    pub fn birthday_reminder(names: &str) -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            body: format!("今天记得祝 {names} 生日快乐"),
        }
    }
}

/// Transport failure reported by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError(pub String);

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification delivery failed: {}", self.0)
    }
}

impl Error for NotifyError {}

/// Delivers reminders to the user.
pub trait NotificationSink {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<S: NotificationSink + ?Sized> NotificationSink for &S {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).send(notification)
    }
}
