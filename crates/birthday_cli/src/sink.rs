use std::cell::RefCell;
use std::io::{self, Stdout, Write};

use birthday_core::{Notification, NotificationSink, NotifyError};

/// Writes reminders as one line each to a terminal or other writer.
pub struct ConsoleSink<W: Write> {
    out: RefCell<W>,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> NotificationSink for ConsoleSink<W> {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "[{}] {}", notification.title, notification.body)
            .and_then(|()| out.flush())
            .map_err(|err| NotifyError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::ConsoleSink;
    use birthday_core::{Notification, NotificationSink};

    #[test]
    fn writes_title_and_body_on_one_line() {
        let sink = ConsoleSink::new(Vec::new());
        sink.send(&Notification::birthday_reminder("小明、小红"))
            .unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "[生日提醒] 今天记得祝 小明、小红 生日快乐\n");
    }
}
