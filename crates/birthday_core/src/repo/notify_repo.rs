//! Notification state persistence.
//!
//! # Responsibility
//! - Remember which records were already notified on a given day.
//! - Provide an atomic check-and-mark for at-most-once-per-day delivery.
//!
//! # Invariants
//! - One row per `(record_id, day)`; marking twice is a no-op.
//! - `claim` checks and marks inside one immediate transaction.

use crate::model::birthday::RecordId;
use crate::repo::birthday_repo::{ensure_table, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// At-most-once-per-day notification bookkeeping.
pub trait NotifyStateRepository {
    /// Whether `id` was already notified on `day`.
    fn was_notified(&self, id: RecordId, day: NaiveDate) -> RepoResult<bool>;
    /// Marks `id` as notified on `day`.
    fn mark_notified(&self, id: RecordId, day: NaiveDate) -> RepoResult<()>;
    /// Marks every not-yet-notified id in `ids` for `day` and returns them,
    /// in input order. Ids already notified that day are left out.
    fn claim(&self, ids: &[RecordId], day: NaiveDate) -> RepoResult<Vec<RecordId>>;
}

/// SQLite-backed notify state.
pub struct SqliteNotifyStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotifyStateRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "notify_log")?;
        Ok(Self { conn })
    }
}

impl NotifyStateRepository for SqliteNotifyStateRepository<'_> {
    fn was_notified(&self, id: RecordId, day: NaiveDate) -> RepoResult<bool> {
        notified_in(self.conn, id, day)
    }

    fn mark_notified(&self, id: RecordId, day: NaiveDate) -> RepoResult<()> {
        insert_mark(self.conn, id, day)
    }

    fn claim(&self, ids: &[RecordId], day: NaiveDate) -> RepoResult<Vec<RecordId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut claimed = Vec::with_capacity(ids.len());
        for &id in ids {
            if notified_in(&tx, id, day)? {
                continue;
            }
            insert_mark(&tx, id, day)?;
            claimed.push(id);
        }
        tx.commit()?;
        Ok(claimed)
    }
}

fn notified_in(conn: &Connection, id: RecordId, day: NaiveDate) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM notify_log
            WHERE record_id = ?1 AND notified_on = ?2
        );",
        params![id.to_string(), day_key(day)],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn insert_mark(conn: &Connection, id: RecordId, day: NaiveDate) -> RepoResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO notify_log (record_id, notified_on) VALUES (?1, ?2);",
        params![id.to_string(), day_key(day)],
    )?;
    Ok(())
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
