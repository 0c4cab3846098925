//! Birthday repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `birthdays` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `BirthdayRecord::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `list_readable` sets an unreadable row aside without failing the rest.
//! - Listings return records in insertion order.

use crate::db::DbError;
use log::warn;
use crate::model::birthday::{BirthdayRecord, BirthdayValidationError, CalendarKind, RecordId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const BIRTHDAY_SELECT_SQL: &str = "SELECT
    id,
    name,
    calendar,
    month,
    day,
    leap_month,
    note
FROM birthdays";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for birthday and notify-state persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(BirthdayValidationError),
    Db(DbError),
    NotFound(RecordId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "birthday not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted birthday data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "database is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<BirthdayValidationError> for RepoError {
    fn from(value: BirthdayValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// A stored row that failed to parse or validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// Raw `birthdays.id` value; may itself be the malformed part.
    pub id: String,
    pub reason: String,
}

/// Readable records plus the rows that were set aside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordListing {
    /// Insertion order.
    pub records: Vec<BirthdayRecord>,
    /// Insertion order.
    pub rejected: Vec<RejectedRow>,
}

/// Record store consumed by services and the resolver's callers.
pub trait BirthdayRepository {
    fn create(&self, record: &BirthdayRecord) -> RepoResult<RecordId>;
    fn update(&self, record: &BirthdayRecord) -> RepoResult<()>;
    fn get(&self, id: RecordId) -> RepoResult<Option<BirthdayRecord>>;
    /// All records in insertion order; fails on the first invalid row.
    fn list(&self) -> RepoResult<Vec<BirthdayRecord>>;
    /// All records in insertion order; invalid rows are returned apart.
    fn list_readable(&self) -> RepoResult<RecordListing>;
    /// Hard-deletes one record.
    fn delete(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed birthday repository.
pub struct SqliteBirthdayRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBirthdayRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "birthdays")?;
        Ok(Self { conn })
    }
}

impl BirthdayRepository for SqliteBirthdayRepository<'_> {
    fn create(&self, record: &BirthdayRecord) -> RepoResult<RecordId> {
        record.validate()?;

        self.conn.execute(
            "INSERT INTO birthdays (
                id,
                name,
                calendar,
                month,
                day,
                leap_month,
                note,
                seq
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                (SELECT COALESCE(MAX(seq), 0) + 1 FROM birthdays)
            );",
            params![
                record.id.to_string(),
                record.name.as_str(),
                record.calendar.as_str(),
                record.month,
                record.day,
                bool_to_int(record.leap_month),
                record.note.as_deref(),
            ],
        )?;

        Ok(record.id)
    }

    fn update(&self, record: &BirthdayRecord) -> RepoResult<()> {
        record.validate()?;

        let changed = self.conn.execute(
            "UPDATE birthdays
             SET
                name = ?1,
                calendar = ?2,
                month = ?3,
                day = ?4,
                leap_month = ?5,
                note = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                record.name.as_str(),
                record.calendar.as_str(),
                record.month,
                record.day,
                bool_to_int(record.leap_month),
                record.note.as_deref(),
                record.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(record.id));
        }

        Ok(())
    }

    fn get(&self, id: RecordId) -> RepoResult<Option<BirthdayRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BIRTHDAY_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_birthday_row(row)?));
        }

        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<BirthdayRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BIRTHDAY_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_birthday_row(row)?);
        }

        Ok(records)
    }

    fn list_readable(&self) -> RepoResult<RecordListing> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BIRTHDAY_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut listing = RecordListing::default();

        while let Some(row) = rows.next()? {
            match parse_birthday_row(row) {
                Ok(record) => listing.records.push(record),
                Err(err) => {
                    let id = row.get::<_, String>("id").unwrap_or_default();
                    warn!(
                        "event=birthday_list module=repo status=error record_id={} error={}",
                        id, err
                    );
                    listing.rejected.push(RejectedRow {
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(listing)
    }

    fn delete(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM birthdays WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

pub(crate) fn parse_record_id(value: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid record id `{value}`")))
}

pub(crate) fn ensure_table(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::MissingRequiredTable(table))
    }
}

fn parse_birthday_row(row: &Row<'_>) -> RepoResult<BirthdayRecord> {
    let id_text: String = row.get("id")?;
    let id = parse_record_id(&id_text)?;

    let calendar_text: String = row.get("calendar")?;
    let calendar = parse_calendar(&calendar_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid calendar `{calendar_text}` in birthdays.calendar"
        ))
    })?;

    let leap_month = match row.get::<_, i64>("leap_month")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid leap_month value `{other}` in birthdays.leap_month"
            )));
        }
    };

    let record = BirthdayRecord {
        id,
        name: row.get("name")?,
        calendar,
        month: row.get("month")?,
        day: row.get("day")?,
        leap_month,
        note: row.get("note")?,
    };
    record.validate()?;
    Ok(record)
}

fn parse_calendar(value: &str) -> Option<CalendarKind> {
    match value {
        "solar" => Some(CalendarKind::Solar),
        "lunar" => Some(CalendarKind::Lunar),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
