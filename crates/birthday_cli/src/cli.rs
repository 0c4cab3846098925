use std::path::PathBuf;

use birthday_core::CalendarKind;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Birthday reminder for solar and lunar birthdays.
#[derive(Parser)]
#[command(
    name = "birthday",
    version,
    about = "好友生日提醒工具（支持农历/阳历）"
)]
pub struct Cli {
    /// SQLite database path (overrides config and `BIRTHDAY_DB_PATH`).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Add a birthday.
    Add(AddArgs),
    /// List all birthdays in insertion order.
    List,
    /// Edit fields of an existing birthday.
    Edit(EditArgs),
    /// Remove a birthday by ID.
    Remove(RemoveArgs),
    /// Show birthdays observed on a day, optionally sending a reminder.
    Due(DueArgs),
    /// Show birthdays within the next N days.
    Upcoming(UpcomingArgs),
    /// Show counts by calendar and by month for the coming year.
    Stats(DateArgs),
    /// Show the lunar date of a solar day.
    Lunar(DateArgs),
}

/// Arguments for the `add` subcommand.
#[derive(clap::Args)]
pub struct AddArgs {
    /// Friend's name.
    #[arg(long)]
    pub name: String,

    /// Calendar: solar/lunar or 阳历/农历.
    #[arg(long, value_parser = parse_calendar)]
    pub calendar: CalendarKind,

    /// Birthday as MM-DD.
    #[arg(long)]
    pub date: String,

    /// Lunar only: the birthday is in a leap month.
    #[arg(long = "leap-month")]
    pub leap_month: bool,

    /// Free-form note.
    #[arg(long)]
    pub note: Option<String>,
}

/// Arguments for the `edit` subcommand.
#[derive(clap::Args)]
pub struct EditArgs {
    /// Birthday record ID.
    #[arg(long)]
    pub id: Uuid,

    /// New name.
    #[arg(long)]
    pub name: Option<String>,

    /// New calendar: solar/lunar or 阳历/农历.
    #[arg(long, value_parser = parse_calendar)]
    pub calendar: Option<CalendarKind>,

    /// New birthday as MM-DD.
    #[arg(long)]
    pub date: Option<String>,

    /// New leap month flag (lunar only).
    #[arg(long = "leap-month")]
    pub leap_month: Option<bool>,

    /// New note; an empty value clears it.
    #[arg(long)]
    pub note: Option<String>,
}

/// Arguments for the `remove` subcommand.
#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Birthday record ID.
    #[arg(long)]
    pub id: Uuid,
}

/// Arguments for the `due` subcommand.
#[derive(clap::Args)]
pub struct DueArgs {
    /// Target day as YYYY-MM-DD (default: today).
    #[arg(long, value_parser = parse_iso_date)]
    pub date: Option<NaiveDate>,

    /// Also send a reminder.
    #[arg(long)]
    pub notify: bool,

    /// Remind each person at most once per day (with --notify).
    #[arg(long = "notify-once-per-day")]
    pub notify_once_per_day: bool,
}

/// Arguments for the `upcoming` subcommand.
#[derive(clap::Args)]
pub struct UpcomingArgs {
    /// Window length in days (default from config, otherwise 30).
    #[arg(long)]
    pub days: Option<u32>,

    /// Start day as YYYY-MM-DD (default: today).
    #[arg(long, value_parser = parse_iso_date)]
    pub date: Option<NaiveDate>,
}

/// Arguments carrying an optional reference day.
#[derive(clap::Args)]
pub struct DateArgs {
    /// Day as YYYY-MM-DD (default: today).
    #[arg(long, value_parser = parse_iso_date)]
    pub date: Option<NaiveDate>,
}

fn parse_calendar(value: &str) -> Result<CalendarKind, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn parse_iso_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("date must be formatted as YYYY-MM-DD, got `{value}`"))
}
