//! Command handlers.
//!
//! Each handler opens the database it needs, delegates to core services and
//! prints plain-text results. The reference day is resolved once in `main`.

use std::error::Error;
use std::path::PathBuf;

use birthday_core::db::open_db;
use birthday_core::{
    parse_month_day, solar_to_lunar, BirthdayOccurrence, BirthdayPatch, BirthdayRecord,
    BirthdayService, BirthdaySummary, NewBirthday, NotifyOutcome, RejectedRow, ReminderService,
    ScheduleReport, SqliteBirthdayRepository, SqliteNotifyStateRepository,
};
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;

use crate::cli::{AddArgs, Command, DateArgs, DueArgs, EditArgs, RemoveArgs, UpcomingArgs};
use crate::config::BirthdayConfig;
use crate::sink::ConsoleSink;

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Inputs shared by every command.
pub struct Context {
    pub db_path: PathBuf,
    pub config: BirthdayConfig,
    pub today: NaiveDate,
}

impl Context {
    fn open(&self) -> Result<Connection, Box<dyn Error>> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(open_db(&self.db_path)?)
    }
}

pub fn run(command: Command, ctx: &Context) -> CommandResult {
    match command {
        Command::Add(args) => add(args, ctx),
        Command::List => list(ctx),
        Command::Edit(args) => edit(args, ctx),
        Command::Remove(args) => remove(args, ctx),
        Command::Due(args) => due(args, ctx),
        Command::Upcoming(args) => upcoming(args, ctx),
        Command::Stats(args) => stats(args, ctx),
        Command::Lunar(args) => lunar(args, ctx),
    }
}

fn add(args: AddArgs, ctx: &Context) -> CommandResult {
    let (month, day) = parse_month_day(&args.date, args.calendar)?;
    let conn = ctx.open()?;
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn)?);

    let record = service.add(NewBirthday {
        name: args.name,
        calendar: args.calendar,
        month,
        day,
        leap_month: args.leap_month,
        note: args.note,
    })?;
    println!(
        "已添加: [{}] {} {}",
        record.id,
        record.name,
        record.birthday_label()
    );
    Ok(())
}

fn list(ctx: &Context) -> CommandResult {
    let conn = ctx.open()?;
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn)?);

    let listing = service.list()?;
    if listing.records.is_empty() && listing.rejected.is_empty() {
        println!("暂无生日记录。");
        return Ok(());
    }
    for record in &listing.records {
        println!("{}", format_record(record));
    }
    print_rejected(&listing.rejected);
    Ok(())
}

fn edit(args: EditArgs, ctx: &Context) -> CommandResult {
    let conn = ctx.open()?;
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn)?);

    let month_day = match &args.date {
        Some(date) => {
            let calendar = match args.calendar {
                Some(calendar) => calendar,
                None => {
                    service
                        .get(args.id)?
                        .ok_or_else(|| format!("未找到 ID: {}", args.id))?
                        .calendar
                }
            };
            Some(parse_month_day(date, calendar)?)
        }
        None => None,
    };

    let record = service.edit(
        args.id,
        BirthdayPatch {
            name: args.name,
            calendar: args.calendar,
            month_day,
            leap_month: args.leap_month,
            note: args.note.map(Some),
        },
    )?;
    println!("已更新: {}", format_record(&record));
    Ok(())
}

fn remove(args: RemoveArgs, ctx: &Context) -> CommandResult {
    let conn = ctx.open()?;
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn)?);

    service.remove(args.id)?;
    println!("已删除 ID: {}", args.id);
    Ok(())
}

fn due(args: DueArgs, ctx: &Context) -> CommandResult {
    let target = args.date.unwrap_or(ctx.today);
    let once_per_day = args.notify_once_per_day || ctx.config.notify_once_per_day;
    let conn = ctx.open()?;
    let reminders = ReminderService::new(
        SqliteBirthdayRepository::try_new(&conn)?,
        SqliteNotifyStateRepository::try_new(&conn)?,
        ConsoleSink::stdout(),
    );

    let report = reminders.due_on(target)?;
    print_due(target, &report);

    if args.notify {
        let outcome = reminders.notify_due(target, once_per_day)?;
        info!(
            "event=cli_due module=cli status=ok sent={} once_per_day={}",
            matches!(outcome, NotifyOutcome::Sent { .. }),
            once_per_day
        );
        if outcome == NotifyOutcome::AlreadyNotified {
            println!("{target} 已通知过，跳过重复通知。");
        }
    }
    Ok(())
}

fn upcoming(args: UpcomingArgs, ctx: &Context) -> CommandResult {
    let start = args.date.unwrap_or(ctx.today);
    let days = args.days.unwrap_or(ctx.config.window_days);
    let conn = ctx.open()?;
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn)?);

    let report = service.upcoming_from(start, days)?;
    if report.occurrences.is_empty() {
        println!("从 {start} 起 {days} 天内没有生日提醒。");
    }
    for occurrence in &report.occurrences {
        println!("{}", format_occurrence(occurrence));
    }
    print_failures(&report);
    Ok(())
}

fn stats(args: DateArgs, ctx: &Context) -> CommandResult {
    let date = args.date.unwrap_or(ctx.today);
    let conn = ctx.open()?;
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn)?);

    let summary = service.summary(date)?;
    for line in format_summary(&summary) {
        println!("{line}");
    }
    for failure in &summary.failures {
        eprintln!("无法计算 [{}] 的生日: {}", failure.record_id, failure.error);
    }
    print_rejected(&summary.rejected);
    Ok(())
}

fn lunar(args: DateArgs, ctx: &Context) -> CommandResult {
    let date = args.date.unwrap_or(ctx.today);
    let lunar = solar_to_lunar(date)?;
    println!("{date} 农历 {lunar}");
    Ok(())
}

fn print_due(target: NaiveDate, report: &ScheduleReport) {
    if report.occurrences.is_empty() {
        println!("{target} 没有生日提醒。");
    } else {
        println!("{target} 今天过生日: {}", report.joined_names());
        for occurrence in &report.occurrences {
            println!(
                "- {} ({})",
                occurrence.record.name,
                occurrence.record.birthday_label()
            );
        }
    }
    print_failures(report);
}

fn print_failures(report: &ScheduleReport) {
    for failure in &report.failures {
        eprintln!("无法计算 [{}] 的生日: {}", failure.record_id, failure.error);
    }
    print_rejected(&report.rejected);
}

fn print_rejected(rejected: &[RejectedRow]) {
    for row in rejected {
        eprintln!("无法读取记录 [{}]: {}", row.id, row.reason);
    }
}

fn format_record(record: &BirthdayRecord) -> String {
    let mut line = format!(
        "[{}] {} | {}",
        record.id,
        record.name,
        record.birthday_label()
    );
    if let Some(note) = &record.note {
        line.push_str(&format!(" | 备注: {note}"));
    }
    line
}

fn format_occurrence(occurrence: &BirthdayOccurrence) -> String {
    let when = match occurrence.days_until {
        0 => "今天".to_string(),
        days => format!("{days} 天后"),
    };
    format!(
        "{} - {} ({}) {when}",
        occurrence.solar_date,
        occurrence.record.name,
        occurrence.record.birthday_label()
    )
}

fn format_summary(summary: &BirthdaySummary) -> Vec<String> {
    let mut lines = vec![format!(
        "共 {} 人（阳历 {}，农历 {}）",
        summary.total, summary.solar, summary.lunar
    )];
    lines.extend(
        summary
            .months
            .iter()
            .map(|bucket| format!("{}-{:02}: {}", bucket.year, bucket.month, bucket.count)),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::{format_occurrence, format_record, format_summary};
    use birthday_core::{
        BirthdayDescriptor, BirthdayOccurrence, BirthdayRecord, BirthdaySummary, MonthBucket,
    };
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn record(note: Option<&str>) -> BirthdayRecord {
        BirthdayRecord::with_id(
            Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap(),
            "妈妈",
            BirthdayDescriptor::lunar(4, 12, true),
            note.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn record_line_includes_note_only_when_present() {
        assert_eq!(
            format_record(&record(None)),
            "[11111111-2222-4333-8444-555555555555] 妈妈 | 农历 04-12 (闰月)"
        );
        assert_eq!(
            format_record(&record(Some("花"))),
            "[11111111-2222-4333-8444-555555555555] 妈妈 | 农历 04-12 (闰月) | 备注: 花"
        );
    }

    #[test]
    fn occurrence_line_shows_date_and_distance() {
        let occurrence = BirthdayOccurrence {
            record: record(None),
            solar_date: NaiveDate::from_ymd_opt(2020, 6, 3).unwrap(),
            year: 2020,
            days_until: 5,
        };
        assert_eq!(
            format_occurrence(&occurrence),
            "2020-06-03 - 妈妈 (农历 04-12 (闰月)) 5 天后"
        );

        let today = BirthdayOccurrence {
            days_until: 0,
            ..occurrence
        };
        assert!(format_occurrence(&today).ends_with("今天"));
    }

    #[test]
    fn summary_lists_totals_then_months() {
        let summary = BirthdaySummary {
            total: 3,
            solar: 1,
            lunar: 2,
            months: vec![
                MonthBucket {
                    year: 2024,
                    month: 12,
                    count: 2,
                },
                MonthBucket {
                    year: 2025,
                    month: 1,
                    count: 0,
                },
            ],
            failures: Vec::new(),
            rejected: Vec::new(),
        };
        assert_eq!(
            format_summary(&summary),
            vec!["共 3 人（阳历 1，农历 2）", "2024-12: 2", "2025-01: 0"]
        );
    }
}
