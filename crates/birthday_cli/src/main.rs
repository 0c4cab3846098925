//! `birthday` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, load configuration and initialize logging.
//! - Read the local clock once and hand the day to command handlers.
//! - Map any failure to a message on stderr and exit code 1.

mod cli;
mod commands;
mod config;
mod sink;

use std::process;

use birthday_core::logging::{default_log_level, init_logging, init_stderr_logging};
use chrono::Local;
use clap::Parser;

use crate::cli::Cli;
use crate::commands::Context;
use crate::config::BirthdayConfig;

fn main() {
    let cli = Cli::parse();

    let config = match BirthdayConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("错误: {err}");
            process::exit(1);
        }
    };
    start_logging(&cli, &config);

    let ctx = Context {
        db_path: config.resolve_db_path(cli.db.as_deref()),
        config,
        today: Local::now().date_naive(),
    };
    if let Err(err) = commands::run(cli.command, &ctx) {
        eprintln!("错误: {err}");
        process::exit(1);
    }
}

/// `-v` flags win over the configured level; file logging falls back to the
/// build-mode default, console logging to `warn`.
fn start_logging(cli: &Cli, config: &BirthdayConfig) {
    let log_dir = cli.log_dir.as_ref().or(config.log_dir.as_ref());
    let fallback = if log_dir.is_some() {
        default_log_level()
    } else {
        "warn"
    };
    let level = match cli.verbose {
        0 => config.log_level.as_deref().unwrap_or(fallback),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let result = match log_dir {
        Some(dir) => init_logging(level, &dir.to_string_lossy()),
        None => init_stderr_logging(level),
    };
    if let Err(err) = result {
        eprintln!("warning: logging disabled: {err}");
    }
}
