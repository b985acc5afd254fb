//! Schedule command - preview reactivation fire times

use crate::cli::check::load_config;
use crate::cli::error::HelpfulError;
use crate::cli::output::{format_instant, print_json};
use chrono::{DateTime, Utc};
use hacluster_cluster::ReactivationSchedule;
use hacluster_config::paths::resolve_config_path;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug)]
pub struct ScheduleArgs {
    /// Expression to preview; falls back to the config's schedule.
    pub expr: Option<String>,
    pub config: Option<PathBuf>,
    pub count: usize,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ScheduleOutput {
    expression: String,
    upcoming: Vec<DateTime<Utc>>,
}

pub fn run(args: ScheduleArgs) -> anyhow::Result<()> {
    let expression = match args.expr {
        Some(expr) => expr,
        None => {
            let path = resolve_config_path(args.config.as_deref());
            load_config(&path)?.reactivation_schedule
        }
    };

    let schedule = ReactivationSchedule::parse(&expression).map_err(|err| {
        HelpfulError::new(err.to_string()).with_suggestions([
            "TRY: Use Quartz layout: sec min hour day-of-month month day-of-week [year]",
            "TRY: Set exactly one of day-of-month and day-of-week to '?'",
            "TRY: Every minute on the minute: \"0 0/1 * 1/1 * ? *\"",
        ])
    })?;

    let output = ScheduleOutput {
        expression: schedule.expression().to_string(),
        upcoming: schedule.upcoming_after(&Utc::now(), args.count),
    };

    if args.json {
        return print_json(&output);
    }

    println!("Schedule: {}", output.expression);
    if output.upcoming.is_empty() {
        println!("  (no future fire times)");
    }
    for (i, instant) in output.upcoming.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, format_instant(instant));
    }
    Ok(())
}
