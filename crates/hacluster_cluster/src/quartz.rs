//! Quartz cron grammar and fire-time search.
//!
//! Fields: seconds, minutes, hours, day-of-month, month, day-of-week and an
//! optional year. Day-of-week counts `1 = SUN` through `7 = SAT`. Exactly one
//! of the two day fields must be `?`.
//!
//! Beyond `*`, `,`, `-` and `/`, the day fields accept:
//! - `L`, `L-n`, `LW` and `nW` in day-of-month
//! - `L`, `xL` and `x#n` in day-of-week

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use std::collections::BTreeSet;

const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 2099;

const MONTH_NAMES: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const DAY_NAMES: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Bounds and symbolic names of one numeric field.
struct FieldSpec {
    label: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
}

const SECONDS: FieldSpec = FieldSpec { label: "seconds", min: 0, max: 59, names: &[] };
const MINUTES: FieldSpec = FieldSpec { label: "minutes", min: 0, max: 59, names: &[] };
const HOURS: FieldSpec = FieldSpec { label: "hours", min: 0, max: 23, names: &[] };
const DAY_OF_MONTH: FieldSpec = FieldSpec { label: "day-of-month", min: 1, max: 31, names: &[] };
const MONTH: FieldSpec = FieldSpec { label: "month", min: 1, max: 12, names: MONTH_NAMES };
const DAY_OF_WEEK: FieldSpec = FieldSpec { label: "day-of-week", min: 1, max: 7, names: DAY_NAMES };
const YEAR: FieldSpec = FieldSpec {
    label: "year",
    min: MIN_YEAR as u32,
    max: MAX_YEAR as u32,
    names: &[],
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum DayOfMonth {
    Unspecified,
    Days(BTreeSet<u32>),
    /// `L` or `L-n`: the last day of the month minus `offset`.
    Last { offset: u32 },
    /// `LW`
    LastWeekday,
    /// `nW`: the weekday closest to day `n` without leaving the month.
    NearestWeekday(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DayOfWeek {
    Unspecified,
    Days(BTreeSet<u32>),
    /// `xL`: the last such weekday of the month.
    Last(u32),
    /// `x#n`: the n-th such weekday of the month.
    Nth { day: u32, nth: u32 },
}

/// A parsed Quartz cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CronExpression {
    seconds: BTreeSet<u32>,
    minutes: BTreeSet<u32>,
    hours: BTreeSet<u32>,
    day_of_month: DayOfMonth,
    months: BTreeSet<u32>,
    day_of_week: DayOfWeek,
    /// `None` matches every year.
    years: Option<BTreeSet<u32>>,
}

impl CronExpression {
    pub(crate) fn parse(expression: &str) -> Result<Self, String> {
        let upper = expression.trim().to_uppercase();
        let fields: Vec<&str> = upper.split_whitespace().collect();
        if fields.len() != 6 && fields.len() != 7 {
            return Err(format!("expected 6 or 7 fields, found {}", fields.len()));
        }

        let day_of_month = parse_day_of_month(fields[3])?;
        let day_of_week = parse_day_of_week(fields[5])?;
        match (&day_of_month, &day_of_week) {
            (DayOfMonth::Unspecified, DayOfWeek::Unspecified) => {
                return Err("'?' may be used in only one of day-of-month and day-of-week".to_string())
            }
            (DayOfMonth::Unspecified, _) | (_, DayOfWeek::Unspecified) => {}
            _ => return Err("one of day-of-month and day-of-week must be '?'".to_string()),
        }

        let years = match fields.get(6) {
            None | Some(&"*") => None,
            Some(field) => Some(parse_values(field, &YEAR)?),
        };

        Ok(Self {
            seconds: parse_values(fields[0], &SECONDS)?,
            minutes: parse_values(fields[1], &MINUTES)?,
            hours: parse_values(fields[2], &HOURS)?,
            day_of_month,
            months: parse_values(fields[4], &MONTH)?,
            day_of_week,
            years,
        })
    }

    /// First fire time strictly after `instant`, at whole-second precision.
    pub(crate) fn next_after(&self, instant: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
        let start = instant.naive_utc().with_nanosecond(0)? + Duration::seconds(1);
        let mut date = start.date();
        let mut earliest = start.time();

        loop {
            if date.year() > MAX_YEAR {
                return None;
            }
            if let Some(years) = &self.years {
                let year = u32::try_from(date.year()).ok()?;
                let next_year = *years.range(year..).next()?;
                if next_year != year {
                    date = NaiveDate::from_ymd_opt(i32::try_from(next_year).ok()?, 1, 1)?;
                    earliest = midnight;
                    continue;
                }
            }
            if !self.months.contains(&date.month()) {
                date = first_of_next_month(date)?;
                earliest = midnight;
                continue;
            }
            if self.day_matches(date) {
                if let Some(time) = self.first_time_from(earliest) {
                    return Some(Utc.from_utc_datetime(&date.and_time(time)));
                }
            }
            date = date.succ_opt()?;
            earliest = midnight;
        }
    }

    fn first_time_from(&self, from: NaiveTime) -> Option<NaiveTime> {
        for &hour in self.hours.range(from.hour()..) {
            let same_hour = hour == from.hour();
            let minute_floor = if same_hour { from.minute() } else { 0 };
            for &minute in self.minutes.range(minute_floor..) {
                let second_floor = if same_hour && minute == from.minute() {
                    from.second()
                } else {
                    0
                };
                if let Some(&second) = self.seconds.range(second_floor..).next() {
                    return NaiveTime::from_hms_opt(hour, minute, second);
                }
            }
        }
        None
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let day = date.day();
        let last = last_day_of_month(date);

        let dom = match &self.day_of_month {
            DayOfMonth::Unspecified => true,
            DayOfMonth::Days(days) => days.contains(&day),
            DayOfMonth::Last { offset } => last.checked_sub(*offset) == Some(day),
            DayOfMonth::LastWeekday => nearest_weekday(date, last) == Some(day),
            DayOfMonth::NearestWeekday(target) => nearest_weekday(date, *target) == Some(day),
        };
        if !dom {
            return false;
        }

        let weekday = date.weekday().number_from_sunday();
        match &self.day_of_week {
            DayOfWeek::Unspecified => true,
            DayOfWeek::Days(days) => days.contains(&weekday),
            DayOfWeek::Last(target) => weekday == *target && day + 7 > last,
            DayOfWeek::Nth { day: target, nth } => weekday == *target && (day - 1) / 7 + 1 == *nth,
        }
    }
}

/// Parse a list of values, ranges and increments into the set it covers.
fn parse_values(field: &str, spec: &FieldSpec) -> Result<BTreeSet<u32>, String> {
    let mut values = BTreeSet::new();
    for part in field.split(',') {
        let (base, step) = match part.split_once('/') {
            Some((base, step)) => (base, Some(parse_step(step, spec)?)),
            None => (part, None),
        };

        let (start, end) = if base == "*" {
            (spec.min, spec.max)
        } else if let Some((from, to)) = base.split_once('-') {
            (parse_value(from, spec)?, parse_value(to, spec)?)
        } else {
            let value = parse_value(base, spec)?;
            match step {
                Some(_) => (value, spec.max),
                None => (value, value),
            }
        };

        let span: Vec<u32> = if start <= end {
            (start..=end).collect()
        } else {
            // Wrapping range such as `22-2` for hours or `FRI-MON`.
            (start..=spec.max).chain(spec.min..=end).collect()
        };
        values.extend(span.into_iter().step_by(step.unwrap_or(1) as usize));
    }
    Ok(values)
}

fn parse_step(raw: &str, spec: &FieldSpec) -> Result<u32, String> {
    let step: u32 = raw
        .parse()
        .map_err(|_| format!("invalid increment '{}' in {}", raw, spec.label))?;
    if step == 0 || step > spec.max {
        return Err(format!("increment {} is out of range for {}", step, spec.label));
    }
    Ok(step)
}

fn parse_value(raw: &str, spec: &FieldSpec) -> Result<u32, String> {
    if let Some(index) = spec.names.iter().position(|name| *name == raw) {
        return Ok(spec.min + index as u32);
    }
    let value: u32 = raw
        .parse()
        .map_err(|_| format!("invalid {} value '{}'", spec.label, raw))?;
    if value < spec.min || value > spec.max {
        return Err(format!(
            "{} value {} is outside {}-{}",
            spec.label, value, spec.min, spec.max
        ));
    }
    Ok(value)
}

fn parse_day_of_month(field: &str) -> Result<DayOfMonth, String> {
    match field {
        "?" => return Ok(DayOfMonth::Unspecified),
        "L" => return Ok(DayOfMonth::Last { offset: 0 }),
        "LW" => return Ok(DayOfMonth::LastWeekday),
        _ => {}
    }
    if let Some(offset) = field.strip_prefix("L-") {
        let offset: u32 = offset
            .parse()
            .map_err(|_| format!("invalid day-of-month offset '{}'", offset))?;
        if offset > 30 {
            return Err(format!("day-of-month offset {} is outside 0-30", offset));
        }
        return Ok(DayOfMonth::Last { offset });
    }
    if let Some(day) = field.strip_suffix('W') {
        return Ok(DayOfMonth::NearestWeekday(parse_value(day, &DAY_OF_MONTH)?));
    }
    if field.contains('L') || field.contains('W') {
        return Err(format!("'L' and 'W' cannot be combined with lists or ranges: '{}'", field));
    }
    parse_values(field, &DAY_OF_MONTH).map(DayOfMonth::Days)
}

fn parse_day_of_week(field: &str) -> Result<DayOfWeek, String> {
    match field {
        "?" => return Ok(DayOfWeek::Unspecified),
        // A bare `L` is the last day of the week.
        "L" => return Ok(DayOfWeek::Days(BTreeSet::from([DAY_OF_WEEK.max]))),
        _ => {}
    }
    if let Some(day) = field.strip_suffix('L') {
        return Ok(DayOfWeek::Last(parse_value(day, &DAY_OF_WEEK)?));
    }
    if let Some((day, nth)) = field.split_once('#') {
        let nth: u32 = nth
            .parse()
            .map_err(|_| format!("invalid day-of-week occurrence '{}'", nth))?;
        if !(1..=5).contains(&nth) {
            return Err(format!("day-of-week occurrence {} is outside 1-5", nth));
        }
        return Ok(DayOfWeek::Nth {
            day: parse_value(day, &DAY_OF_WEEK)?,
            nth,
        });
    }
    parse_values(field, &DAY_OF_WEEK).map(DayOfWeek::Days)
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    first_of_next_month(date)
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

/// The weekday closest to `target` in `date`'s month, never crossing into
/// a neighbouring month. `None` when the month has no such day.
fn nearest_weekday(date: NaiveDate, target: u32) -> Option<u32> {
    let last = last_day_of_month(date);
    let anchor = date.with_day(target)?;
    let day = match anchor.weekday() {
        Weekday::Sat if target == 1 => 3,
        Weekday::Sat => target - 1,
        Weekday::Sun if target == last => target - 2,
        Weekday::Sun => target + 1,
        _ => target,
    };
    Some(day)
}
