//! Cron-style cadence for automatic replica reactivation.
//!
//! Expressions use the Quartz layout: seconds, minutes, hours, day of month,
//! month, day of week and an optional year. `?` stands for "no specific
//! value" in one of the day fields, so the default `0 0/1 * 1/1 * ? *` fires
//! every minute on the minute. `L`, `W`, `LW` and `#` are supported.

use crate::error::ScheduleError;
use crate::quartz::CronExpression;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// A parsed reactivation schedule.
///
/// Two schedules are equal when their source expressions are equal.
#[derive(Clone)]
pub struct ReactivationSchedule {
    expression: String,
    cron: CronExpression,
}

impl ReactivationSchedule {
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(ScheduleError {
                expression: expression.to_string(),
                reason: "expression is empty".to_string(),
            });
        }
        let cron = CronExpression::parse(trimmed).map_err(|reason| ScheduleError {
            expression: expression.to_string(),
            reason,
        })?;
        Ok(Self {
            expression: trimmed.to_string(),
            cron,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `instant`, if the schedule fires again.
    pub fn next_after(&self, instant: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.cron.next_after(instant)
    }

    /// The next `count` fire times after `instant`.
    pub fn upcoming_after(&self, instant: &DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        let mut upcoming = Vec::with_capacity(count);
        let mut cursor = *instant;
        while upcoming.len() < count {
            match self.cron.next_after(&cursor) {
                Some(next) => {
                    upcoming.push(next);
                    cursor = next;
                }
                None => break,
            }
        }
        upcoming
    }

    /// True when the schedule has no fire time after `instant`.
    pub fn is_exhausted_after(&self, instant: &DateTime<Utc>) -> bool {
        self.next_after(instant).is_none()
    }
}

impl FromStr for ReactivationSchedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for ReactivationSchedule {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

impl Eq for ReactivationSchedule {}

impl fmt::Debug for ReactivationSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReactivationSchedule")
            .field(&self.expression)
            .finish()
    }
}

impl fmt::Display for ReactivationSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}
