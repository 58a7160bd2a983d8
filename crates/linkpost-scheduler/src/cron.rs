//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds), evaluated in UTC.
//! Each field accepts `*`, `*/N`, `N`, `A-B`, `A-B/N` and comma lists of those.
//! Example: "0 9 * * 1" = Mondays at 09:00
//!
//! Day-of-month and day-of-week follow Vixie cron: when both are restricted a
//! day matches if either matches.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use std::collections::BTreeSet;

/// Upper bound for the next-run search.
const MAX_SEARCH_DAYS: i64 = 4 * 366;

/// A parsed five-field cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    minutes: BTreeSet<u32>,
    hours: BTreeSet<u32>,
    days_of_month: BTreeSet<u32>,
    months: BTreeSet<u32>,
    /// 0 = Sunday.
    days_of_week: BTreeSet<u32>,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronSchedule {
    /// Parse an expression, `None` when any field is malformed or out of range.
    pub fn parse(expression: &str) -> Option<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return None;
        }

        let days_of_week = parse_field(parts[4], 0, 7)?
            .into_iter()
            .map(|d| d % 7)
            .collect();

        Some(Self {
            minutes: parse_field(parts[0], 0, 59)?,
            hours: parse_field(parts[1], 0, 23)?,
            days_of_month: parse_field(parts[2], 1, 31)?,
            months: parse_field(parts[3], 1, 12)?,
            days_of_week,
            dom_restricted: !parts[2].starts_with('*'),
            dow_restricted: !parts[4].starts_with('*'),
        })
    }

    fn day_matches(&self, day: NaiveDate) -> bool {
        if !self.months.contains(&day.month()) {
            return false;
        }
        let dom = self.days_of_month.contains(&day.day());
        let dow = self
            .days_of_week
            .contains(&day.weekday().num_days_from_sunday());

        if self.dom_restricted && self.dow_restricted {
            dom || dow
        } else {
            dom && dow
        }
    }

    /// Whether `at` (truncated to the minute) is a firing time.
    pub fn matches(&self, at: DateTime<Utc>) -> bool {
        self.day_matches(at.date_naive())
            && self.hours.contains(&at.hour())
            && self.minutes.contains(&at.minute())
    }

    /// First firing time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start = (after + Duration::minutes(1))
            .with_second(0)?
            .with_nanosecond(0)?;
        let mut day = start.date_naive();
        let last_day = day + Duration::days(MAX_SEARCH_DAYS);

        while day <= last_day {
            if self.day_matches(day) {
                for &hour in &self.hours {
                    for &minute in &self.minutes {
                        let candidate = day.and_hms_opt(hour, minute, 0)?.and_utc();
                        if candidate >= start {
                            return Some(candidate);
                        }
                    }
                }
            }
            day = day.succ_opt()?;
        }
        None
    }
}

/// Parse a cron expression and compute the next run time after `after`.
pub fn next_run_from_cron(expression: &str, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let Some(schedule) = CronSchedule::parse(expression) else {
        tracing::warn!(
            "Invalid cron expression: '{}' (need 5 fields: MIN HOUR DOM MON DOW)",
            expression
        );
        return None;
    };
    schedule.next_after(after)
}

/// Parse a cron field into the set of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<BTreeSet<u32>> {
    let mut values = BTreeSet::new();
    for item in field.split(',') {
        values.extend(parse_item(item.trim(), min, max)?);
    }
    if values.is_empty() { None } else { Some(values) }
}

/// One list item: `*`, `N`, `A-B`, optionally followed by `/STEP`.
fn parse_item(item: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => {
            let step: u32 = step.parse().ok()?;
            if step == 0 {
                return None;
            }
            (range, step)
        }
        None => (item, 1),
    };

    let (lo, hi) = if range == "*" {
        (min, max)
    } else if let Some((a, b)) = range.split_once('-') {
        (a.parse().ok()?, b.parse().ok()?)
    } else {
        let n: u32 = range.parse().ok()?;
        // "N/STEP" runs from N to the end of the range.
        if item.contains('/') { (n, max) } else { (n, n) }
    };

    if lo < min || hi > max || lo > hi {
        return None;
    }
    Some((lo..=hi).step_by(step as usize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_every_hour() {
        let next = next_run_from_cron("0 * * * *", at(2026, 2, 22, 10, 30)).unwrap();
        assert_eq!(next, at(2026, 2, 22, 11, 0));
    }

    #[test]
    fn test_specific_time_rolls_to_next_day() {
        let next = next_run_from_cron("15 8 * * *", at(2026, 2, 22, 9, 0)).unwrap();
        assert_eq!(next, at(2026, 2, 23, 8, 15));
    }

    #[test]
    fn test_strictly_after() {
        let next = next_run_from_cron("15 8 * * *", at(2026, 2, 22, 8, 15)).unwrap();
        assert_eq!(next, at(2026, 2, 23, 8, 15));
    }

    #[test]
    fn test_every_15_minutes() {
        let next = next_run_from_cron("*/15 * * * *", at(2026, 2, 22, 10, 2)).unwrap();
        assert_eq!(next.minute(), 15);
    }

    #[test]
    fn test_day_of_week() {
        // 2026-02-22 is a Sunday.
        let next = next_run_from_cron("0 9 * * 1", at(2026, 2, 22, 12, 0)).unwrap();
        assert_eq!(next, at(2026, 2, 23, 9, 0));
        assert_eq!(next.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_sunday_as_seven() {
        let next = next_run_from_cron("0 0 * * 7", at(2026, 2, 23, 0, 0)).unwrap();
        assert_eq!(next.weekday(), Weekday::Sun);
    }

    #[test]
    fn test_day_of_month_step() {
        let schedule = CronSchedule::parse("0 9 */14 * *").unwrap();
        assert_eq!(schedule.next_after(at(2026, 3, 2, 0, 0)), Some(at(2026, 3, 15, 9, 0)));
        assert_eq!(schedule.next_after(at(2026, 3, 15, 9, 0)), Some(at(2026, 3, 29, 9, 0)));
        assert_eq!(schedule.next_after(at(2026, 3, 29, 9, 0)), Some(at(2026, 4, 1, 9, 0)));
    }

    #[test]
    fn test_first_of_month() {
        let next = next_run_from_cron("0 9 1 * *", at(2026, 12, 5, 0, 0)).unwrap();
        assert_eq!(next, at(2027, 1, 1, 9, 0));
    }

    #[test]
    fn test_ranges_and_lists() {
        let schedule = CronSchedule::parse("0,30 9-10 * * 1-5").unwrap();
        assert!(schedule.matches(at(2026, 2, 23, 9, 30)));
        assert!(schedule.matches(at(2026, 2, 23, 10, 0)));
        assert!(!schedule.matches(at(2026, 2, 23, 11, 0)));
        // Saturday
        assert!(!schedule.matches(at(2026, 2, 28, 9, 0)));
    }

    #[test]
    fn test_dom_dow_or_semantics() {
        // 13th of the month OR any Friday.
        let schedule = CronSchedule::parse("0 0 13 * 5").unwrap();
        // 2026-04-13 is a Monday, 2026-03-06 a Friday.
        assert!(schedule.matches(at(2026, 4, 13, 0, 0)));
        assert!(schedule.matches(at(2026, 3, 6, 0, 0)));
        assert!(!schedule.matches(at(2026, 3, 7, 0, 0)));
    }

    #[test]
    fn test_month_field() {
        let next = next_run_from_cron("0 0 1 6 *", at(2026, 7, 1, 0, 0)).unwrap();
        assert_eq!(next, at(2027, 6, 1, 0, 0));
    }

    #[test]
    fn test_impossible_date_is_none() {
        assert!(next_run_from_cron("0 0 31 2 *", at(2026, 1, 1, 0, 0)).is_none());
    }

    #[test]
    fn test_invalid_expression() {
        let after = Utc::now();
        assert!(next_run_from_cron("bad", after).is_none());
        assert!(next_run_from_cron("60 * * * *", after).is_none());
        assert!(next_run_from_cron("*/0 * * * *", after).is_none());
        assert!(next_run_from_cron("0 5-3 * * *", after).is_none());
        assert!(next_run_from_cron("0 0 0 * *", after).is_none());
    }
}
