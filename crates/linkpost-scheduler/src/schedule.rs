//! Frequency → cron mapping. All times are UTC.

use chrono::{DateTime, Utc};
use linkpost_core::types::Frequency;
use serde::Serialize;

use crate::cron;

/// Every day at 08:15.
pub const DAILY_CRON: &str = "15 8 * * *";
/// Mondays at 09:00.
pub const WEEKLY_CRON: &str = "0 9 * * 1";
/// Days 1, 15 and 29 of each month at 09:00.
pub const BIWEEKLY_CRON: &str = "0 9 */14 * *";
/// First of the month at 09:00.
pub const MONTHLY_CRON: &str = "0 9 1 * *";

/// A frequency together with its fixed cron expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSpec {
    pub frequency: Frequency,
    pub cron: &'static str,
}

impl ScheduleSpec {
    pub fn for_frequency(frequency: Frequency) -> Self {
        let cron = match frequency {
            Frequency::Daily => DAILY_CRON,
            Frequency::Weekly => WEEKLY_CRON,
            Frequency::BiWeekly => BIWEEKLY_CRON,
            Frequency::Monthly => MONTHLY_CRON,
        };
        Self { frequency, cron }
    }

    /// Case-insensitive label lookup; unknown labels map to Weekly.
    pub fn from_label(label: &str) -> Self {
        Self::for_frequency(Frequency::parse_lenient(label))
    }

    /// Next firing strictly after `after`.
    pub fn next_run(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        cron::next_run_from_cron(self.cron, after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Weekday};

    #[test]
    fn test_canonical_table() {
        assert_eq!(ScheduleSpec::from_label("Daily").cron, "15 8 * * *");
        assert_eq!(ScheduleSpec::from_label("weekly").cron, "0 9 * * 1");
        assert_eq!(ScheduleSpec::from_label("BIWEEKLY").cron, "0 9 */14 * *");
        assert_eq!(ScheduleSpec::from_label("Monthly").cron, "0 9 1 * *");
    }

    #[test]
    fn test_unknown_label_is_weekly() {
        let spec = ScheduleSpec::from_label("hourly");
        assert_eq!(spec.frequency, Frequency::Weekly);
        assert_eq!(spec.cron, WEEKLY_CRON);
    }

    #[test]
    fn test_every_cron_parses() {
        for cron in [DAILY_CRON, WEEKLY_CRON, BIWEEKLY_CRON, MONTHLY_CRON] {
            assert!(cron::CronSchedule::parse(cron).is_some(), "{cron}");
        }
    }

    #[test]
    fn test_next_runs() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 12, 0, 0).unwrap();

        let daily = ScheduleSpec::for_frequency(Frequency::Daily).next_run(after).unwrap();
        assert_eq!(daily, Utc.with_ymd_and_hms(2026, 2, 23, 8, 15, 0).unwrap());

        let weekly = ScheduleSpec::for_frequency(Frequency::Weekly).next_run(after).unwrap();
        assert_eq!(weekly.weekday(), Weekday::Mon);

        let monthly = ScheduleSpec::for_frequency(Frequency::Monthly).next_run(after).unwrap();
        assert_eq!(monthly, Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());

        let biweekly = ScheduleSpec::for_frequency(Frequency::BiWeekly).next_run(after).unwrap();
        assert_eq!(biweekly, Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_serializes_for_status() {
        let json = serde_json::to_value(ScheduleSpec::for_frequency(Frequency::Daily)).unwrap();
        assert_eq!(json["frequency"], "Daily");
        assert_eq!(json["cron"], "15 8 * * *");
    }
}
