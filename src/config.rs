use std::env;

use chrono::{FixedOffset, NaiveTime, Weekday};

/// Tuning knobs for the scheduler and the calendar grid. Hosts construct one
/// directly or pull overrides from the environment.
#[derive(Clone, Debug)]
pub struct ScheduleConfig {
    /// First slot of the calendar grid.
    pub day_start: NaiveTime,
    /// Start of the last slot of the grid.
    pub day_end: NaiveTime,
    pub slot_minutes: u32,
    pub week_start: Weekday,
    /// Tenant-local offset used to bucket bookings into calendar days.
    pub tz_offset: FixedOffset,
    /// Commit attempts before a contended write gives up.
    pub commit_retries: u32,
    /// How long after a confirmed lesson's end the no-show sweep waits.
    pub no_show_grace_minutes: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            day_end: NaiveTime::from_hms_opt(20, 30, 0).unwrap(),
            slot_minutes: 30,
            week_start: Weekday::Mon,
            tz_offset: FixedOffset::east_opt(0).unwrap(),
            commit_retries: 3,
            no_show_grace_minutes: 60,
        }
    }
}

impl ScheduleConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            day_start: env::var("SCHEDULE_DAY_START")
                .ok()
                .and_then(|v| NaiveTime::parse_from_str(&v, "%H:%M").ok())
                .unwrap_or(defaults.day_start),
            day_end: env::var("SCHEDULE_DAY_END")
                .ok()
                .and_then(|v| NaiveTime::parse_from_str(&v, "%H:%M").ok())
                .unwrap_or(defaults.day_end),
            slot_minutes: env::var("SCHEDULE_SLOT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&m| m > 0)
                .unwrap_or(defaults.slot_minutes),
            week_start: env::var("SCHEDULE_WEEK_START")
                .ok()
                .and_then(|v| parse_weekday(&v))
                .unwrap_or(defaults.week_start),
            tz_offset: env::var("SCHEDULE_TZ_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .and_then(|m| FixedOffset::east_opt(m * 60))
                .unwrap_or(defaults.tz_offset),
            commit_retries: env::var("SCHEDULE_COMMIT_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.commit_retries),
            no_show_grace_minutes: env::var("SCHEDULE_NO_SHOW_GRACE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.no_show_grace_minutes),
        }
    }

    /// Slot starts for one grid day, inclusive of `day_end`.
    pub fn slot_starts(&self) -> Vec<NaiveTime> {
        let step = chrono::Duration::minutes(self.slot_minutes as i64);
        let mut starts = Vec::new();
        let mut t = self.day_start;
        loop {
            starts.push(t);
            if t >= self.day_end {
                break;
            }
            let (next, wrapped) = t.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            t = next;
        }
        starts
    }
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}
