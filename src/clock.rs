use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Source of "now" for past-time checks. Injected so tests can pin time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the OS clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a chosen instant, advanceable from tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn fixed_clock_holds_and_advances() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let clock = FixedClock::at(t0);
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), t0 + Duration::minutes(90));

        clock.set(t0);
        assert_eq!(clock.now(), t0);
    }
}
