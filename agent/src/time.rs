use chrono::{DateTime, Local, TimeZone};

/// Wall clock used for the timestamp on the display.
pub trait TimeProvider {
    fn now() -> DateTime<Local>;
}

pub struct SystemClock;

impl TimeProvider for SystemClock {
    fn now() -> DateTime<Local> {
        Local::now()
    }
}

pub struct MockClock;

impl TimeProvider for MockClock {
    fn now() -> DateTime<Local> {
        // 9:05:07 local time, whatever the zone.
        Local
            .with_ymd_and_hms(2026, 10, 18, 9, 5, 7)
            .earliest()
            .unwrap()
    }
}
