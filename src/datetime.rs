//! Clock and day-arithmetic helpers.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::{ManageMeError, Result};

/// Number of seconds in one day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Project an absolute unix timestamp onto a 24-hour cycle.
///
/// Uses Euclidean remainder so instants before the epoch still land in
/// `0..SECONDS_PER_DAY`.
pub fn seconds_of_day(timestamp: i64) -> i64 {
    timestamp.rem_euclid(SECONDS_PER_DAY)
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// The local wall-clock reading, reinterpreted as if it were UTC.
    ///
    /// Task windows are entered as wall-clock times, so a draft created at
    /// 09:00 local must read 09:00 on the day axis the server stores.
    fn wall_clock_as_utc(&self) -> i64;
}

/// Clock backed by the system time and a configured timezone.
#[derive(Debug, Clone)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    /// Create a clock for the given IANA timezone name (e.g. "Asia/Tokyo").
    pub fn new(timezone: &str) -> Result<Self> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|e| ManageMeError::Config(format!("unknown timezone {timezone}: {e}")))?;
        Ok(Self { tz })
    }

    /// Clock pinned to UTC.
    pub fn utc() -> Self {
        Self { tz: chrono_tz::UTC }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn wall_clock_as_utc(&self) -> i64 {
        wall_clock_in(self.now(), self.tz)
    }
}

/// Read `instant` on the wall clock of `tz` and return that reading as UTC seconds.
pub fn wall_clock_in(instant: DateTime<Utc>, tz: Tz) -> i64 {
    instant.with_timezone(&tz).naive_local().and_utc().timestamp()
}

/// Clock frozen at a fixed instant. Useful for tests and replays.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    tz: Tz,
}

impl FixedClock {
    /// Freeze the clock at `timestamp` (unix seconds), observed from `tz`.
    pub fn at(timestamp: i64, tz: Tz) -> Self {
        let instant = DateTime::from_timestamp(timestamp, 0).unwrap_or_default();
        Self { instant, tz }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn wall_clock_as_utc(&self) -> i64 {
        wall_clock_in(self.instant, self.tz)
    }
}
