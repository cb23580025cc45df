//! Wall-clock time for the time label.
//!
//! The panel has no RTC. Local time is extrapolated from the last weather
//! observation timestamp plus however long ago (monotonically) it arrived.

use std::fmt;
use std::time::Duration;

const SECONDS_PER_DAY: i64 = 86_400;

/// Hour and minute of the local day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockState {
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
}

impl ClockState {
    /// Local time from a unix timestamp, an offset from UTC, and the time
    /// elapsed since the timestamp was observed.
    pub fn from_observation(observed_at: i64, utc_offset_seconds: i32, elapsed: Duration) -> Self {
        let elapsed = i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX);
        let local = observed_at
            .saturating_add(elapsed)
            .saturating_add(i64::from(utc_offset_seconds));
        let second_of_day = local.rem_euclid(SECONDS_PER_DAY);
        Self {
            hour: (second_of_day / 3600) as u8,
            minute: (second_of_day % 3600 / 60) as u8,
        }
    }

    /// Hour on a 12-hour dial: 0 and 12 both show as 12.
    pub fn hour12(self) -> u8 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }
}

/// `HH:MM` on a 12-hour dial, zero padded, without an AM/PM suffix.
impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour12(), self.minute)
    }
}
