//! Local time arithmetic
//!
//! Converts an SNTP-synced UTC epoch to Swiss local time with the compiled-in
//! European DST rule: UTC+2 from the last Sunday of March, UTC+1 from the
//! last Sunday of October, both switching at 01:00 UTC. Plain integer math,
//! no calendar library.

use core::fmt::Write;

use heapless::String;

/// Month abbreviations for the footer date line
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WINTER_OFFSET_S: i64 = 3600; // UTC+1
const SUMMER_OFFSET_S: i64 = 7200; // UTC+2

/// Day of week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// True on Saturday and Sunday
    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }

    fn from_days(days: i64) -> Self {
        // 1970-01-01 was a Thursday
        match (days + 3).rem_euclid(7) {
            0 => Weekday::Monday,
            1 => Weekday::Tuesday,
            2 => Weekday::Wednesday,
            3 => Weekday::Thursday,
            4 => Weekday::Friday,
            5 => Weekday::Saturday,
            _ => Weekday::Sunday,
        }
    }
}

/// A civil local date and time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub weekday: Weekday,
}

impl LocalTime {
    /// Convert a UTC epoch to Swiss local time
    pub fn from_utc_epoch(epoch: i64) -> Self {
        let local = epoch + utc_offset_secs(epoch);
        let days = local.div_euclid(86_400);
        let secs = local.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        Self {
            year,
            month,
            day,
            hour: (secs / 3600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
            weekday: Weekday::from_days(days),
        }
    }

    /// Minutes since local midnight; the night-window unit
    pub fn minutes_since_midnight(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// "HH:MM"
    pub fn format_hhmm(&self) -> String<8> {
        let mut s = String::new();
        let _ = write!(s, "{:02}:{:02}", self.hour, self.minute);
        s
    }

    /// "YYYY-MM-DD HH:MM" for the stationboard datetime parameter
    pub fn format_query(&self) -> String<20> {
        let mut s = String::new();
        let _ = write!(
            s,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        );
        s
    }

    /// "HH:MM - D. Mon YYYY" for the footer
    pub fn format_footer(&self) -> String<24> {
        let mut s = String::new();
        let month = MONTHS[(self.month as usize - 1).min(11)];
        let _ = write!(
            s,
            "{:02}:{:02} - {}. {} {}",
            self.hour, self.minute, self.day, month, self.year
        );
        s
    }
}

/// Wall clock anchored at the last SNTP sync
///
/// Before the first sync `local()` is `None`; the night window and the query
/// datetime parameter both treat that as "unknown, act as if inactive".
#[derive(Debug, Default, Clone, Copy)]
pub struct WallClock {
    epoch_at_sync: Option<i64>,
    synced_at_ms: u64,
}

impl WallClock {
    /// Create an unsynced clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sync result against the monotonic millisecond clock
    pub fn sync(&mut self, epoch: i64, now_ms: u64) {
        self.epoch_at_sync = Some(epoch);
        self.synced_at_ms = now_ms;
    }

    /// True once at least one sync has landed
    pub fn is_synced(&self) -> bool {
        self.epoch_at_sync.is_some()
    }

    /// Current UTC epoch, if synced
    pub fn utc_epoch(&self, now_ms: u64) -> Option<i64> {
        let epoch = self.epoch_at_sync?;
        Some(epoch + (now_ms.saturating_sub(self.synced_at_ms) / 1000) as i64)
    }

    /// Current local time, if synced
    pub fn local(&self, now_ms: u64) -> Option<LocalTime> {
        self.utc_epoch(now_ms).map(LocalTime::from_utc_epoch)
    }
}

/// UTC offset in seconds for a given UTC instant (EU DST rule)
fn utc_offset_secs(epoch: i64) -> i64 {
    let (year, _, _) = civil_from_days(epoch.div_euclid(86_400));
    // Both transitions happen at 01:00 UTC
    let summer_start = days_from_civil(year, 3, last_sunday(year, 3)) * 86_400 + 3_600;
    let summer_end = days_from_civil(year, 10, last_sunday(year, 10)) * 86_400 + 3_600;
    if epoch >= summer_start && epoch < summer_end {
        SUMMER_OFFSET_S
    } else {
        WINTER_OFFSET_S
    }
}

/// Day of month of the last Sunday in `month`
fn last_sunday(year: i32, month: u8) -> u8 {
    let last_day = days_in_month(year, month);
    let days = days_from_civil(year, month, last_day);
    let back = match Weekday::from_days(days) {
        Weekday::Sunday => 0,
        Weekday::Monday => 1,
        Weekday::Tuesday => 2,
        Weekday::Wednesday => 3,
        Weekday::Thursday => 4,
        Weekday::Friday => 5,
        Weekday::Saturday => 6,
    };
    last_day - back
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

/// Days since 1970-01-01 for a civil date (Howard Hinnant's algorithm)
fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = year as i64 - if month <= 2 { 1 } else { 0 };
    let m = month as i64;
    let d = day as i64;
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Civil date from days since 1970-01-01 (inverse of `days_from_civil`)
fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    (if m <= 2 { y + 1 } else { y } as i32, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-01 12:00:00 UTC, a Friday in winter time
    const WINTER_NOON: i64 = 1_709_294_400;

    #[test]
    fn test_winter_time_is_utc_plus_one() {
        let t = LocalTime::from_utc_epoch(WINTER_NOON);
        assert_eq!((t.year, t.month, t.day), (2024, 3, 1));
        assert_eq!(t.hour, 13);
        assert_eq!(t.weekday, Weekday::Friday);
    }

    #[test]
    fn test_dst_spring_transition() {
        // Last Sunday of March 2025 is the 30th; switch at 01:00 UTC
        let before = days_from_civil(2025, 3, 30) * 86_400 + 3_599;
        let after = before + 1;
        assert_eq!(LocalTime::from_utc_epoch(before).hour, 1); // 01:59:59 CET
        assert_eq!(LocalTime::from_utc_epoch(after).hour, 3); // 03:00:00 CEST
    }

    #[test]
    fn test_dst_autumn_transition() {
        // Last Sunday of October 2025 is the 26th
        let before = days_from_civil(2025, 10, 26) * 86_400 + 3_599;
        let after = before + 1;
        assert_eq!(LocalTime::from_utc_epoch(before).hour, 2); // 02:59:59 CEST
        assert_eq!(LocalTime::from_utc_epoch(after).hour, 2); // 02:00:00 CET
    }

    #[test]
    fn test_civil_round_trip() {
        for days in [-1, 0, 1, 19_000, 20_500] {
            let (y, m, d) = civil_from_days(days);
            assert_eq!(days_from_civil(y, m, d), days);
        }
    }

    #[test]
    fn test_query_and_footer_formats() {
        let t = LocalTime::from_utc_epoch(WINTER_NOON);
        assert_eq!(t.format_query(), "2024-03-01 13:00");
        assert_eq!(t.format_hhmm(), "13:00");
        assert_eq!(t.format_footer(), "13:00 - 1. Mar 2024");
        assert_eq!(t.minutes_since_midnight(), 13 * 60);
    }

    #[test]
    fn test_wall_clock_advances_with_monotonic_time() {
        let mut clock = WallClock::new();
        assert!(clock.local(5_000).is_none());

        clock.sync(WINTER_NOON, 10_000);
        let t = clock.local(70_000).unwrap();
        assert_eq!(t.minutes_since_midnight(), 13 * 60 + 1);
    }
}
