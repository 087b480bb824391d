//! Night-dark time window

use crate::clock::Weekday;

/// The configured night-dark window, in minutes since local midnight
///
/// `start >= end` means the window crosses midnight. The window is
/// re-evaluated every tick rather than edge-triggered, so clock corrections
/// (first sync, DST) are tolerated without special cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NightWindow {
    pub enabled: bool,
    pub start_min: u16,
    pub end_min: u16,
    /// Force the window inactive on Saturday and Sunday
    pub weekend_disable: bool,
}

impl NightWindow {
    /// A disabled window; used until configuration is loaded
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            start_min: 0,
            end_min: 0,
            weekend_disable: false,
        }
    }

    /// Is the window active at `minutes` since midnight on `weekday`?
    pub fn is_active(&self, minutes: u16, weekday: Weekday) -> bool {
        if !self.enabled {
            return false;
        }
        if self.weekend_disable && weekday.is_weekend() {
            return false;
        }
        if self.start_min < self.end_min {
            self.start_min <= minutes && minutes < self.end_min
        } else {
            minutes >= self.start_min || minutes < self.end_min
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crossing() -> NightWindow {
        // 22:00 .. 07:00
        NightWindow {
            enabled: true,
            start_min: 22 * 60,
            end_min: 7 * 60,
            weekend_disable: false,
        }
    }

    #[test]
    fn test_crossing_midnight_window() {
        let w = crossing();
        assert!(!w.is_active(21 * 60 + 59, Weekday::Tuesday));
        assert!(w.is_active(22 * 60, Weekday::Tuesday));
        assert!(w.is_active(23 * 60 + 59, Weekday::Tuesday));
        assert!(w.is_active(0, Weekday::Wednesday));
        assert!(w.is_active(6 * 60 + 59, Weekday::Wednesday));
        assert!(!w.is_active(7 * 60, Weekday::Wednesday));
        assert!(!w.is_active(12 * 60, Weekday::Wednesday));
    }

    #[test]
    fn test_same_day_window() {
        let w = NightWindow {
            enabled: true,
            start_min: 13 * 60,
            end_min: 14 * 60,
            weekend_disable: false,
        };
        assert!(!w.is_active(12 * 60 + 59, Weekday::Monday));
        assert!(w.is_active(13 * 60, Weekday::Monday));
        assert!(w.is_active(13 * 60 + 59, Weekday::Monday));
        assert!(!w.is_active(14 * 60, Weekday::Monday));
    }

    #[test]
    fn test_disabled_window_never_active() {
        let mut w = crossing();
        w.enabled = false;
        assert!(!w.is_active(23 * 60, Weekday::Tuesday));
    }

    #[test]
    fn test_weekend_exemption() {
        let mut w = crossing();
        w.weekend_disable = true;
        assert!(w.is_active(23 * 60, Weekday::Friday));
        assert!(!w.is_active(23 * 60, Weekday::Saturday));
        assert!(!w.is_active(23 * 60, Weekday::Sunday));
        assert!(w.is_active(23 * 60, Weekday::Monday));
    }
}
