//! Configuration types and compiled defaults

use heapless::String;

use crate::power::NightWindow;

/// Maximum station identifier length in bytes
pub const MAX_STATION_ID_LEN: usize = 32;

const DEFAULT_STATION: &str = "Luzern";
const DEFAULT_STATION2: &str = "Zug";
const DEFAULT_LIMIT: u8 = 8;
const DEFAULT_OFFSET: u8 = 0;
const DEFAULT_BRIGHTNESS_INDEX: u8 = 4;

/// Night-dark window configuration, in wall-clock hours and minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NightConfig {
    pub enabled: bool,
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
    pub weekend_disable: bool,
}

impl Default for NightConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 22,
            start_minute: 0,
            end_hour: 7,
            end_minute: 0,
            weekend_disable: false,
        }
    }
}

impl NightConfig {
    /// Convert to the minutes-since-midnight window the state machine uses
    pub fn window(&self) -> NightWindow {
        NightWindow {
            enabled: self.enabled,
            start_min: self.start_hour as u16 * 60 + self.start_minute as u16,
            end_min: self.end_hour as u16 * 60 + self.end_minute as u16,
            weekend_disable: self.weekend_disable,
        }
    }
}

/// Complete persisted configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    /// Primary station identifier
    pub station_id: String<MAX_STATION_ID_LEN>,
    /// Secondary station, reached by double click
    pub station_id2: String<MAX_STATION_ID_LEN>,
    /// Stationboard result limit
    pub limit: u8,
    /// Minute offset added to the query datetime
    pub offset: u8,
    /// Boot index into the brightness level table
    pub brightness_index: u8,
    pub night: NightConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut station_id = String::new();
        let _ = station_id.push_str(DEFAULT_STATION);
        let mut station_id2 = String::new();
        let _ = station_id2.push_str(DEFAULT_STATION2);
        Self {
            station_id,
            station_id2,
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
            brightness_index: DEFAULT_BRIGHTNESS_INDEX,
            night: NightConfig::default(),
        }
    }
}

impl AppConfig {
    /// The station the board currently shows
    pub fn active_station(&self, secondary: bool) -> &str {
        if secondary {
            &self.station_id2
        } else {
            &self.station_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.station_id, "Luzern");
        assert_eq!(cfg.station_id2, "Zug");
        assert_eq!(cfg.limit, 8);
        assert_eq!(cfg.brightness_index, 4);
        assert!(!cfg.night.enabled);
        assert_eq!((cfg.night.start_hour, cfg.night.end_hour), (22, 7));
    }

    #[test]
    fn test_night_window_conversion() {
        let night = NightConfig {
            enabled: true,
            start_hour: 22,
            start_minute: 30,
            end_hour: 6,
            end_minute: 45,
            weekend_disable: true,
        };
        let w = night.window();
        assert!(w.enabled && w.weekend_disable);
        assert_eq!(w.start_min, 22 * 60 + 30);
        assert_eq!(w.end_min, 6 * 60 + 45);
    }

    #[test]
    fn test_active_station_selection() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.active_station(false), "Luzern");
        assert_eq!(cfg.active_station(true), "Zug");
    }
}
