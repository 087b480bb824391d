//! Simple TOML parser for the appliance configuration
//!
//! A minimal line-based parser for the subset `appliance.toml` uses:
//! `[section]` headers, `key = value` pairs (quoted strings, integers,
//! booleans), and `#` comments. Nothing else is supported; build.rs
//! validates the file with a full TOML parser on the host.

use heapless::String;

use abfahrt_core::config::AppConfig;

/// Maximum URL length in the `[api]` section
pub const MAX_URL_LEN: usize = 96;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Malformed section header
    InvalidSection,
    /// Line is neither a section, a comment, nor a key = value pair
    InvalidLine,
    /// Value does not fit its field or has the wrong type
    InvalidValue,
}

/// WiFi credentials and hostname
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetConfig {
    pub ssid: String<32>,
    pub password: String<64>,
    pub hostname: String<32>,
}

/// API endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    pub stationboard: String<MAX_URL_LEN>,
    pub price: String<MAX_URL_LEN>,
    pub ntp: String<48>,
}

/// Complete firmware configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmwareConfig {
    pub app: AppConfig,
    pub net: NetConfig,
    pub api: ApiConfig,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Station,
    Night,
    Display,
    Net,
    Api,
}

/// Parse `appliance.toml` content
pub fn parse_config(input: &str) -> Result<FirmwareConfig, ParseError> {
    let mut config = FirmwareConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = match &line[1..line.len() - 1] {
                "station" => Section::Station,
                "night" => Section::Night,
                "display" => Section::Display,
                "net" => Section::Net,
                "api" => Section::Api,
                _ => return Err(ParseError::InvalidSection),
            };
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidLine)?;
        let (key, value) = (key.trim(), strip_comment(value.trim()));
        apply(&mut config, section, key, value)?;
    }

    Ok(config)
}

/// Drop a trailing `# comment` outside of quotes
fn strip_comment(value: &str) -> &str {
    if value.starts_with('"') {
        return value;
    }
    match value.split_once('#') {
        Some((v, _)) => v.trim(),
        None => value,
    }
}

fn apply(
    config: &mut FirmwareConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match section {
        Section::Root => Err(ParseError::InvalidLine),
        Section::Station => match key {
            "id" => set_string(&mut config.app.station_id, value),
            "id2" => set_string(&mut config.app.station_id2, value),
            "limit" => set_int(&mut config.app.limit, value, 16),
            "offset" => set_int(&mut config.app.offset, value, 59),
            _ => Ok(()),
        },
        Section::Night => match key {
            "enabled" => set_bool(&mut config.app.night.enabled, value),
            "start_hour" => set_int(&mut config.app.night.start_hour, value, 23),
            "start_minute" => set_int(&mut config.app.night.start_minute, value, 59),
            "end_hour" => set_int(&mut config.app.night.end_hour, value, 23),
            "end_minute" => set_int(&mut config.app.night.end_minute, value, 59),
            "weekend_disable" => set_bool(&mut config.app.night.weekend_disable, value),
            _ => Ok(()),
        },
        Section::Display => match key {
            "brightness" => set_int(&mut config.app.brightness_index, value, 4),
            _ => Ok(()),
        },
        Section::Net => match key {
            "ssid" => set_string(&mut config.net.ssid, value),
            "password" => set_string(&mut config.net.password, value),
            "hostname" => set_string(&mut config.net.hostname, value),
            _ => Ok(()),
        },
        Section::Api => match key {
            "stationboard" => set_string(&mut config.api.stationboard, value),
            "price" => set_string(&mut config.api.price, value),
            "ntp" => set_string(&mut config.api.ntp, value),
            _ => Ok(()),
        },
    }
}

fn set_string<const N: usize>(field: &mut String<N>, value: &str) -> Result<(), ParseError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)?;
    field.clear();
    field.push_str(inner).map_err(|_| ParseError::InvalidValue)
}

fn set_int(field: &mut u8, value: &str, max: u8) -> Result<(), ParseError> {
    let n = value.parse::<u8>().map_err(|_| ParseError::InvalidValue)?;
    if n > max {
        return Err(ParseError::InvalidValue);
    }
    *field = n;
    Ok(())
}

fn set_bool(field: &mut bool, value: &str) -> Result<(), ParseError> {
    match value {
        "true" => *field = true,
        "false" => *field = false,
        _ => return Err(ParseError::InvalidValue),
    }
    Ok(())
}
