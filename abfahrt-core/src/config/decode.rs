//! Persisted-configuration JSON decode and encode
//!
//! The document is one flat object; every recognized field overrides the
//! compiled default independently, unknown fields are ignored, and values
//! that fail to parse or exceed their range leave the default in place. A
//! syntax error keeps the fields applied before it.

use core::fmt::Write;

use heapless::String;

use super::types::AppConfig;
use crate::json::{JsonError, JsonEvent, PathTracker, Tokenizer};

/// Maximum encoded configuration document length
pub const MAX_CONFIG_DOC_LEN: usize = 384;

/// Push-based configuration decoder
#[derive(Debug, Default)]
pub struct ConfigDecoder {
    tokenizer: Tokenizer,
    path: PathTracker,
    cfg: AppConfig,
}

impl ConfigDecoder {
    /// Start from compiled defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration; present fields override it
    pub fn with_base(cfg: AppConfig) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    /// Feed one byte of the document
    pub fn feed(&mut self, byte: u8) -> Result<(), JsonError> {
        self.tokenizer.feed(byte)?;
        while let Some(event) = self.tokenizer.next_event() {
            if let JsonEvent::Scalar(value) = &event {
                self.on_scalar(value);
            }
            self.path.observe(&event);
        }
        Ok(())
    }

    /// The decoded configuration
    pub fn finish(self) -> AppConfig {
        self.cfg
    }

    fn on_scalar(&mut self, value: &str) {
        let cfg = &mut self.cfg;
        if self.path.matches("/station_id") {
            set_string(&mut cfg.station_id, value);
        } else if self.path.matches("/station_id2") {
            set_string(&mut cfg.station_id2, value);
        } else if self.path.matches("/limit") {
            set_u8(&mut cfg.limit, value, 16);
        } else if self.path.matches("/offset") {
            set_u8(&mut cfg.offset, value, 59);
        } else if self.path.matches("/defaultBrightness") {
            set_u8(&mut cfg.brightness_index, value, 4);
        } else if self.path.matches("/nightModeEnabled") {
            set_bool(&mut cfg.night.enabled, value);
        } else if self.path.matches("/nightModeStartHour") {
            set_u8(&mut cfg.night.start_hour, value, 23);
        } else if self.path.matches("/nightModeStartMinute") {
            set_u8(&mut cfg.night.start_minute, value, 59);
        } else if self.path.matches("/nightModeEndHour") {
            set_u8(&mut cfg.night.end_hour, value, 23);
        } else if self.path.matches("/nightModeEndMinute") {
            set_u8(&mut cfg.night.end_minute, value, 59);
        } else if self.path.matches("/nightModeWeekendDisable") {
            set_bool(&mut cfg.night.weekend_disable, value);
        }
    }
}

fn set_string<const N: usize>(field: &mut String<N>, value: &str) {
    if value.is_empty() || value == "null" {
        return;
    }
    field.clear();
    for c in value.chars() {
        if field.push(c).is_err() {
            break;
        }
    }
}

fn set_u8(field: &mut u8, value: &str, max: u8) {
    if let Ok(n) = value.parse::<u8>() {
        if n <= max {
            *field = n;
        }
    }
}

fn set_bool(field: &mut bool, value: &str) {
    match value {
        "true" => *field = true,
        "false" => *field = false,
        _ => {}
    }
}

/// Decode a whole document, stopping at the first syntax error
pub fn decode_config(doc: &[u8]) -> AppConfig {
    let mut decoder = ConfigDecoder::new();
    for &b in doc {
        if decoder.feed(b).is_err() {
            break;
        }
    }
    decoder.finish()
}

/// Encode a configuration as the persisted JSON document
pub fn encode_config(cfg: &AppConfig) -> String<MAX_CONFIG_DOC_LEN> {
    let mut doc = String::new();
    let _ = write!(
        doc,
        concat!(
            "{{\"station_id\":\"{}\",\"station_id2\":\"{}\",",
            "\"limit\":{},\"offset\":{},\"defaultBrightness\":{},",
            "\"nightModeEnabled\":{},",
            "\"nightModeStartHour\":{},\"nightModeStartMinute\":{},",
            "\"nightModeEndHour\":{},\"nightModeEndMinute\":{},",
            "\"nightModeWeekendDisable\":{}}}"
        ),
        cfg.station_id,
        cfg.station_id2,
        cfg.limit,
        cfg.offset,
        cfg.brightness_index,
        cfg.night.enabled,
        cfg.night.start_hour,
        cfg.night.start_minute,
        cfg.night.end_hour,
        cfg.night.end_minute,
        cfg.night.weekend_disable,
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        assert_eq!(decode_config(b"{}"), AppConfig::default());
    }

    #[test]
    fn test_partial_document_overrides_only_present_fields() {
        let cfg = decode_config(br#"{"station_id":"Bern","nightModeEnabled":true}"#);
        assert_eq!(cfg.station_id, "Bern");
        assert!(cfg.night.enabled);
        assert_eq!(cfg.station_id2, "Zug");
        assert_eq!(cfg.limit, 8);
        assert_eq!(cfg.night.start_hour, 22);
    }

    #[test]
    fn test_out_of_range_values_keep_defaults() {
        let cfg = decode_config(
            br#"{"limit":"99","defaultBrightness":"9","nightModeStartHour":"25","offset":"-3"}"#,
        );
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_numbers_accepted_bare_or_quoted() {
        let cfg = decode_config(br#"{"limit":5,"defaultBrightness":"2"}"#);
        assert_eq!(cfg.limit, 5);
        assert_eq!(cfg.brightness_index, 2);
    }

    #[test]
    fn test_syntax_error_keeps_applied_fields() {
        let cfg = decode_config(br#"{"station_id":"Basel","limit":@@@"#);
        assert_eq!(cfg.station_id, "Basel");
        assert_eq!(cfg.limit, 8);
    }

    #[test]
    fn test_encoded_document_shape() {
        let doc = encode_config(&AppConfig::default());
        assert_eq!(
            doc,
            concat!(
                "{\"station_id\":\"Luzern\",\"station_id2\":\"Zug\",",
                "\"limit\":8,\"offset\":0,\"defaultBrightness\":4,",
                "\"nightModeEnabled\":false,",
                "\"nightModeStartHour\":22,\"nightModeStartMinute\":0,",
                "\"nightModeEndHour\":7,\"nightModeEndMinute\":0,",
                "\"nightModeWeekendDisable\":false}"
            )
        );
    }

    #[test]
    fn test_with_base_layers_overrides() {
        let mut base = AppConfig::default();
        base.limit = 5;
        base.night.enabled = true;
        let mut decoder = ConfigDecoder::with_base(base);
        for &b in br#"{"limit":3}"# as &[u8] {
            decoder.feed(b).unwrap();
        }
        let cfg = decoder.finish();
        assert_eq!(cfg.limit, 3);
        assert!(cfg.night.enabled);
    }

    #[test]
    fn test_decode_of_encoded_document() {
        let mut cfg = AppConfig::default();
        cfg.station_id.clear();
        let _ = cfg.station_id.push_str("Olten");
        cfg.night.enabled = true;
        cfg.night.weekend_disable = true;
        cfg.brightness_index = 1;
        assert_eq!(decode_config(encode_config(&cfg).as_bytes()), cfg);
    }
}
