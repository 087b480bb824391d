//! Application configuration
//!
//! Types plus the persisted-JSON decode/encode used by the config portal
//! and flash storage. Every field falls back to its compiled default
//! independently.

mod decode;
mod types;

pub use decode::{decode_config, encode_config, ConfigDecoder, MAX_CONFIG_DOC_LEN};
pub use types::{AppConfig, NightConfig, MAX_STATION_ID_LEN};
