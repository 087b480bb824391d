//! Firmware-level configuration
//!
//! Compile-time defaults come from the embedded `appliance.toml`; the
//! portal's JSON document in flash overrides the station/night/display
//! fields one by one. Network and API endpoints are compile-time only.

mod flash;
mod loader;
mod toml;

pub use flash::{FlashError, FlashStore, CONFIG_PARTITION_SIZE, FLASH_SIZE};
pub use loader::load;
pub use toml::{parse_config, ApiConfig, FirmwareConfig, NetConfig, ParseError};
