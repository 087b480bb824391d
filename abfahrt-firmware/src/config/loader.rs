//! Configuration load order
//!
//! flash JSON -> embedded `appliance.toml` -> compiled minimal fallback.
//! The TOML provides the whole firmware config; the flash document from
//! the portal overrides its station/night/display fields one by one.

use defmt::*;

use abfahrt_core::config::ConfigDecoder;

use super::flash::FlashStore;
use super::toml::{parse_config, FirmwareConfig};

/// Largest flash document we accept
const MAX_STORED_DOC: usize = 512;

/// Load the effective firmware configuration
pub async fn load(store: &mut FlashStore<'_>, embedded_toml: &str) -> FirmwareConfig {
    let mut config = match parse_config(embedded_toml) {
        Ok(config) => config,
        Err(e) => {
            // build.rs validates the file, so this only fires on a stale image
            warn!("embedded appliance.toml rejected: {:?}, using fallback", e);
            FirmwareConfig::default()
        }
    };

    let mut buf = [0u8; MAX_STORED_DOC];
    match store.read_config(&mut buf).await {
        Ok(len) => {
            info!("portal config loaded from flash ({} bytes)", len);
            let mut decoder = ConfigDecoder::with_base(config.app.clone());
            for &b in &buf[..len] {
                if decoder.feed(b).is_err() {
                    warn!("stored config document malformed, keeping earlier fields");
                    break;
                }
            }
            config.app = decoder.finish();
        }
        Err(e) => {
            info!("no portal config in flash: {:?}", e);
        }
    }

    config
}
