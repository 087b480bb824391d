//! WiFi station join
//!
//! Bounded join attempts against the configured access point; DHCP is
//! handled by the embassy-net stack once the link is up.

use cyw43::{Control, JoinOptions};
use defmt::*;
use embassy_net::Stack;
use embassy_time::{Duration, Timer};

use abfahrt_core::power::{RECONNECT_ATTEMPTS, RECONNECT_DELAY_MS};

/// Join the configured network, with bounded retries
///
/// Returns false when every attempt failed; the caller shows the failure
/// indicator and tries again next cycle.
pub async fn join(control: &mut Control<'_>, ssid: &str, password: &str) -> bool {
    for attempt in 1..=RECONNECT_ATTEMPTS {
        match control.join(ssid, JoinOptions::new(password.as_bytes())).await {
            Ok(()) => {
                info!("joined '{}' (attempt {})", ssid, attempt);
                return true;
            }
            Err(e) => {
                warn!("join '{}' failed (attempt {}): status {}", ssid, attempt, e.status);
                Timer::after(Duration::from_millis(RECONNECT_DELAY_MS)).await;
            }
        }
    }
    false
}

/// Wait until DHCP has produced a usable config
pub async fn wait_for_ip(stack: Stack<'_>) {
    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("dhcp lease: {}", config.address);
    }
}
