//! SNTP time sync
//!
//! One UDP exchange per hour against the configured pool host. Only the
//! server transmit timestamp is used; sub-second precision is irrelevant
//! for a minute-resolution board.

use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{with_timeout, Duration, Timer};

use crate::channels::TIME_SYNC;

const NTP_PORT: u16 = 123;
const LOCAL_PORT: u16 = 12_300;
/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
const NTP_UNIX_OFFSET: u32 = 2_208_988_800;

const SYNC_INTERVAL: Duration = Duration::from_secs(3600);
const RETRY_INTERVAL: Duration = Duration::from_secs(60);
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SntpError {
    Dns,
    Socket,
    Timeout,
    /// Response shorter than an NTP packet or not from the server
    BadResponse,
}

/// Perform one SNTP exchange and return the UTC epoch
pub async fn query(stack: Stack<'_>, server: &str) -> Result<i64, SntpError> {
    let addrs = stack
        .dns_query(server, DnsQueryType::A)
        .await
        .map_err(|_| SntpError::Dns)?;
    let addr = *addrs.first().ok_or(SntpError::Dns)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buf = [0u8; 128];
    let mut tx_buf = [0u8; 128];
    let mut socket = UdpSocket::new(stack, &mut rx_meta, &mut rx_buf, &mut tx_meta, &mut tx_buf);
    socket.bind(LOCAL_PORT).map_err(|_| SntpError::Socket)?;

    // Client request: LI 0, version 4, mode 3
    let mut packet = [0u8; 48];
    packet[0] = 0x23;
    socket
        .send_to(&packet, IpEndpoint::new(addr, NTP_PORT))
        .await
        .map_err(|_| SntpError::Socket)?;

    let mut response = [0u8; 48];
    let (len, _) = with_timeout(EXCHANGE_TIMEOUT, socket.recv_from(&mut response))
        .await
        .map_err(|_| SntpError::Timeout)?
        .map_err(|_| SntpError::Socket)?;
    if len < 48 {
        return Err(SntpError::BadResponse);
    }

    // Transmit timestamp seconds, bytes 40..44
    let secs = u32::from_be_bytes([response[40], response[41], response[42], response[43]]);
    if secs < NTP_UNIX_OFFSET {
        return Err(SntpError::BadResponse);
    }
    Ok((secs - NTP_UNIX_OFFSET) as i64)
}

/// Hourly sync task; signals each successful result to the controller
#[embassy_executor::task]
pub async fn sntp_task(stack: Stack<'static>, server: &'static str) {
    info!("sntp task started, server {}", server);
    loop {
        match query(stack, server).await {
            Ok(epoch) => {
                info!("time sync: epoch {}", epoch);
                TIME_SYNC.signal(epoch);
                Timer::after(SYNC_INTERVAL).await;
            }
            Err(e) => {
                warn!("time sync failed: {:?}", e);
                Timer::after(RETRY_INTERVAL).await;
            }
        }
    }
}
