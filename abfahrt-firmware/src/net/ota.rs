//! OTA staging receiver
//!
//! Accepts one raw firmware image over TCP and writes it into the staging
//! area between the running image and the config partition; the boot-stage
//! copier applies a staged image on the next reset. Entered only through
//! the long-press recovery gesture and left only by restarting.

use defmt::*;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE, WRITE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_time::Duration;

use crate::config::{CONFIG_PARTITION_SIZE, FLASH_SIZE};

/// TCP port the receiver listens on
pub const OTA_PORT: u16 = 8080;

/// Staging area: upper flash, above the WiFi chip blobs at 1 MiB and below
/// the config partition
const STAGE_START: u32 = 0x15_0000;
const STAGE_END: u32 = (FLASH_SIZE - CONFIG_PARTITION_SIZE) as u32;

const PAGE: usize = WRITE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OtaError {
    /// Listener or transfer socket failed
    Socket,
    /// Image exceeds the staging area
    TooLarge,
    /// Flash erase/write failed
    Flash,
}

/// Receive one image into the staging area
///
/// Returns the staged image size; the caller resets the device. A failed
/// transfer leaves the running image untouched.
pub async fn receive_image(
    stack: Stack<'_>,
    flash: &mut Flash<'_, FLASH, Async, FLASH_SIZE>,
) -> Result<usize, OtaError> {
    let mut rx_buf = [0u8; 2048];
    let mut tx_buf = [0u8; 256];
    let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);
    socket.set_timeout(Some(Duration::from_secs(120)));

    info!("ota: waiting for image on port {}", OTA_PORT);
    socket.accept(OTA_PORT).await.map_err(|_| OtaError::Socket)?;

    let mut writer = StageWriter::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => writer.push(flash, &chunk[..n])?,
            Err(_) => return Err(OtaError::Socket),
        }
    }
    let total = writer.finish(flash)?;
    info!("ota: staged {} bytes", total);

    let _ = socket.write(b"OK\n").await;
    socket.close();
    Ok(total)
}

/// Accumulates stream bytes into write-aligned flash pages
struct StageWriter {
    offset: u32,
    erased_to: u32,
    page: [u8; PAGE],
    page_len: usize,
}

impl StageWriter {
    fn new() -> Self {
        Self {
            offset: STAGE_START,
            erased_to: STAGE_START,
            page: [0xFF; PAGE],
            page_len: 0,
        }
    }

    fn push(
        &mut self,
        flash: &mut Flash<'_, FLASH, Async, FLASH_SIZE>,
        data: &[u8],
    ) -> Result<(), OtaError> {
        for &b in data {
            self.page[self.page_len] = b;
            self.page_len += 1;
            if self.page_len == PAGE {
                self.flush_page(flash)?;
            }
        }
        Ok(())
    }

    fn finish(
        mut self,
        flash: &mut Flash<'_, FLASH, Async, FLASH_SIZE>,
    ) -> Result<usize, OtaError> {
        if self.page_len > 0 {
            // Pad the trailing page with erased-state bytes
            for b in &mut self.page[self.page_len..] {
                *b = 0xFF;
            }
            self.page_len = PAGE;
            self.flush_page(flash)?;
        }
        Ok((self.offset - STAGE_START) as usize)
    }

    fn flush_page(
        &mut self,
        flash: &mut Flash<'_, FLASH, Async, FLASH_SIZE>,
    ) -> Result<(), OtaError> {
        let end = self.offset + PAGE as u32;
        if end > STAGE_END {
            return Err(OtaError::TooLarge);
        }
        while self.erased_to < end {
            flash
                .blocking_erase(self.erased_to, self.erased_to + ERASE_SIZE as u32)
                .map_err(|_| OtaError::Flash)?;
            self.erased_to += ERASE_SIZE as u32;
        }
        flash
            .blocking_write(self.offset, &self.page)
            .map_err(|_| OtaError::Flash)?;
        self.offset = end;
        self.page = [0xFF; PAGE];
        self.page_len = 0;
        Ok(())
    }
}
