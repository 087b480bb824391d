//! Flash persistence for the portal configuration
//!
//! Wear-leveled key-value storage via sequential-storage in the last 64 KiB
//! of the Pico W's 2 MiB flash. The portal's JSON document is stored
//! verbatim under a single key.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

/// Total flash size on the Pico W
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Size of the config partition at the end of flash
pub const CONFIG_PARTITION_SIZE: usize = 64 * 1024;

/// Flash range of the config partition
pub const CONFIG_RANGE: core::ops::Range<u32> =
    ((FLASH_SIZE - CONFIG_PARTITION_SIZE) as u32)..(FLASH_SIZE as u32);

/// Storage key of the portal configuration document
const CONFIG_KEY: u8 = 0;

/// Scratch buffer size; bounds the stored document length
const MAX_DOC_SIZE: usize = 512;

/// Flash storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Key not present
    NotFound,
    /// Caller's buffer is too small for the stored value
    BufferTooSmall,
    /// Underlying storage operation failed
    Storage,
}

/// Wear-leveled config storage
pub struct FlashStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> FlashStore<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Read the stored configuration document into `buffer`
    pub async fn read_config(&mut self, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut scratch = [0u8; MAX_DOC_SIZE];
        let result = map::fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut scratch,
            &CONFIG_KEY,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                if buffer.len() < data.len() {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(_) => Err(FlashError::Storage),
        }
    }

    /// Store a configuration document, replacing any previous one
    pub async fn write_config(&mut self, doc: &[u8]) -> Result<(), FlashError> {
        let mut scratch = [0u8; MAX_DOC_SIZE];
        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut scratch,
            &CONFIG_KEY,
            &doc,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }

    /// Wipe the config partition (boot-time factory reset)
    pub async fn erase_config(&mut self) -> Result<(), FlashError> {
        sequential_storage::erase_all(&mut self.flash, CONFIG_RANGE)
            .await
            .map_err(|_| FlashError::Storage)
    }

    /// Raw flash access for the OTA staging writer
    pub fn raw(&mut self) -> &mut Flash<'d, FLASH, Async, FLASH_SIZE> {
        &mut self.flash
    }
}
