//! Departure record type and extraction heuristics
//!
//! The discard/truncation limits are tuned to observed payloads rather than
//! documented API guarantees, so they live here as named constants instead
//! of literals in the decoder.

use heapless::String;

/// Maximum station name length in bytes
pub const MAX_STATION_LEN: usize = 32;

/// Maximum destination length in bytes (25 chars may exceed 25 bytes)
pub const MAX_DEST_LEN: usize = 40;

/// Maximum line name length in bytes
pub const MAX_NAME_LEN: usize = 24;

/// Maximum category/number/delay field length in bytes
pub const MAX_CODE_LEN: usize = 8;

/// Line numbers at or above this are treated as malformed codes and cleared
pub const NUMBER_DISCARD_MIN: i64 = 1000;

/// Destinations longer than this many chars are truncated
pub const DEST_MAX_CHARS: usize = 25;

/// Chars kept when truncating, before the ellipsis marker
pub const DEST_KEEP_CHARS: usize = 22;

/// Ellipsis marker appended to truncated destinations
pub const ELLIPSIS: &str = "...";

/// One extracted transit-line entry
///
/// Created empty when decoding starts a new stationboard entry and filled
/// incrementally as matching leaf values arrive in document order. The
/// destination value's arrival completes the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Departure {
    /// Line type code, e.g. "S" or "IC"
    pub category: String<MAX_CODE_LEN>,
    /// Line number digits; empty if absent or over NUMBER_DISCARD_MIN
    pub number: String<MAX_CODE_LEN>,
    /// Raw line name; records named the literal "null" are skipped at render time
    pub name: String<MAX_NAME_LEN>,
    /// Destination, capped at DEST_MAX_CHARS chars
    pub destination: String<MAX_DEST_LEN>,
    /// Departure time as "HH:MM", empty if the timestamp was too short
    pub departure: String<8>,
    /// Delay verbatim; the "only show if > 0" policy is a rendering decision
    pub delay: String<MAX_CODE_LEN>,
}

impl Departure {
    /// True if this record should be hidden on the board
    pub fn is_null_entry(&self) -> bool {
        self.name == "null"
    }
}
