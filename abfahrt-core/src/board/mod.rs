//! Stationboard extraction and query building
//!
//! Turns the transit API's nested JSON response into an ordered sequence of
//! [`Departure`] records via suffix-path matching, and builds the
//! percent-encoded stationboard query URL.

pub mod decode;
pub mod query;
pub mod types;

pub use decode::{BoardDecoder, DecodeEvent};
pub use types::Departure;
