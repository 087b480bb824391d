//! Board-agnostic core logic for the Abfahrt transit display firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Streaming JSON tokenizer and slash-joined path tracking
//! - Stationboard decoder (departure records) and price decoder
//! - Power state machine (sleep, night mode, portal, OTA)
//! - Button gesture routing
//! - Refresh cycle scheduling
//! - Local time arithmetic (EU DST rules)
//! - Configuration type definitions and JSON persistence format

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod board;
pub mod clock;
pub mod config;
pub mod input;
pub mod json;
pub mod power;
pub mod price;
pub mod refresh;
