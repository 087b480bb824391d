//! Network collaborators
//!
//! CYW43 station join, streaming HTTP GET, the hourly SNTP exchange, and
//! the OTA staging receiver.

pub mod http;
pub mod ota;
pub mod sntp;
pub mod wifi;
