//! Embassy tasks
//!
//! Auxiliary tasks around the controller loop: button gesture
//! classification, the config portal, and the network stack runners.
//! The SNTP task lives with the protocol code in `net::sntp`.

pub mod button;
pub mod net;
pub mod portal;
