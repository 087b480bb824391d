//! Render abstraction for the departure display
//!
//! This crate provides:
//! - `Surface` trait: the pixel/text primitives the firmware renders with
//! - `Sprite`: an off-screen RGB565 buffer for flicker-free composition
//! - A 6×8 bitmap font with integer scaling
//!
//! The controller draws whole screen regions into sprites and blits them to
//! the hardware surface; because execution is single-threaded the surface
//! is exclusively owned by whichever operation is drawing.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod color;
pub mod font;
pub mod sprite;
pub mod surface;

pub use sprite::Sprite;
pub use surface::{Surface, TextStyle};
