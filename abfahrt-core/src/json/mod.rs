//! Streaming JSON tokenizer and path tracking
//!
//! The transit API returns documents far larger than the device can hold,
//! so nothing here builds a parse tree: the tokenizer turns bytes into
//! structural events one at a time, and [`PathTracker`] mirrors the open
//! container nesting as a slash-joined key path for suffix matching.

pub mod path;
pub mod tokenizer;

pub use path::PathTracker;
pub use tokenizer::{JsonError, JsonEvent, Tokenizer};
