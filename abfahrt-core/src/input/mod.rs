//! Button input model
//!
//! The firmware's button task classifies raw edges into [`Gesture`]s; the
//! router maps a gesture plus the current power context to one [`Action`].

mod gesture;
mod router;

pub use gesture::Gesture;
pub use router::{route, Action};
