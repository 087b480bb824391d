//! Refresh cycle scheduling

mod scheduler;

pub use scheduler::{CyclePlan, RefreshScheduler};
