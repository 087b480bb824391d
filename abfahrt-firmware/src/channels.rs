//! Inter-task communication channels
//!
//! Static embassy-sync primitives connecting the auxiliary tasks to the
//! controller. The controller owns all mutable state; tasks only send.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use abfahrt_core::config::AppConfig;
use abfahrt_core::input::Gesture;

/// Classified gestures from the button task; one-deep so gestures made
/// while the controller is mid-cycle are dropped, not replayed later
pub static GESTURES: Channel<CriticalSectionRawMutex, Gesture, 1> = Channel::new();

/// Latest SNTP result as a UTC epoch (seconds)
pub static TIME_SYNC: Signal<CriticalSectionRawMutex, i64> = Signal::new();

/// Portal lifecycle command from the controller
#[derive(Debug)]
pub enum PortalCommand {
    /// Start serving; carries a snapshot of the current configuration
    Start(AppConfig),
    /// Stop serving and drop the listener
    Stop,
}

/// Controller -> portal task lifecycle signal
pub static PORTAL_CMD: Signal<CriticalSectionRawMutex, PortalCommand> = Signal::new();

/// Configuration documents accepted by the portal, for the controller to
/// persist and apply
pub static PORTAL_SAVED: Channel<CriticalSectionRawMutex, AppConfig, 1> = Channel::new();
