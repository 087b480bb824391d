//! Power management
//!
//! The night window decides when the screen goes dark; the state machine
//! owns the current mode, the temporary-wake deadline, the brightness
//! level, and the active-station selector.

mod machine;
mod night;

pub use machine::{
    Mode, PowerStateMachine, BRIGHTNESS_LEVELS, CLICK_WINDOW_MS, HTTP_TIMEOUT_MS, LONG_PRESS_MS,
    NIGHT_RECHECK_MS, RECONNECT_ATTEMPTS, RECONNECT_DELAY_MS, SLEEP_GUARD_LEVEL, TEMP_WAKE_MS,
    UPDATE_INTERVAL_MS, UPDATE_LINGER_MS,
};
pub use night::NightWindow;
