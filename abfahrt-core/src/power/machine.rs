//! Power state machine
//!
//! Owns the current mode, the temporary-wake deadline, the backlight level,
//! and the active-station selector. All device behavior is a function of
//! the current mode plus ticks and routed gestures; transitions happen only
//! here.

use super::night::NightWindow;
use crate::clock::LocalTime;
use crate::input::{route, Action, Gesture};

/// Normal inter-refresh interval
pub const UPDATE_INTERVAL_MS: u64 = 60_000;
/// How long fresh content stays visible before light sleep
pub const UPDATE_LINGER_MS: u64 = 10_000;
/// Temporary night-wake duration
pub const TEMP_WAKE_MS: u64 = 300_000;
/// Short re-check sleep while night-dark
pub const NIGHT_RECHECK_MS: u64 = 10_000;
/// Overall HTTP fetch timeout
pub const HTTP_TIMEOUT_MS: u64 = 10_000;
/// Reconnect attempts when a cycle starts without connectivity
pub const RECONNECT_ATTEMPTS: u32 = 3;
/// Delay between reconnect attempts
pub const RECONNECT_DELAY_MS: u64 = 1_000;
/// Long-press threshold
pub const LONG_PRESS_MS: u64 = 10_000;
/// Multi-click grouping window
pub const CLICK_WINDOW_MS: u64 = 500;
/// Backlight PWM levels cycled by single click
pub const BRIGHTNESS_LEVELS: [u8; 5] = [0, 64, 128, 192, 255];
/// Hardware light sleep is only entered above this backlight level
pub const SLEEP_GUARD_LEVEL: u8 = 192;

/// Device power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Awake, display on
    Active,
    /// A refresh cycle is running
    Updating,
    /// Idle between refreshes, display retained
    LightSleep,
    /// Inside the night window, backlight off
    NightDark,
    /// Night-dark with an open temporary wake window
    NightTempWake,
    /// Configuration portal is serving
    ConfigPortal,
    /// OTA transfer in progress; exits only via restart
    OtaUpdate,
}

/// The power state machine
///
/// Mutated only by `tick`, `handle_gesture`, cycle begin/finish, and the
/// portal completion handler; read at the top of each control-loop tick.
#[derive(Debug)]
pub struct PowerStateMachine {
    mode: Mode,
    night: NightWindow,
    brightness_index: usize,
    temp_wake_until: Option<u64>,
    force_refresh: bool,
    secondary_station: bool,
    /// Mode a running cycle resumes from
    resume: Mode,
}

impl PowerStateMachine {
    /// Start in `Active` with the configured window and brightness index
    pub fn new(night: NightWindow, brightness_index: usize) -> Self {
        Self {
            mode: Mode::Active,
            night,
            brightness_index: brightness_index.min(BRIGHTNESS_LEVELS.len() - 1),
            temp_wake_until: None,
            force_refresh: true,
            secondary_station: false,
            resume: Mode::Active,
        }
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Replace the night window (portal completion)
    pub fn set_night(&mut self, night: NightWindow) {
        self.night = night;
    }

    /// Configured backlight level
    pub fn brightness(&self) -> u8 {
        BRIGHTNESS_LEVELS[self.brightness_index]
    }

    /// True when the secondary station is selected
    pub fn secondary_station(&self) -> bool {
        self.secondary_station
    }

    /// True when the next cycle should start regardless of the interval
    pub fn force_refresh(&self) -> bool {
        self.force_refresh
    }

    /// Request an out-of-interval refresh
    pub fn request_refresh(&mut self) {
        self.force_refresh = true;
    }

    /// Periodic re-evaluation: temp-wake expiry and the night window
    ///
    /// `local` is `None` before the first time sync; the window is treated
    /// as inactive until then. OTA suppresses night entry entirely.
    pub fn tick(&mut self, now_ms: u64, local: Option<LocalTime>) {
        if self.mode == Mode::OtaUpdate {
            return;
        }

        let night_active = local
            .map(|t| self.night.is_active(t.minutes_since_midnight(), t.weekday))
            .unwrap_or(false);

        if self.mode == Mode::NightTempWake {
            let expired = self.temp_wake_until.map(|d| now_ms >= d).unwrap_or(true);
            if !night_active {
                self.temp_wake_until = None;
                self.mode = Mode::Active;
            } else if expired {
                self.temp_wake_until = None;
                self.mode = Mode::NightDark;
            }
            return;
        }

        match self.mode {
            Mode::Active | Mode::LightSleep if night_active => self.mode = Mode::NightDark,
            Mode::NightDark if !night_active => self.mode = Mode::Active,
            _ => {}
        }
    }

    /// Route and apply one gesture
    ///
    /// Any qualifying gesture while a temporary wake is open replaces its
    /// deadline, in addition to the mapped action.
    pub fn handle_gesture(&mut self, now_ms: u64, gesture: Gesture) -> Action {
        if self.mode == Mode::NightTempWake {
            self.temp_wake_until = Some(now_ms + TEMP_WAKE_MS);
        }

        let action = route(self.mode == Mode::NightDark, gesture);
        match action {
            Action::CycleBrightness => {
                self.brightness_index = (self.brightness_index + 1) % BRIGHTNESS_LEVELS.len();
            }
            Action::EnterNightTempWake => {
                self.mode = Mode::NightTempWake;
                self.temp_wake_until = Some(now_ms + TEMP_WAKE_MS);
            }
            Action::ToggleStation => {
                self.secondary_station = !self.secondary_station;
                self.force_refresh = true;
            }
            Action::TogglePortal => {
                self.mode = if self.mode == Mode::ConfigPortal {
                    Mode::Active
                } else {
                    Mode::ConfigPortal
                };
            }
            Action::EnterOta => {
                self.mode = Mode::OtaUpdate;
            }
            Action::Ignore => {}
        }
        action
    }

    /// Mark a refresh cycle as started
    ///
    /// Portal and OTA keep their mode; the cycle then runs only its
    /// permitted steps.
    pub fn begin_update(&mut self) {
        self.resume = self.mode;
        if !matches!(self.mode, Mode::ConfigPortal | Mode::OtaUpdate) {
            self.mode = Mode::Updating;
        }
    }

    /// Post-cycle transition, after the linger period
    ///
    /// Sleeps unless the portal or a temporary wake keeps the device awake;
    /// a cycle that started night-dark stays night-dark.
    pub fn finish_cycle(&mut self) -> Mode {
        self.force_refresh = false;
        if self.mode == Mode::Updating {
            self.mode = match self.resume {
                Mode::NightTempWake => Mode::NightTempWake,
                Mode::NightDark => Mode::NightDark,
                _ => Mode::LightSleep,
            };
        }
        self.mode
    }

    /// How long to idle before the next tick
    pub fn sleep_duration_ms(&self, elapsed_since_update_ms: u64) -> u64 {
        if self.mode == Mode::NightDark {
            NIGHT_RECHECK_MS
        } else {
            UPDATE_INTERVAL_MS.saturating_sub(elapsed_since_update_ms)
        }
    }

    /// Backlight level to restore right after a wake
    ///
    /// Zero while night-dark with no open wake window; the configured level
    /// otherwise.
    pub fn wake_brightness(&self) -> u8 {
        if self.mode == Mode::NightDark {
            0
        } else {
            self.brightness()
        }
    }

    /// Low-brightness guard: hardware light sleep causes visible PWM
    /// flicker on wake at dim levels, so it is only entered when bright
    pub fn hardware_sleep_allowed(&self) -> bool {
        self.brightness() > SLEEP_GUARD_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Weekday;

    fn night_2200_0700() -> NightWindow {
        NightWindow {
            enabled: true,
            start_min: 22 * 60,
            end_min: 7 * 60,
            weekend_disable: false,
        }
    }

    fn local(hour: u8, minute: u8) -> Option<LocalTime> {
        Some(LocalTime {
            year: 2024,
            month: 3,
            day: 5,
            hour,
            minute,
            second: 0,
            weekday: Weekday::Tuesday,
        })
    }

    fn dark_machine(now_ms: u64) -> PowerStateMachine {
        let mut m = PowerStateMachine::new(night_2200_0700(), 4);
        m.tick(now_ms, local(23, 0));
        assert_eq!(m.mode(), Mode::NightDark);
        m
    }

    #[test]
    fn test_night_entry_and_exit_by_tick() {
        let mut m = PowerStateMachine::new(night_2200_0700(), 4);
        m.tick(0, local(21, 59));
        assert_eq!(m.mode(), Mode::Active);
        m.tick(1_000, local(22, 0));
        assert_eq!(m.mode(), Mode::NightDark);
        m.tick(2_000, local(7, 0));
        assert_eq!(m.mode(), Mode::Active);
    }

    #[test]
    fn test_unsynced_clock_keeps_night_inactive() {
        let mut m = PowerStateMachine::new(night_2200_0700(), 4);
        m.tick(0, None);
        assert_eq!(m.mode(), Mode::Active);
    }

    #[test]
    fn test_temp_wake_extends_instead_of_stacking() {
        let mut m = dark_machine(0);
        m.handle_gesture(1_000, Gesture::SingleClick);
        assert_eq!(m.mode(), Mode::NightTempWake);

        // Interaction at T resets the deadline to T + duration
        m.handle_gesture(100_000, Gesture::SingleClick);
        m.tick(1_000 + TEMP_WAKE_MS + 1, local(23, 30));
        assert_eq!(m.mode(), Mode::NightTempWake);
        m.tick(100_000 + TEMP_WAKE_MS, local(23, 45));
        assert_eq!(m.mode(), Mode::NightDark);
    }

    #[test]
    fn test_temp_wake_cleared_when_window_ends() {
        let mut m = dark_machine(0);
        m.handle_gesture(1_000, Gesture::SingleClick);
        m.tick(2_000, local(7, 0));
        assert_eq!(m.mode(), Mode::Active);
    }

    #[test]
    fn test_portal_toggle_and_night_refusal() {
        let mut m = PowerStateMachine::new(night_2200_0700(), 4);
        assert_eq!(m.handle_gesture(0, Gesture::TripleClick), Action::TogglePortal);
        assert_eq!(m.mode(), Mode::ConfigPortal);
        m.handle_gesture(1_000, Gesture::TripleClick);
        assert_eq!(m.mode(), Mode::Active);

        let mut dark = dark_machine(0);
        assert_eq!(dark.handle_gesture(1_000, Gesture::TripleClick), Action::Ignore);
        assert_eq!(dark.mode(), Mode::NightDark);
    }

    #[test]
    fn test_long_press_reaches_ota_from_any_state() {
        let setups: [fn(&mut PowerStateMachine); 3] = [
            |_| {},
            |m| m.tick(0, local(23, 0)),
            |m| {
                m.handle_gesture(0, Gesture::TripleClick);
            },
        ];
        for setup in setups {
            let mut m = PowerStateMachine::new(night_2200_0700(), 4);
            setup(&mut m);
            m.handle_gesture(1_000, Gesture::LongPress);
            assert_eq!(m.mode(), Mode::OtaUpdate);
            // OTA suppresses night entry
            m.tick(2_000, local(23, 30));
            assert_eq!(m.mode(), Mode::OtaUpdate);
        }
    }

    #[test]
    fn test_station_toggle_forces_refresh() {
        let mut m = PowerStateMachine::new(night_2200_0700(), 4);
        m.begin_update();
        m.finish_cycle();
        assert!(!m.force_refresh());
        m.handle_gesture(0, Gesture::DoubleClick);
        assert!(m.secondary_station());
        assert!(m.force_refresh());
        m.handle_gesture(500, Gesture::DoubleClick);
        assert!(!m.secondary_station());
    }

    #[test]
    fn test_brightness_cycles_and_wraps() {
        let mut m = PowerStateMachine::new(night_2200_0700(), 4);
        assert_eq!(m.brightness(), 255);
        m.handle_gesture(0, Gesture::SingleClick);
        assert_eq!(m.brightness(), 0);
        m.handle_gesture(1_000, Gesture::SingleClick);
        assert_eq!(m.brightness(), 64);
    }

    #[test]
    fn test_cycle_ends_in_sleep_unless_kept_awake() {
        let mut m = PowerStateMachine::new(night_2200_0700(), 4);
        m.begin_update();
        assert_eq!(m.mode(), Mode::Updating);
        assert_eq!(m.finish_cycle(), Mode::LightSleep);

        let mut dark = dark_machine(0);
        dark.handle_gesture(1_000, Gesture::SingleClick);
        dark.begin_update();
        assert_eq!(dark.finish_cycle(), Mode::NightTempWake);

        let mut portal = PowerStateMachine::new(night_2200_0700(), 4);
        portal.handle_gesture(0, Gesture::TripleClick);
        portal.begin_update();
        assert_eq!(portal.mode(), Mode::ConfigPortal);
        assert_eq!(portal.finish_cycle(), Mode::ConfigPortal);
    }

    #[test]
    fn test_sleep_duration_selection() {
        let mut m = PowerStateMachine::new(night_2200_0700(), 4);
        assert_eq!(m.sleep_duration_ms(15_000), UPDATE_INTERVAL_MS - 15_000);
        m.tick(0, local(23, 0));
        assert_eq!(m.sleep_duration_ms(15_000), NIGHT_RECHECK_MS);
    }

    #[test]
    fn test_wake_brightness_policy() {
        let mut m = dark_machine(0);
        assert_eq!(m.wake_brightness(), 0);
        m.handle_gesture(1_000, Gesture::SingleClick);
        assert_eq!(m.wake_brightness(), 255);
    }

    #[test]
    fn test_sleep_guard_below_max_brightness() {
        let mut m = PowerStateMachine::new(night_2200_0700(), 4);
        assert!(m.hardware_sleep_allowed());
        m.handle_gesture(0, Gesture::SingleClick); // 255 -> 0
        assert!(!m.hardware_sleep_allowed());
    }
}
