//! Gesture-to-action routing
//!
//! One exhaustive `(context, gesture)` match; the power state machine
//! applies the returned action. Dispatch is synchronous and unqueued.

use super::Gesture;

/// What a gesture means in the current power context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Step to the next backlight level
    CycleBrightness,
    /// Open a temporary wake window during night-dark
    EnterNightTempWake,
    /// Switch between the two configured stations and force a refresh
    ToggleStation,
    /// Toggle the configuration portal
    TogglePortal,
    /// Enter OTA update mode
    EnterOta,
    /// Gesture refused in this context
    Ignore,
}

/// Map a gesture to an action
///
/// `in_dark` is true when the device is night-dark with no open temporary
/// wake. Long press is the recovery path and always reaches OTA.
pub fn route(in_dark: bool, gesture: Gesture) -> Action {
    match (in_dark, gesture) {
        (true, Gesture::SingleClick) => Action::EnterNightTempWake,
        (true, Gesture::DoubleClick) => Action::Ignore,
        (true, Gesture::TripleClick) => Action::Ignore,
        (false, Gesture::SingleClick) => Action::CycleBrightness,
        (false, Gesture::DoubleClick) => Action::ToggleStation,
        (false, Gesture::TripleClick) => Action::TogglePortal,
        (_, Gesture::LongPress) => Action::EnterOta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_context_routing() {
        assert_eq!(route(true, Gesture::SingleClick), Action::EnterNightTempWake);
        assert_eq!(route(true, Gesture::DoubleClick), Action::Ignore);
        assert_eq!(route(true, Gesture::TripleClick), Action::Ignore);
        assert_eq!(route(true, Gesture::LongPress), Action::EnterOta);
    }

    #[test]
    fn test_normal_context_routing() {
        assert_eq!(route(false, Gesture::SingleClick), Action::CycleBrightness);
        assert_eq!(route(false, Gesture::DoubleClick), Action::ToggleStation);
        assert_eq!(route(false, Gesture::TripleClick), Action::TogglePortal);
        assert_eq!(route(false, Gesture::LongPress), Action::EnterOta);
    }
}
