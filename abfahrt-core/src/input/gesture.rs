/// A classified physical-button event
///
/// Classification mechanics (debounce, click window, press threshold) live
/// in the firmware's button task; one gesture is delivered per physical
/// event, never a backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// One click inside the click window
    SingleClick,
    /// Two clicks inside the click window
    DoubleClick,
    /// Three clicks inside the click window
    TripleClick,
    /// Held past the long-press threshold
    LongPress,
}
