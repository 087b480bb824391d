//! Refresh scheduler
//!
//! Decides when a refresh cycle starts and which of its ordered sub-steps
//! {clock, departure board, price ticker} run, based on the power mode at
//! cycle start. A started cycle runs its permitted steps to completion; a
//! new trigger waits for the next tick.

use crate::power::{Mode, UPDATE_INTERVAL_MS};

/// Which sub-steps of one refresh cycle run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CyclePlan {
    pub update_clock: bool,
    pub fetch_board: bool,
    pub fetch_ticker: bool,
}

impl CyclePlan {
    /// Steps permitted in `mode`
    ///
    /// Night-dark without an open wake skips everything; the portal keeps
    /// the clock alive but skips the fetches; OTA runs nothing.
    pub fn for_mode(mode: Mode) -> Self {
        let fetch = matches!(mode, Mode::Active | Mode::Updating | Mode::LightSleep | Mode::NightTempWake);
        Self {
            update_clock: fetch || mode == Mode::ConfigPortal,
            fetch_board: fetch,
            fetch_ticker: fetch,
        }
    }

    /// True when no step runs; such a cycle completes without rendering
    pub fn is_empty(&self) -> bool {
        !self.update_clock && !self.fetch_board && !self.fetch_ticker
    }
}

/// Tracks refresh timing and cycle exclusivity
#[derive(Debug)]
pub struct RefreshScheduler {
    last_update_ms: Option<u64>,
    in_cycle: bool,
}

impl RefreshScheduler {
    /// A scheduler that is immediately due
    pub fn new() -> Self {
        Self {
            last_update_ms: None,
            in_cycle: false,
        }
    }

    /// Milliseconds since the last completed cycle; the full interval if
    /// none has completed yet
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.last_update_ms {
            Some(last) => now_ms.saturating_sub(last),
            None => UPDATE_INTERVAL_MS,
        }
    }

    /// Should a cycle start now?
    pub fn due(&self, now_ms: u64, force: bool) -> bool {
        !self.in_cycle && (force || self.elapsed_ms(now_ms) >= UPDATE_INTERVAL_MS)
    }

    /// Mark the cycle as started; further triggers are ignored until
    /// `complete`
    pub fn begin(&mut self) {
        self.in_cycle = true;
    }

    /// Mark the cycle as finished and restart the interval
    pub fn complete(&mut self, now_ms: u64) {
        self.in_cycle = false;
        self.last_update_ms = Some(now_ms);
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}
