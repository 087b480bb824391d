//! Button gesture classification
//!
//! Debounces the single push button (active low) and classifies
//! single/double/triple clicks inside the click window plus the long
//! press. Exactly one gesture per physical event; if the controller is
//! mid-cycle the gesture is dropped rather than queued up.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{with_timeout, Duration, Timer};

use abfahrt_core::input::Gesture;
use abfahrt_core::power::{CLICK_WINDOW_MS, LONG_PRESS_MS};

use crate::channels::GESTURES;

const DEBOUNCE_MS: u64 = 30;

#[embassy_executor::task]
pub async fn button_task(mut button: Input<'static>) {
    info!("button task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after_millis(DEBOUNCE_MS).await;
        if button.is_high() {
            continue;
        }

        let held = with_timeout(
            Duration::from_millis(LONG_PRESS_MS),
            button.wait_for_high(),
        )
        .await;
        if held.is_err() {
            debug!("gesture: long press");
            dispatch(Gesture::LongPress);
            button.wait_for_high().await;
            continue;
        }

        let mut clicks = 1u8;
        while clicks < 3 {
            let next_press = with_timeout(
                Duration::from_millis(CLICK_WINDOW_MS),
                button.wait_for_falling_edge(),
            )
            .await;
            if next_press.is_err() {
                break;
            }
            Timer::after_millis(DEBOUNCE_MS).await;
            if button.is_high() {
                continue;
            }
            button.wait_for_high().await;
            clicks += 1;
        }

        let gesture = match clicks {
            1 => Gesture::SingleClick,
            2 => Gesture::DoubleClick,
            _ => Gesture::TripleClick,
        };
        debug!("gesture: {:?}", gesture);
        dispatch(gesture);
    }
}

/// Unqueued dispatch: drop the gesture when the controller lags
fn dispatch(gesture: Gesture) {
    if GESTURES.try_send(gesture).is_err() {
        warn!("gesture dropped, controller busy");
    }
}
