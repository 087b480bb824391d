//! Main control loop
//!
//! Owns all mutable state: configuration, the power state machine, the
//! refresh scheduler, the wall clock, the renderer, and flash. Auxiliary
//! tasks only feed it through channels, so every mutation completes before
//! the next tick reads the state. Light sleep is the executor idling in
//! the select below with the timer and the button as the only wake
//! sources.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_net::Stack;
use embassy_rp::spi::Instance;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use heapless::{String, Vec};

use abfahrt_core::board::query::stationboard_url;
use abfahrt_core::board::{BoardDecoder, DecodeEvent, Departure};
use abfahrt_core::clock::{LocalTime, WallClock};
use abfahrt_core::config::{encode_config, AppConfig};
use abfahrt_core::input::{Action, Gesture};
use abfahrt_core::power::{Mode, PowerStateMachine, UPDATE_INTERVAL_MS, UPDATE_LINGER_MS};
use abfahrt_core::price::PriceDecoder;
use abfahrt_core::refresh::{CyclePlan, RefreshScheduler};

use crate::channels::{PortalCommand, GESTURES, PORTAL_CMD, PORTAL_SAVED, TIME_SYNC};
use crate::config::{FirmwareConfig, FlashStore};
use crate::display::{Backlight, Renderer};
use crate::net::http::{get_streamed, FetchError};
use crate::net::{ota, wifi};

/// Most departures kept from one response
const MAX_DEPARTURES: usize = 16;

/// Shortest idle between ticks, keeps gesture latency bounded
const MIN_IDLE_MS: u64 = 100;

pub struct Controller<'d, T: Instance> {
    config: FirmwareConfig,
    power: PowerStateMachine,
    scheduler: RefreshScheduler,
    clock: WallClock,
    renderer: Renderer<'d, T>,
    backlight: Backlight<'d>,
    store: FlashStore<'d>,
    stack: Stack<'d>,
    control: cyw43::Control<'d>,
    last_price: Option<String<16>>,
}

impl<'d, T: Instance> Controller<'d, T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: FirmwareConfig,
        renderer: Renderer<'d, T>,
        backlight: Backlight<'d>,
        store: FlashStore<'d>,
        stack: Stack<'d>,
        control: cyw43::Control<'d>,
    ) -> Self {
        let power = PowerStateMachine::new(
            config.app.night.window(),
            config.app.brightness_index as usize,
        );
        Self {
            config,
            power,
            scheduler: RefreshScheduler::new(),
            clock: WallClock::new(),
            renderer,
            backlight,
            store,
            stack,
            control,
            last_price: None,
        }
    }

    pub async fn run(&mut self) -> ! {
        self.backlight.set_level(self.power.brightness());

        loop {
            let now = now_ms();
            if let Some(epoch) = TIME_SYNC.try_take() {
                self.clock.sync(epoch, now);
            }

            let before = self.power.mode();
            self.power.tick(now, self.clock.local(now));
            self.apply_mode_change(before);

            if let Ok(cfg) = PORTAL_SAVED.try_receive() {
                self.apply_portal_config(cfg).await;
            }

            if self.power.mode() == Mode::OtaUpdate {
                self.run_ota().await;
            }

            if self.scheduler.due(now, self.power.force_refresh()) {
                self.run_cycle().await;
            }

            let now = now_ms();
            let idle = self
                .power
                .sleep_duration_ms(self.scheduler.elapsed_ms(now))
                .clamp(MIN_IDLE_MS, UPDATE_INTERVAL_MS);
            match select(Timer::after_millis(idle), GESTURES.receive()).await {
                Either::First(()) => {}
                Either::Second(gesture) => self.on_gesture(gesture),
            }
        }
    }

    fn on_gesture(&mut self, gesture: Gesture) {
        let before = self.power.mode();
        let action = self.power.handle_gesture(now_ms(), gesture);
        info!("gesture {:?} -> {:?}", gesture, action);

        if action == Action::CycleBrightness {
            self.backlight.set_level(self.power.brightness());
        }
        self.apply_mode_change(before);
    }

    /// Side effects of a mode transition: portal lifecycle, dark screen,
    /// wake brightness
    fn apply_mode_change(&mut self, before: Mode) {
        let mode = self.power.mode();
        if mode == before {
            return;
        }
        info!("mode {:?} -> {:?}", before, mode);

        if mode == Mode::ConfigPortal {
            PORTAL_CMD.signal(PortalCommand::Start(self.config.app.clone()));
            let _ = self
                .renderer
                .render_message("CONFIG", "portal listening on port 80");
        } else if before == Mode::ConfigPortal {
            PORTAL_CMD.signal(PortalCommand::Stop);
            self.power.request_refresh();
        }

        if mode == Mode::NightDark {
            let _ = self.renderer.render_dark();
        } else if before == Mode::NightDark {
            // Leaving the dark window; repaint as soon as possible
            self.power.request_refresh();
        }

        self.backlight.set_level(self.power.wake_brightness());
    }

    /// One refresh cycle: clock, board, ticker, then the post-cycle
    /// transition
    async fn run_cycle(&mut self) {
        let plan = CyclePlan::for_mode(self.power.mode());
        self.power.begin_update();
        self.scheduler.begin();

        let mut online = true;
        if (plan.fetch_board || plan.fetch_ticker) && !self.stack.is_config_up() {
            online = self.reconnect().await;
        }

        if plan.fetch_board && online {
            match self.fetch_board().await {
                Ok((station, departures)) => {
                    let _ = self.renderer.render_board(&station, &departures);
                }
                Err(e) => {
                    warn!("board fetch failed: {:?}", e);
                    online = false;
                }
            }
        }

        let mut price = self.last_price.take();
        if plan.fetch_ticker && online {
            match self.fetch_price().await {
                Ok(p) => price = Some(p),
                Err(e) => {
                    warn!("price fetch failed: {:?}", e);
                    online = false;
                }
            }
        }

        if plan.update_clock {
            let datetime = match self.clock.local(now_ms()) {
                Some(t) => t.format_footer(),
                None => {
                    let mut s = String::new();
                    let _ = s.push_str("--:--");
                    s
                }
            };
            let _ = self
                .renderer
                .render_footer(&datetime, price.as_deref(), online);
        }
        self.last_price = price;

        if self.power.mode() == Mode::Updating && !plan.is_empty() {
            // Leave the fresh content visible before sleeping
            Timer::after_millis(UPDATE_LINGER_MS).await;
        }
        let next = self.power.finish_cycle();
        self.scheduler.complete(now_ms());

        if next == Mode::LightSleep && self.power.hardware_sleep_allowed() {
            debug!("light sleep until next refresh");
        }
        self.backlight.set_level(self.power.wake_brightness());
    }

    /// Bounded rejoin when a cycle starts without connectivity
    async fn reconnect(&mut self) -> bool {
        warn!("no connectivity at cycle start, rejoining");
        let net = &self.config.net;
        if !wifi::join(&mut self.control, &net.ssid, &net.password).await {
            return false;
        }
        with_timeout(Duration::from_secs(10), self.stack.wait_config_up())
            .await
            .is_ok()
    }

    async fn fetch_board(
        &mut self,
    ) -> Result<(String<32>, Vec<Departure, MAX_DEPARTURES>), FetchError> {
        let app = &self.config.app;
        let station_id = app.active_station(self.power.secondary_station());
        let datetime = self.clock.utc_epoch(now_ms()).map(|epoch| {
            LocalTime::from_utc_epoch(epoch + app.offset as i64 * 60).format_query()
        });
        let url = stationboard_url(
            &self.config.api.stationboard,
            station_id,
            app.limit,
            datetime.as_deref(),
        );
        info!("fetching {}", url.as_str());

        let mut decoder = BoardDecoder::new();
        let mut station: String<32> = String::new();
        let _ = station.push_str(station_id);
        let mut departures: Vec<Departure, MAX_DEPARTURES> = Vec::new();

        let result = get_streamed(self.stack, &url, |chunk| {
            for &b in chunk {
                match decoder.feed(b) {
                    Ok(Some(DecodeEvent::Station(name))) => station = name,
                    Ok(Some(DecodeEvent::Departure(dep))) => {
                        let _ = departures.push(dep);
                    }
                    Ok(None) => {}
                    Err(_) => return false,
                }
            }
            true
        })
        .await;

        match result {
            Ok(()) => Ok((station, departures)),
            // A mid-document decode error keeps the records already emitted
            Err(FetchError::Decode) if !departures.is_empty() => Ok((station, departures)),
            Err(e) => Err(e),
        }
    }

    async fn fetch_price(&mut self) -> Result<String<16>, FetchError> {
        let mut decoder = PriceDecoder::new();
        let result = get_streamed(self.stack, &self.config.api.price, |chunk| {
            for &b in chunk {
                if decoder.feed(b).is_err() {
                    return false;
                }
            }
            true
        })
        .await;

        match result {
            Ok(()) => {
                let amount = decoder.amount().ok_or(FetchError::Decode)?;
                let mut price = String::new();
                let _ = price.push_str(amount);
                Ok(price)
            }
            Err(e) => Err(e),
        }
    }

    async fn apply_portal_config(&mut self, cfg: AppConfig) {
        let doc = encode_config(&cfg);
        match self.store.write_config(doc.as_bytes()).await {
            Ok(()) => info!("portal config persisted ({} bytes)", doc.len()),
            Err(e) => warn!("portal config persist failed: {:?}", e),
        }
        self.power.set_night(cfg.night.window());
        self.config.app = cfg;
        self.power.request_refresh();
    }

    /// OTA mode: exits only through the post-transfer restart
    async fn run_ota(&mut self) -> ! {
        let _ = self
            .renderer
            .render_message("OTA UPDATE", "send image to port 8080");
        // Recovery path must be visible even when night-dark forced zero
        self.backlight.set_level(self.power.brightness().max(64));

        loop {
            match ota::receive_image(self.stack, self.store.raw()).await {
                Ok(len) => {
                    info!("ota image staged ({} bytes), restarting", len);
                    cortex_m::peripheral::SCB::sys_reset();
                }
                Err(e) => {
                    warn!("ota transfer failed: {:?}", e);
                    let _ = self
                        .renderer
                        .render_message("OTA UPDATE", "transfer failed, retrying");
                }
            }
        }
    }
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}
