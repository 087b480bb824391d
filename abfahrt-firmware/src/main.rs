//! Abfahrt - transit departure display firmware
//!
//! Firmware binary for the Raspberry Pi Pico W driving a 1.14" ST7789
//! panel. Shows the next departures for a configured station from the
//! transport.opendata.ch stationboard API, with a clock/price footer,
//! night-mode power management, and a one-button gesture interface.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{DhcpConfig, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_time::Timer;
use heapless::String;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};

use crate::config::FlashStore;
use crate::controller::Controller;
use crate::display::{Backlight, Renderer, St7789, FRAME_PIXELS};
use crate::tasks::button::button_task;
use crate::tasks::net::{cyw43_task, net_task};
use crate::tasks::portal::portal_task;

mod channels;
mod config;
mod controller;
mod display;
mod net;
mod tasks;

/// Embedded default configuration (compiled into firmware)
/// Edit appliance.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../appliance.toml");

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

// WiFi chip blobs, flashed separately to keep iteration fast:
//   probe-rs download 43439A0.bin     --binary-format bin --chip RP2040 --base-address 0x10100000
//   probe-rs download 43439A0_clm.bin --binary-format bin --chip RP2040 --base-address 0x10140000
const WIFI_FW_ADDR: usize = 0x1010_0000;
const WIFI_FW_LEN: usize = 230_321;
const WIFI_CLM_ADDR: usize = 0x1014_0000;
const WIFI_CLM_LEN: usize = 4752;

static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<8>> = StaticCell::new();
static FRAME: StaticCell<[u16; FRAME_PIXELS]> = StaticCell::new();
static NTP_SERVER: StaticCell<String<48>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("abfahrt firmware starting");

    let p = embassy_rp::init(Default::default());

    let mut store = FlashStore::new(p.FLASH, p.DMA_CH1);

    // Holding the button through power-on wipes the stored overrides
    let button = Input::new(p.PIN_15, Pull::Up);
    Timer::after_millis(50).await;
    if button.is_low() {
        warn!("button held at boot, erasing stored configuration");
        if store.erase_config().await.is_err() {
            error!("config erase failed");
        }
    }

    let config = config::load(&mut store, EMBEDDED_CONFIG).await;
    info!(
        "station '{}' / '{}', limit {}",
        config.app.station_id.as_str(),
        config.app.station_id2.as_str(),
        config.app.limit
    );

    // Display: blocking SPI0 at 62.5 MHz, PWM backlight
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = 62_500_000;
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let dc = Output::new(p.PIN_16, Level::Low);
    let lcd_cs = Output::new(p.PIN_17, Level::High);
    let rst = Output::new(p.PIN_20, Level::Low);
    let mut lcd = St7789::new(spi, dc, lcd_cs, rst);
    if lcd.init().is_err() {
        error!("display init failed");
    }

    let mut pwm_config = PwmConfig::default();
    let backlight = Backlight::new(
        Pwm::new_output_b(p.PWM_SLICE2, p.PIN_21, pwm_config.clone()),
        &mut pwm_config,
    );

    let frame = FRAME.init([0u16; FRAME_PIXELS]);
    let mut renderer = Renderer::new(lcd, frame);
    let _ = renderer.render_boot("connecting...");

    // WiFi chip over PIO SPI
    let fw = unsafe { core::slice::from_raw_parts(WIFI_FW_ADDR as *const u8, WIFI_FW_LEN) };
    let clm = unsafe { core::slice::from_raw_parts(WIFI_CLM_ADDR as *const u8, WIFI_CLM_LEN) };

    let pwr = Output::new(p.PIN_23, Level::Low);
    let wl_cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let wl_spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        wl_cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, wl_spi, fw).await;
    unwrap!(spawner.spawn(cyw43_task(runner)));
    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let mut dhcp = DhcpConfig::default();
    dhcp.hostname = Some(config.net.hostname.clone());
    // Single appliance on a private network; a fixed TCP seed is fine
    let (stack, net_runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(dhcp),
        NET_RESOURCES.init(StackResources::new()),
        0x4142_4641_4852_5421,
    );
    unwrap!(spawner.spawn(net_task(net_runner)));

    if net::wifi::join(&mut control, &config.net.ssid, &config.net.password).await {
        let _ = renderer.render_boot("waiting for dhcp...");
        net::wifi::wait_for_ip(stack).await;
        let _ = renderer.render_boot("syncing time...");
    } else {
        // The controller retries at the start of each cycle
        let _ = renderer.render_boot("wifi unavailable");
    }

    let ntp = NTP_SERVER.init(config.api.ntp.clone());
    unwrap!(spawner.spawn(net::sntp::sntp_task(stack, ntp.as_str())));
    unwrap!(spawner.spawn(portal_task(stack)));
    unwrap!(spawner.spawn(button_task(button)));

    Controller::new(config, renderer, backlight, store, stack, control)
        .run()
        .await
}
