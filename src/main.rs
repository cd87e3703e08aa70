//! FireSuppress Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter  VisionUart   MqttTelemetrySink  MonotonicClock│
//! │  (SensorPort)     (ByteSource) (TelemetrySink)    (Clock)       │
//! │  RelayDriver ×3   MQTT receiver ──▶ CommandGateway inbox       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            SuppressionService (pure logic)             │    │
//! │  │  SensorStore · Vision · Fan · Pump · Buzzer            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  One pinned thread per loop: sensor, vision, fan, pump,        │
//! │  buzzer, telemetry, command.  Main thread logs status.         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::{AnyOutputPin, IOPin, Output, OutputPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{error, info, warn};

use firesuppress::adapters::device_id;
use firesuppress::adapters::hardware::HardwareAdapter;
use firesuppress::adapters::log_sink::LogTelemetrySink;
use firesuppress::adapters::mqtt::{self, MqttTelemetrySink};
use firesuppress::adapters::time::MonotonicClock;
use firesuppress::adapters::uart::VisionUart;
use firesuppress::app::gateway::CommandGateway;
use firesuppress::app::ports::{Clock, TelemetrySink};
use firesuppress::app::service::SuppressionService;
use firesuppress::config::SystemConfig;
use firesuppress::drivers::relay::{ActiveLevel, RelayDriver};
use firesuppress::drivers::task_pin::{spawn_on_core, Core};
use firesuppress::pins;
use firesuppress::sensors::dht11::Dht11Sensor;
use firesuppress::sensors::mq2::Mq2Sensor;
use firesuppress::sensors::SensorHub;

type Rly = RelayDriver<PinDriver<'static, AnyOutputPin, Output>>;
type Service = SuppressionService<Rly, Rly, Rly>;

static GATEWAY: CommandGateway = CommandGateway::new();

const WIFI_SSID: Option<&str> = option_env!("FIRESUPPRESS_WIFI_SSID");
const WIFI_PASS: &str = match option_env!("FIRESUPPRESS_WIFI_PASS") {
    Some(p) => p,
    None => "",
};
const MQTT_URL: &str = match option_env!("FIRESUPPRESS_MQTT_URL") {
    Some(u) => u,
    None => "mqtt://broker.emqx.io:1883",
};
const WIFI_CONNECT_ATTEMPTS: u32 = 5;
const STATUS_PERIOD: Duration = Duration::from_secs(10);

// Loop priorities.  The pump loop outranks the rest: its deadline is the
// one that floods the room if missed.
const PRIO_PUMP: u8 = 7;
const PRIO_BUZZER: u8 = 6;
const PRIO_VISION: u8 = 6;
const PRIO_FAN: u8 = 5;
const PRIO_COMMAND: u8 = 5;
const PRIO_SENSOR: u8 = 4;
const PRIO_TELEMETRY: u8 = 3;

fn ms(v: u32) -> Duration {
    Duration::from_millis(v as u64)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  FireSuppress v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    if let Err(e) = init_hal() {
        // Without ADC/GPIO the sensor loop reads garbage; keep going so
        // vision and remote control still work.
        error!("HAL init failed: {}", e);
    }

    // ── 2. Config ─────────────────────────────────────────────
    let config = SystemConfig::default();
    let config = match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("Config rejected ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 3. Identity ───────────────────────────────────────────
    let mac = device_id::read_mac();
    let dev_id = device_id::device_id(&mac);
    let dev_hostname = device_id::hostname(&mac);
    info!("Device ID: {} (hostname: {})", dev_id, dev_hostname);

    // ── 4. Peripherals ────────────────────────────────────────
    let p = Peripherals::take()?;
    let fan = RelayDriver::new(PinDriver::output(p.pins.gpio13.downgrade_output())?, ActiveLevel::High, "fan");
    let pump = RelayDriver::new(PinDriver::output(p.pins.gpio14.downgrade_output())?, ActiveLevel::High, "pump");
    let buzzer = RelayDriver::new(PinDriver::output(p.pins.gpio8.downgrade_output())?, ActiveLevel::Low, "buzzer");
    info!(
        "Relays: fan=GPIO{} pump=GPIO{} buzzer=GPIO{} parked off",
        pins::FAN_RELAY_GPIO,
        pins::PUMP_RELAY_GPIO,
        pins::BUZZER_GPIO
    );

    let vision_uart = VisionUart::new(p.uart1, p.pins.gpio17.downgrade(), p.pins.gpio18.downgrade())?;
    let sensors = HardwareAdapter::new(SensorHub::new(
        Dht11Sensor::new(pins::DHT11_GPIO),
        Mq2Sensor::new(pins::MQ2_AO_GPIO, pins::MQ2_DO_GPIO),
    ));

    // ── 5. Core service ───────────────────────────────────────
    let service: Arc<Service> = Arc::new(SuppressionService::new(config, dev_id, fan, pump, buzzer));
    let config = service.config();

    // ── 6. Network (optional) ─────────────────────────────────
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut esp_wifi = EspWifi::new(p.modem, sys_loop.clone(), Some(nvs))?;
    let online = match connect_wifi(&mut esp_wifi, sys_loop) {
        Ok(()) => true,
        Err(e) => {
            warn!("WiFi: {}, running offline with telemetry to log", e);
            false
        }
    };

    let mqtt_client = if online {
        match mqtt::connect(MQTT_URL, dev_hostname.as_str()) {
            Ok((client, conn)) => {
                let rx_client = Arc::clone(&client);
                spawn_on_core(Core::Pro, 5, 6, "mqtt-rx\0", move || {
                    mqtt::run_receiver(conn, rx_client, &GATEWAY)
                })?;
                Some(client)
            }
            Err(e) => {
                warn!("MQTT: client init failed: {}", e);
                None
            }
        }
    } else {
        None
    };

    // ── 7. Control loops ──────────────────────────────────────
    let clock = Arc::new(MonotonicClock::new());

    {
        let (svc, mut port) = (Arc::clone(&service), sensors);
        let period = ms(config.sensor_period_ms);
        spawn_on_core(Core::App, PRIO_SENSOR, 6, "sensor\0", move || loop {
            svc.sample(&mut port);
            thread::sleep(period);
        })?;
    }
    {
        let (svc, clk, mut uart) = (Arc::clone(&service), Arc::clone(&clock), vision_uart);
        let (delay, period) = (ms(config.vision_start_delay_ms), ms(config.vision_period_ms));
        spawn_on_core(Core::App, PRIO_VISION, 4, "vision\0", move || {
            thread::sleep(delay);
            loop {
                svc.poll_vision(&mut uart, &*clk);
                thread::sleep(period);
            }
        })?;
    }
    spawn_cycle(&service, &clock, "fan\0", PRIO_FAN, config.fan_start_delay_ms, config.fan_period_ms, |s, now| {
        s.fan_cycle(now)
    })?;
    spawn_cycle(&service, &clock, "pump\0", PRIO_PUMP, config.pump_start_delay_ms, config.pump_period_ms, |s, now| {
        s.pump_cycle(now)
    })?;
    spawn_cycle(
        &service,
        &clock,
        "buzzer\0",
        PRIO_BUZZER,
        config.buzzer_start_delay_ms,
        config.buzzer_period_ms,
        |s, now| s.buzzer_cycle(now),
    )?;
    spawn_cycle(&service, &clock, "command\0", PRIO_COMMAND, 0, config.command_period_ms, |s, now| {
        GATEWAY.process(s, now);
    })?;

    match mqtt_client {
        Some(client) => spawn_telemetry(&service, &clock, config.telemetry_period_ms, MqttTelemetrySink::new(client))?,
        None => spawn_telemetry(&service, &clock, config.telemetry_period_ms, LogTelemetrySink::new())?,
    }

    info!("System ready.");

    // ── 8. Supervisor ─────────────────────────────────────────
    // `esp_wifi` must outlive the loops.
    let _wifi = esp_wifi;
    loop {
        thread::sleep(STATUS_PERIOD);
        service.log_status(clock.now_ms());
    }
}

fn spawn_cycle(
    service: &Arc<Service>,
    clock: &Arc<MonotonicClock>,
    name: &'static str,
    priority: u8,
    start_delay_ms: u32,
    period_ms: u32,
    cycle: impl Fn(&Service, u64) + Send + 'static,
) -> Result<()> {
    let (svc, clk) = (Arc::clone(service), Arc::clone(clock));
    spawn_on_core(Core::App, priority, 4, name, move || {
        thread::sleep(ms(start_delay_ms));
        loop {
            cycle(&svc, clk.now_ms());
            thread::sleep(ms(period_ms));
        }
    })?;
    Ok(())
}

fn spawn_telemetry<S: TelemetrySink + Send + 'static>(
    service: &Arc<Service>,
    clock: &Arc<MonotonicClock>,
    period_ms: u32,
    mut sink: S,
) -> Result<()> {
    let (svc, clk) = (Arc::clone(service), Arc::clone(clock));
    spawn_on_core(Core::Pro, PRIO_TELEMETRY, 6, "telemetry\0", move || loop {
        svc.publish_telemetry(&mut sink, clk.now_ms());
        thread::sleep(ms(period_ms));
    })?;
    Ok(())
}

/// ADC and GPIO bring-up.  The raw return code is logged here; callers
/// only see which subsystem failed.
fn init_hal() -> firesuppress::error::Result<()> {
    firesuppress::drivers::hw_init::init_peripherals().map_err(|e| {
        warn!("HAL: {}", e);
        firesuppress::error::Error::from(e)
    })
}

fn connect_wifi(esp_wifi: &mut EspWifi<'static>, sys_loop: EspSystemEventLoop) -> Result<()> {
    let ssid = WIFI_SSID.ok_or_else(|| anyhow!("no SSID configured"))?;
    let mut wifi = BlockingWifi::wrap(esp_wifi, sys_loop)?;

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: ssid.try_into().map_err(|_| anyhow!("SSID too long"))?,
        password: WIFI_PASS.try_into().map_err(|_| anyhow!("password too long"))?,
        auth_method: if WIFI_PASS.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        },
        ..Default::default()
    }))?;
    wifi.start()?;

    let mut last_err = None;
    for attempt in 1..=WIFI_CONNECT_ATTEMPTS {
        match wifi.connect().and_then(|()| wifi.wait_netif_up()) {
            Ok(()) => {
                info!("WiFi: connected to '{}' (attempt {})", ssid, attempt);
                return Ok(());
            }
            Err(e) => {
                warn!("WiFi: attempt {}/{} failed: {}", attempt, WIFI_CONNECT_ATTEMPTS, e);
                let _ = wifi.disconnect();
                last_err = Some(e);
                thread::sleep(Duration::from_secs(2));
            }
        }
    }
    let _ = wifi.stop();
    Err(last_err.map_or_else(|| anyhow!("connect failed"), anyhow::Error::from))
}
