//! Controller firmware — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  HardwareAdapter            LogEventSink                 │
//! │  (Sensor+Contact+Actuator)  (EventSink)                  │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────      │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │            ControlService (pure logic)             │  │
//! │  │  charge scheduler · regulator · sequencer          │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! One synchronous polling loop; all timers are elapsed-time counters fed
//! by the measured loop delta, never sleeps inside the core.

use std::time::Instant;

use anyhow::Result;
use log::info;

use heatpumpctl::adapters::hardware::HardwareAdapter;
use heatpumpctl::adapters::log_sink::LogEventSink;
use heatpumpctl::app::service::ControlService;
use heatpumpctl::config::ControlConfig;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("heatpumpctl v{} booting", env!("CARGO_PKG_VERSION"));

    let config = ControlConfig::default();
    let loop_interval_ms = config.control_loop_interval_ms;

    let mut hw = HardwareAdapter::new().map_err(|e| anyhow::anyhow!("hardware init: {e}"))?;
    let mut sink = LogEventSink::new();
    let mut service = ControlService::new(config);
    service.start(&mut sink);

    let mut last = Instant::now();
    loop {
        esp_idf_hal::delay::FreeRtos::delay_ms(loop_interval_ms);

        let now = Instant::now();
        let elapsed_ms = now.duration_since(last).as_millis().min(u128::from(u32::MAX)) as u32;
        last = now;

        service.tick(&mut hw, &mut sink, elapsed_ms);
    }
}
