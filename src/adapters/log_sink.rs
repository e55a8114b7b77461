//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production). A future settings-link
//! adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | seq={:?} charge={:?} | outdoor={:?} storage={:?} supply={:?} | \
                     setpoint={} | status=0x{:04x}",
                    t.seq_state,
                    t.charge_state,
                    t.outdoor_c,
                    t.storage_c,
                    t.supply_c,
                    t.setpoint_c,
                    t.status_word,
                );
            }
            AppEvent::SequencerChanged { from, to } => {
                info!("SEQ   | {:?} -> {:?}", from, to);
            }
            AppEvent::ChargeChanged { from, to } => {
                info!("CHARGE| {:?} -> {:?}", from, to);
            }
            AppEvent::FaultRaised(mask) => {
                warn!("FAULT | raised, mask=0b{:03b}", mask);
            }
            AppEvent::FaultAcknowledged => {
                info!("FAULT | acknowledged");
            }
            AppEvent::SensorStale => {
                warn!("SENSOR| supply reading stale, output held");
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
