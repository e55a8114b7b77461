//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — log to serial, forward to
//! the remote settings link, drive the status LEDs.

use crate::charge::ChargeState;
use crate::sequencer::SeqState;

/// Structured events emitted by the control core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The control service has started (carries initial sequencer state).
    Started(SeqState),

    /// The compressor sequencer transitioned between states.
    SequencerChanged { from: SeqState, to: SeqState },

    /// The storage-charge scheduler transitioned between states.
    ChargeChanged { from: ChargeState, to: ChargeState },

    /// One or more interlock faults were raised (SafetyFault mask).
    FaultRaised(u8),

    /// A latched fault was acknowledged and cleared.
    FaultAcknowledged,

    /// The supply sensor went stale; the valve holds its last command.
    SensorStale,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub seq_state: SeqState,
    pub charge_state: ChargeState,
    pub outdoor_c: Option<i16>,
    pub storage_c: Option<i16>,
    pub supply_c: Option<i16>,
    pub setpoint_c: i16,
    /// Packed [`SystemStatus`](crate::status::SystemStatus) word.
    pub status_word: u16,
}
