//! Port traits — the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (sensor acquisition, contact inputs, relay outputs,
//! event sinks) implement these traits. The
//! [`ControlService`](super::service::ControlService) consumes them via
//! generics, so the control core never touches a pin number.

use crate::inputs::CHANNELS;
use crate::regulator::tristate::ValveCommand;
use crate::sequencer::context::CompressorOutputs;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One tick's worth of plant temperatures, in whole °C. `None` means the
/// sensor collaborator flagged the reading invalid (open circuit, out of
/// range); the core never sees raw ADC counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Temperatures {
    pub outdoor_c: Option<i16>,
    pub condenser_c: Option<i16>,
    pub storage_c: Option<i16>,
    pub supply_c: Option<i16>,
}

/// Read-side port for the temperature sensors.
pub trait SensorPort {
    /// Read all four plant temperatures.
    fn read_temperatures(&mut self) -> Temperatures;
}

/// Read-side port for the eight digital control contacts. Returns raw,
/// undebounced levels; debouncing happens in the core.
pub trait ContactPort {
    fn read_contacts(&mut self) -> [bool; CHANNELS];
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain commands named logical outputs only.
pub trait ActuatorPort {
    /// Apply the compressor output set (contactors, heater, fan, bypass,
    /// charge pump, alarm relay).
    fn apply_outputs(&mut self, outputs: &CompressorOutputs);

    /// Pulse the mixing valve in the commanded direction for this tick.
    fn drive_valve(&mut self, cmd: ValveCommand);

    /// Switch the heating-circuit circulation pump.
    fn set_heating_pump(&mut self, on: bool);

    /// De-energise every output — safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, remote
/// settings link, display layer).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
