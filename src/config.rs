//! System configuration parameters.
//!
//! Two kinds of values live here and must not be confused:
//!
//! * Fixed safety/operational timing constants. These are properties of the
//!   refrigeration circuit and the installed actuators, compiled in and
//!   never writable through the communication layer.
//! * [`ControlConfig`], the tunable regulator/loop parameters. These can be
//!   overridden at provisioning time and round-trip through serde.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fixed timing constants (milliseconds unless noted)
// ---------------------------------------------------------------------------

/// Compressor start-contactor changeover time.
pub const START_DELAY_MS: u32 = 1_000;

/// Mixing-valve full travel 100% -> 0%, including 5 s reserve.
pub const VALVE_TRAVEL_MS: u32 = 155_000;

/// Charge-pump overrun after storage charging ends.
pub const PUMP_OVERRUN_MS: u32 = 100_000;

/// Maximum continuous charge duration before a defrost must run.
pub const MAX_CHARGE_MS: u32 = 2_400_000;

/// Anti-short-cycle lockout: minimum off-time between compressor runs.
pub const RESTART_LOCKOUT_MS: u32 = 900_000;

/// No defrost within this time after a compressor start, so that system
/// pressure can build up first.
pub const DEFROST_LOCKOUT_MS: u32 = 210_000;

/// Hard cap on a single defrost cycle.
pub const DEFROST_MAX_MS: u32 = 600_000;

/// Outdoor temperature (°C) below which periodic evaporator defrost is
/// permitted. Above this the coil does not ice up.
pub const DEFROST_OUTDOOR_MAX_C: i16 = 10;

/// Condenser-return temperature (°C) at which the evaporator coil is
/// considered de-iced and the defrost cycle ends.
pub const DEFROST_FINISH_COND_C: i16 = 15;

/// Storage must fall this far (K) below the supply setpoint before a new
/// charge cycle is demanded. Prevents charge/stop chatter around the target.
pub const CHARGE_DEMAND_HYSTERESIS_C: i16 = 4;

/// Clamp range for the computed supply setpoint (°C).
pub const SUPPLY_MIN_C: i16 = 0;
/// Upper clamp: condensation limit of the circuit.
pub const SUPPLY_MAX_C: i16 = 70;

// ---------------------------------------------------------------------------
// Tunable configuration
// ---------------------------------------------------------------------------

/// Core control-loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    // --- Timing ---
    /// Control loop interval (milliseconds).
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,

    // --- Three-position valve controller ---
    /// Proportional gain of the valve controller.
    pub valve_gain: f32,
    /// Deadband half-width (K); inside it the valve is never driven.
    pub valve_min_error: f32,
    /// Hysteresis (% travel) on the commanded position before a new
    /// direction pulse is issued.
    pub valve_hysteresis: f32,
    /// Integral time constant (seconds).
    pub valve_integral_time_s: f32,

    // --- Heating ---
    /// Setback (K) subtracted from the setpoint in reduced (night) mode.
    pub reduced_setback_c: i16,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            control_loop_interval_ms: 1_000, // 1 Hz
            telemetry_interval_secs: 60,     // 1/min

            valve_gain: 0.35,
            valve_min_error: 0.4,
            valve_hysteresis: 0.2,
            valve_integral_time_s: 1.0,

            reduced_setback_c: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = ControlConfig::default();
        assert!(c.control_loop_interval_ms > 0);
        assert!(c.valve_gain > 0.0);
        assert!(c.valve_min_error > 0.0);
        assert!(c.valve_hysteresis > 0.0);
        assert!(c.valve_integral_time_s > 0.0);
        assert!(c.reduced_setback_c > 0);
    }

    #[test]
    fn timing_constants_keep_their_ordering() {
        // The defrost lockout must be far shorter than the charge cap,
        // otherwise a forced defrost could never fire.
        assert!(DEFROST_LOCKOUT_MS < MAX_CHARGE_MS);
        // The pump overrun must fit inside the restart lockout.
        assert!(PUMP_OVERRUN_MS < RESTART_LOCKOUT_MS);
        assert!(SUPPLY_MIN_C < SUPPLY_MAX_C);
        assert!(DEFROST_FINISH_COND_C > DEFROST_OUTDOOR_MAX_C);
    }

    #[test]
    fn serde_roundtrip() {
        let c = ControlConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: ControlConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.control_loop_interval_ms, c2.control_loop_interval_ms);
        assert!((c.valve_gain - c2.valve_gain).abs() < 0.001);
        assert_eq!(c.reduced_setback_c, c2.reduced_setback_c);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = ControlConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: ControlConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.telemetry_interval_secs, c2.telemetry_interval_secs);
        assert!((c.valve_min_error - c2.valve_min_error).abs() < 0.001);
    }
}
