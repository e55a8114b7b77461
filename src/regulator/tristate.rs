//! Three-position mixing-valve controller.
//!
//! The valve actuator only understands three commands: drive open, drive
//! closed, or stay put. The controller integrates the temperature error
//! into a virtual position in [0,100]% travel and emits a direction pulse
//! whenever that position moves past the last issued one by more than the
//! hysteresis. A deadband around the setpoint suppresses all movement so
//! the actuator does not dither near target.
//!
//! The actuator is slow (full travel takes minutes), so the per-tick
//! position step is bounded by the physical slew rate; the controller can
//! never wind the virtual position ahead of where the valve can actually
//! be by more than one tick of travel.

use crate::config::{ControlConfig, VALVE_TRAVEL_MS};

/// Valve drive command for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValveCommand {
    /// Drive toward open (raise supply temperature).
    Open,
    /// Drive toward closed (lower supply temperature).
    Close,
    /// Leave the actuator unpowered.
    #[default]
    Neutral,
}

/// Controller tuning. Defaults match the commissioned plant.
#[derive(Debug, Clone, Copy)]
pub struct TristateParams {
    /// Proportional gain (%-travel per K per second, before time scaling).
    pub gain: f32,
    /// Deadband half-width (K).
    pub min_error: f32,
    /// Hysteresis (% travel) around the last issued position.
    pub hysteresis: f32,
    /// Integral time constant (seconds).
    pub integral_time_s: f32,
    /// Full actuator travel time (milliseconds).
    pub travel_time_ms: u32,
}

impl Default for TristateParams {
    fn default() -> Self {
        Self {
            gain: 0.35,
            min_error: 0.4,
            hysteresis: 0.2,
            integral_time_s: 1.0,
            travel_time_ms: VALVE_TRAVEL_MS,
        }
    }
}

impl TristateParams {
    pub fn from_config(cfg: &ControlConfig) -> Self {
        Self {
            gain: cfg.valve_gain,
            min_error: cfg.valve_min_error,
            hysteresis: cfg.valve_hysteresis,
            integral_time_s: cfg.valve_integral_time_s,
            travel_time_ms: VALVE_TRAVEL_MS,
        }
    }
}

/// Three-position controller state.
pub struct TristateValve {
    params: TristateParams,
    /// Virtual commanded position, % travel.
    position: f32,
    /// Position at which the last Open/Close pulse was issued.
    issued: f32,
    last_cmd: ValveCommand,
    stale: bool,
}

impl TristateValve {
    pub fn new(params: TristateParams) -> Self {
        Self {
            params,
            position: 0.0,
            issued: 0.0,
            last_cmd: ValveCommand::Neutral,
            stale: false,
        }
    }

    /// One controller step.
    ///
    /// `measured_c = None` means the supply sensor is invalid; the
    /// controller then holds the last command (fail-safe hold, not
    /// Neutral) and raises the stale flag for the layer above.
    pub fn step(
        &mut self,
        setpoint_c: i16,
        measured_c: Option<i16>,
        elapsed_ms: u32,
    ) -> ValveCommand {
        let Some(measured) = measured_c else {
            self.stale = true;
            return self.last_cmd;
        };
        self.stale = false;

        let error = f32::from(setpoint_c - measured);
        if error.abs() < self.params.min_error {
            // Inside the deadband the valve is never driven, regardless of
            // where the integrator left off.
            self.last_cmd = ValveCommand::Neutral;
            return ValveCommand::Neutral;
        }

        let dt_s = elapsed_ms as f32 / 1_000.0;
        let step = self.params.gain * error * dt_s / self.params.integral_time_s;

        // Travel budget for this tick: the actuator cannot move faster.
        let slew = 100.0 * elapsed_ms as f32 / self.params.travel_time_ms as f32;
        let step = step.clamp(-slew, slew);

        self.position = (self.position + step).clamp(0.0, 100.0);

        let cmd = if self.position > self.issued + self.params.hysteresis {
            ValveCommand::Open
        } else if self.position < self.issued - self.params.hysteresis {
            ValveCommand::Close
        } else {
            ValveCommand::Neutral
        };
        if cmd != ValveCommand::Neutral {
            self.issued = self.position;
        }
        self.last_cmd = cmd;
        cmd
    }

    /// Supply sensor was invalid on the last step.
    pub fn stale(&self) -> bool {
        self.stale
    }

    /// Virtual commanded position, % travel.
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Drop accumulated travel state (used when the regulator is switched
    /// off and the valve is driven to a defined end stop externally).
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.issued = 0.0;
        self.last_cmd = ValveCommand::Neutral;
        self.stale = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valve() -> TristateValve {
        TristateValve::new(TristateParams::default())
    }

    #[test]
    fn deadband_stays_neutral_for_ten_ticks() {
        let mut v = valve();
        // Push the integrator somewhere first.
        for _ in 0..5 {
            v.step(50, Some(40), 1_000);
        }
        // Error within the deadband: Neutral on every one of 10 ticks.
        for _ in 0..10 {
            assert_eq!(v.step(50, Some(50), 1_000), ValveCommand::Neutral);
        }
    }

    #[test]
    fn positive_error_drives_open() {
        let mut v = valve();
        assert_eq!(v.step(50, Some(40), 1_000), ValveCommand::Open);
    }

    #[test]
    fn negative_error_drives_closed() {
        let mut v = valve();
        // Wind the position up first so there is travel to give back.
        for _ in 0..20 {
            v.step(60, Some(40), 1_000);
        }
        assert_eq!(v.step(40, Some(60), 1_000), ValveCommand::Close);
    }

    #[test]
    fn step_is_bounded_by_actuator_slew() {
        let mut v = valve();
        let before = v.position();
        v.step(70, Some(10), 1_000); // huge error
        let moved = v.position() - before;
        let slew = 100.0 * 1_000.0 / VALVE_TRAVEL_MS as f32;
        assert!(moved <= slew + f32::EPSILON);
    }

    #[test]
    fn exhausted_travel_budget_goes_neutral() {
        let mut v = valve();
        // Saturate the position at 100%.
        for _ in 0..32 {
            if v.position() >= 100.0 {
                break;
            }
            v.step(70, Some(10), 10_000);
        }
        assert!(v.position() >= 100.0 - f32::EPSILON);
        // Still demanding more heat, but no travel is left.
        assert_eq!(v.step(70, Some(10), 1_000), ValveCommand::Neutral);
    }

    #[test]
    fn stale_sensor_holds_last_command() {
        let mut v = valve();
        let cmd = v.step(50, Some(40), 1_000);
        assert_eq!(cmd, ValveCommand::Open);
        assert_eq!(v.step(50, None, 1_000), ValveCommand::Open);
        assert!(v.stale());
        // Recovery clears the flag.
        v.step(50, Some(49), 1_000);
        assert!(!v.stale());
    }

    #[test]
    fn hysteresis_suppresses_tiny_reversals() {
        let mut v = valve();
        v.step(50, Some(40), 1_000); // issue Open, issued == position
        // A tiny opposite error moves the position less than the
        // hysteresis, so no Close pulse is issued.
        assert_eq!(v.step(49, Some(50), 100), ValveCommand::Neutral);
    }
}
