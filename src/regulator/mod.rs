//! Supply-temperature regulator.
//!
//! Combines the heating-curve setpoint calculation ([`curve`]) with the
//! three-position mixing-valve controller ([`tristate`]). The regulator
//! runs in one of five modes selected by the orchestration layer; only
//! Auto drives the valve. During storage charging and defrost the heating
//! circuit is passive, but the setpoint keeps being computed because the
//! charge scheduler uses it as its storage target.

pub mod curve;
pub mod tristate;

use log::info;

use crate::config::ControlConfig;
use tristate::{TristateParams, TristateValve, ValveCommand};

/// Regulator operating mode, selected by the orchestration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegulatorMode {
    /// Plant off; heating pump stopped, valve idle.
    #[default]
    Off,
    /// Normal weather-compensated heating operation.
    Auto,
    /// Outputs under external control; the regulator idles.
    Manual,
    /// Storage charge in progress; heating circuit passive.
    Charging,
    /// Evaporator defrost in progress; heating circuit passive.
    Defrost,
}

/// What the regulator wants from the hardware this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegulatorOutput {
    pub valve: ValveCommand,
    pub heating_pump: bool,
    /// Regulator is actively driving the valve (status-word bit).
    pub active: bool,
    /// Supply sensor was invalid; last command held.
    pub stale: bool,
}

impl RegulatorOutput {
    const IDLE: Self = Self {
        valve: ValveCommand::Neutral,
        heating_pump: false,
        active: false,
        stale: false,
    };
}

/// Mixing-valve regulator with mode selection.
pub struct Regulator {
    mode: RegulatorMode,
    valve: TristateValve,
}

impl Regulator {
    pub fn new(cfg: &ControlConfig) -> Self {
        Self {
            mode: RegulatorMode::Off,
            valve: TristateValve::new(TristateParams::from_config(cfg)),
        }
    }

    pub fn mode(&self) -> RegulatorMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RegulatorMode) {
        if mode != self.mode {
            info!("regulator mode: {:?} -> {:?}", self.mode, mode);
            if mode == RegulatorMode::Off {
                self.valve.reset();
            }
            self.mode = mode;
        }
    }

    /// One regulator step. `setpoint_c` is the already computed supply
    /// setpoint; `supply_c` the measured supply temperature (None when the
    /// sensor is invalid).
    pub fn step(
        &mut self,
        setpoint_c: i16,
        supply_c: Option<i16>,
        elapsed_ms: u32,
    ) -> RegulatorOutput {
        match self.mode {
            RegulatorMode::Auto => {
                let cmd = self.valve.step(setpoint_c, supply_c, elapsed_ms);
                RegulatorOutput {
                    valve: cmd,
                    heating_pump: true,
                    active: true,
                    stale: self.valve.stale(),
                }
            }
            // Manual leaves the outputs to the external operator; Off,
            // Charging and Defrost park the heating circuit.
            RegulatorMode::Off
            | RegulatorMode::Manual
            | RegulatorMode::Charging
            | RegulatorMode::Defrost => RegulatorOutput::IDLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regulator_in(mode: RegulatorMode) -> Regulator {
        let mut r = Regulator::new(&ControlConfig::default());
        r.set_mode(mode);
        r
    }

    #[test]
    fn auto_drives_valve_and_pump() {
        let mut r = regulator_in(RegulatorMode::Auto);
        let out = r.step(50, Some(40), 1_000);
        assert_eq!(out.valve, ValveCommand::Open);
        assert!(out.heating_pump);
        assert!(out.active);
    }

    #[test]
    fn idle_modes_do_not_drive() {
        for mode in [
            RegulatorMode::Off,
            RegulatorMode::Manual,
            RegulatorMode::Charging,
            RegulatorMode::Defrost,
        ] {
            let mut r = regulator_in(mode);
            let out = r.step(50, Some(20), 1_000);
            assert_eq!(out, RegulatorOutput::IDLE, "mode {mode:?}");
        }
    }

    #[test]
    fn stale_supply_is_flagged_in_auto() {
        let mut r = regulator_in(RegulatorMode::Auto);
        r.step(50, Some(40), 1_000);
        let out = r.step(50, None, 1_000);
        assert!(out.stale);
        assert_eq!(out.valve, ValveCommand::Open); // held, not Neutral
    }

    #[test]
    fn switching_off_resets_travel_state() {
        let mut r = regulator_in(RegulatorMode::Auto);
        for _ in 0..10 {
            r.step(60, Some(30), 1_000);
        }
        r.set_mode(RegulatorMode::Off);
        r.set_mode(RegulatorMode::Auto);
        // Fresh integrator: first pulse opens again from zero.
        assert_eq!(r.step(50, Some(40), 1_000).valve, ValveCommand::Open);
    }
}
