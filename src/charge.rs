//! Storage-charge scheduler.
//!
//! Decides when the compressor should run to charge the thermal buffer
//! tank, when it must stop, and when an evaporator defrost has to be
//! forced in. It never touches hardware: its sole output is the
//! [`Request`] consumed by the compressor sequencer in the same tick, so
//! scheduling policy stays separate from safety sequencing.
//!
//! ```text
//!  IDLE ──[charging demanded + lockout over]──▶ CHARGING
//!                                                │     │
//!                 [storage at target / demand    │     │ [max charge + cold
//!                  dropped]                      ▼     ▼  outdoor + defrost ok]
//!                                              STOP  DEFROST
//!                                                │     │ [coil de-iced]
//!                                                ▼     ▼
//!                                             LOCKED  (CHARGING | STOP)
//!                                                │
//!                                  [lockout over]▼
//!                                              IDLE
//! ```
//!
//! Conflicting demands (a charge request during the lockout) are deferred
//! silently: the machine simply stays where it is until the lockout runs
//! out.

use log::info;

use crate::config;
use crate::sequencer::context::Request;

/// Storage-charge scheduler states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargeState {
    /// Ready; waiting for a charge demand.
    #[default]
    Idle,
    /// Compressor requested, storage charging.
    Charging,
    /// Storage satisfied (or demand dropped); halt the heat pump.
    Stop,
    /// Forced evaporator defrost in progress.
    Defrost,
    /// Anti-short-cycle lockout running.
    Locked,
}

/// Everything the scheduler looks at in one tick. Temperatures are `None`
/// when the sensor collaborator flags them invalid.
#[derive(Debug, Clone, Copy)]
pub struct ChargeInputs {
    /// The regulator is in its charging mode (storage demand present).
    pub charging_demanded: bool,
    /// Target storage temperature: the computed supply setpoint.
    pub target_c: i16,
    pub storage_c: Option<i16>,
    pub condenser_c: Option<i16>,
    pub outdoor_c: Option<i16>,
}

/// The scheduling state machine. A plain enum with a pure step function;
/// all timers are elapsed-ms counters advanced by the measured tick delta.
pub struct ChargeScheduler {
    state: ChargeState,
    /// Time since the last charge cycle ended (anti-short-cycle basis).
    lockout_ms: u32,
    /// Time spent in the current charge run (defrost-lockout and
    /// forced-defrost basis).
    charge_ms: u32,
    /// Time spent in the current defrost.
    defrost_ms: u32,
}

impl ChargeScheduler {
    pub fn new() -> Self {
        Self {
            // Power-up counts as a stop, same as the sequencer's restart
            // lockout: a mains glitch must not restart a warm compressor.
            state: ChargeState::Idle,
            lockout_ms: 0,
            charge_ms: 0,
            defrost_ms: 0,
        }
    }

    pub fn state(&self) -> ChargeState {
        self.state
    }

    /// One scheduling step. Returns the request for the sequencer.
    pub fn step(&mut self, inp: &ChargeInputs, elapsed_ms: u32) -> Request {
        self.lockout_ms = self.lockout_ms.saturating_add(elapsed_ms);

        let next = match self.state {
            ChargeState::Idle => self.idle_step(inp),
            ChargeState::Charging => self.charging_step(inp, elapsed_ms),
            ChargeState::Defrost => self.defrost_step(inp, elapsed_ms),
            ChargeState::Stop => {
                // One Halt tick, then straight into the lockout.
                Some(ChargeState::Locked)
            }
            ChargeState::Locked => {
                (self.lockout_ms >= config::RESTART_LOCKOUT_MS).then_some(ChargeState::Idle)
            }
        };

        if let Some(next) = next {
            info!("charge scheduler: {:?} -> {:?}", self.state, next);
            self.state = next;
        }

        match self.state {
            ChargeState::Idle | ChargeState::Locked => Request::Idle,
            ChargeState::Charging => Request::Charge,
            ChargeState::Stop => Request::Halt,
            ChargeState::Defrost => Request::Defrost,
        }
    }

    fn idle_step(&mut self, inp: &ChargeInputs) -> Option<ChargeState> {
        if inp.charging_demanded && self.lockout_ms >= config::RESTART_LOCKOUT_MS {
            self.charge_ms = 0;
            return Some(ChargeState::Charging);
        }
        None
    }

    fn charging_step(&mut self, inp: &ChargeInputs, elapsed_ms: u32) -> Option<ChargeState> {
        self.charge_ms = self.charge_ms.saturating_add(elapsed_ms);

        if !inp.charging_demanded {
            self.end_charge();
            return Some(ChargeState::Stop);
        }
        if let Some(storage) = inp.storage_c {
            if storage >= inp.target_c {
                info!("charge scheduler: storage at {storage} °C, target reached");
                self.end_charge();
                return Some(ChargeState::Stop);
            }
        }
        // A stale storage sensor keeps the charge running; the maximum
        // charge timer still bounds it below.

        if self.charge_ms >= config::MAX_CHARGE_MS {
            let cold = inp
                .outdoor_c
                .is_some_and(|t| t < config::DEFROST_OUTDOOR_MAX_C);
            if cold && self.charge_ms >= config::DEFROST_LOCKOUT_MS {
                self.defrost_ms = 0;
                return Some(ChargeState::Defrost);
            }
            self.end_charge();
            return Some(ChargeState::Stop);
        }
        None
    }

    fn defrost_step(&mut self, inp: &ChargeInputs, elapsed_ms: u32) -> Option<ChargeState> {
        self.defrost_ms = self.defrost_ms.saturating_add(elapsed_ms);

        let de_iced = inp
            .condenser_c
            .is_some_and(|t| t >= config::DEFROST_FINISH_COND_C);
        if !de_iced && self.defrost_ms < config::DEFROST_MAX_MS {
            return None;
        }

        let storage_low = match inp.storage_c {
            Some(storage) => storage < inp.target_c,
            None => false, // no valid reading: do not restart blind
        };
        if inp.charging_demanded && storage_low {
            // Fresh charge period: the forced-defrost timer starts over.
            self.charge_ms = 0;
            Some(ChargeState::Charging)
        } else {
            self.end_charge();
            Some(ChargeState::Stop)
        }
    }

    fn end_charge(&mut self) {
        self.lockout_ms = 0;
    }
}

impl Default for ChargeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demand(storage: i16) -> ChargeInputs {
        ChargeInputs {
            charging_demanded: true,
            target_c: 50,
            storage_c: Some(storage),
            condenser_c: Some(30),
            outdoor_c: Some(5),
        }
    }

    /// Fresh scheduler with the power-up lockout already elapsed.
    fn ready() -> ChargeScheduler {
        let mut s = ChargeScheduler::new();
        let idle = ChargeInputs {
            charging_demanded: false,
            ..demand(40)
        };
        let _ = s.step(&idle, config::RESTART_LOCKOUT_MS);
        s
    }

    #[test]
    fn demand_during_lockout_is_deferred() {
        let mut s = ChargeScheduler::new();
        for _ in 0..5 {
            assert_eq!(s.step(&demand(30), 10_000), Request::Idle);
            assert_eq!(s.state(), ChargeState::Idle);
        }
    }

    #[test]
    fn charges_until_storage_reaches_target() {
        let mut s = ready();
        assert_eq!(s.step(&demand(40), 1_000), Request::Charge);
        assert_eq!(s.state(), ChargeState::Charging);

        assert_eq!(s.step(&demand(45), 60_000), Request::Charge);

        // Storage at target: halt, then lockout.
        assert_eq!(s.step(&demand(50), 60_000), Request::Halt);
        assert_eq!(s.state(), ChargeState::Stop);
        assert_eq!(s.step(&demand(50), 1_000), Request::Idle);
        assert_eq!(s.state(), ChargeState::Locked);
    }

    #[test]
    fn locked_until_lockout_elapses() {
        let mut s = ready();
        let _ = s.step(&demand(40), 1_000);
        let _ = s.step(&demand(50), 1_000); // -> Stop
        let _ = s.step(&demand(40), 1_000); // -> Locked

        // Renewed demand is deferred for the full lockout.
        let mut waited = 0u32;
        while waited + 60_000 < config::RESTART_LOCKOUT_MS {
            assert_eq!(s.step(&demand(40), 60_000), Request::Idle);
            waited += 60_000;
        }
        let _ = s.step(&demand(40), 60_000); // lockout over -> Idle
        assert_eq!(s.step(&demand(40), 1_000), Request::Charge);
    }

    #[test]
    fn max_charge_in_cold_weather_forces_defrost() {
        let mut s = ready();
        let _ = s.step(&demand(40), 1_000);
        assert_eq!(s.state(), ChargeState::Charging);

        // Storage never satisfies; outdoor is below the defrost threshold.
        let mut inp = demand(40);
        inp.condenser_c = Some(5); // iced coil stays cold
        let _ = s.step(&inp, config::MAX_CHARGE_MS);
        assert_eq!(s.state(), ChargeState::Defrost);
        assert_eq!(s.step(&inp, 1_000), Request::Defrost);
    }

    #[test]
    fn max_charge_in_mild_weather_stops_instead() {
        let mut s = ready();
        let _ = s.step(&demand(40), 1_000);

        let mut inp = demand(40);
        inp.outdoor_c = Some(config::DEFROST_OUTDOOR_MAX_C); // not below threshold
        let _ = s.step(&inp, config::MAX_CHARGE_MS);
        assert_eq!(s.state(), ChargeState::Stop);
    }

    #[test]
    fn defrost_ends_when_coil_warms_up() {
        let mut s = ready();
        let _ = s.step(&demand(40), 1_000);
        let mut inp = demand(40);
        inp.condenser_c = Some(5);
        let _ = s.step(&inp, config::MAX_CHARGE_MS);
        assert_eq!(s.state(), ChargeState::Defrost);

        // Coil warm again and storage still low: back to charging.
        inp.condenser_c = Some(config::DEFROST_FINISH_COND_C);
        let _ = s.step(&inp, 30_000);
        assert_eq!(s.state(), ChargeState::Charging);
    }

    #[test]
    fn defrost_is_bounded_in_time() {
        let mut s = ready();
        let _ = s.step(&demand(40), 1_000);
        let mut inp = demand(40);
        inp.condenser_c = None; // sensor invalid: time cap must still end it
        let _ = s.step(&inp, config::MAX_CHARGE_MS);
        assert_eq!(s.state(), ChargeState::Defrost);

        let _ = s.step(&inp, config::DEFROST_MAX_MS);
        assert_ne!(s.state(), ChargeState::Defrost);
    }

    #[test]
    fn stale_storage_sensor_keeps_charging() {
        let mut s = ready();
        let _ = s.step(&demand(40), 1_000);

        let mut inp = demand(40);
        inp.storage_c = None;
        assert_eq!(s.step(&inp, 60_000), Request::Charge);
        assert_eq!(s.state(), ChargeState::Charging);
    }

    #[test]
    fn dropped_demand_halts_charge() {
        let mut s = ready();
        let _ = s.step(&demand(40), 1_000);
        let mut inp = demand(40);
        inp.charging_demanded = false;
        assert_eq!(s.step(&inp, 1_000), Request::Halt);
        assert_eq!(s.state(), ChargeState::Stop);
    }
}
