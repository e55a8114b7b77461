//! Shared mutable context threaded through every sequencer state handler.
//!
//! `SequencerContext` is the single struct the state handlers read from
//! and write to: the per-cycle digital-input snapshot, the logical output
//! set, the protection timers, and the mode flags needed to assemble the
//! status word. It is owned by the sequencer; other components hand values
//! in by copy before each tick.

use crate::inputs::DigitalInputs;
use crate::status::SystemStatus;

use super::SeqState;

/// Operating-mode request into the sequencer. This is the only command
/// vocabulary the storage-charge scheduler may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Request {
    /// No demand; stay in standby.
    #[default]
    Idle,
    /// End compressor operation.
    Halt,
    /// Run the compressor for storage charging.
    Charge,
    /// Initiate an evaporator defrost.
    Defrost,
}

/// Logical output set written by state handlers and applied to hardware
/// after the tick. One field per output line; no pin numbers here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressorOutputs {
    /// Crankcase heater (on whenever the compressor rests).
    pub crankcase_heater: bool,
    /// Start contactor (star winding / soft start).
    pub start_contactor: bool,
    /// Run contactor (delta winding).
    pub run_contactor: bool,
    /// Evaporator fan.
    pub fan: bool,
    /// Hot-gas bypass valve (open = defrost path).
    pub bypass: bool,
    /// Storage charge pump.
    pub charge_pump: bool,
    /// Collective alarm relay toward the building alarm loop.
    pub alarm_relay: bool,
}

impl CompressorOutputs {
    /// Every output de-energised — the safe shutdown set.
    pub const fn all_off() -> Self {
        Self {
            crankcase_heater: false,
            start_contactor: false,
            run_contactor: false,
            fan: false,
            bypass: false,
            charge_pump: false,
            alarm_relay: false,
        }
    }
}

/// Mode flags mirrored into the status word. Derived from the user
/// settings by the orchestration layer each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeFlags {
    pub auto: bool,
    pub reduced: bool,
    pub manual: bool,
}

/// The shared context passed to every state handler function.
pub struct SequencerContext {
    // -- Timing --
    /// Milliseconds elapsed since the current state was entered.
    pub millis_in_state: u32,

    // -- Protection timers (elapsed counters, reset on defined transitions) --
    /// Time since the last Stop -> Idle transition. Start is only allowed
    /// once this reaches the anti-short-cycle lockout.
    pub restart_lockout_ms: u32,
    /// Time since the last compressor start. Defrost is only allowed once
    /// this reaches the post-start defrost lockout.
    pub since_start_ms: u32,

    // -- Per-cycle inputs --
    /// Debounced digital-input snapshot, captured once per cycle.
    pub inputs: DigitalInputs,
    /// Mode request from the storage-charge scheduler.
    pub request: Request,

    // -- Outputs --
    /// Logical output set, applied to hardware after the tick.
    pub outputs: CompressorOutputs,

    // -- Status-word plumbing --
    pub mode: ModeFlags,
    pub regulator_active: bool,
    pub heating_pump: bool,
}

impl SequencerContext {
    pub fn new() -> Self {
        Self {
            millis_in_state: 0,
            // Power-up counts as a stop: a mains glitch must not bypass the
            // anti-short-cycle protection.
            restart_lockout_ms: 0,
            since_start_ms: 0,
            inputs: DigitalInputs::all_ok(),
            request: Request::Idle,
            outputs: CompressorOutputs::all_off(),
            mode: ModeFlags::default(),
            regulator_active: false,
            heating_pump: false,
        }
    }

    /// Assemble the per-cycle status word from outputs, inputs and mode.
    ///
    /// The pressure/motor alarm bits mirror the failed input directly, so
    /// they clear as soon as the contact closes again even while the
    /// sequencer itself stays latched in an error state.
    pub fn status(&self, state: SeqState) -> SystemStatus {
        let o = &self.outputs;
        let i = &self.inputs;
        let mut s = SystemStatus {
            crankcase_heater: o.crankcase_heater,
            compressor: o.start_contactor || o.run_contactor,
            fan: o.fan,
            bypass_open: o.bypass,
            charge_pump: o.charge_pump,
            regulator_active: self.regulator_active,
            heating_pump: self.heating_pump,
            defrost: state == SeqState::Defrost,
            auto_mode: self.mode.auto,
            reduced_mode: self.mode.reduced,
            manual_mode: self.mode.manual,
            low_pressure_alarm: !i.low_pressure_ok,
            high_pressure_alarm: !i.high_pressure_ok,
            motor_protection: !i.motor_protection_ok,
            tariff_locked: i.tariff_locked,
            alarm: false,
        };
        s.alarm = s.any_alarm();
        s
    }
}

impl Default for SequencerContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mirrors_failed_inputs() {
        let mut ctx = SequencerContext::new();
        ctx.inputs.high_pressure_ok = false;
        let s = ctx.status(SeqState::Run);
        assert!(s.high_pressure_alarm);
        assert!(!s.low_pressure_alarm);
        assert!(s.alarm);
    }

    #[test]
    fn alarm_summary_follows_alarm_fields() {
        let ctx = SequencerContext::new();
        let s = ctx.status(SeqState::Idle);
        assert!(!s.alarm);
        assert!(!s.any_alarm());
    }

    #[test]
    fn compressor_bit_covers_both_contactors() {
        let mut ctx = SequencerContext::new();
        ctx.outputs.start_contactor = true;
        assert!(ctx.status(SeqState::Start).compressor);
        ctx.outputs.start_contactor = false;
        ctx.outputs.run_contactor = true;
        assert!(ctx.status(SeqState::Run).compressor);
    }
}
