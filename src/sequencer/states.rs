//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  IDLE ──[charge req + lockout over + interlocks ok]──▶ START
//!    ▲                                                     │
//!    │                                  [delay over + run feedback]
//!    │                                                     ▼
//!  STOP ◀──[halt / charge satisfied]──────────────────── RUN
//!    │                                                  ▲    │
//!    │ [pump overrun done]                   [defrost   │    │ [defrost req
//!    ▼                                        cleared]  │    ▼  + lockout over]
//!  IDLE                                               DEFROST
//!
//!  Any operating state ──[pressure trip]──▶ ERROR_PRESSURE ─┐
//!  Any operating state ──[motor trip]─────▶ ERROR_MOTOR ────┤ latched until
//!                                                           ┘ acknowledged
//! ```
//!
//! Interlock checks run before request handling in every operating state;
//! the latched error states are left only through
//! [`Sequencer::acknowledge`](super::Sequencer::acknowledge).

use log::{info, warn};

use super::context::{CompressorOutputs, Request, SequencerContext};
use super::{SeqState, StateDescriptor};
use crate::config;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; SeqState::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: SeqState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Start
        StateDescriptor {
            id: SeqState::Start,
            name: "Start",
            on_enter: Some(start_enter),
            on_exit: None,
            on_update: start_update,
        },
        // Index 2 — Run
        StateDescriptor {
            id: SeqState::Run,
            name: "Run",
            on_enter: Some(run_enter),
            on_exit: None,
            on_update: run_update,
        },
        // Index 3 — Stop
        StateDescriptor {
            id: SeqState::Stop,
            name: "Stop",
            on_enter: Some(stop_enter),
            on_exit: Some(stop_exit),
            on_update: stop_update,
        },
        // Index 4 — Defrost
        StateDescriptor {
            id: SeqState::Defrost,
            name: "Defrost",
            on_enter: Some(defrost_enter),
            on_exit: Some(defrost_exit),
            on_update: defrost_update,
        },
        // Index 5 — ErrorPressure
        StateDescriptor {
            id: SeqState::ErrorPressure,
            name: "ErrorPressure",
            on_enter: Some(error_pressure_enter),
            on_exit: None,
            on_update: error_update,
        },
        // Index 6 — ErrorMotor
        StateDescriptor {
            id: SeqState::ErrorMotor,
            name: "ErrorMotor",
            on_enter: Some(error_motor_enter),
            on_exit: None,
            on_update: error_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Interlock guard
// ═══════════════════════════════════════════════════════════════════════════

/// Safety interlocks win over every request. Pressure is checked before
/// motor protection: both error states kill the outputs, but the pressure
/// chain reacts faster and is the more likely root cause.
fn interlock_fault(ctx: &SequencerContext) -> Option<SeqState> {
    if !ctx.inputs.pressure_ok() {
        return Some(SeqState::ErrorPressure);
    }
    if !ctx.inputs.motor_protection_ok {
        return Some(SeqState::ErrorMotor);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE — standby, crankcase heater only
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut SequencerContext) {
    ctx.outputs = CompressorOutputs::all_off();
    // Heater stays on at rest so refrigerant cannot migrate into the sump.
    ctx.outputs.crankcase_heater = true;
    info!("IDLE: compressor at rest, crankcase heater on");
}

fn idle_update(ctx: &mut SequencerContext) -> Option<SeqState> {
    if ctx.request != Request::Charge {
        return None;
    }
    // A run is being requested: the interlocks must hold before the first
    // contactor is allowed to pull in.
    if let Some(err) = interlock_fault(ctx) {
        return Some(err);
    }
    if ctx.inputs.tariff_locked {
        // Utility lock. Deferred silently; the scheduler keeps asking.
        return None;
    }
    if ctx.restart_lockout_ms >= config::RESTART_LOCKOUT_MS {
        return Some(SeqState::Start);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  START — contactor changeover
// ═══════════════════════════════════════════════════════════════════════════

fn start_enter(ctx: &mut SequencerContext) {
    ctx.outputs.crankcase_heater = false;
    ctx.outputs.start_contactor = true;
    ctx.outputs.charge_pump = true;
    ctx.since_start_ms = 0;
    info!("START: start contactor engaged, changeover in {} ms", config::START_DELAY_MS);
}

fn start_update(ctx: &mut SequencerContext) -> Option<SeqState> {
    if let Some(err) = interlock_fault(ctx) {
        return Some(err);
    }
    if matches!(ctx.request, Request::Halt | Request::Idle) {
        // Operator abort during changeover.
        return Some(SeqState::Stop);
    }
    if ctx.millis_in_state >= config::START_DELAY_MS && ctx.inputs.run_contactor_on {
        return Some(SeqState::Run);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUN — compressor in normal charging operation
// ═══════════════════════════════════════════════════════════════════════════

fn run_enter(ctx: &mut SequencerContext) {
    ctx.outputs.start_contactor = false;
    ctx.outputs.run_contactor = true;
    ctx.outputs.fan = true;
    ctx.outputs.bypass = false;
    info!("RUN: run contactor engaged, fan on");
}

fn run_update(ctx: &mut SequencerContext) -> Option<SeqState> {
    if let Some(err) = interlock_fault(ctx) {
        return Some(err);
    }
    match ctx.request {
        Request::Halt | Request::Idle => Some(SeqState::Stop),
        Request::Defrost if ctx.since_start_ms >= config::DEFROST_LOCKOUT_MS => {
            Some(SeqState::Defrost)
        }
        // Defrost before the lockout has elapsed: keep running, pressure
        // has to build up first.
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  STOP — run-down with charge-pump overrun
// ═══════════════════════════════════════════════════════════════════════════

fn stop_enter(ctx: &mut SequencerContext) {
    ctx.outputs.start_contactor = false;
    ctx.outputs.run_contactor = false;
    ctx.outputs.fan = false;
    ctx.outputs.bypass = false;
    ctx.outputs.crankcase_heater = true;
    // Charge pump keeps moving water so the condenser heat is not lost.
    info!("STOP: contactors open, pump overrun {} ms", config::PUMP_OVERRUN_MS);
}

fn stop_update(ctx: &mut SequencerContext) -> Option<SeqState> {
    if let Some(err) = interlock_fault(ctx) {
        return Some(err);
    }
    if ctx.millis_in_state >= config::PUMP_OVERRUN_MS {
        return Some(SeqState::Idle);
    }
    None
}

fn stop_exit(ctx: &mut SequencerContext) {
    ctx.outputs.charge_pump = false;
    // The anti-short-cycle lockout runs from here.
    ctx.restart_lockout_ms = 0;
    info!("STOP: pump overrun complete, restart lockout armed");
}

// ═══════════════════════════════════════════════════════════════════════════
//  DEFROST — hot-gas bypass, fan suppressed, compressor keeps running
// ═══════════════════════════════════════════════════════════════════════════

fn defrost_enter(ctx: &mut SequencerContext) {
    ctx.outputs.bypass = true;
    ctx.outputs.fan = false;
    info!("DEFROST: bypass open, fan suppressed");
}

fn defrost_exit(ctx: &mut SequencerContext) {
    ctx.outputs.bypass = false;
}

fn defrost_update(ctx: &mut SequencerContext) -> Option<SeqState> {
    if let Some(err) = interlock_fault(ctx) {
        return Some(err);
    }
    match ctx.request {
        Request::Charge => Some(SeqState::Run),
        Request::Halt | Request::Idle => Some(SeqState::Stop),
        Request::Defrost => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR states — outputs forced off, latched until acknowledged
// ═══════════════════════════════════════════════════════════════════════════

fn error_pressure_enter(ctx: &mut SequencerContext) {
    kill_outputs(ctx);
    warn!(
        "ERROR: pressure interlock open (lp_ok={} hp_ok={}), outputs forced off",
        ctx.inputs.low_pressure_ok, ctx.inputs.high_pressure_ok
    );
}

fn error_motor_enter(ctx: &mut SequencerContext) {
    kill_outputs(ctx);
    warn!("ERROR: motor protection tripped, outputs forced off");
}

fn error_update(_ctx: &mut SequencerContext) -> Option<SeqState> {
    // Latched. Auto-recovery would allow repeated unsafe restarts; the only
    // exit is an explicit acknowledgement after the contact has closed.
    None
}

fn kill_outputs(ctx: &mut SequencerContext) {
    ctx.outputs = CompressorOutputs::all_off();
    ctx.outputs.alarm_relay = true;
}
