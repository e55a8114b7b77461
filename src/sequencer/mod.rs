//! Compressor safety/sequencing state machine.
//!
//! Classic embedded function-pointer FSM:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StateTable                                                   │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ SeqState      │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle          │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Start         │ …         │ …        │ …                 │  │
//! │  │ Run           │ …         │ …        │ …                 │  │
//! │  │ Stop          │ …         │ …        │ …                 │  │
//! │  │ Defrost       │ …         │ …        │ …                 │  │
//! │  │ ErrorPressure │ …         │ …        │ …                 │  │
//! │  │ ErrorMotor    │ …         │ …        │ …                 │  │
//! │  └──────────────┴───────────┴──────────┴───────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each control cycle the engine calls `on_update` for the current state
//! with the measured elapsed milliseconds. Interlock faults are checked by
//! every operating state before request-driven logic, so a pressure or
//! motor trip always wins over whatever the scheduler asked for. The two
//! error states latch: the only way out is [`Sequencer::acknowledge`]
//! after the offending contact has closed again.

pub mod context;
pub mod states;

use context::SequencerContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Compressor sequencer states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SeqState {
    Idle = 0,
    Start = 1,
    Run = 2,
    Stop = 3,
    Defrost = 4,
    ErrorPressure = 5,
    ErrorMotor = 6,
}

impl SeqState {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 7;

    /// Convert an index back to `SeqState`. Panics on out-of-range in
    /// debug builds; returns `ErrorPressure` in release (safe fallback,
    /// outputs off).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Start,
            2 => Self::Run,
            3 => Self::Stop,
            4 => Self::Defrost,
            5 => Self::ErrorPressure,
            6 => Self::ErrorMotor,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::ErrorPressure
            }
        }
    }

    /// Latched error state (exit only by acknowledgement).
    pub fn is_error(self) -> bool {
        matches!(self, Self::ErrorPressure | Self::ErrorMotor)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut SequencerContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut SequencerContext) -> Option<SeqState>;

/// Static descriptor for a single sequencer state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: SeqState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The compressor sequencer engine.
///
/// Owns the state table and the per-state elapsed time; the mutable
/// [`SequencerContext`] is threaded through every handler call.
pub struct Sequencer {
    table: [StateDescriptor; SeqState::COUNT],
    current: usize,
    /// Milliseconds spent in the current state.
    millis_in_state: u32,
}

impl Sequencer {
    /// Construct a sequencer starting in `initial` (normally Idle).
    pub fn new(table: [StateDescriptor; SeqState::COUNT], initial: SeqState) -> Self {
        Self {
            table,
            current: initial as usize,
            millis_in_state: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut SequencerContext) {
        info!("sequencer starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the sequencer by one control cycle of `elapsed_ms`.
    ///
    /// 1. Advance the per-state and protection timers.
    /// 2. Call `on_update` for the current state.
    /// 3. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut SequencerContext, elapsed_ms: u32) {
        self.millis_in_state = self.millis_in_state.saturating_add(elapsed_ms);

        ctx.millis_in_state = self.millis_in_state;
        ctx.restart_lockout_ms = ctx.restart_lockout_ms.saturating_add(elapsed_ms);
        ctx.since_start_ms = ctx.since_start_ms.saturating_add(elapsed_ms);

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Acknowledge a latched fault. Succeeds only while in an error state
    /// and only once the offending input reads ok again; auto-recovery is
    /// deliberately not possible.
    pub fn acknowledge(&mut self, ctx: &mut SequencerContext) -> bool {
        let cleared = match self.current_state() {
            SeqState::ErrorPressure => ctx.inputs.pressure_ok(),
            SeqState::ErrorMotor => ctx.inputs.motor_protection_ok,
            _ => return false,
        };
        if cleared {
            info!("fault acknowledged, returning to Idle");
            self.transition(SeqState::Idle, ctx);
        }
        cleared
    }

    /// Force an immediate transition (test and commissioning aid).
    pub fn force_transition(&mut self, next: SeqState, ctx: &mut SequencerContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> SeqState {
        SeqState::from_index(self.current)
    }

    /// Milliseconds the sequencer has spent in the current state.
    pub fn millis_in_current_state(&self) -> u32 {
        self.millis_in_state
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: SeqState, ctx: &mut SequencerContext) {
        let next_idx = next_id as usize;

        info!(
            "sequencer transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.millis_in_state = 0;
        ctx.millis_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::context::{Request, SequencerContext};
    use super::*;
    use proptest::prelude::*;

    fn arb_request() -> impl Strategy<Value = Request> {
        prop_oneof![
            Just(Request::Idle),
            Just(Request::Halt),
            Just(Request::Charge),
            Just(Request::Defrost),
        ]
    }

    proptest! {
        /// Whatever the plant and the scheduler do, the sequencer only
        /// ever occupies one of its seven defined states.
        #[test]
        fn no_invalid_state_reachable(
            steps in proptest::collection::vec(
                (arb_request(), any::<[bool; 6]>(), 1u32..20_000),
                1..200,
            ),
        ) {
            let mut seq = Sequencer::new(states::build_state_table(), SeqState::Idle);
            let mut ctx = SequencerContext::new();
            seq.start(&mut ctx);

            for (request, bits, elapsed) in steps {
                ctx.request = request;
                ctx.inputs.low_pressure_ok = bits[0];
                ctx.inputs.high_pressure_ok = bits[1];
                ctx.inputs.motor_protection_ok = bits[2];
                ctx.inputs.run_contactor_on = bits[3];
                ctx.inputs.start_contactor_on = bits[4];
                ctx.inputs.tariff_locked = bits[5];
                seq.tick(&mut ctx, elapsed);

                prop_assert!((seq.current_state() as usize) < SeqState::COUNT);
            }
        }

        /// An open low-pressure switch puts every operating state into
        /// ErrorPressure on the next tick (Idle only once a run is
        /// actually requested).
        #[test]
        fn low_pressure_always_reaches_error(
            state in prop_oneof![
                Just(SeqState::Start),
                Just(SeqState::Run),
                Just(SeqState::Stop),
                Just(SeqState::Defrost),
            ],
        ) {
            let mut seq = Sequencer::new(states::build_state_table(), SeqState::Idle);
            let mut ctx = SequencerContext::new();
            seq.start(&mut ctx);
            seq.force_transition(state, &mut ctx);

            ctx.inputs.low_pressure_ok = false;
            seq.tick(&mut ctx, 100);
            prop_assert_eq!(seq.current_state(), SeqState::ErrorPressure);
        }

        /// The compressor contactors never engage while the anti-short-
        /// cycle lockout is still running, for any request sequence.
        #[test]
        fn lockout_blocks_restart(
            requests in proptest::collection::vec(arb_request(), 1..100),
        ) {
            let mut seq = Sequencer::new(states::build_state_table(), SeqState::Idle);
            let mut ctx = SequencerContext::new();
            seq.start(&mut ctx);

            let mut elapsed = 0u32;
            for request in requests {
                ctx.request = request;
                seq.tick(&mut ctx, 5_000);
                elapsed += 5_000;
                if elapsed < crate::config::RESTART_LOCKOUT_MS {
                    prop_assert!(!ctx.outputs.start_contactor);
                    prop_assert!(!ctx.outputs.run_contactor);
                }
            }
        }
    }
}
