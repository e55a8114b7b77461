//! Control service — the hexagonal core.
//!
//! [`ControlService`] owns the three cooperating state machines and the
//! shared context, and runs them in a fixed order within one polling tick:
//!
//! ```text
//!  SensorPort ───▶ ┌──────────────────────────────────┐ ──▶ EventSink
//!  ContactPort ──▶ │          ControlService           │
//!                  │  charge scheduler ─▶ regulator    │
//!  ActuatorPort ◀──│        ─▶ compressor sequencer    │
//!                  └──────────────────────────────────┘
//! ```
//!
//! Scheduling decisions made in a tick are visible to the sequencer within
//! the same tick; there is no lag between mode decision and safety
//! arbitration. All I/O flows through port traits injected at call sites,
//! so the whole service runs against mock adapters in tests.

use log::{info, warn};

use crate::charge::{ChargeInputs, ChargeScheduler, ChargeState};
use crate::config::{self, ControlConfig};
use crate::error::SafetyFault;
use crate::inputs::{DigitalInputs, InputDebouncer};
use crate::regulator::curve::supply_setpoint;
use crate::regulator::{Regulator, RegulatorMode};
use crate::sequencer::context::{ModeFlags, SequencerContext};
use crate::sequencer::states::build_state_table;
use crate::sequencer::{SeqState, Sequencer};
use crate::settings::{OperatingMode, Settings};
use crate::status::SystemStatus;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, ContactPort, EventSink, SensorPort, Temperatures};

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

/// The control service orchestrates all domain logic.
pub struct ControlService {
    config: ControlConfig,
    settings: Settings,

    debouncer: InputDebouncer,
    scheduler: ChargeScheduler,
    regulator: Regulator,
    sequencer: Sequencer,
    ctx: SequencerContext,

    /// Last valid supply setpoint; held while the outdoor sensor is stale.
    setpoint_c: i16,
    /// Storage-charge demand with hysteresis around the setpoint.
    charge_demand: bool,

    status: SystemStatus,
    last_temps: Temperatures,
    prev_fault_mask: u8,
    prev_stale: bool,
    telemetry_elapsed_ms: u32,
}

impl ControlService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the sequencer — call [`start`](Self::start) next.
    pub fn new(config: ControlConfig) -> Self {
        let regulator = Regulator::new(&config);
        Self {
            config,
            settings: Settings::new(),
            debouncer: InputDebouncer::new(),
            scheduler: ChargeScheduler::new(),
            regulator,
            sequencer: Sequencer::new(build_state_table(), SeqState::Idle),
            ctx: SequencerContext::new(),
            setpoint_c: 35,
            charge_demand: false,
            status: SystemStatus::default(),
            last_temps: Temperatures::default(),
            prev_fault_mask: 0,
            prev_stale: false,
            telemetry_elapsed_ms: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run the initial state entry and announce the service.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.sequencer.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.sequencer.current_state()));
        info!("control service started in {:?}", self.sequencer.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: read inputs → schedule → regulate →
    /// sequence → apply outputs → emit events.
    ///
    /// The `hw` parameter satisfies all three hardware ports, which avoids
    /// a multi-borrow while keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ContactPort + ActuatorPort),
        sink: &mut impl EventSink,
        elapsed_ms: u32,
    ) {
        // 1. Acquire this cycle's inputs.
        let temps = hw.read_temperatures();
        self.last_temps = temps;
        self.ctx.inputs = self.debouncer.sample(hw.read_contacts());

        // 2. Weather-compensated setpoint; held on a stale outdoor sensor.
        if let Some(outdoor) = temps.outdoor_c {
            self.setpoint_c = supply_setpoint(
                outdoor,
                self.settings.curve_stage(),
                self.settings.parallel_shift(),
                self.settings.reduced_mode(),
                self.config.reduced_setback_c,
            );
        }

        // 3. Storage-charge demand with hysteresis around the setpoint.
        if let Some(storage) = temps.storage_c {
            if storage < self.setpoint_c - config::CHARGE_DEMAND_HYSTERESIS_C {
                self.charge_demand = true;
            } else if storage >= self.setpoint_c {
                self.charge_demand = false;
            }
        }

        // 4. Resolve the regulator mode from the user mode and the charge
        //    arbitration state.
        let user_mode = self.settings.operating_mode();
        let demanded = user_mode == OperatingMode::Auto && self.charge_demand;
        let mode = match user_mode {
            OperatingMode::Standby => RegulatorMode::Off,
            OperatingMode::Manual => RegulatorMode::Manual,
            OperatingMode::Auto => match self.scheduler.state() {
                ChargeState::Defrost => RegulatorMode::Defrost,
                ChargeState::Charging => RegulatorMode::Charging,
                _ if demanded => RegulatorMode::Charging,
                _ => RegulatorMode::Auto,
            },
        };
        self.regulator.set_mode(mode);

        // 5. Storage-charge scheduler decides the sequencer request.
        let prev_charge = self.scheduler.state();
        let request = self.scheduler.step(
            &ChargeInputs {
                charging_demanded: demanded,
                target_c: self.setpoint_c,
                storage_c: temps.storage_c,
                condenser_c: temps.condenser_c,
                outdoor_c: temps.outdoor_c,
            },
            elapsed_ms,
        );

        // 6. Supply-temperature regulator drives the mixing valve.
        let reg = self.regulator.step(self.setpoint_c, temps.supply_c, elapsed_ms);

        // 7. Compressor sequencer consumes the request and the snapshot.
        let prev_seq = self.sequencer.current_state();
        self.ctx.request = request;
        self.ctx.mode = ModeFlags {
            auto: user_mode == OperatingMode::Auto,
            reduced: user_mode == OperatingMode::Auto && self.settings.reduced_mode(),
            manual: user_mode == OperatingMode::Manual,
        };
        self.ctx.regulator_active = reg.active;
        self.ctx.heating_pump = reg.heating_pump;
        self.sequencer.tick(&mut self.ctx, elapsed_ms);
        let seq_state = self.sequencer.current_state();
        self.status = self.ctx.status(seq_state);

        // 8. Apply outputs. In manual mode the heating-circuit outputs are
        //    under external control and must not be overwritten.
        hw.apply_outputs(&self.ctx.outputs);
        if user_mode != OperatingMode::Manual {
            hw.set_heating_pump(reg.heating_pump);
            hw.drive_valve(reg.valve);
        }

        // 9. Events.
        if seq_state != prev_seq {
            sink.emit(&AppEvent::SequencerChanged {
                from: prev_seq,
                to: seq_state,
            });
        }
        let charge_state = self.scheduler.state();
        if charge_state != prev_charge {
            sink.emit(&AppEvent::ChargeChanged {
                from: prev_charge,
                to: charge_state,
            });
        }

        let fault_mask = fault_mask(&self.ctx.inputs);
        if fault_mask != 0 && fault_mask != self.prev_fault_mask {
            warn!("interlock fault mask: 0b{fault_mask:03b}");
            sink.emit(&AppEvent::FaultRaised(fault_mask));
        }
        self.prev_fault_mask = fault_mask;

        if reg.stale && !self.prev_stale {
            warn!("supply sensor stale, valve holding last command");
            sink.emit(&AppEvent::SensorStale);
        }
        self.prev_stale = reg.stale;

        self.telemetry_elapsed_ms = self.telemetry_elapsed_ms.saturating_add(elapsed_ms);
        if self.telemetry_elapsed_ms >= self.config.telemetry_interval_secs * 1_000 {
            self.telemetry_elapsed_ms = 0;
            sink.emit(&AppEvent::Telemetry(self.telemetry()));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (settings link, operator panel).
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::ApplySetting { action, value } => {
                match self.settings.apply(&action, value) {
                    Ok(()) => info!("setting applied: {action}={value}"),
                    // Rejected at the boundary; the core state is untouched.
                    Err(e) => warn!("setting rejected: {action}={value}: {e}"),
                }
            }
            AppCommand::AcknowledgeFault => {
                if self.sequencer.acknowledge(&mut self.ctx) {
                    sink.emit(&AppEvent::FaultAcknowledged);
                } else {
                    warn!("fault acknowledgement refused (not latched or input still open)");
                }
            }
            AppCommand::RequestTelemetry => {
                sink.emit(&AppEvent::Telemetry(self.telemetry()));
            }
        }
    }

    // ── Read-only accessors for collaborators ─────────────────

    /// Current packed status record (read-only outside the sequencer).
    pub fn status(&self) -> SystemStatus {
        self.status
    }

    /// Packed status word for the communication layer.
    pub fn status_word(&self) -> u16 {
        self.status.pack()
    }

    pub fn sequencer_state(&self) -> SeqState {
        self.sequencer.current_state()
    }

    pub fn charge_state(&self) -> ChargeState {
        self.scheduler.state()
    }

    /// Current supply setpoint (°C).
    pub fn setpoint_c(&self) -> i16 {
        self.setpoint_c
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn telemetry(&self) -> TelemetryData {
        TelemetryData {
            seq_state: self.sequencer.current_state(),
            charge_state: self.scheduler.state(),
            outdoor_c: self.last_temps.outdoor_c,
            storage_c: self.last_temps.storage_c,
            supply_c: self.last_temps.supply_c,
            setpoint_c: self.setpoint_c,
            status_word: self.status.pack(),
        }
    }
}

/// Interlock fault mask for the event layer, derived from the snapshot.
fn fault_mask(inputs: &DigitalInputs) -> u8 {
    let mut mask = 0;
    if !inputs.low_pressure_ok {
        mask |= SafetyFault::LowPressure.mask();
    }
    if !inputs.high_pressure_ok {
        mask |= SafetyFault::HighPressure.mask();
    }
    if !inputs.motor_protection_ok {
        mask |= SafetyFault::MotorProtection.mask();
    }
    mask
}
