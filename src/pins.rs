//! GPIO / peripheral pin assignments for the controller main board.
//!
//! Single source of truth — the hardware adapter references this module
//! rather than hard-coding pin numbers. The control core never sees these;
//! it consumes the debounced snapshot and writes named logical outputs.

// ---------------------------------------------------------------------------
// Digital inputs — protective chain and status contacts
// ---------------------------------------------------------------------------

/// Low-pressure switch (closed = pressure ok).
pub const LOW_PRESSURE_GPIO: i32 = 4;
/// High-pressure switch (closed = pressure ok).
pub const HIGH_PRESSURE_GPIO: i32 = 5;
/// Motor-protection breaker auxiliary contact.
pub const MOTOR_PROTECT_GPIO: i32 = 6;
/// Start contactor auxiliary contact (feedback).
pub const START_CONTACTOR_FB_GPIO: i32 = 7;
/// Run contactor auxiliary contact (feedback).
pub const RUN_CONTACTOR_FB_GPIO: i32 = 8;
/// Utility tariff-lock signal from the grid operator.
pub const TARIFF_LOCK_GPIO: i32 = 9;
/// Spare digital inputs.
pub const DI_RESERVE1_GPIO: i32 = 10;
pub const DI_RESERVE2_GPIO: i32 = 11;

// ---------------------------------------------------------------------------
// Digital outputs — relay board
// ---------------------------------------------------------------------------

/// Compressor crankcase heater.
pub const CRANKCASE_HEATER_GPIO: i32 = 12;
/// Start contactor coil.
pub const START_CONTACTOR_GPIO: i32 = 13;
/// Run contactor coil.
pub const RUN_CONTACTOR_GPIO: i32 = 14;
/// Hot-gas bypass valve.
pub const BYPASS_GPIO: i32 = 15;
/// Evaporator fan.
pub const FAN_GPIO: i32 = 16;
/// Storage charge pump.
pub const CHARGE_PUMP_GPIO: i32 = 17;
/// Heating-circuit circulation pump.
pub const HEATING_PUMP_GPIO: i32 = 18;
/// Mixing valve drive open (raise supply temperature).
pub const VALVE_OPEN_GPIO: i32 = 21;
/// Mixing valve drive closed (lower supply temperature).
pub const VALVE_CLOSE_GPIO: i32 = 38;
/// Collective alarm relay toward the building alarm loop.
pub const ALARM_RELAY_GPIO: i32 = 39;

// ---------------------------------------------------------------------------
// Temperature inputs — ADC1, NTC dividers
// ---------------------------------------------------------------------------

/// Outdoor temperature sensor.
pub const OUTDOOR_ADC_GPIO: i32 = 1;
/// Condenser-return temperature sensor.
pub const CONDENSER_ADC_GPIO: i32 = 2;
/// Storage-tank temperature sensor.
pub const STORAGE_ADC_GPIO: i32 = 3;
/// Supply (flow) temperature sensor.
pub const SUPPLY_ADC_GPIO: i32 = 10;
