//! ESP-IDF hardware adapter.
//!
//! Maps the port traits onto the relay board and the NTC dividers via raw
//! ESP-IDF calls. This is the only file that knows pin numbers; everything
//! above it works on named logical values.
//!
//! NTC inputs: 10 kOhm @ 25 C, B = 3950, in a divider with a fixed 10 kOhm
//! resistor against 3.3 V. A reading pinned at either rail means an open
//! or shorted sensor and is reported as invalid.

use esp_idf_sys as sys;
use log::warn;

use crate::app::ports::{ActuatorPort, ContactPort, SensorPort, Temperatures};
use crate::error::Error;
use crate::inputs::CHANNELS;
use crate::pins;
use crate::regulator::tristate::ValveCommand;
use crate::sequencer::context::CompressorOutputs;

const R25: f32 = 10_000.0;
const BETA: f32 = 3950.0;
const T25_K: f32 = 298.15;
const R_DIVIDER: f32 = 10_000.0;
const ADC_MAX: f32 = 4095.0;

const INPUT_PINS: [i32; CHANNELS] = [
    pins::LOW_PRESSURE_GPIO,
    pins::HIGH_PRESSURE_GPIO,
    pins::MOTOR_PROTECT_GPIO,
    pins::START_CONTACTOR_FB_GPIO,
    pins::RUN_CONTACTOR_FB_GPIO,
    pins::TARIFF_LOCK_GPIO,
    pins::DI_RESERVE1_GPIO,
    pins::DI_RESERVE2_GPIO,
];

const OUTPUT_PINS: [i32; 10] = [
    pins::CRANKCASE_HEATER_GPIO,
    pins::START_CONTACTOR_GPIO,
    pins::RUN_CONTACTOR_GPIO,
    pins::BYPASS_GPIO,
    pins::FAN_GPIO,
    pins::CHARGE_PUMP_GPIO,
    pins::HEATING_PUMP_GPIO,
    pins::VALVE_OPEN_GPIO,
    pins::VALVE_CLOSE_GPIO,
    pins::ALARM_RELAY_GPIO,
];

/// ADC1 channel numbers for the four temperature inputs.
const ADC_OUTDOOR: sys::adc1_channel_t = 0;
const ADC_CONDENSER: sys::adc1_channel_t = 1;
const ADC_STORAGE: sys::adc1_channel_t = 2;
const ADC_SUPPLY: sys::adc1_channel_t = 9;

/// Adapter owning every configured pin.
pub struct HardwareAdapter;

impl HardwareAdapter {
    /// Configure all GPIO directions and the ADC. Call once at boot.
    pub fn new() -> Result<Self, Error> {
        for pin in INPUT_PINS {
            configure_pin(pin, sys::gpio_mode_t_GPIO_MODE_INPUT)?;
        }
        for pin in OUTPUT_PINS {
            configure_pin(pin, sys::gpio_mode_t_GPIO_MODE_OUTPUT)?;
            gpio_write(pin, false);
        }
        // 12-bit width, 11 dB attenuation for the full divider range.
        unsafe {
            sys::adc1_config_width(sys::adc_bits_width_t_ADC_WIDTH_BIT_12);
            for ch in [ADC_OUTDOOR, ADC_CONDENSER, ADC_STORAGE, ADC_SUPPLY] {
                sys::adc1_config_channel_atten(ch, sys::adc_atten_t_ADC_ATTEN_DB_11);
            }
        }
        Ok(Self)
    }
}

impl ContactPort for HardwareAdapter {
    fn read_contacts(&mut self) -> [bool; CHANNELS] {
        let mut raw = [false; CHANNELS];
        for (i, pin) in INPUT_PINS.iter().enumerate() {
            raw[i] = gpio_read(*pin);
        }
        raw
    }
}

impl SensorPort for HardwareAdapter {
    fn read_temperatures(&mut self) -> Temperatures {
        Temperatures {
            outdoor_c: read_ntc(ADC_OUTDOOR),
            condenser_c: read_ntc(ADC_CONDENSER),
            storage_c: read_ntc(ADC_STORAGE),
            supply_c: read_ntc(ADC_SUPPLY),
        }
    }
}

impl ActuatorPort for HardwareAdapter {
    fn apply_outputs(&mut self, outputs: &CompressorOutputs) {
        gpio_write(pins::CRANKCASE_HEATER_GPIO, outputs.crankcase_heater);
        gpio_write(pins::START_CONTACTOR_GPIO, outputs.start_contactor);
        gpio_write(pins::RUN_CONTACTOR_GPIO, outputs.run_contactor);
        gpio_write(pins::BYPASS_GPIO, outputs.bypass);
        gpio_write(pins::FAN_GPIO, outputs.fan);
        gpio_write(pins::CHARGE_PUMP_GPIO, outputs.charge_pump);
        gpio_write(pins::ALARM_RELAY_GPIO, outputs.alarm_relay);
    }

    fn drive_valve(&mut self, cmd: ValveCommand) {
        // The two direction lines are mechanically interlocked in the
        // actuator, but we never energise both anyway.
        let (open, close) = match cmd {
            ValveCommand::Open => (true, false),
            ValveCommand::Close => (false, true),
            ValveCommand::Neutral => (false, false),
        };
        gpio_write(pins::VALVE_OPEN_GPIO, open);
        gpio_write(pins::VALVE_CLOSE_GPIO, close);
    }

    fn set_heating_pump(&mut self, on: bool) {
        gpio_write(pins::HEATING_PUMP_GPIO, on);
    }

    fn all_off(&mut self) {
        for pin in OUTPUT_PINS {
            gpio_write(pin, false);
        }
    }
}

// ── Internal ──────────────────────────────────────────────────

fn configure_pin(pin: i32, mode: sys::gpio_mode_t) -> Result<(), Error> {
    let cfg = sys::gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: sys::gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: sys::gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: sys::gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { sys::gpio_config(&cfg) };
    if ret == sys::ESP_OK {
        Ok(())
    } else {
        Err(Error::Init("gpio_config failed"))
    }
}

fn gpio_write(pin: i32, high: bool) {
    unsafe {
        sys::gpio_set_level(pin, u32::from(high));
    }
}

fn gpio_read(pin: i32) -> bool {
    unsafe { sys::gpio_get_level(pin) != 0 }
}

/// Read one NTC divider and convert to whole °C; `None` on an open or
/// shorted sensor.
fn read_ntc(channel: sys::adc1_channel_t) -> Option<i16> {
    let raw = unsafe { sys::adc1_get_raw(channel) };
    if raw <= 10 || raw >= 4_085 {
        warn!("ADC channel {channel} pinned at rail ({raw}), sensor invalid");
        return None;
    }
    let ratio = raw as f32 / ADC_MAX;
    let r_ntc = R_DIVIDER * ratio / (1.0 - ratio);
    let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
    let celsius = 1.0 / inv_t - 273.15;
    if !(-50.0..=150.0).contains(&celsius) {
        return None;
    }
    Some(celsius as i16)
}
