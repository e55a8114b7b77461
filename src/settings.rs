//! User/communication settings boundary.
//!
//! Remote settings arrive as `name:value` pairs over the serial link; this
//! module owns the validated registry the control core reads from. Range
//! checks live HERE: an out-of-range curve stage or shift is rejected at
//! this boundary and never reaches the regulator.
//!
//! Serial framing (line assembly, checksums) is handled by the transport
//! layer; this module only parses a complete `name:value` payload.

use crate::error::SettingsError;
use crate::regulator::curve::STAGE_COUNT;

/// Maximum accepted payload length, `name:value\n` included.
pub const MAX_LINE_LEN: usize = 21;

/// Permitted parallel-shift range (K).
pub const PARALLEL_SHIFT_RANGE: core::ops::RangeInclusive<i16> = -20..=20;

/// Operator-selected operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    /// Plant off, protective functions only.
    Standby,
    /// Normal automatic heating operation.
    #[default]
    Auto,
    /// Outputs under external control; the regulator idles.
    Manual,
}

/// Validated settings registry.
#[derive(Debug, Clone)]
pub struct Settings {
    curve_stage: u8,
    parallel_shift: i16,
    reduced: bool,
    force_local: bool,
    mode: OperatingMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            curve_stage: 5,
            parallel_shift: 0,
            reduced: false,
            force_local: false,
            mode: OperatingMode::Auto,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a named setting. Rejects unknown actions and out-of-range
    /// values without touching the stored state.
    pub fn apply(&mut self, action: &str, value: i16) -> Result<(), SettingsError> {
        match action {
            "curve-stage" => {
                if !(0..STAGE_COUNT as i16).contains(&value) {
                    return Err(SettingsError::OutOfRange);
                }
                self.curve_stage = value as u8;
            }
            "parallel-shift" => {
                if !PARALLEL_SHIFT_RANGE.contains(&value) {
                    return Err(SettingsError::OutOfRange);
                }
                self.parallel_shift = value;
            }
            "reduced-mode" => self.reduced = parse_flag(value)?,
            "force-local" => self.force_local = parse_flag(value)?,
            "op-mode" => {
                self.mode = match value {
                    0 => OperatingMode::Standby,
                    1 => OperatingMode::Auto,
                    2 => OperatingMode::Manual,
                    _ => return Err(SettingsError::OutOfRange),
                };
            }
            _ => return Err(SettingsError::UnknownAction),
        }
        Ok(())
    }

    /// Read back a named setting, for echo to the remote side.
    pub fn get(&self, action: &str) -> Option<i16> {
        match action {
            "curve-stage" => Some(i16::from(self.curve_stage)),
            "parallel-shift" => Some(self.parallel_shift),
            "reduced-mode" => Some(i16::from(self.reduced)),
            "force-local" => Some(i16::from(self.force_local)),
            "op-mode" => Some(match self.mode {
                OperatingMode::Standby => 0,
                OperatingMode::Auto => 1,
                OperatingMode::Manual => 2,
            }),
            _ => None,
        }
    }

    // -- Getters consumed by the control core --

    pub fn curve_stage(&self) -> u8 {
        self.curve_stage
    }

    pub fn parallel_shift(&self) -> i16 {
        self.parallel_shift
    }

    pub fn reduced_mode(&self) -> bool {
        self.reduced
    }

    pub fn force_local(&self) -> bool {
        self.force_local
    }

    pub fn operating_mode(&self) -> OperatingMode {
        self.mode
    }
}

/// Split a `name:value` payload. The trailing newline, if the transport
/// left one in, is tolerated.
pub fn parse_line(line: &str) -> Result<(&str, i16), SettingsError> {
    if line.len() > MAX_LINE_LEN {
        return Err(SettingsError::Malformed);
    }
    let line = line.trim_end_matches('\n');
    let (name, value) = line.split_once(':').ok_or(SettingsError::Malformed)?;
    if name.is_empty() {
        return Err(SettingsError::Malformed);
    }
    let value: i16 = value.trim().parse().map_err(|_| SettingsError::Malformed)?;
    Ok((name, value))
}

fn parse_flag(value: i16) -> Result<bool, SettingsError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(SettingsError::OutOfRange),
    }
}
