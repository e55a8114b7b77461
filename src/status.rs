//! Packed system-status word.
//!
//! [`SystemStatus`] mirrors actuator and mode state as sixteen named
//! boolean fields. The field set is the authoritative contract; the bit
//! layout of [`SystemStatus::pack`] exists only for wire transmission and
//! logging, and round-trips every field.
//!
//! Produced by the compressor sequencer each cycle, consumed read-only by
//! the logging/communication collaborators.

/// Per-cycle system status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemStatus {
    /// Crankcase heater energised (prevents refrigerant migration).
    pub crankcase_heater: bool,
    /// Compressor motor energised (start or run contactor closed).
    pub compressor: bool,
    /// Evaporator fan running.
    pub fan: bool,
    /// Hot-gas bypass valve open.
    pub bypass_open: bool,
    /// Storage charge pump running.
    pub charge_pump: bool,
    /// Supply-temperature regulator actively driving the mixing valve.
    pub regulator_active: bool,
    /// Heating-circuit circulation pump running.
    pub heating_pump: bool,
    /// Defrost cycle in progress.
    pub defrost: bool,
    /// Automatic operation selected.
    pub auto_mode: bool,
    /// Reduced (setback) heating active.
    pub reduced_mode: bool,
    /// Manual operation selected.
    pub manual_mode: bool,
    /// Low-pressure alarm (true only while the switch reads not-ok).
    pub low_pressure_alarm: bool,
    /// High-pressure alarm (true only while the switch reads not-ok).
    pub high_pressure_alarm: bool,
    /// Motor-protection breaker tripped.
    pub motor_protection: bool,
    /// Utility tariff lock active.
    pub tariff_locked: bool,
    /// Alarm summary: set iff any individual alarm field is set.
    pub alarm: bool,
}

impl SystemStatus {
    /// Serialize to a 16-bit word, one bit per field in declaration order.
    pub fn pack(&self) -> u16 {
        let fields = self.as_bits();
        let mut word = 0u16;
        for (i, &b) in fields.iter().enumerate() {
            word |= u16::from(b) << i;
        }
        word
    }

    /// Rebuild a status record from a packed word.
    pub fn unpack(word: u16) -> Self {
        let bit = |i: usize| word & (1 << i) != 0;
        Self {
            crankcase_heater: bit(0),
            compressor: bit(1),
            fan: bit(2),
            bypass_open: bit(3),
            charge_pump: bit(4),
            regulator_active: bit(5),
            heating_pump: bit(6),
            defrost: bit(7),
            auto_mode: bit(8),
            reduced_mode: bit(9),
            manual_mode: bit(10),
            low_pressure_alarm: bit(11),
            high_pressure_alarm: bit(12),
            motor_protection: bit(13),
            tariff_locked: bit(14),
            alarm: bit(15),
        }
    }

    /// Any alarm field set.
    pub fn any_alarm(&self) -> bool {
        self.low_pressure_alarm || self.high_pressure_alarm || self.motor_protection
    }

    fn as_bits(&self) -> [bool; 16] {
        [
            self.crankcase_heater,
            self.compressor,
            self.fan,
            self.bypass_open,
            self.charge_pump,
            self.regulator_active,
            self.heating_pump,
            self.defrost,
            self.auto_mode,
            self.reduced_mode,
            self.manual_mode,
            self.low_pressure_alarm,
            self.high_pressure_alarm,
            self.motor_protection,
            self.tariff_locked,
            self.alarm,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_packs_to_zero() {
        assert_eq!(SystemStatus::default().pack(), 0);
    }

    #[test]
    fn roundtrip_preserves_every_field() {
        let s = SystemStatus {
            crankcase_heater: true,
            compressor: true,
            fan: true,
            bypass_open: false,
            charge_pump: true,
            regulator_active: false,
            heating_pump: true,
            defrost: false,
            auto_mode: true,
            reduced_mode: false,
            manual_mode: false,
            low_pressure_alarm: false,
            high_pressure_alarm: true,
            motor_protection: false,
            tariff_locked: true,
            alarm: true,
        };
        assert_eq!(SystemStatus::unpack(s.pack()), s);
    }

    #[test]
    fn alarm_summary_helper() {
        let mut s = SystemStatus::default();
        assert!(!s.any_alarm());
        s.motor_protection = true;
        assert!(s.any_alarm());
    }
}
