//! Heating-curve lookup and supply-setpoint calculation.
//!
//! Each selectable stage is a linear function from outdoor temperature to
//! target supply-water temperature. Slope and offset are stored scaled by
//! 100 so the whole calculation stays in integer arithmetic; the final
//! division truncates toward zero.

use crate::config::{SUPPLY_MAX_C, SUPPLY_MIN_C};

/// One heating-curve stage: `target = (slope * outdoor + offset) / 100`.
/// Both values scaled by 100. Slopes are negative by construction, so the
/// target rises as the outdoor temperature falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurvePoint {
    pub slope: i16,
    pub offset: i16,
}

impl CurvePoint {
    /// Base target for this stage, before shift and setback.
    pub fn target(&self, outdoor_c: i16) -> i16 {
        let scaled = i32::from(self.slope) * i32::from(outdoor_c) + i32::from(self.offset);
        (scaled / 100) as i16
    }
}

/// Number of selectable curve stages. Stage indices are validated at the
/// settings boundary; the core never sees an out-of-range stage.
pub const STAGE_COUNT: usize = 11;

/// Stage table, mild (0) to steep (10). Loaded once at startup as const
/// data; stage 5 is the commissioning default for a mid-insulated building.
pub const CURVE_STAGES: [CurvePoint; STAGE_COUNT] = [
    CurvePoint { slope: -50, offset: 2_600 },
    CurvePoint { slope: -70, offset: 2_800 },
    CurvePoint { slope: -90, offset: 3_000 },
    CurvePoint { slope: -110, offset: 3_200 },
    CurvePoint { slope: -130, offset: 3_400 },
    CurvePoint { slope: -150, offset: 3_600 },
    CurvePoint { slope: -170, offset: 3_800 },
    CurvePoint { slope: -190, offset: 4_000 },
    CurvePoint { slope: -210, offset: 4_200 },
    CurvePoint { slope: -230, offset: 4_400 },
    CurvePoint { slope: -250, offset: 4_600 },
];

/// Compute the supply-water setpoint (°C) for the given outdoor
/// temperature and user settings.
///
/// `parallel_shift_c` moves the whole curve up or down; `reduced` applies
/// the night setback. The result is clamped to the physical supply range
/// of the circuit.
pub fn supply_setpoint(
    outdoor_c: i16,
    stage: u8,
    parallel_shift_c: i16,
    reduced: bool,
    reduced_setback_c: i16,
) -> i16 {
    let idx = usize::from(stage);
    debug_assert!(idx < STAGE_COUNT, "invalid curve stage: {stage}");
    let point = CURVE_STAGES[idx.min(STAGE_COUNT - 1)];

    let mut target = i32::from(point.target(outdoor_c)) + i32::from(parallel_shift_c);
    if reduced {
        target -= i32::from(reduced_setback_c);
    }
    target.clamp(i32::from(SUPPLY_MIN_C), i32::from(SUPPLY_MAX_C)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_truncation() {
        // (-150 * -5 + 4000) / 100 = 47.5, truncated to 47.
        let p = CurvePoint { slope: -150, offset: 4_000 };
        assert_eq!(p.target(-5), 47);
    }

    #[test]
    fn shift_and_setback_are_applied() {
        let base = supply_setpoint(0, 5, 0, false, 5);
        assert_eq!(supply_setpoint(0, 5, 3, false, 5), base + 3);
        assert_eq!(supply_setpoint(0, 5, 0, true, 5), base - 5);
    }

    #[test]
    fn all_stages_have_negative_slope() {
        for p in &CURVE_STAGES {
            assert!(p.slope < 0);
        }
    }

    #[test]
    fn steeper_stage_gives_higher_target_in_cold() {
        let mild = supply_setpoint(-10, 0, 0, false, 5);
        let steep = supply_setpoint(-10, 10, 0, false, 5);
        assert!(steep > mild);
    }

    #[test]
    fn setpoint_is_clamped_to_supply_range() {
        // Steepest curve in arctic cold still caps at the circuit limit.
        assert!(supply_setpoint(-40, 10, 20, false, 5) <= crate::config::SUPPLY_MAX_C);
        // Mildest curve in a heat wave never goes below the lower clamp.
        assert!(supply_setpoint(40, 0, -20, true, 5) >= crate::config::SUPPLY_MIN_C);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// For a fixed stage the setpoint never increases with rising
        /// outdoor temperature.
        #[test]
        fn monotone_in_outdoor_temperature(
            stage in 0u8..STAGE_COUNT as u8,
            outdoor in -30i16..34,
            shift in -20i16..=20,
        ) {
            let colder = supply_setpoint(outdoor, stage, shift, false, 5);
            let warmer = supply_setpoint(outdoor + 1, stage, shift, false, 5);
            prop_assert!(warmer <= colder);
        }
    }
}
