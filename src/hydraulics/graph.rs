//! Dependency groups and their fixed evaluation order

use crate::record::keys::*;
use serde::Serialize;

/// One recalculation step: a formula block with declared inputs and outputs.
///
/// Groups are evaluated in [`CalcGroup::ORDER`], which is topological: no
/// group reads a field written by a group later in the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CalcGroup {
    CvRatio,
    DynamicLossMargin,
    SuctionLosses,
    TotalSuctionPressure,
    BrakeHorsePower,
    PowerConsumption,
    Npsha,
    NpshaWithMargin,
    TotalDischargePressure,
    PumpResults,
    MaxSuctionPressure,
    McfControlValve,
    ShutOffDifferential,
    MaxDischargeOptions,
}

impl CalcGroup {
    pub const ORDER: [CalcGroup; 14] = [
        CalcGroup::CvRatio,
        CalcGroup::DynamicLossMargin,
        CalcGroup::SuctionLosses,
        CalcGroup::TotalSuctionPressure,
        CalcGroup::BrakeHorsePower,
        CalcGroup::PowerConsumption,
        CalcGroup::Npsha,
        CalcGroup::NpshaWithMargin,
        CalcGroup::TotalDischargePressure,
        CalcGroup::PumpResults,
        CalcGroup::MaxSuctionPressure,
        CalcGroup::McfControlValve,
        CalcGroup::ShutOffDifferential,
        CalcGroup::MaxDischargeOptions,
    ];

    /// Fields whose change makes this group stale.
    pub fn inputs(&self) -> &'static [&'static str] {
        match self {
            CalcGroup::CvRatio => &[CV_MAX, CV_MIN],
            CalcGroup::DynamicLossMargin => &[TOTAL_FRICTIONAL_LOSSES],
            CalcGroup::SuctionLosses => &[
                INLINE_INST_LOSSES,
                LINE_FRIC_LOSSES,
                CONTROL_VALVE_SUCTION,
                MISC_ITEMS_SUCTION,
            ],
            CalcGroup::TotalSuctionPressure => {
                &[SOURCE_OP_PRESSURE, SUCTION_EL_M, TOTAL_SUCTION_LOSSES]
            }
            CalcGroup::BrakeHorsePower => &[HYDRAULIC_POWER, PUMP_EFFICIENCY],
            CalcGroup::PowerConsumption => &[BREAK_HORSE_POWER, MOTOR_EFFICIENCY],
            CalcGroup::Npsha => &[SUCTION_PRESSURE_NPSH, VAPOR_PRESSURE, DENSITY],
            CalcGroup::NpshaWithMargin => &[NPSHA, SAFETY_MARGIN_NPSHA],
            CalcGroup::TotalDischargePressure => &[
                DESTINATION_PRESSURE,
                DESTINATION_ELEVATION,
                LINE_FRICTION_LOSS,
                FLOW_METER_DEL_P,
                OTHER_LOSSES,
                CONTROL_VALVE,
                MISC_ITEM,
                CONTINGENCY,
            ],
            CalcGroup::PumpResults => &[
                TOTAL_DISCHARGE_PRESSURE,
                SOURCE_OP_PRESSURE,
                SUCTION_EL_M,
                TOTAL_SUCTION_LOSSES,
                NPSHA,
                DENSITY,
            ],
            CalcGroup::MaxSuctionPressure => &[
                SUCTION_VESSEL_MAX_OP_PRESSURE,
                TL_TO_HHLL_M,
                SUCTION_EL_M_MAX,
                DENSITY,
            ],
            CalcGroup::McfControlValve => &[
                PUMP_DISCHARGE_PRESSURE_MIN_FLOW,
                DESTINATION_PRESSURE,
                FLUID_DENSITY_MCF,
                EL_DESTINATION_PUMP_CL,
                MCF_LINE_FRICTION_LOSSES,
                FLOW_METER_LOSSES,
                MISC_PRESSURE_DROP_MCF,
            ],
            CalcGroup::ShutOffDifferential => &[
                DIFFERENTIAL_PRESSURE,
                API_TOLERANCE_FACTOR,
                SHUT_OFF_PRESSURE_FACTOR,
            ],
            CalcGroup::MaxDischargeOptions => &[
                MAX_SUCTION_PRESSURE,
                DIFFERENTIAL_PRESSURE,
                SHUT_OFF_DIFFERENTIAL_PRESSURE,
            ],
        }
    }

    /// Fields this group writes.
    pub fn outputs(&self) -> &'static [&'static str] {
        match self {
            CalcGroup::CvRatio => &[CV_RATIO],
            CalcGroup::DynamicLossMargin => &[DYNAMIC_LOSSES_30_PERCENT],
            CalcGroup::SuctionLosses => &[TOTAL_SUCTION_LOSSES],
            CalcGroup::TotalSuctionPressure => &[TOTAL_SUCTION_PRESSURE],
            CalcGroup::BrakeHorsePower => &[BREAK_HORSE_POWER],
            CalcGroup::PowerConsumption => &[POWER_CONSUMPTION],
            CalcGroup::Npsha => &[NPSHA],
            CalcGroup::NpshaWithMargin => &[NPSHA_WITH_SAFETY_MARGIN],
            CalcGroup::TotalDischargePressure => &[TOTAL_DISCHARGE_PRESSURE],
            CalcGroup::PumpResults => &[
                DISCHARGE_PRESSURE,
                SUCTION_PRESSURE_RESULT,
                DIFFERENTIAL_PRESSURE,
                DIFFERENTIAL_HEAD,
                NPSHA_RESULT,
            ],
            CalcGroup::MaxSuctionPressure => &[MAX_SUCTION_PRESSURE],
            CalcGroup::McfControlValve => &[MCF_ELEVATION_HEAD, MCF_CONTROL_VALVE_DP],
            CalcGroup::ShutOffDifferential => &[SHUT_OFF_DIFFERENTIAL_PRESSURE],
            CalcGroup::MaxDischargeOptions => {
                &[MAX_DISCHARGE_PRESSURE_OPTION_1, MAX_DISCHARGE_PRESSURE_OPTION_2]
            }
        }
    }

    pub fn reads(&self, field: &str) -> bool {
        self.inputs().iter().any(|input| *input == field)
    }
}

/// Calculated fields affected, directly or transitively, by editing `field`.
///
/// Returned in evaluation order.
pub fn dependents_of(field: &str) -> Vec<&'static str> {
    let mut dirty: Vec<&str> = vec![field];
    let mut affected = Vec::new();
    for group in CalcGroup::ORDER {
        if dirty.iter().any(|f| group.reads(f)) {
            for out in group.outputs() {
                dirty.push(*out);
                affected.push(*out);
            }
        }
    }
    affected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::catalog;

    #[test]
    fn test_order_is_topological() {
        for (i, group) in CalcGroup::ORDER.iter().enumerate() {
            for later in &CalcGroup::ORDER[i + 1..] {
                for out in later.outputs() {
                    assert!(
                        !group.reads(out),
                        "{group:?} reads {out} which {later:?} writes later"
                    );
                }
            }
        }
    }

    #[test]
    fn test_outputs_are_calculated_fields() {
        for group in CalcGroup::ORDER {
            for out in group.outputs() {
                assert!(catalog::is_calculated(out), "{out} is not marked calculated");
            }
        }
    }

    #[test]
    fn test_every_calculated_field_has_a_writer() {
        for spec in catalog::FIELDS.iter().filter(|f| f.calculated) {
            let writers = CalcGroup::ORDER
                .iter()
                .filter(|g| g.outputs().contains(&spec.key))
                .count();
            assert_eq!(writers, 1, "{} has {writers} writers", spec.key);
        }
    }

    #[test]
    fn test_dependents_of_suction_loss_component() {
        let affected = dependents_of(INLINE_INST_LOSSES);
        assert_eq!(affected[0], TOTAL_SUCTION_LOSSES);
        assert!(affected.contains(&TOTAL_SUCTION_PRESSURE));
        assert!(affected.contains(&DIFFERENTIAL_HEAD));
        assert!(affected.contains(&MAX_DISCHARGE_PRESSURE_OPTION_2));
        assert!(!affected.contains(&CV_RATIO));
    }

    #[test]
    fn test_dependents_of_text_field_is_empty() {
        assert!(dependents_of(TAG_NO).is_empty());
    }
}
