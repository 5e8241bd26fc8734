//! Recalculation Scenarios
//!
//! Worked datasheet examples run through the public engine API, checking
//! the formatted values a user would see on the form.

use pumpcalc::hydraulics::{dependents_of, recalculate, recalculate_all, recalculate_traced};
use pumpcalc::keys::*;
use pumpcalc::{EngineeringRecord, FieldValue};

fn text(record: &EngineeringRecord, key: &str) -> Option<String> {
    record.get(key).map(FieldValue::display)
}

// ============================================================================
// Worked examples
// ============================================================================

#[test]
fn cv_ratio_is_formatted_to_two_decimals() {
    let record = EngineeringRecord::new().with(CV_MAX, 80.0).with(CV_MIN, 40.0);
    let out = recalculate(&record, CV_MIN);
    assert_eq!(text(&out, CV_RATIO).as_deref(), Some("2.00"));
}

#[test]
fn zero_pump_efficiency_leaves_bhp_unchanged() {
    let record = EngineeringRecord::new()
        .with(HYDRAULIC_POWER, 50.0)
        .with(PUMP_EFFICIENCY, 0.0)
        .with(BREAK_HORSE_POWER, "71.43");
    let out = recalculate(&record, PUMP_EFFICIENCY);
    assert_eq!(text(&out, BREAK_HORSE_POWER).as_deref(), Some("71.43"));
}

#[test]
fn discharge_components_sum_to_total() {
    let record = EngineeringRecord::new()
        .with(DESTINATION_PRESSURE, 2.0)
        .with(DESTINATION_ELEVATION, 0.5)
        .with(LINE_FRICTION_LOSS, 0.3)
        .with(FLOW_METER_DEL_P, 0.1)
        .with(OTHER_LOSSES, 0.0)
        .with(CONTROL_VALVE, 0.0)
        .with(MISC_ITEM, 0.0)
        .with(CONTINGENCY, 0.0);
    let out = recalculate(&record, FLOW_METER_DEL_P);
    assert_eq!(text(&out, TOTAL_DISCHARGE_PRESSURE).as_deref(), Some("2.90"));
    assert_eq!(text(&out, DISCHARGE_PRESSURE).as_deref(), Some("2.900"));
}

#[test]
fn negative_suction_pressures_clamp_to_zero() {
    let record = EngineeringRecord::new()
        .with(SOURCE_OP_PRESSURE, 0.1)
        .with(SUCTION_EL_M, 10.0);
    let out = recalculate(&record, SOURCE_OP_PRESSURE);
    assert_eq!(text(&out, SUCTION_PRESSURE_RESULT).as_deref(), Some("0.000"));

    let record = EngineeringRecord::new()
        .with(SUCTION_VESSEL_MAX_OP_PRESSURE, 0.2)
        .with(TL_TO_HHLL_M, 1.0)
        .with(SUCTION_EL_M_MAX, 10.0);
    let out = recalculate(&record, SUCTION_EL_M_MAX);
    assert_eq!(text(&out, MAX_SUCTION_PRESSURE).as_deref(), Some("0.000"));
}

#[test]
fn end_to_end_suction_then_discharge() {
    let record = EngineeringRecord::new()
        .with(SOURCE_OP_PRESSURE, 5.0)
        .with(SUCTION_EL_M, 2.0)
        .with(TOTAL_SUCTION_LOSSES, 0.5);
    let record = recalculate(&record, TOTAL_SUCTION_LOSSES);

    let record = recalculate(&record.with(TOTAL_DISCHARGE_PRESSURE, 6.0), TOTAL_DISCHARGE_PRESSURE);

    assert_eq!(text(&record, SUCTION_PRESSURE_RESULT).as_deref(), Some("4.304"));
    assert_eq!(text(&record, DIFFERENTIAL_PRESSURE).as_deref(), Some("1.696"));
    assert_eq!(text(&record, DIFFERENTIAL_HEAD).as_deref(), Some("17.294"));
    // user-entered totals are not overwritten by an unrelated edit
    assert_eq!(text(&record, TOTAL_SUCTION_LOSSES).as_deref(), Some("0.5"));
    assert_eq!(text(&record, TOTAL_DISCHARGE_PRESSURE).as_deref(), Some("6"));
}

#[test]
fn light_liquid_scales_heads() {
    let water = EngineeringRecord::new()
        .with(SUCTION_PRESSURE_NPSH, 2.0)
        .with(VAPOR_PRESSURE, 0.5);
    let oil = water.clone().with(DENSITY, 850.0);

    let water = recalculate(&water, SUCTION_PRESSURE_NPSH);
    let oil = recalculate(&oil, DENSITY);

    assert_eq!(text(&water, NPSHA).as_deref(), Some("15.30"));
    assert_eq!(text(&oil, NPSHA).as_deref(), Some("18.00"));
}

#[test]
fn density_edit_rescales_differential_head() {
    let record = EngineeringRecord::new()
        .with(TOTAL_DISCHARGE_PRESSURE, 3.0)
        .with(SOURCE_OP_PRESSURE, 1.0);
    let water = recalculate(&record, TOTAL_DISCHARGE_PRESSURE);
    assert_eq!(text(&water, DIFFERENTIAL_HEAD).as_deref(), Some("20.394"));

    let heavy = recalculate(&water.with(DENSITY, 1200.0), DENSITY);
    assert_eq!(text(&heavy, DIFFERENTIAL_HEAD).as_deref(), Some("16.995"));
}

// ============================================================================
// Engine properties
// ============================================================================

#[test]
fn recalculation_is_idempotent() {
    let record = EngineeringRecord::new()
        .with(CV_MAX, 120.0)
        .with(CV_MIN, 30.0)
        .with(INLINE_INST_LOSSES, 0.1)
        .with(LINE_FRIC_LOSSES, 0.15)
        .with(SOURCE_OP_PRESSURE, 3.5)
        .with(SUCTION_EL_M, 4.0)
        .with(HYDRAULIC_POWER, 30.0)
        .with(PUMP_EFFICIENCY, 70.0)
        .with(MOTOR_EFFICIENCY, 94.0)
        .with(DESTINATION_PRESSURE, 9.0)
        .with(API_TOLERANCE_FACTOR, 1.05)
        .with(SHUT_OFF_PRESSURE_FACTOR, 1.2);

    for field in [CV_MIN, INLINE_INST_LOSSES, PUMP_EFFICIENCY, DESTINATION_PRESSURE, DENSITY] {
        let once = recalculate(&record, field);
        let twice = recalculate(&once, field);
        assert_eq!(once, twice, "recalculating {field} twice changed the record");
    }

    let once = recalculate_all(&record);
    assert_eq!(recalculate_all(&once), once);
}

#[test]
fn garbage_input_is_read_as_zero() {
    let record = EngineeringRecord::new()
        .with(INLINE_INST_LOSSES, "abc")
        .with(LINE_FRIC_LOSSES, 0.2);
    let out = recalculate(&record, LINE_FRIC_LOSSES);
    assert_eq!(text(&out, TOTAL_SUCTION_LOSSES).as_deref(), Some("0.20"));
    assert_eq!(out.numeric_issues().len(), 1);
}

#[test]
fn values_with_units_read_their_leading_number() {
    let record = EngineeringRecord::new()
        .with(CV_MAX, "90 m3/h")
        .with(CV_MIN, "30");
    let out = recalculate(&record, CV_MAX);
    assert_eq!(text(&out, CV_RATIO).as_deref(), Some("3.00"));

    let issues = out.numeric_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, CV_MAX);
    assert_eq!(issues[0].read_as, 90.0);
}

#[test]
fn traced_report_matches_dependents() {
    let record = EngineeringRecord::new()
        .with(PUMP_DISCHARGE_PRESSURE_MIN_FLOW, 12.0)
        .with(FLUID_DENSITY_MCF, 1000.0)
        .with(EL_DESTINATION_PUMP_CL, 10.0);
    let report = recalculate_traced(&record, EL_DESTINATION_PUMP_CL);
    assert_eq!(report.updated, dependents_of(EL_DESTINATION_PUMP_CL));
    assert_eq!(
        text(&report.record, MCF_CONTROL_VALVE_DP).as_deref(),
        Some("11.019")
    );
}

#[test]
fn text_edit_triggers_nothing() {
    let record = EngineeringRecord::new()
        .with(CV_MAX, 80.0)
        .with(TAG_NO, "P-101A");
    let report = recalculate_traced(&record, TAG_NO);
    assert!(report.ran.is_empty());
    assert_eq!(report.record, record);
}
