//! Pump Hydraulic Calculation Engine
//!
//! Deterministic recalculation of every derived field on the pump
//! datasheet. All math here is plain arithmetic over the record - no I/O,
//! no hidden state.
//!
//! ## Entry points
//! - `recalculate()` - update the fields downstream of one edited field
//! - `recalculate_all()` - rerun every formula block (after loading a record)
//! - `recalculate_traced()` - `recalculate()` plus a report of what ran
//! - `dependents_of()` - which derived fields an edit will touch
//!
//! ## Numeric policy
//! Inputs that are missing or not numbers are read as zero. Guarded
//! divisions leave their output untouched. Outputs are written as
//! fixed-precision strings, and downstream blocks read those strings, so a
//! chain of results is consistent with what the user sees.

pub mod conversions;
pub mod formulas;
pub mod graph;

pub use conversions::FluidConversions;
pub use graph::{dependents_of, CalcGroup};

use crate::record::keys::*;
use crate::record::{catalog, format_fixed, EngineeringRecord, FieldValue};
use serde::Serialize;
use tracing::{debug, trace};

/// What a recalculation pass did.
#[derive(Debug, Clone, Serialize)]
pub struct RecalcReport {
    pub record: EngineeringRecord,
    /// Groups evaluated, in order
    pub ran: Vec<CalcGroup>,
    /// Groups whose division guard prevented a write
    pub skipped: Vec<CalcGroup>,
    /// Fields written, in order
    pub updated: Vec<&'static str>,
}

/// Recompute every derived field downstream of `changed_field`.
pub fn recalculate(record: &EngineeringRecord, changed_field: &str) -> EngineeringRecord {
    recalculate_traced(record, changed_field).record
}

/// Recompute every derived field from the current inputs.
pub fn recalculate_all(record: &EngineeringRecord) -> EngineeringRecord {
    let report = run_pass(record, |_, _| true);
    debug!(updated = report.updated.len(), skipped = ?report.skipped, "Full recalculation");
    report.record
}

/// Same as [`recalculate`], returning the pass report.
pub fn recalculate_traced(record: &EngineeringRecord, changed_field: &str) -> RecalcReport {
    let report = run_pass(record, |group, dirty| {
        group.reads(changed_field) || dirty.iter().any(|f| group.reads(f))
    });
    debug!(
        changed = changed_field,
        ran = ?report.ran,
        skipped = ?report.skipped,
        updated = report.updated.len(),
        "Recalculated"
    );
    report
}

/// Walk the groups in order, evaluating those selected by `should_run`.
///
/// `should_run` receives the fields written so far in this pass.
fn run_pass<F>(record: &EngineeringRecord, should_run: F) -> RecalcReport
where
    F: Fn(CalcGroup, &[&'static str]) -> bool,
{
    let mut out = record.clone();
    let mut ran = Vec::new();
    let mut skipped = Vec::new();
    let mut updated: Vec<&'static str> = Vec::new();

    for group in CalcGroup::ORDER {
        if !should_run(group, &updated) {
            continue;
        }
        ran.push(group);
        let written = evaluate(group, &mut out);
        if written.is_empty() {
            trace!(?group, "Guard skipped group");
            skipped.push(group);
        }
        updated.extend(written);
    }

    RecalcReport {
        record: out,
        ran,
        skipped,
        updated,
    }
}

/// Write a derived value with the field's catalog precision.
///
/// Non-finite values are never written.
fn write(
    record: &mut EngineeringRecord,
    key: &'static str,
    value: f64,
    written: &mut Vec<&'static str>,
) {
    if !value.is_finite() {
        return;
    }
    let precision = catalog::field(key).and_then(|f| f.precision).unwrap_or(2);
    record.set(key, FieldValue::Text(format_fixed(value, precision)));
    written.push(key);
}

/// Evaluate one group against the record, returning the fields written.
fn evaluate(group: CalcGroup, r: &mut EngineeringRecord) -> Vec<&'static str> {
    let mut w = Vec::new();
    match group {
        CalcGroup::CvRatio => {
            if let Some(ratio) = formulas::cv_ratio(r.number(CV_MAX), r.number(CV_MIN)) {
                write(r, CV_RATIO, ratio, &mut w);
            }
        }
        CalcGroup::DynamicLossMargin => {
            let margin = formulas::dynamic_loss_margin(r.number(TOTAL_FRICTIONAL_LOSSES));
            write(r, DYNAMIC_LOSSES_30_PERCENT, margin, &mut w);
        }
        CalcGroup::SuctionLosses => {
            let total = formulas::sum_losses(&[
                r.number(INLINE_INST_LOSSES),
                r.number(LINE_FRIC_LOSSES),
                r.number(CONTROL_VALVE_SUCTION),
                r.number(MISC_ITEMS_SUCTION),
            ]);
            write(r, TOTAL_SUCTION_LOSSES, total, &mut w);
        }
        CalcGroup::TotalSuctionPressure => {
            let p = formulas::total_suction_pressure(
                r.number(SOURCE_OP_PRESSURE),
                r.number(SUCTION_EL_M),
                r.number(TOTAL_SUCTION_LOSSES),
            );
            write(r, TOTAL_SUCTION_PRESSURE, p, &mut w);
        }
        CalcGroup::BrakeHorsePower => {
            if let Some(bhp) =
                formulas::brake_horse_power(r.number(HYDRAULIC_POWER), r.number(PUMP_EFFICIENCY))
            {
                write(r, BREAK_HORSE_POWER, bhp, &mut w);
            }
        }
        CalcGroup::PowerConsumption => {
            if let Some(p) =
                formulas::power_consumption(r.number(BREAK_HORSE_POWER), r.number(MOTOR_EFFICIENCY))
            {
                write(r, POWER_CONSUMPTION, p, &mut w);
            }
        }
        CalcGroup::Npsha => {
            let conv = FluidConversions::from_record(r);
            let h = formulas::npsha(
                r.number(SUCTION_PRESSURE_NPSH),
                r.number(VAPOR_PRESSURE),
                &conv,
            );
            write(r, NPSHA, h, &mut w);
        }
        CalcGroup::NpshaWithMargin => {
            let h = r.number(NPSHA) - r.number(SAFETY_MARGIN_NPSHA);
            write(r, NPSHA_WITH_SAFETY_MARGIN, h, &mut w);
        }
        CalcGroup::TotalDischargePressure => {
            let total = formulas::sum_losses(&[
                r.number(DESTINATION_PRESSURE),
                r.number(DESTINATION_ELEVATION),
                r.number(LINE_FRICTION_LOSS),
                r.number(FLOW_METER_DEL_P),
                r.number(OTHER_LOSSES),
                r.number(CONTROL_VALVE),
                r.number(MISC_ITEM),
                r.number(CONTINGENCY),
            ]);
            write(r, TOTAL_DISCHARGE_PRESSURE, total, &mut w);
        }
        CalcGroup::PumpResults => {
            let conv = FluidConversions::from_record(r);
            let discharge = r.number(TOTAL_DISCHARGE_PRESSURE);
            write(r, DISCHARGE_PRESSURE, discharge, &mut w);
            let suction = formulas::suction_pressure_result(
                r.number(SOURCE_OP_PRESSURE),
                r.number(SUCTION_EL_M),
                r.number(TOTAL_SUCTION_LOSSES),
                &conv,
            );
            write(r, SUCTION_PRESSURE_RESULT, suction, &mut w);
            let dp = r.number(DISCHARGE_PRESSURE) - r.number(SUCTION_PRESSURE_RESULT);
            write(r, DIFFERENTIAL_PRESSURE, dp, &mut w);
            let head = formulas::differential_head(r.number(DIFFERENTIAL_PRESSURE), &conv);
            write(r, DIFFERENTIAL_HEAD, head, &mut w);
            let npsha = r.number(NPSHA);
            write(r, NPSHA_RESULT, npsha, &mut w);
        }
        CalcGroup::MaxSuctionPressure => {
            let conv = FluidConversions::from_record(r);
            let p = formulas::max_suction_pressure(
                r.number(SUCTION_VESSEL_MAX_OP_PRESSURE),
                r.number(TL_TO_HHLL_M),
                r.number(SUCTION_EL_M_MAX),
                &conv,
            );
            write(r, MAX_SUCTION_PRESSURE, p, &mut w);
        }
        CalcGroup::McfControlValve => {
            let head = formulas::mcf_elevation_head(
                r.number(EL_DESTINATION_PUMP_CL),
                r.number(FLUID_DENSITY_MCF),
            );
            write(r, MCF_ELEVATION_HEAD, head, &mut w);
            let dp = formulas::mcf_control_valve_dp(
                r.number(PUMP_DISCHARGE_PRESSURE_MIN_FLOW),
                r.number(DESTINATION_PRESSURE),
                head,
                r.number(MCF_LINE_FRICTION_LOSSES),
                r.number(FLOW_METER_LOSSES),
                r.number(MISC_PRESSURE_DROP_MCF),
            );
            write(r, MCF_CONTROL_VALVE_DP, dp, &mut w);
        }
        CalcGroup::ShutOffDifferential => {
            let dp = formulas::shut_off_differential_pressure(
                r.number(DIFFERENTIAL_PRESSURE),
                r.number(API_TOLERANCE_FACTOR),
                r.number(SHUT_OFF_PRESSURE_FACTOR),
            );
            write(r, SHUT_OFF_DIFFERENTIAL_PRESSURE, dp, &mut w);
        }
        CalcGroup::MaxDischargeOptions => {
            let max_suction = r.number(MAX_SUCTION_PRESSURE);
            let option_1 = max_suction + r.number(DIFFERENTIAL_PRESSURE);
            let option_2 = max_suction + r.number(SHUT_OFF_DIFFERENTIAL_PRESSURE);
            write(r, MAX_DISCHARGE_PRESSURE_OPTION_1, option_1, &mut w);
            write(r, MAX_DISCHARGE_PRESSURE_OPTION_2, option_2, &mut w);
        }
    }
    w
}
