//! Pump hydraulic formulas
//!
//! Plain f64 in, f64 out. Guarded divisions return `None` so the caller can
//! leave the dependent field untouched instead of writing NaN or infinity.
//! Pressures are in bar, elevations and heads in metres, powers in kW,
//! efficiencies in percent.

use super::conversions::FluidConversions;

/// Share of total frictional losses reserved for the control valve.
pub const DYNAMIC_LOSS_MARGIN: f64 = 0.30;

// ============================================================================
// Control Valve
// ============================================================================

/// Cv rangeability ratio.
///
/// Formula: ratio = Cv_max / Cv_min
///
/// Returns `None` when Cv_min is zero.
pub fn cv_ratio(cv_max: f64, cv_min: f64) -> Option<f64> {
    if cv_min == 0.0 {
        return None;
    }
    Some(cv_max / cv_min)
}

/// Dynamic-loss allowance for the control valve: 30% of frictional losses.
pub fn dynamic_loss_margin(total_frictional_losses: f64) -> f64 {
    total_frictional_losses * DYNAMIC_LOSS_MARGIN
}

// ============================================================================
// Suction Side
// ============================================================================

/// Sum of pressure-loss components (bar).
pub fn sum_losses(components: &[f64]) -> f64 {
    components.iter().sum()
}

/// Total suction pressure as entered on the suction sheet.
///
/// Formula: P_suction = P_source + elevation − losses
///
/// The elevation term is added as entered, with no head conversion; the
/// result block below is the converted figure.
pub fn total_suction_pressure(
    source_op_pressure: f64,
    suction_elevation: f64,
    total_losses: f64,
) -> f64 {
    source_op_pressure + suction_elevation - total_losses
}

/// Pump suction pressure for the result block, clamped at zero.
///
/// Formula: P = max(0, P_source − elevation_m × bar_per_metre − losses)
pub fn suction_pressure_result(
    source_op_pressure: f64,
    suction_elevation_m: f64,
    total_losses: f64,
    conv: &FluidConversions,
) -> f64 {
    (source_op_pressure - suction_elevation_m * conv.bar_per_metre - total_losses).max(0.0)
}

/// Maximum suction pressure at high-high liquid level, clamped at zero.
///
/// Formula: P = max(0, P_vessel_max + TL→HHLL × bar_per_metre − elevation × bar_per_metre)
pub fn max_suction_pressure(
    vessel_max_op_pressure: f64,
    tl_to_hhll_m: f64,
    suction_elevation_m: f64,
    conv: &FluidConversions,
) -> f64 {
    (vessel_max_op_pressure + tl_to_hhll_m * conv.bar_per_metre
        - suction_elevation_m * conv.bar_per_metre)
        .max(0.0)
}

// ============================================================================
// Power
// ============================================================================

/// Brake horse power from hydraulic power and pump efficiency.
///
/// Formula: BHP = P_hydraulic / (η_pump / 100)
///
/// Returns `None` unless the efficiency is positive.
pub fn brake_horse_power(hydraulic_power: f64, pump_efficiency_pct: f64) -> Option<f64> {
    if pump_efficiency_pct <= 0.0 {
        return None;
    }
    Some(hydraulic_power / (pump_efficiency_pct / 100.0))
}

/// Electrical power drawn by the motor.
///
/// Formula: P = BHP / (η_motor / 100)
///
/// Returns `None` unless the efficiency is positive.
pub fn power_consumption(brake_horse_power: f64, motor_efficiency_pct: f64) -> Option<f64> {
    if motor_efficiency_pct <= 0.0 {
        return None;
    }
    Some(brake_horse_power / (motor_efficiency_pct / 100.0))
}

// ============================================================================
// NPSH
// ============================================================================

/// Net positive suction head available (m).
///
/// Formula: NPSHA = (P_suction − P_vapor) × metres_per_bar
pub fn npsha(suction_pressure: f64, vapor_pressure: f64, conv: &FluidConversions) -> f64 {
    (suction_pressure - vapor_pressure) * conv.npsh_metres_per_bar
}

// ============================================================================
// Discharge Side
// ============================================================================

/// Pump differential head (m) from differential pressure (bar).
pub fn differential_head(differential_pressure: f64, conv: &FluidConversions) -> f64 {
    differential_pressure * conv.metres_per_bar
}

/// Static head of the MCF line expressed in bar.
///
/// Formula: head = elevation × 0.0981 × (ρ / 1000)
///
/// Uses the MCF fluid density directly; an unset density yields zero head.
pub fn mcf_elevation_head(elevation_m: f64, fluid_density_kg_m3: f64) -> f64 {
    let specific_gravity = fluid_density_kg_m3 / super::conversions::REFERENCE_DENSITY_KG_M3;
    elevation_m * super::conversions::BAR_PER_METRE_WATER * specific_gravity
}

/// Pressure left for the MCF control valve, clamped at zero.
pub fn mcf_control_valve_dp(
    discharge_pressure_min_flow: f64,
    destination_pressure: f64,
    elevation_head: f64,
    line_friction_losses: f64,
    flow_meter_losses: f64,
    misc_pressure_drop: f64,
) -> f64 {
    (discharge_pressure_min_flow
        - destination_pressure
        - elevation_head
        - line_friction_losses
        - flow_meter_losses
        - misc_pressure_drop)
        .max(0.0)
}

/// Differential pressure at shut-off.
///
/// Formula: ΔP_shutoff = ΔP × API tolerance × shut-off factor
pub fn shut_off_differential_pressure(
    differential_pressure: f64,
    api_tolerance_factor: f64,
    shut_off_pressure_factor: f64,
) -> f64 {
    differential_pressure * api_tolerance_factor * shut_off_pressure_factor
}
