//! Field catalog - static metadata for every engineering field
//!
//! The catalog is the single source of truth for labels, units, sections,
//! which fields are derived by the recalculation engine, the display
//! precision of derived numerics, and the snake_case key used by the
//! persistence API.

use serde::Serialize;

// ============================================================================
// Field keys
// ============================================================================

/// Stable camelCase identifiers for every field in an [`super::EngineeringRecord`].
pub mod keys {
    // Project Info
    pub const PROJECT_NO: &str = "projectNo";
    pub const DOCUMENT_NO: &str = "documentNo";
    pub const REVISION: &str = "revision";
    pub const TAG_NO: &str = "tagNo";
    pub const SERVICE: &str = "service";
    pub const CLIENT: &str = "client";
    pub const LOCATION: &str = "location";
    pub const PREPARED_BY: &str = "preparedBy";
    pub const CHECKED_BY: &str = "checkedBy";
    pub const APPROVED_BY: &str = "approvedBy";
    pub const FLOW_RATE: &str = "flowRate";
    pub const OPERATING_TEMPERATURE: &str = "operatingTemperature";
    pub const DENSITY: &str = "density";
    pub const VISCOSITY: &str = "viscosity";

    // Discharge Pressure
    pub const DESTINATION_PRESSURE: &str = "destinationPressure";
    pub const DESTINATION_ELEVATION: &str = "destinationElevation";
    pub const LINE_FRICTION_LOSS: &str = "lineFrictionLoss";
    pub const FLOW_METER_DEL_P: &str = "flowMeterDelP";
    pub const OTHER_LOSSES: &str = "otherLosses";
    pub const CONTROL_VALVE: &str = "controlValve";
    pub const MISC_ITEM: &str = "miscItem";
    pub const CONTINGENCY: &str = "contingency";
    pub const TOTAL_DISCHARGE_PRESSURE: &str = "totalDischargePressure";

    // Control Valve Δp
    pub const TOTAL_FRICTIONAL_LOSSES: &str = "totalFrictionalLosses";
    pub const DYNAMIC_LOSSES_30_PERCENT: &str = "dynamicLosses30Percent";
    pub const CV_MAX: &str = "cvMax";
    pub const CV_MIN: &str = "cvMin";
    pub const CV_RATIO: &str = "cvRatio";
    pub const CV_RANGEABILITY: &str = "cvRangeability";

    // Suction Pressure
    pub const SOURCE_OP_PRESSURE: &str = "sourceOpPressure";
    pub const SUCTION_EL_M: &str = "suctionELm";
    pub const INLINE_INST_LOSSES: &str = "inlineInstLosses";
    pub const LINE_FRIC_LOSSES: &str = "lineFricLosses";
    pub const CONTROL_VALVE_SUCTION: &str = "controlValveSuction";
    pub const MISC_ITEMS_SUCTION: &str = "miscItemsSuction";
    pub const TOTAL_SUCTION_LOSSES: &str = "totalSuctionLosses";
    pub const TOTAL_SUCTION_PRESSURE: &str = "totalSuctionPressure";

    // Power Consumption
    pub const HYDRAULIC_POWER: &str = "hydraulicPower";
    pub const PUMP_EFFICIENCY: &str = "pumpEfficiency";
    pub const BREAK_HORSE_POWER: &str = "breakHorsePower";
    pub const MOTOR_CLASSIFICATION: &str = "motorClassification";
    pub const MOTOR_EFFICIENCY: &str = "motorEfficiency";
    pub const POWER_CONSUMPTION: &str = "powerConsumption";

    // NPSH Availability
    pub const SUCTION_PRESSURE_NPSH: &str = "suctionPressureNpsh";
    pub const VAPOR_PRESSURE: &str = "vaporPressure";
    pub const NPSHA: &str = "npsha";
    pub const SAFETY_MARGIN_NPSHA: &str = "safetyMarginNpsha";
    pub const NPSHA_WITH_SAFETY_MARGIN: &str = "npshaWithSafetyMargin";

    // Calculation Results
    pub const DISCHARGE_PRESSURE: &str = "dischargePressure";
    pub const SUCTION_PRESSURE_RESULT: &str = "suctionPressureResult";
    pub const DIFFERENTIAL_PRESSURE: &str = "differentialPressure";
    pub const DIFFERENTIAL_HEAD: &str = "differentialHead";
    pub const NPSHA_RESULT: &str = "npshaResult";

    // Max Suction Pressure
    pub const SUCTION_VESSEL_MAX_OP_PRESSURE: &str = "suctionVesselMaxOpPressure";
    pub const TL_TO_HHLL_M: &str = "tlToHhllM";
    pub const SUCTION_EL_M_MAX: &str = "suctionElM";
    pub const MAX_SUCTION_PRESSURE: &str = "maxSuctionPressure";

    // MCF Calculation
    pub const PUMP_DISCHARGE_PRESSURE_MIN_FLOW: &str = "pumpDischargePressureMinFlow";
    pub const FLUID_DENSITY_MCF: &str = "fluidDensityMcf";
    pub const EL_DESTINATION_PUMP_CL: &str = "elDestinationPumpCl";
    pub const MCF_LINE_FRICTION_LOSSES: &str = "mcfLineFrictionLosses";
    pub const FLOW_METER_LOSSES: &str = "flowMeterLosses";
    pub const MISC_PRESSURE_DROP_MCF: &str = "miscPressureDropMcf";
    pub const MCF_ELEVATION_HEAD: &str = "mcfElevationHead";
    pub const MCF_CONTROL_VALVE_DP: &str = "mcfControlValveDp";

    // Max Discharge Pressure
    pub const API_TOLERANCE_FACTOR: &str = "apiToleranceFactor";
    pub const SHUT_OFF_PRESSURE_FACTOR: &str = "shutOffPressureFactor";
    pub const SHUT_OFF_DIFFERENTIAL_PRESSURE: &str = "shutOffDifferentialPressure";

    // Max Discharge Pressure Options
    pub const MAX_DISCHARGE_PRESSURE_OPTION_1: &str = "maxDischargePressureOption1";
    pub const MAX_DISCHARGE_PRESSURE_OPTION_2: &str = "maxDischargePressureOption2";
}

// ============================================================================
// Metadata types
// ============================================================================

/// Form section a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    ProjectInfo,
    DischargePressure,
    ControlValveDeltaP,
    SuctionPressure,
    PowerConsumption,
    NpshAvailability,
    CalculationResults,
    MaxSuctionPressure,
    McfCalculation,
    MaxDischargePressure,
    MaxDischargePressureOptions,
}

impl Section {
    /// All sections in form order.
    pub const ALL: [Section; 11] = [
        Section::ProjectInfo,
        Section::DischargePressure,
        Section::ControlValveDeltaP,
        Section::SuctionPressure,
        Section::PowerConsumption,
        Section::NpshAvailability,
        Section::CalculationResults,
        Section::MaxSuctionPressure,
        Section::McfCalculation,
        Section::MaxDischargePressure,
        Section::MaxDischargePressureOptions,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::ProjectInfo => "Project Info",
            Section::DischargePressure => "Discharge Pressure",
            Section::ControlValveDeltaP => "Control Valve Δp",
            Section::SuctionPressure => "Suction Pressure",
            Section::PowerConsumption => "Power Consumption",
            Section::NpshAvailability => "NPSH Availability",
            Section::CalculationResults => "Calculation Results",
            Section::MaxSuctionPressure => "Max Suction Pressure",
            Section::McfCalculation => "MCF Calculation",
            Section::MaxDischargePressure => "Max Discharge Pressure",
            Section::MaxDischargePressureOptions => "Max Discharge Pressure Options",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Whether a field holds a number or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Numeric,
    Text,
}

/// Static metadata for one field.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    /// camelCase record key
    pub key: &'static str,
    /// snake_case persistence key
    pub api_key: &'static str,
    pub label: &'static str,
    /// Display unit; empty for dimensionless or text fields
    pub unit: &'static str,
    pub section: Section,
    pub kind: FieldKind,
    pub required: bool,
    /// Derived by the recalculation engine, never edited by the user
    pub calculated: bool,
    /// Fractional digits written for calculated numerics
    pub precision: Option<usize>,
}

// Constructors keep the table below readable.

const fn text(
    key: &'static str,
    api_key: &'static str,
    label: &'static str,
    section: Section,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        key,
        api_key,
        label,
        unit: "",
        section,
        kind: FieldKind::Text,
        required,
        calculated: false,
        precision: None,
    }
}

const fn input(
    key: &'static str,
    api_key: &'static str,
    label: &'static str,
    unit: &'static str,
    section: Section,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        key,
        api_key,
        label,
        unit,
        section,
        kind: FieldKind::Numeric,
        required,
        calculated: false,
        precision: None,
    }
}

const fn derived(
    key: &'static str,
    api_key: &'static str,
    label: &'static str,
    unit: &'static str,
    section: Section,
    precision: usize,
) -> FieldSpec {
    FieldSpec {
        key,
        api_key,
        label,
        unit,
        section,
        kind: FieldKind::Numeric,
        required: false,
        calculated: true,
        precision: Some(precision),
    }
}

use keys::*;
use Section::*;

/// Every field, grouped by section in form order.
pub static FIELDS: &[FieldSpec] = &[
    // Project Info
    text(PROJECT_NO, "project_no", "Project No.", ProjectInfo, true),
    text(DOCUMENT_NO, "document_no", "Document No.", ProjectInfo, true),
    text(REVISION, "revision", "Revision", ProjectInfo, true),
    text(TAG_NO, "tag_no", "Tag No.", ProjectInfo, true),
    text(SERVICE, "service", "Service", ProjectInfo, true),
    text(CLIENT, "client", "Client", ProjectInfo, false),
    text(LOCATION, "location", "Location", ProjectInfo, false),
    text(PREPARED_BY, "prepared_by", "Prepared By", ProjectInfo, false),
    text(CHECKED_BY, "checked_by", "Checked By", ProjectInfo, false),
    text(APPROVED_BY, "approved_by", "Approved By", ProjectInfo, false),
    input(FLOW_RATE, "flow_rate", "Flow Rate", "m³/h", ProjectInfo, true),
    input(
        OPERATING_TEMPERATURE,
        "operating_temperature",
        "Operating Temperature",
        "°C",
        ProjectInfo,
        false,
    ),
    input(DENSITY, "density", "Density", "kg/m³", ProjectInfo, false),
    input(VISCOSITY, "viscosity", "Viscosity", "cP", ProjectInfo, false),
    // Discharge Pressure
    input(
        DESTINATION_PRESSURE,
        "destination_pressure",
        "Destination Pressure",
        "bar g",
        DischargePressure,
        true,
    ),
    input(
        DESTINATION_ELEVATION,
        "destination_elevation",
        "Destination Elevation",
        "bar",
        DischargePressure,
        true,
    ),
    input(
        LINE_FRICTION_LOSS,
        "line_friction_loss",
        "Line Friction Loss",
        "bar",
        DischargePressure,
        true,
    ),
    input(FLOW_METER_DEL_P, "flow_meter_del_p", "Flow Meter ΔP", "bar", DischargePressure, false),
    input(OTHER_LOSSES, "other_losses", "Other Losses", "bar", DischargePressure, false),
    input(CONTROL_VALVE, "control_valve", "Control Valve", "bar", DischargePressure, false),
    input(MISC_ITEM, "misc_item", "Misc. Item", "bar", DischargePressure, false),
    input(CONTINGENCY, "contingency", "Contingency", "bar", DischargePressure, false),
    derived(
        TOTAL_DISCHARGE_PRESSURE,
        "total_discharge_pressure",
        "Total Discharge Pressure",
        "bar g",
        DischargePressure,
        2,
    ),
    // Control Valve Δp
    input(
        TOTAL_FRICTIONAL_LOSSES,
        "total_frictional_losses",
        "Total Frictional Losses",
        "bar",
        ControlValveDeltaP,
        false,
    ),
    derived(
        DYNAMIC_LOSSES_30_PERCENT,
        "dynamic_losses_30_percent",
        "30% of Dynamic Losses",
        "bar",
        ControlValveDeltaP,
        2,
    ),
    input(CV_MAX, "cv_max", "Cv Max", "", ControlValveDeltaP, false),
    input(CV_MIN, "cv_min", "Cv Min", "", ControlValveDeltaP, false),
    derived(CV_RATIO, "cv_ratio", "Cv Max / Cv Min", "", ControlValveDeltaP, 2),
    input(CV_RANGEABILITY, "cv_rangeability", "Valve Rangeability", "", ControlValveDeltaP, false),
    // Suction Pressure
    input(
        SOURCE_OP_PRESSURE,
        "source_op_pressure",
        "Source Operating Pressure",
        "bar g",
        SuctionPressure,
        true,
    ),
    input(SUCTION_EL_M, "suction_el_m", "Suction Elevation", "m", SuctionPressure, true),
    input(
        INLINE_INST_LOSSES,
        "inline_inst_losses",
        "Inline Instrument Losses",
        "bar",
        SuctionPressure,
        false,
    ),
    input(
        LINE_FRIC_LOSSES,
        "line_fric_losses",
        "Line Friction Losses",
        "bar",
        SuctionPressure,
        false,
    ),
    input(
        CONTROL_VALVE_SUCTION,
        "control_valve_suction",
        "Control Valve",
        "bar",
        SuctionPressure,
        false,
    ),
    input(MISC_ITEMS_SUCTION, "misc_items_suction", "Misc. Items", "bar", SuctionPressure, false),
    derived(
        TOTAL_SUCTION_LOSSES,
        "total_suction_losses",
        "Total Suction Losses",
        "bar",
        SuctionPressure,
        2,
    ),
    derived(
        TOTAL_SUCTION_PRESSURE,
        "total_suction_pressure",
        "Total Suction Pressure",
        "bar g",
        SuctionPressure,
        2,
    ),
    // Power Consumption
    input(HYDRAULIC_POWER, "hydraulic_power", "Hydraulic Power", "kW", PowerConsumption, false),
    input(PUMP_EFFICIENCY, "pump_efficiency", "Pump Efficiency", "%", PowerConsumption, false),
    derived(BREAK_HORSE_POWER, "break_horse_power", "Brake Horse Power", "kW", PowerConsumption, 2),
    text(
        MOTOR_CLASSIFICATION,
        "motor_classification",
        "Motor Classification",
        PowerConsumption,
        false,
    ),
    input(MOTOR_EFFICIENCY, "motor_efficiency", "Motor Efficiency", "%", PowerConsumption, false),
    derived(POWER_CONSUMPTION, "power_consumption", "Power Consumption", "kW", PowerConsumption, 2),
    // NPSH Availability
    input(
        SUCTION_PRESSURE_NPSH,
        "suction_pressure_npsh",
        "Suction Pressure",
        "bar a",
        NpshAvailability,
        false,
    ),
    input(VAPOR_PRESSURE, "vapor_pressure", "Vapor Pressure", "bar a", NpshAvailability, false),
    derived(NPSHA, "npsha", "NPSHA", "m", NpshAvailability, 2),
    input(
        SAFETY_MARGIN_NPSHA,
        "safety_margin_npsha",
        "Safety Margin",
        "m",
        NpshAvailability,
        false,
    ),
    derived(
        NPSHA_WITH_SAFETY_MARGIN,
        "npsha_with_safety_margin",
        "NPSHA with Safety Margin",
        "m",
        NpshAvailability,
        2,
    ),
    // Calculation Results
    derived(
        DISCHARGE_PRESSURE,
        "discharge_pressure",
        "Discharge Pressure",
        "bar g",
        CalculationResults,
        3,
    ),
    derived(
        SUCTION_PRESSURE_RESULT,
        "suction_pressure_result",
        "Suction Pressure",
        "bar g",
        CalculationResults,
        3,
    ),
    derived(
        DIFFERENTIAL_PRESSURE,
        "differential_pressure",
        "Differential Pressure",
        "bar",
        CalculationResults,
        3,
    ),
    derived(
        DIFFERENTIAL_HEAD,
        "differential_head",
        "Differential Head",
        "m",
        CalculationResults,
        3,
    ),
    derived(NPSHA_RESULT, "npsha_result", "NPSHA", "m", CalculationResults, 3),
    // Max Suction Pressure
    input(
        SUCTION_VESSEL_MAX_OP_PRESSURE,
        "suction_vessel_max_op_pressure",
        "Suction Vessel Max Operating Pressure",
        "bar g",
        MaxSuctionPressure,
        false,
    ),
    input(TL_TO_HHLL_M, "tl_to_hhll_m", "TL to HHLL", "m", MaxSuctionPressure, false),
    input(
        SUCTION_EL_M_MAX,
        "suction_el_m_max",
        "Suction Elevation",
        "m",
        MaxSuctionPressure,
        false,
    ),
    derived(
        MAX_SUCTION_PRESSURE,
        "max_suction_pressure",
        "Max Suction Pressure",
        "bar g",
        MaxSuctionPressure,
        3,
    ),
    // MCF Calculation
    input(
        PUMP_DISCHARGE_PRESSURE_MIN_FLOW,
        "pump_discharge_pressure_min_flow",
        "Pump Discharge Pressure at Min Flow",
        "bar g",
        McfCalculation,
        false,
    ),
    input(FLUID_DENSITY_MCF, "fluid_density_mcf", "Fluid Density", "kg/m³", McfCalculation, false),
    input(
        EL_DESTINATION_PUMP_CL,
        "el_destination_pump_cl",
        "Elevation Destination - Pump CL",
        "m",
        McfCalculation,
        false,
    ),
    input(
        MCF_LINE_FRICTION_LOSSES,
        "mcf_line_friction_losses",
        "Line Friction Losses",
        "bar",
        McfCalculation,
        false,
    ),
    input(
        FLOW_METER_LOSSES,
        "flow_meter_losses",
        "Flow Meter Losses",
        "bar",
        McfCalculation,
        false,
    ),
    input(
        MISC_PRESSURE_DROP_MCF,
        "misc_pressure_drop_mcf",
        "Misc. Pressure Drop",
        "bar",
        McfCalculation,
        false,
    ),
    derived(MCF_ELEVATION_HEAD, "mcf_elevation_head", "Elevation Head", "bar", McfCalculation, 3),
    derived(
        MCF_CONTROL_VALVE_DP,
        "mcf_control_valve_dp",
        "MCF Control Valve Δp",
        "bar",
        McfCalculation,
        3,
    ),
    // Max Discharge Pressure
    input(
        API_TOLERANCE_FACTOR,
        "api_tolerance_factor",
        "API Tolerance Factor",
        "",
        MaxDischargePressure,
        false,
    ),
    input(
        SHUT_OFF_PRESSURE_FACTOR,
        "shut_off_pressure_factor",
        "Shut-off Pressure Factor",
        "",
        MaxDischargePressure,
        false,
    ),
    derived(
        SHUT_OFF_DIFFERENTIAL_PRESSURE,
        "shut_off_differential_pressure",
        "Shut-off Differential Pressure",
        "bar",
        MaxDischargePressure,
        3,
    ),
    // Max Discharge Pressure Options
    derived(
        MAX_DISCHARGE_PRESSURE_OPTION_1,
        "max_discharge_pressure_option_1",
        "Option 1: Max Suction + Differential",
        "bar g",
        MaxDischargePressureOptions,
        3,
    ),
    derived(
        MAX_DISCHARGE_PRESSURE_OPTION_2,
        "max_discharge_pressure_option_2",
        "Option 2: Max Suction + Shut-off Differential",
        "bar g",
        MaxDischargePressureOptions,
        3,
    ),
];

/// Look up a field by its camelCase key.
pub fn field(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Look up a field by its snake_case persistence key.
pub fn field_by_api_key(api_key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.api_key == api_key)
}

/// True when the field is derived by the recalculation engine.
pub fn is_calculated(key: &str) -> bool {
    field(key).is_some_and(|f| f.calculated)
}

/// Fields belonging to one section, in form order.
pub fn section_fields(section: Section) -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(move |f| f.section == section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<_> = FIELDS.iter().map(|f| f.key).collect();
        assert_eq!(keys.len(), FIELDS.len());
        let api_keys: HashSet<_> = FIELDS.iter().map(|f| f.api_key).collect();
        assert_eq!(api_keys.len(), FIELDS.len());
    }

    #[test]
    fn test_calculated_fields_have_precision() {
        for f in FIELDS.iter().filter(|f| f.calculated) {
            assert!(f.precision.is_some(), "{} has no precision", f.key);
            assert_eq!(f.kind, FieldKind::Numeric);
            assert!(!f.required, "{} is calculated and required", f.key);
        }
    }

    #[test]
    fn test_result_sections_use_three_decimals() {
        for f in section_fields(Section::CalculationResults) {
            assert_eq!(f.precision, Some(3));
        }
        assert_eq!(field(keys::CV_RATIO).and_then(|f| f.precision), Some(2));
    }

    #[test]
    fn test_every_section_has_fields() {
        for section in Section::ALL {
            assert!(section_fields(section).next().is_some(), "{section} is empty");
        }
    }

    #[test]
    fn test_lookup_by_api_key() {
        let f = field_by_api_key("total_discharge_pressure").expect("known key");
        assert_eq!(f.key, keys::TOTAL_DISCHARGE_PRESSURE);
        assert!(is_calculated(keys::TOTAL_DISCHARGE_PRESSURE));
        assert!(!is_calculated(keys::CV_MAX));
        assert!(!is_calculated("notAField"));
    }
}
