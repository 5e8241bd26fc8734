//! Bar ↔ metre conversion factors for the pumped liquid
//!
//! The classic datasheet constants assume water. Scaling them by the
//! liquid's specific gravity keeps water results bit-identical while
//! giving correct heads for lighter or heavier liquids.

use crate::record::{keys, EngineeringRecord};
use serde::Serialize;

/// Hydrostatic pressure of one metre of water column (bar/m).
pub const BAR_PER_METRE_WATER: f64 = 0.0981;

/// Metres of water column per bar, used for differential head.
pub const METRES_PER_BAR_WATER: f64 = 10.197;

/// Metres of water column per bar, used for NPSH.
pub const NPSH_METRES_PER_BAR_WATER: f64 = 10.2;

/// Density of the reference liquid (kg/m³).
pub const REFERENCE_DENSITY_KG_M3: f64 = 1000.0;

/// Conversion factors for one liquid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FluidConversions {
    pub specific_gravity: f64,
    pub bar_per_metre: f64,
    pub metres_per_bar: f64,
    pub npsh_metres_per_bar: f64,
}

impl FluidConversions {
    pub fn water() -> Self {
        Self {
            specific_gravity: 1.0,
            bar_per_metre: BAR_PER_METRE_WATER,
            metres_per_bar: METRES_PER_BAR_WATER,
            npsh_metres_per_bar: NPSH_METRES_PER_BAR_WATER,
        }
    }

    /// Factors for a liquid of the given density (kg/m³).
    ///
    /// Falls back to water when the density is missing, non-finite or not positive.
    pub fn for_density(density_kg_m3: Option<f64>) -> Self {
        match density_kg_m3 {
            Some(rho) if rho.is_finite() && rho > 0.0 => {
                let sg = rho / REFERENCE_DENSITY_KG_M3;
                Self {
                    specific_gravity: sg,
                    bar_per_metre: BAR_PER_METRE_WATER * sg,
                    metres_per_bar: METRES_PER_BAR_WATER / sg,
                    npsh_metres_per_bar: NPSH_METRES_PER_BAR_WATER / sg,
                }
            }
            _ => Self::water(),
        }
    }

    /// Factors for the liquid described by the record's `density` field.
    pub fn from_record(record: &EngineeringRecord) -> Self {
        Self::for_density(record.parse(keys::DENSITY).ok())
    }
}

impl Default for FluidConversions {
    fn default() -> Self {
        Self::water()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_density_matches_constants() {
        let conv = FluidConversions::for_density(Some(1000.0));
        assert_eq!(conv, FluidConversions::water());
    }

    #[test]
    fn test_missing_or_invalid_density_is_water() {
        assert_eq!(FluidConversions::for_density(None), FluidConversions::water());
        assert_eq!(FluidConversions::for_density(Some(0.0)), FluidConversions::water());
        assert_eq!(FluidConversions::for_density(Some(-5.0)), FluidConversions::water());

        let record = EngineeringRecord::new().with(keys::DENSITY, "n/a");
        assert_eq!(FluidConversions::from_record(&record), FluidConversions::water());
    }

    #[test]
    fn test_light_liquid_scales_factors() {
        let conv = FluidConversions::for_density(Some(850.0));
        assert!((conv.specific_gravity - 0.85).abs() < 1e-12);
        assert!((conv.bar_per_metre - 0.083385).abs() < 1e-12);
        assert!((conv.metres_per_bar - 10.197 / 0.85).abs() < 1e-12);
        assert!((conv.npsh_metres_per_bar - 12.0).abs() < 1e-9);
    }
}
