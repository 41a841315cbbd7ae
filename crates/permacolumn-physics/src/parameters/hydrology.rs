use crate::soil::check_fraction;
use permacolumn_core::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Parameters for the hydrology process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydrologyParameters {
    /// Water-plus-ice filled share of the pore space, uniform over the
    /// column
    /// unit: 1
    pub saturation_water_ice: f64,
    /// Linear drainage coefficient of the surface store
    /// unit: 1/s
    pub drainage_coefficient: f64,
    /// Initial ponded water on the surface
    /// unit: m
    pub initial_storage: f64,
}

impl HydrologyParameters {
    pub fn validate(&self) -> ModelResult<()> {
        check_fraction("saturation_water_ice", self.saturation_water_ice)?;
        if self.drainage_coefficient < 0.0 {
            return Err(ModelError::InvalidConfiguration(format!(
                "drainage coefficient must be non-negative, got {}",
                self.drainage_coefficient
            )));
        }
        if self.initial_storage < 0.0 {
            return Err(ModelError::InvalidConfiguration(format!(
                "initial surface storage must be non-negative, got {}",
                self.initial_storage
            )));
        }
        Ok(())
    }
}

impl Default for HydrologyParameters {
    fn default() -> Self {
        Self {
            saturation_water_ice: 0.9,
            drainage_coefficient: 1.0e-6,
            initial_storage: 0.0,
        }
    }
}
