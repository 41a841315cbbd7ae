use permacolumn_core::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Parameters for the biogeochemistry process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiogeochemistryParameters {
    /// Base decomposition rate at the reference temperature
    /// unit: 1/s
    pub rate_constant: f64,
    /// Respiration increase per 10 degC of warming
    /// unit: 1
    pub q10: f64,
    /// Reference temperature for the base rate
    /// unit: degC
    pub reference_temperature: f64,
    /// Initial soil organic carbon density, uniform over the column
    /// unit: kg/m^3
    pub initial_carbon_density: f64,
}

impl BiogeochemistryParameters {
    pub fn validate(&self) -> ModelResult<()> {
        if self.rate_constant < 0.0 {
            return Err(ModelError::InvalidConfiguration(format!(
                "decomposition rate constant must be non-negative, got {}",
                self.rate_constant
            )));
        }
        if self.q10 <= 0.0 {
            return Err(ModelError::InvalidConfiguration(format!(
                "Q10 must be positive, got {}",
                self.q10
            )));
        }
        if self.initial_carbon_density < 0.0 {
            return Err(ModelError::InvalidConfiguration(format!(
                "initial carbon density must be non-negative, got {}",
                self.initial_carbon_density
            )));
        }
        Ok(())
    }
}

impl Default for BiogeochemistryParameters {
    fn default() -> Self {
        Self {
            // ~1% / yr at the reference temperature
            rate_constant: 3.2e-10,
            q10: 2.0,
            reference_temperature: 10.0,
            initial_carbon_density: 40.0,
        }
    }
}
