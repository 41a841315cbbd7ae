//! Biogeochemistry process.
//!
//! First-order decomposition of soil organic carbon with a Q10 temperature
//! response, throttled by the liquid-water fraction so frozen cells barely
//! respire. Temperature and liquid fraction come from the energy balance,
//! which runs earlier in the process order.
//!
//! $$ R = k \cdot Q_{10}^{(T - T_{ref}) / 10} \cdot \ell \cdot C_{soc} $$
//!
//! # States
//!
//! - `soil_organic_carbon` (kg/m^3)
//!
//! # Outputs
//!
//! - `respiration_rate` (kg/m^3/s)

use crate::parameters::BiogeochemistryParameters;
use crate::variables::{LIQUID_WATER_FRACTION, RESPIRATION_RATE, SOIL_ORGANIC_CARBON, TEMPERATURE};
use ndarray::Array1;
use permacolumn_core::errors::ModelResult;
use permacolumn_core::grid::ColumnGrid;
use permacolumn_core::process::Process;
use permacolumn_core::state::StateContainer;
use permacolumn_core::variable::{Dimensionality, VariableDefinition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Biogeochemistry {
    parameters: BiogeochemistryParameters,
}

impl Biogeochemistry {
    /// Create the process, validating the parameters eagerly.
    pub fn from_parameters(parameters: BiogeochemistryParameters) -> ModelResult<Self> {
        parameters.validate()?;
        Ok(Self { parameters })
    }

    fn rate_modifier(&self, temperature: f64, liquid: f64) -> f64 {
        let q10 = self
            .parameters
            .q10
            .powf((temperature - self.parameters.reference_temperature) / 10.0);
        q10 * liquid
    }
}

#[typetag::serde]
impl Process for Biogeochemistry {
    fn name(&self) -> &str {
        "biogeochemistry"
    }

    fn variables(&self) -> Vec<VariableDefinition> {
        vec![
            VariableDefinition::prognostic(SOIL_ORGANIC_CARBON, "kg/m^3", Dimensionality::Column)
                .with_description("Soil organic carbon density"),
            VariableDefinition::auxiliary(RESPIRATION_RATE, "kg/m^3/s", Dimensionality::Column)
                .with_description("Heterotrophic respiration rate"),
        ]
    }

    /// Write the initial carbon profile; the respiration auxiliary becomes
    /// meaningful once the energy balance has produced temperatures.
    fn initialize(&self, _grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        state
            .get_mut(SOIL_ORGANIC_CARBON)?
            .fill(self.parameters.initial_carbon_density);
        Ok(())
    }

    fn compute_auxiliary(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        let n_cells = grid.n_cells();
        let mut respiration = Array1::zeros(n_cells);
        {
            let temperature = state.get(TEMPERATURE)?;
            let liquid = state.get(LIQUID_WATER_FRACTION)?;
            let carbon = state.get(SOIL_ORGANIC_CARBON)?;
            for cell in 0..n_cells {
                respiration[cell] = self.parameters.rate_constant
                    * self.rate_modifier(temperature[cell], liquid[cell])
                    * carbon[cell].max(0.0);
            }
        }
        state.get_mut(RESPIRATION_RATE)?.assign(&respiration);
        Ok(())
    }

    fn compute_tendencies(&self, _grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        let loss = state.get(RESPIRATION_RATE)?.mapv(|r| -r);
        state.accumulate_tendency(SOIL_ORGANIC_CARBON, &loss)
    }
}
