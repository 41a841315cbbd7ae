//! Stratigraphy process.
//!
//! Maps the configured soil horizons onto the column grid, writing the
//! composition profiles every other process reads.
//!
//! # Outputs
//!
//! - `porosity` (1) — pore share of each cell
//! - `organic_fraction` (1) — organic share of each cell's solid phase

use crate::parameters::StratigraphyParameters;
use crate::variables::{ORGANIC_FRACTION, POROSITY};
use permacolumn_core::errors::ModelResult;
use permacolumn_core::grid::ColumnGrid;
use permacolumn_core::process::Process;
use permacolumn_core::state::StateContainer;
use permacolumn_core::variable::{Dimensionality, VariableDefinition};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stratigraphy {
    parameters: StratigraphyParameters,
}

impl Stratigraphy {
    /// Create the process, validating the layer table eagerly.
    pub fn from_parameters(parameters: StratigraphyParameters) -> ModelResult<Self> {
        parameters.validate()?;
        Ok(Self { parameters })
    }

    pub fn parameters(&self) -> &StratigraphyParameters {
        &self.parameters
    }
}

#[typetag::serde]
impl Process for Stratigraphy {
    fn name(&self) -> &str {
        "stratigraphy"
    }

    fn variables(&self) -> Vec<VariableDefinition> {
        vec![
            VariableDefinition::auxiliary(POROSITY, "1", Dimensionality::Column)
                .with_description("Pore share of the total volume"),
            VariableDefinition::auxiliary(ORGANIC_FRACTION, "1", Dimensionality::Column)
                .with_description("Organic share of the solid phase"),
        ]
    }

    fn compute_auxiliary(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        let n_cells = grid.n_cells();
        let mut porosity = Array1::zeros(n_cells);
        let mut organic = Array1::zeros(n_cells);
        for cell in 0..n_cells {
            let layer = self.parameters.layer_at(grid.midpoint(cell));
            porosity[cell] = layer.porosity;
            organic[cell] = layer.organic_fraction;
        }
        state.get_mut(POROSITY)?.assign(&porosity);
        state.get_mut(ORGANIC_FRACTION)?.assign(&organic);
        Ok(())
    }

    fn compute_tendencies(&self, _grid: &ColumnGrid, _state: &mut StateContainer) -> ModelResult<()> {
        Ok(())
    }
}
