//! Hydrology process.
//!
//! Writes the pore-saturation profile the energy balance and the freeze
//! curve read, and tracks a simple surface water store: ponded water fed by
//! infiltration and lost through linear drainage.
//!
//! # Inputs
//!
//! - `infiltration_rate` (m/s) — water supply rate at the surface
//!
//! # States
//!
//! - `surface_water_storage` (m) — ponded water on the surface
//!
//! # Outputs
//!
//! - `saturation_water_ice` (1) — water-plus-ice filled pore share
//! - `drainage_rate` (m/s) — linear loss from the surface store

use crate::parameters::HydrologyParameters;
use crate::variables::{
    DRAINAGE_RATE, INFILTRATION_RATE, SATURATION_WATER_ICE, SURFACE_WATER_STORAGE,
};
use ndarray::Array1;
use permacolumn_core::errors::ModelResult;
use permacolumn_core::grid::ColumnGrid;
use permacolumn_core::process::Process;
use permacolumn_core::state::StateContainer;
use permacolumn_core::variable::{Dimensionality, VariableDefinition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hydrology {
    parameters: HydrologyParameters,
}

impl Hydrology {
    /// Create the process, validating the parameters eagerly.
    pub fn from_parameters(parameters: HydrologyParameters) -> ModelResult<Self> {
        parameters.validate()?;
        Ok(Self { parameters })
    }
}

#[typetag::serde]
impl Process for Hydrology {
    fn name(&self) -> &str {
        "hydrology"
    }

    fn variables(&self) -> Vec<VariableDefinition> {
        vec![
            VariableDefinition::auxiliary(SATURATION_WATER_ICE, "1", Dimensionality::Column)
                .with_description("Water-plus-ice filled share of the pore space"),
            VariableDefinition::prognostic(SURFACE_WATER_STORAGE, "m", Dimensionality::Surface)
                .with_description("Ponded water on the surface"),
            VariableDefinition::input(INFILTRATION_RATE, "m/s", Dimensionality::Surface)
                .with_description("Water supply rate at the surface"),
            VariableDefinition::auxiliary(DRAINAGE_RATE, "m/s", Dimensionality::Surface)
                .with_description("Linear drainage loss from the surface store"),
        ]
    }

    fn initialize(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        state.set_scalar(SURFACE_WATER_STORAGE, self.parameters.initial_storage)?;
        self.compute_auxiliary(grid, state)
    }

    fn compute_auxiliary(&self, _grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        state
            .get_mut(SATURATION_WATER_ICE)?
            .fill(self.parameters.saturation_water_ice);
        let storage = state.get_scalar(SURFACE_WATER_STORAGE)?;
        state.set_scalar(
            DRAINAGE_RATE,
            self.parameters.drainage_coefficient * storage.max(0.0),
        )?;
        Ok(())
    }

    fn compute_tendencies(&self, _grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        let infiltration = state.get_scalar(INFILTRATION_RATE)?;
        let drainage = state.get_scalar(DRAINAGE_RATE)?;
        state.accumulate_tendency(
            SURFACE_WATER_STORAGE,
            &Array1::from_elem(1, infiltration - drainage),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use permacolumn_core::integrator::{ForwardEuler, Integrator};
    use permacolumn_core::model::ModelBuilder;
    use permacolumn_core::simulation::{ConstantInputs, InputSource};
    use std::sync::Arc;

    fn process() -> Hydrology {
        Hydrology::from_parameters(HydrologyParameters {
            saturation_water_ice: 0.8,
            drainage_coefficient: 0.0,
            initial_storage: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn saturation_profile_is_written_everywhere() {
        let process = process();
        let grid = ColumnGrid::uniform(4, 0.5).unwrap();
        let mut state = StateContainer::allocate(&process.variables(), &grid).unwrap();
        process.initialize(&grid, &mut state).unwrap();
        assert!(state[SATURATION_WATER_ICE].iter().all(|&s| s == 0.8));
    }

    #[test]
    fn storage_grows_linearly_without_drainage() {
        let model = ModelBuilder::new()
            .with_grid(ColumnGrid::uniform(2, 0.5).unwrap())
            .with_process(Arc::new(process()))
            .build()
            .unwrap();
        let mut state = model.initialize().unwrap();
        let inputs = ConstantInputs::new().with(INFILTRATION_RATE, 2.0e-6);
        let mut euler = ForwardEuler;
        for _ in 0..10 {
            inputs.update_inputs(&mut state).unwrap();
            euler.step(&model, &mut state, 100.0).unwrap();
        }
        assert_relative_eq!(
            state.get_scalar(SURFACE_WATER_STORAGE).unwrap(),
            2.0e-3,
            max_relative = 1e-12
        );
    }

    #[test]
    fn drainage_balances_infiltration_at_steady_state() {
        let process = Hydrology::from_parameters(HydrologyParameters {
            saturation_water_ice: 0.8,
            drainage_coefficient: 1.0e-4,
            initial_storage: 0.02,
        })
        .unwrap();
        let grid = ColumnGrid::uniform(2, 0.5).unwrap();
        let mut state = StateContainer::allocate(&process.variables(), &grid).unwrap();
        process.initialize(&grid, &mut state).unwrap();
        // At storage = infiltration / k the tendency vanishes.
        state.set_scalar(INFILTRATION_RATE, 0.02 * 1.0e-4).unwrap();
        process.compute_auxiliary(&grid, &mut state).unwrap();
        process.compute_tendencies(&grid, &mut state).unwrap();
        assert_relative_eq!(
            state.tendency(SURFACE_WATER_STORAGE).unwrap()[0],
            0.0,
            epsilon = 1e-18
        );
    }

    #[test]
    fn invalid_parameters_fail_at_construction() {
        assert!(Hydrology::from_parameters(HydrologyParameters {
            saturation_water_ice: 1.2,
            ..HydrologyParameters::default()
        })
        .is_err());
        assert!(Hydrology::from_parameters(HydrologyParameters {
            drainage_coefficient: -1.0,
            ..HydrologyParameters::default()
        })
        .is_err());
    }
}
