//! Energy-balance process.
//!
//! Vertical heat conduction through the column with freeze/thaw handled by
//! the free-water freeze curve. Internal energy is the prognostic quantity;
//! temperature and liquid-water fraction are recovered from it by the
//! closure after every step, so the conduction stencil here only ever reads
//! them.
//!
//! The conductive flux across the interface below cell `i` is
//!
//! $$ F_{i+1/2} = -k_{i+1/2} \frac{T_{i+1} - T_i}{z_{i+1} - z_i} $$
//!
//! with the interface conductivity the thickness-weighted harmonic mean of
//! the neighbouring cells, and the tendency of each cell the flux divergence
//! over its thickness. Fluxes are positive downward.
//!
//! # Inputs
//!
//! - `surface_heat_flux` (W/m^2) or `surface_temperature` (degC), per the
//!   configured upper boundary
//! - `geothermal_heat_flux` (W/m^2) — upward supply at the column base
//!
//! # States
//!
//! - `internal_energy` (J/m^3) — with the free-water freeze curve attached
//!
//! # Outputs
//!
//! - `thermal_conductivity` (W/m/K), `heat_capacity` (J/m^3/K) — bulk
//!   values from the constituent mixing rules

use crate::freeze::FreeWaterFreezeCurve;
use crate::parameters::{EnergyParameters, UpperBoundary};
use crate::soil::{SoilComposition, ThermalProperties};
use crate::variables::{
    GEOTHERMAL_HEAT_FLUX, HEAT_CAPACITY, INTERNAL_ENERGY, LIQUID_WATER_FRACTION, ORGANIC_FRACTION,
    POROSITY, SATURATION_WATER_ICE, SURFACE_HEAT_FLUX, SURFACE_TEMPERATURE, TEMPERATURE,
    THERMAL_CONDUCTIVITY,
};
use ndarray::Array1;
use permacolumn_core::errors::ModelResult;
use permacolumn_core::grid::ColumnGrid;
use permacolumn_core::process::Process;
use permacolumn_core::state::StateContainer;
use permacolumn_core::variable::{Dimensionality, VariableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyBalance {
    parameters: EnergyParameters,
    properties: ThermalProperties,
}

impl EnergyBalance {
    pub fn from_parameters(parameters: EnergyParameters) -> Self {
        Self {
            parameters,
            properties: ThermalProperties::for_texture(parameters.texture),
        }
    }

    pub fn parameters(&self) -> &EnergyParameters {
        &self.parameters
    }

    /// Conductive flux through the upper boundary, positive downward.
    fn surface_flux(&self, grid: &ColumnGrid, state: &StateContainer) -> ModelResult<f64> {
        match self.parameters.upper_boundary {
            UpperBoundary::PrescribedFlux => state.get_scalar(SURFACE_HEAT_FLUX),
            UpperBoundary::PrescribedTemperature => {
                let surface = state.get_scalar(SURFACE_TEMPERATURE)?;
                let top = state.get(TEMPERATURE)?[0];
                let conductivity = state.get(THERMAL_CONDUCTIVITY)?[0];
                Ok(conductivity * (surface - top) / (grid.cell_thickness(0) / 2.0))
            }
        }
    }
}

#[typetag::serde]
impl Process for EnergyBalance {
    fn name(&self) -> &str {
        "energy_balance"
    }

    fn variables(&self) -> Vec<VariableDefinition> {
        let mut variables = vec![
            VariableDefinition::prognostic(INTERNAL_ENERGY, "J/m^3", Dimensionality::Column)
                .with_description("Volumetric internal energy relative to free water at 0 degC")
                .with_closure(Arc::new(FreeWaterFreezeCurve::new(self.parameters.texture))),
            VariableDefinition::auxiliary(THERMAL_CONDUCTIVITY, "W/m/K", Dimensionality::Column)
                .with_description("Bulk thermal conductivity"),
            VariableDefinition::auxiliary(HEAT_CAPACITY, "J/m^3/K", Dimensionality::Column)
                .with_description("Bulk volumetric heat capacity"),
            VariableDefinition::input(GEOTHERMAL_HEAT_FLUX, "W/m^2", Dimensionality::Surface)
                .with_description("Upward geothermal heat flux into the column base"),
        ];
        variables.push(match self.parameters.upper_boundary {
            UpperBoundary::PrescribedFlux => {
                VariableDefinition::input(SURFACE_HEAT_FLUX, "W/m^2", Dimensionality::Surface)
                    .with_description("Downward heat flux through the surface")
            }
            UpperBoundary::PrescribedTemperature => {
                VariableDefinition::input(SURFACE_TEMPERATURE, "degC", Dimensionality::Surface)
                    .with_description("Prescribed surface temperature")
            }
        });
        variables
    }

    /// Write the initial temperature profile. The forward freeze curve then
    /// turns it into internal energy during model initialization.
    fn initialize(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        let surface = self.parameters.initial_surface_temperature;
        let gradient = self.parameters.initial_temperature_gradient;
        let profile = grid.midpoints().mapv(|depth| surface + gradient * depth);
        state.get_mut(TEMPERATURE)?.assign(&profile);
        Ok(())
    }

    fn compute_auxiliary(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        let n_cells = grid.n_cells();
        let mut conductivity = Array1::zeros(n_cells);
        let mut capacity = Array1::zeros(n_cells);
        {
            let porosity = state.get(POROSITY)?;
            let saturation = state.get(SATURATION_WATER_ICE)?;
            let organic = state.get(ORGANIC_FRACTION)?;
            let liquid = state.get(LIQUID_WATER_FRACTION)?;
            for cell in 0..n_cells {
                let composition = SoilComposition::new(
                    porosity[cell],
                    saturation[cell],
                    liquid[cell],
                    organic[cell],
                    self.parameters.texture,
                )?;
                let fractions = composition.volumetric_fractions();
                conductivity[cell] = self.properties.bulk_conductivity(&fractions);
                capacity[cell] = self.properties.bulk_heat_capacity(&fractions);
            }
        }
        state.get_mut(THERMAL_CONDUCTIVITY)?.assign(&conductivity);
        state.get_mut(HEAT_CAPACITY)?.assign(&capacity);
        Ok(())
    }

    fn compute_tendencies(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        let n_cells = grid.n_cells();
        let mut divergence = Array1::zeros(n_cells);
        {
            let temperature = state.get(TEMPERATURE)?;
            let conductivity = state.get(THERMAL_CONDUCTIVITY)?;

            for upper in 0..n_cells.saturating_sub(1) {
                let lower = upper + 1;
                let dz_upper = grid.cell_thickness(upper);
                let dz_lower = grid.cell_thickness(lower);
                // Thickness-weighted harmonic mean keeps the flux continuous
                // across material contrasts.
                let interface_conductivity = (dz_upper + dz_lower)
                    / (dz_upper / conductivity[upper] + dz_lower / conductivity[lower]);
                let flux = -interface_conductivity
                    * (temperature[lower] - temperature[upper])
                    / grid.interface_spacing(upper);
                divergence[upper] -= flux / dz_upper;
                divergence[lower] += flux / dz_lower;
            }

            let top_flux = self.surface_flux(grid, state)?;
            divergence[0] += top_flux / grid.cell_thickness(0);

            let geothermal = state.get_scalar(GEOTHERMAL_HEAT_FLUX)?;
            divergence[n_cells - 1] += geothermal / grid.cell_thickness(n_cells - 1);
        }
        state.accumulate_tendency(INTERNAL_ENERGY, &divergence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{HydrologyParameters, StratigraphyParameters};
    use crate::processes::{Hydrology, Stratigraphy};
    use crate::soil::SoilTexture;
    use approx::assert_relative_eq;
    use permacolumn_core::model::{Model, ModelBuilder};
    use permacolumn_core::simulation::{ConstantInputs, InputSource};

    fn column_model(upper: UpperBoundary) -> Model {
        let energy = EnergyBalance::from_parameters(EnergyParameters {
            upper_boundary: upper,
            texture: SoilTexture::Sand,
            initial_surface_temperature: -2.0,
            initial_temperature_gradient: 1.0,
        });
        ModelBuilder::new()
            .with_grid(ColumnGrid::uniform(4, 0.5).unwrap())
            .with_process(Arc::new(
                Stratigraphy::from_parameters(StratigraphyParameters::default()).unwrap(),
            ))
            .with_process(Arc::new(
                Hydrology::from_parameters(HydrologyParameters::default()).unwrap(),
            ))
            .with_process(Arc::new(energy))
            .build()
            .unwrap()
    }

    #[test]
    fn closure_derived_quantities_are_ordinary_state() {
        let model = column_model(UpperBoundary::PrescribedFlux);
        let state = model.initialize().unwrap();
        assert!(state.has(TEMPERATURE));
        assert!(state.has(LIQUID_WATER_FRACTION));
        // Initial profile: -2.0 + 1.0 * depth at midpoints 0.25..1.75.
        assert_relative_eq!(state[TEMPERATURE][0], -1.75);
        assert_relative_eq!(state[TEMPERATURE][3], -0.25);
        // Everything below 0 degC initializes fully frozen.
        assert!(state[LIQUID_WATER_FRACTION].iter().all(|&l| l == 0.0));
    }

    #[test]
    fn initialization_round_trips_through_the_closure() {
        let model = column_model(UpperBoundary::PrescribedFlux);
        let mut state = model.initialize().unwrap();
        // Re-inverting the closure must reproduce the initial temperatures.
        let before = state[TEMPERATURE].clone();
        model.invert_closures(&mut state).unwrap();
        for cell in 0..4 {
            assert_relative_eq!(state[TEMPERATURE][cell], before[cell], max_relative = 1e-10);
        }
    }

    #[test]
    fn interior_fluxes_cancel_in_the_column_integral() {
        let model = column_model(UpperBoundary::PrescribedFlux);
        let mut state = model.initialize().unwrap();
        // Zero boundary fluxes: whatever the interior does, the
        // thickness-weighted tendency integral vanishes.
        model.compute_tendencies(&mut state).unwrap();
        let integral = model
            .grid()
            .column_integral(state.tendency(INTERNAL_ENERGY).unwrap());
        assert_relative_eq!(integral, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn boundary_fluxes_enter_the_budget_with_their_signs() {
        let model = column_model(UpperBoundary::PrescribedFlux);
        let mut state = model.initialize().unwrap();
        let inputs = ConstantInputs::new()
            .with(SURFACE_HEAT_FLUX, 10.0)
            .with(GEOTHERMAL_HEAT_FLUX, 0.05);
        inputs.update_inputs(&mut state).unwrap();
        model.compute_tendencies(&mut state).unwrap();
        let integral = model
            .grid()
            .column_integral(state.tendency(INTERNAL_ENERGY).unwrap());
        assert_relative_eq!(integral, 10.05, max_relative = 1e-10);
    }

    #[test]
    fn prescribed_surface_temperature_drives_the_top_cell() {
        let model = column_model(UpperBoundary::PrescribedTemperature);
        let mut state = model.initialize().unwrap();
        let inputs = ConstantInputs::new().with(SURFACE_TEMPERATURE, 5.0);
        inputs.update_inputs(&mut state).unwrap();
        model.compute_tendencies(&mut state).unwrap();
        // Surface far warmer than the -1.75 degC top cell: heat flows in.
        assert!(state.tendency(INTERNAL_ENERGY).unwrap()[0] > 0.0);
    }
}
