//! TOML model configuration.
//!
//! A configuration file describes the column grid and the parameters of the
//! four standard processes; [`ModelConfig::build_model`] assembles them in
//! their fixed execution order.
//!
//! ```toml
//! [grid]
//! cell_thickness = [0.05, 0.05, 0.1, 0.1, 0.2, 0.5, 1.0]
//!
//! [[stratigraphy.layers]]
//! lower_depth = 0.2
//! porosity = 0.75
//! organic_fraction = 0.8
//!
//! [[stratigraphy.layers]]
//! lower_depth = 10.0
//! porosity = 0.4
//! organic_fraction = 0.05
//!
//! [hydrology]
//! saturation_water_ice = 0.9
//! drainage_coefficient = 1e-6
//! initial_storage = 0.0
//!
//! [energy]
//! upper_boundary = "prescribed_flux"
//! texture = "loam"
//! initial_surface_temperature = -5.0
//! initial_temperature_gradient = 0.03
//!
//! [biogeochemistry]
//! rate_constant = 3.2e-10
//! q10 = 2.0
//! reference_temperature = 10.0
//! initial_carbon_density = 40.0
//! ```

use crate::parameters::{
    BiogeochemistryParameters, EnergyParameters, HydrologyParameters, StratigraphyParameters,
};
use crate::processes::{Biogeochemistry, EnergyBalance, Hydrology, Stratigraphy};
use log::info;
use permacolumn_core::errors::{ModelError, ModelResult};
use permacolumn_core::grid::ColumnGrid;
use permacolumn_core::model::{Model, ModelBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Cell thicknesses in metres, top down.
    pub cell_thickness: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub grid: GridConfig,
    #[serde(default)]
    pub stratigraphy: StratigraphyParameters,
    #[serde(default)]
    pub hydrology: HydrologyParameters,
    #[serde(default)]
    pub energy: EnergyParameters,
    #[serde(default)]
    pub biogeochemistry: BiogeochemistryParameters,
}

impl ModelConfig {
    pub fn from_toml_str(source: &str) -> ModelResult<Self> {
        toml::from_str(source).map_err(|err| {
            ModelError::InvalidConfiguration(format!("failed to parse model configuration: {err}"))
        })
    }

    /// Assemble the standard processes in their fixed execution order.
    pub fn build_model(&self) -> ModelResult<Model> {
        let grid = ColumnGrid::from_thicknesses(self.grid.cell_thickness.clone())?;
        info!(
            "building column model: {} cells, {:.2} m deep",
            grid.n_cells(),
            grid.total_depth()
        );
        ModelBuilder::new()
            .with_grid(grid)
            .with_process(Arc::new(Stratigraphy::from_parameters(
                self.stratigraphy.clone(),
            )?))
            .with_process(Arc::new(Hydrology::from_parameters(self.hydrology)?))
            .with_process(Arc::new(EnergyBalance::from_parameters(self.energy)))
            .with_process(Arc::new(Biogeochemistry::from_parameters(
                self.biogeochemistry,
            )?))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{INTERNAL_ENERGY, SOIL_ORGANIC_CARBON, TEMPERATURE};

    const MINIMAL: &str = r#"
        [grid]
        cell_thickness = [0.1, 0.1, 0.2]
    "#;

    #[test]
    fn minimal_configuration_uses_defaults() {
        let config = ModelConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.hydrology, HydrologyParameters::default());
        let model = config.build_model().unwrap();
        let state = model.initialize().unwrap();
        assert!(state.has(INTERNAL_ENERGY));
        assert!(state.has(TEMPERATURE));
        assert!(state.has(SOIL_ORGANIC_CARBON));
    }

    #[test]
    fn full_configuration_round_trips() {
        let config = ModelConfig::from_toml_str(
            r#"
            [grid]
            cell_thickness = [0.05, 0.1]

            [[stratigraphy.layers]]
            lower_depth = 1.0
            porosity = 0.5
            organic_fraction = 0.2

            [hydrology]
            saturation_water_ice = 0.7
            drainage_coefficient = 0.0
            initial_storage = 0.01

            [energy]
            upper_boundary = "prescribed_temperature"
            texture = "clay"
            initial_surface_temperature = -1.0
            initial_temperature_gradient = 0.0

            [biogeochemistry]
            rate_constant = 1e-9
            q10 = 2.5
            reference_temperature = 5.0
            initial_carbon_density = 25.0
            "#,
        )
        .unwrap();
        let serialized = toml::to_string(&config).unwrap();
        let reparsed = ModelConfig::from_toml_str(&serialized).unwrap();
        assert_eq!(reparsed, config);
        assert!(config.build_model().is_ok());
    }

    #[test]
    fn malformed_configuration_is_rejected() {
        assert!(ModelConfig::from_toml_str("grid = 3").is_err());
        let negative_grid = r#"
            [grid]
            cell_thickness = [-0.1]
        "#;
        let config = ModelConfig::from_toml_str(negative_grid).unwrap();
        assert!(config.build_model().is_err());
    }

    #[test]
    fn invalid_physics_parameters_fail_the_build() {
        let config = ModelConfig::from_toml_str(
            r#"
            [grid]
            cell_thickness = [0.1]

            [hydrology]
            saturation_water_ice = 1.5
            drainage_coefficient = 0.0
            initial_storage = 0.0
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.build_model(),
            Err(ModelError::FractionOutOfRange { .. })
        ));
    }
}
