use crate::soil::SoilTexture;
use serde::{Deserialize, Serialize};

/// How the top of the column is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpperBoundary {
    /// A prescribed downward heat flux, read from the `surface_heat_flux`
    /// input.
    PrescribedFlux,
    /// A prescribed surface temperature, read from the
    /// `surface_temperature` input and applied through the half-cell
    /// resistance of the top cell.
    PrescribedTemperature,
}

/// Parameters for the energy-balance process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyParameters {
    /// Upper boundary treatment
    pub upper_boundary: UpperBoundary,
    /// Mineral class of the solid phase
    pub texture: SoilTexture,
    /// Initial temperature at the top of the column
    /// unit: degC
    pub initial_surface_temperature: f64,
    /// Initial vertical temperature gradient, positive downward
    /// unit: degC/m
    pub initial_temperature_gradient: f64,
}

impl Default for EnergyParameters {
    fn default() -> Self {
        Self {
            upper_boundary: UpperBoundary::PrescribedFlux,
            texture: SoilTexture::Loam,
            initial_surface_temperature: -5.0,
            initial_temperature_gradient: 0.03,
        }
    }
}
