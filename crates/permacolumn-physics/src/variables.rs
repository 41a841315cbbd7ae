//! Canonical variable names shared between processes.
//!
//! Processes refer to state by these names; keeping them in one place keeps
//! the cross-process reads (stratigraphy -> hydrology -> energy ->
//! biogeochemistry) spelled consistently.

/// Pore volume per unit soil volume (1), column auxiliary.
pub const POROSITY: &str = "porosity";
/// Organic share of the solid phase (1), column auxiliary.
pub const ORGANIC_FRACTION: &str = "organic_fraction";
/// Water-plus-ice filled share of the pore space (1), column auxiliary.
pub const SATURATION_WATER_ICE: &str = "saturation_water_ice";
/// Liquid share of the pore water (1), column auxiliary derived from the
/// freeze curve.
pub const LIQUID_WATER_FRACTION: &str = "liquid_water_fraction";
/// Volumetric internal energy relative to free water at 0 degC (J/m^3),
/// column prognostic.
pub const INTERNAL_ENERGY: &str = "internal_energy";
/// Soil temperature (degC), column auxiliary derived from the freeze curve.
pub const TEMPERATURE: &str = "temperature";
/// Bulk thermal conductivity (W/m/K), column auxiliary.
pub const THERMAL_CONDUCTIVITY: &str = "thermal_conductivity";
/// Bulk volumetric heat capacity (J/m^3/K), column auxiliary.
pub const HEAT_CAPACITY: &str = "heat_capacity";

/// Downward heat flux through the surface (W/m^2), surface input.
pub const SURFACE_HEAT_FLUX: &str = "surface_heat_flux";
/// Prescribed surface temperature (degC), surface input.
pub const SURFACE_TEMPERATURE: &str = "surface_temperature";
/// Upward geothermal heat flux into the column base (W/m^2), surface input.
pub const GEOTHERMAL_HEAT_FLUX: &str = "geothermal_heat_flux";

/// Ponded water on the surface (m), surface prognostic.
pub const SURFACE_WATER_STORAGE: &str = "surface_water_storage";
/// Water supply rate at the surface (m/s), surface input.
pub const INFILTRATION_RATE: &str = "infiltration_rate";
/// Linear drainage loss from the surface store (m/s), surface auxiliary.
pub const DRAINAGE_RATE: &str = "drainage_rate";

/// Soil organic carbon density (kg/m^3), column prognostic.
pub const SOIL_ORGANIC_CARBON: &str = "soil_organic_carbon";
/// Heterotrophic respiration rate (kg/m^3/s), column auxiliary.
pub const RESPIRATION_RATE: &str = "respiration_rate";
