//! Physical constants for the soil constituents.

/// Density of liquid water (kg/m^3)
pub const RHO_WATER: f64 = 1000.0;
/// Density of ice (kg/m^3)
pub const RHO_ICE: f64 = 917.0;
/// Specific latent heat of fusion of water (J/kg)
pub const L_FUSION: f64 = 0.334e6;
/// Volumetric latent heat of fusion per unit pore-water volume (J/m^3)
pub const L_VOL: f64 = RHO_WATER * L_FUSION;
/// Freezing point of free pore water (degC)
pub const T_FREEZE: f64 = 0.0;

/// Volumetric heat capacity of liquid water (J/m^3/K)
pub const C_WATER: f64 = 4.18e6;
/// Volumetric heat capacity of ice (J/m^3/K)
pub const C_ICE: f64 = 1.93e6;
/// Volumetric heat capacity of air (J/m^3/K)
pub const C_AIR: f64 = 1.25e3;
/// Volumetric heat capacity of mineral soil (J/m^3/K)
pub const C_MINERAL: f64 = 2.0e6;
/// Volumetric heat capacity of soil organic matter (J/m^3/K)
pub const C_ORGANIC: f64 = 2.5e6;

/// Thermal conductivity of liquid water (W/m/K)
pub const K_WATER: f64 = 0.57;
/// Thermal conductivity of ice (W/m/K)
pub const K_ICE: f64 = 2.2;
/// Thermal conductivity of air (W/m/K)
pub const K_AIR: f64 = 0.025;
/// Thermal conductivity of soil organic matter (W/m/K)
pub const K_ORGANIC: f64 = 0.25;
/// Thermal conductivity of sand-dominated mineral soil (W/m/K)
pub const K_SAND: f64 = 3.8;
/// Thermal conductivity of loamy mineral soil (W/m/K)
pub const K_LOAM: f64 = 2.9;
/// Thermal conductivity of clay-dominated mineral soil (W/m/K)
pub const K_CLAY: f64 = 2.2;
