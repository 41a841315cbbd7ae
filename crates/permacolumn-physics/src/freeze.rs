//! The free-water freezing characteristic.
//!
//! Pore water changes phase isothermally at 0 degC: latent heat is absorbed
//! or released before temperature can move further. Internal energy U
//! (J/m^3, zero for thawed soil at 0 degC) is the prognostic quantity;
//! temperature T and liquid-water fraction l are derived from it.
//!
//! With the cell's maximum latent-heat content L_theta = L_vol * p * s, the
//! inverse direction is piecewise:
//!
//! - thawed, U >= 0:          l = 1, T = U / C
//! - phase change, -L_theta < U < 0:  l = 1 - U / (-L_theta), T = 0
//! - frozen, U <= -L_theta:   l = 0, T = (U + L_theta) / C
//!
//! The order of evaluation matters: l is derived from U first, the bulk heat
//! capacity C from the fractions implied by that l, and T only after C.
//!
//! The forward direction is used exactly once, at initialization, when the
//! temperature profile is prescribed: l = 1 above 0 degC and 0 otherwise
//! (indeterminate inside the band, which is why this direction never drives
//! tendency computation), and U = T * C - L_vol * p * s * (1 - l).
//!
//! Dry soil (s = 0) degenerates to T = U / C with no phase change. A zero
//! bulk heat capacity is unrepresentable past [`ThermalProperties`]
//! construction, so neither direction can divide by zero.

use crate::constants::{L_VOL, T_FREEZE};
use crate::soil::{SoilComposition, SoilTexture, ThermalProperties};
use crate::variables::{
    INTERNAL_ENERGY, LIQUID_WATER_FRACTION, ORGANIC_FRACTION, POROSITY, SATURATION_WATER_ICE,
    TEMPERATURE,
};
use ndarray::Array1;
use permacolumn_core::closure::Closure;
use permacolumn_core::errors::ModelResult;
use permacolumn_core::state::StateContainer;
use permacolumn_core::variable::{Dimensionality, VariableDefinition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeWaterFreezeCurve {
    texture: SoilTexture,
    properties: ThermalProperties,
}

impl FreeWaterFreezeCurve {
    pub fn new(texture: SoilTexture) -> Self {
        Self {
            texture,
            properties: ThermalProperties::for_texture(texture),
        }
    }

    pub fn properties(&self) -> &ThermalProperties {
        &self.properties
    }

    /// Forward direction for one cell: internal energy from a known
    /// temperature. Initialization only.
    pub fn energy_from_temperature(
        &self,
        temperature: f64,
        porosity: f64,
        saturation: f64,
        organic_fraction: f64,
    ) -> ModelResult<(f64, f64)> {
        let liquid = if temperature > T_FREEZE { 1.0 } else { 0.0 };
        let composition =
            SoilComposition::new(porosity, saturation, liquid, organic_fraction, self.texture)?;
        let capacity = self
            .properties
            .bulk_heat_capacity(&composition.volumetric_fractions());
        let energy = temperature * capacity - L_VOL * porosity * saturation * (1.0 - liquid);
        Ok((energy, liquid))
    }

    /// Inverse direction for one cell: temperature and liquid fraction from
    /// internal energy.
    pub fn temperature_from_energy(
        &self,
        energy: f64,
        porosity: f64,
        saturation: f64,
        organic_fraction: f64,
    ) -> ModelResult<(f64, f64)> {
        let latent = L_VOL * porosity * saturation;
        let liquid = if energy >= 0.0 {
            1.0
        } else if energy <= -latent {
            0.0
        } else {
            1.0 - energy / (-latent)
        };
        let composition =
            SoilComposition::new(porosity, saturation, liquid, organic_fraction, self.texture)?;
        let capacity = self
            .properties
            .bulk_heat_capacity(&composition.volumetric_fractions());
        let temperature = if energy >= 0.0 {
            energy / capacity
        } else if energy < -latent {
            (energy + latent) / capacity
        } else {
            T_FREEZE
        };
        Ok((temperature, liquid))
    }

    fn composition_profile<'a>(
        state: &'a StateContainer,
    ) -> ModelResult<(
        &'a Array1<f64>,
        &'a Array1<f64>,
        &'a Array1<f64>,
    )> {
        Ok((
            state.get(POROSITY)?,
            state.get(SATURATION_WATER_ICE)?,
            state.get(ORGANIC_FRACTION)?,
        ))
    }
}

#[typetag::serde]
impl Closure for FreeWaterFreezeCurve {
    fn name(&self) -> &str {
        "free_water_freeze_curve"
    }

    fn prognostic_variable(&self) -> &str {
        INTERNAL_ENERGY
    }

    fn derived_variables(&self) -> Vec<VariableDefinition> {
        vec![
            VariableDefinition::auxiliary(TEMPERATURE, "degC", Dimensionality::Column)
                .with_description("Soil temperature"),
            VariableDefinition::auxiliary(LIQUID_WATER_FRACTION, "1", Dimensionality::Column)
                .with_description("Liquid share of the pore water"),
        ]
    }

    fn initialize(&self, state: &mut StateContainer) -> ModelResult<()> {
        let n_cells = state.get(INTERNAL_ENERGY)?.len();
        let mut energy = Array1::zeros(n_cells);
        let mut liquid = Array1::zeros(n_cells);
        {
            let temperature = state.get(TEMPERATURE)?;
            let (porosity, saturation, organic) = Self::composition_profile(state)?;
            for cell in 0..n_cells {
                let (u, l) = self.energy_from_temperature(
                    temperature[cell],
                    porosity[cell],
                    saturation[cell],
                    organic[cell],
                )?;
                energy[cell] = u;
                liquid[cell] = l;
            }
        }
        state.get_mut(INTERNAL_ENERGY)?.assign(&energy);
        state.get_mut(LIQUID_WATER_FRACTION)?.assign(&liquid);
        Ok(())
    }

    fn invert(&self, state: &mut StateContainer) -> ModelResult<()> {
        let n_cells = state.get(INTERNAL_ENERGY)?.len();
        let mut temperature = Array1::zeros(n_cells);
        let mut liquid = Array1::zeros(n_cells);
        {
            let energy = state.get(INTERNAL_ENERGY)?;
            let (porosity, saturation, organic) = Self::composition_profile(state)?;
            for cell in 0..n_cells {
                let (t, l) = self.temperature_from_energy(
                    energy[cell],
                    porosity[cell],
                    saturation[cell],
                    organic[cell],
                )?;
                temperature[cell] = t;
                liquid[cell] = l;
            }
        }
        state.get_mut(TEMPERATURE)?.assign(&temperature);
        state.get_mut(LIQUID_WATER_FRACTION)?.assign(&liquid);
        Ok(())
    }
}
