//! Soil composition and bulk thermal-property mixing.
//!
//! A unit soil volume is partitioned into five constituents: liquid water,
//! ice, air, mineral matter and organic matter. The split is described by
//! four fractions, validated to [0, 1] at construction:
//!
//! - porosity `p`: pore share of the total volume
//! - saturation `s`: water-plus-ice share of the pore space
//! - liquid fraction `l`: liquid share of the pore water
//! - organic fraction `o`: organic share of the solid phase
//!
//! giving volumetric fractions water = p s l, ice = p s (1 - l),
//! air = p (1 - s), mineral = (1 - p)(1 - o), organic = (1 - p) o, which sum
//! to one by construction.
//!
//! Bulk properties follow from per-constituent values: heat capacity mixes
//! linearly, conductivity with the quadratic-parallel rule
//! (sum of fraction-weighted square roots, squared).

use crate::constants::{
    C_AIR, C_ICE, C_MINERAL, C_ORGANIC, C_WATER, K_AIR, K_CLAY, K_ICE, K_LOAM, K_ORGANIC, K_SAND,
    K_WATER,
};
use permacolumn_core::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Check a fractional quantity against [0, 1].
pub fn check_fraction(quantity: &str, value: f64) -> ModelResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::FractionOutOfRange {
            quantity: quantity.to_string(),
            value,
        })
    }
}

/// Dominant mineral class of the solid phase, selecting its thermal
/// properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilTexture {
    Sand,
    Loam,
    Clay,
}

impl SoilTexture {
    fn mineral_conductivity(self) -> f64 {
        match self {
            SoilTexture::Sand => K_SAND,
            SoilTexture::Loam => K_LOAM,
            SoilTexture::Clay => K_CLAY,
        }
    }
}

/// Constituent shares of a unit soil volume. Sums to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumetricFractions {
    pub water: f64,
    pub ice: f64,
    pub air: f64,
    pub mineral: f64,
    pub organic: f64,
}

impl VolumetricFractions {
    pub fn sum(&self) -> f64 {
        self.water + self.ice + self.air + self.mineral + self.organic
    }
}

/// Immutable per-cell material description.
///
/// Every fraction is validated at construction, never lazily, so an invalid
/// physical state is caught before it can corrupt a downstream flux
/// computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilComposition {
    porosity: f64,
    saturation_water_ice: f64,
    liquid_water_fraction: f64,
    organic_fraction: f64,
    texture: SoilTexture,
}

impl SoilComposition {
    pub fn new(
        porosity: f64,
        saturation_water_ice: f64,
        liquid_water_fraction: f64,
        organic_fraction: f64,
        texture: SoilTexture,
    ) -> ModelResult<Self> {
        check_fraction("porosity", porosity)?;
        check_fraction("saturation_water_ice", saturation_water_ice)?;
        check_fraction("liquid_water_fraction", liquid_water_fraction)?;
        check_fraction("organic_fraction", organic_fraction)?;
        Ok(Self {
            porosity,
            saturation_water_ice,
            liquid_water_fraction,
            organic_fraction,
            texture,
        })
    }

    pub fn porosity(&self) -> f64 {
        self.porosity
    }

    pub fn saturation_water_ice(&self) -> f64 {
        self.saturation_water_ice
    }

    pub fn liquid_water_fraction(&self) -> f64 {
        self.liquid_water_fraction
    }

    pub fn organic_fraction(&self) -> f64 {
        self.organic_fraction
    }

    pub fn texture(&self) -> SoilTexture {
        self.texture
    }

    pub fn volumetric_fractions(&self) -> VolumetricFractions {
        let p = self.porosity;
        let s = self.saturation_water_ice;
        let l = self.liquid_water_fraction;
        let o = self.organic_fraction;
        VolumetricFractions {
            water: p * s * l,
            ice: p * s * (1.0 - l),
            air: p * (1.0 - s),
            mineral: (1.0 - p) * (1.0 - o),
            organic: (1.0 - p) * o,
        }
    }
}

/// Thermal conductivity and volumetric heat capacity of one constituent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstituentProperties {
    /// W/m/K
    pub conductivity: f64,
    /// J/m^3/K
    pub heat_capacity: f64,
}

/// Per-constituent thermal properties plus the bulk mixing rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalProperties {
    water: ConstituentProperties,
    ice: ConstituentProperties,
    air: ConstituentProperties,
    mineral: ConstituentProperties,
    organic: ConstituentProperties,
}

impl ThermalProperties {
    /// Build a property table, rejecting non-positive values.
    ///
    /// Heat capacities must be strictly positive: together with the
    /// fractions summing to one this makes a zero bulk heat capacity
    /// unrepresentable, so the energy closure can never divide by zero.
    pub fn new(
        water: ConstituentProperties,
        ice: ConstituentProperties,
        air: ConstituentProperties,
        mineral: ConstituentProperties,
        organic: ConstituentProperties,
    ) -> ModelResult<Self> {
        let constituents = [&water, &ice, &air, &mineral, &organic];
        if constituents.iter().any(|c| c.heat_capacity <= 0.0) {
            return Err(ModelError::DegenerateHeatCapacity);
        }
        if let Some(c) = constituents.iter().find(|c| c.conductivity <= 0.0) {
            return Err(ModelError::InvalidConfiguration(format!(
                "constituent conductivities must be positive, got {}",
                c.conductivity
            )));
        }
        Ok(Self {
            water,
            ice,
            air,
            mineral,
            organic,
        })
    }

    /// Standard constituent values with the mineral class taken from the
    /// texture.
    pub fn for_texture(texture: SoilTexture) -> Self {
        Self {
            water: ConstituentProperties {
                conductivity: K_WATER,
                heat_capacity: C_WATER,
            },
            ice: ConstituentProperties {
                conductivity: K_ICE,
                heat_capacity: C_ICE,
            },
            air: ConstituentProperties {
                conductivity: K_AIR,
                heat_capacity: C_AIR,
            },
            mineral: ConstituentProperties {
                conductivity: texture.mineral_conductivity(),
                heat_capacity: C_MINERAL,
            },
            organic: ConstituentProperties {
                conductivity: K_ORGANIC,
                heat_capacity: C_ORGANIC,
            },
        }
    }

    fn pairs(&self, fractions: &VolumetricFractions) -> [(f64, ConstituentProperties); 5] {
        [
            (fractions.water, self.water),
            (fractions.ice, self.ice),
            (fractions.air, self.air),
            (fractions.mineral, self.mineral),
            (fractions.organic, self.organic),
        ]
    }

    /// Linear weighted average of the constituent heat capacities (J/m^3/K).
    pub fn bulk_heat_capacity(&self, fractions: &VolumetricFractions) -> f64 {
        self.pairs(fractions)
            .iter()
            .map(|(theta, c)| theta * c.heat_capacity)
            .sum()
    }

    /// Quadratic-parallel mixing of the constituent conductivities (W/m/K):
    /// the square of the fraction-weighted square roots.
    pub fn bulk_conductivity(&self, fractions: &VolumetricFractions) -> f64 {
        self.pairs(fractions)
            .iter()
            .map(|(theta, c)| theta * c.conductivity.sqrt())
            .sum::<f64>()
            .powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn properties() -> ThermalProperties {
        ThermalProperties::for_texture(SoilTexture::Sand)
    }

    #[test]
    fn fractions_sum_to_one_across_parameter_sweep() {
        let steps = [0.0, 0.25, 0.5, 0.75, 1.0];
        for &p in &steps {
            for &s in &steps {
                for &l in &steps {
                    for &o in &steps {
                        let composition =
                            SoilComposition::new(p, s, l, o, SoilTexture::Loam).unwrap();
                        assert_relative_eq!(
                            composition.volumetric_fractions().sum(),
                            1.0,
                            max_relative = 1e-12
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn construction_validates_every_fraction_eagerly() {
        for bad in [-0.01, 1.01, f64::NAN] {
            assert!(SoilComposition::new(bad, 0.5, 0.5, 0.5, SoilTexture::Sand).is_err());
            assert!(SoilComposition::new(0.5, bad, 0.5, 0.5, SoilTexture::Sand).is_err());
            assert!(SoilComposition::new(0.5, 0.5, bad, 0.5, SoilTexture::Sand).is_err());
            assert!(SoilComposition::new(0.5, 0.5, 0.5, bad, SoilTexture::Sand).is_err());
        }
    }

    #[test]
    fn saturated_thawed_cell_has_no_ice_or_air() {
        let composition = SoilComposition::new(0.4, 1.0, 1.0, 0.0, SoilTexture::Sand).unwrap();
        let fractions = composition.volumetric_fractions();
        assert_relative_eq!(fractions.water, 0.4);
        assert_eq!(fractions.ice, 0.0);
        assert_eq!(fractions.air, 0.0);
        assert_relative_eq!(fractions.mineral, 0.6);
    }

    #[test]
    fn mixing_reduces_to_pure_constituent_values() {
        let props = properties();
        // Pure water: p = 1, s = 1, l = 1.
        let water = SoilComposition::new(1.0, 1.0, 1.0, 0.0, SoilTexture::Sand)
            .unwrap()
            .volumetric_fractions();
        assert_relative_eq!(props.bulk_heat_capacity(&water), 4.18e6, max_relative = 1e-12);
        assert_relative_eq!(props.bulk_conductivity(&water), 0.57, max_relative = 1e-12);

        // Pure ice: p = 1, s = 1, l = 0.
        let ice = SoilComposition::new(1.0, 1.0, 0.0, 0.0, SoilTexture::Sand)
            .unwrap()
            .volumetric_fractions();
        assert_relative_eq!(props.bulk_conductivity(&ice), 2.2, max_relative = 1e-12);

        // Pure mineral: p = 0, o = 0.
        let mineral = SoilComposition::new(0.0, 0.0, 0.0, 0.0, SoilTexture::Sand)
            .unwrap()
            .volumetric_fractions();
        assert_relative_eq!(props.bulk_conductivity(&mineral), 3.8, max_relative = 1e-12);
        assert_relative_eq!(props.bulk_heat_capacity(&mineral), 2.0e6, max_relative = 1e-12);

        // Pure organic: p = 0, o = 1.
        let organic = SoilComposition::new(0.0, 0.0, 0.0, 1.0, SoilTexture::Sand)
            .unwrap()
            .volumetric_fractions();
        assert_relative_eq!(props.bulk_conductivity(&organic), 0.25, max_relative = 1e-12);
    }

    #[test]
    fn conductivity_is_monotone_in_the_ice_share() {
        // Freezing replaces water (0.57 W/m/K) with ice (2.2 W/m/K); bulk
        // conductivity must not decrease as the liquid fraction drops.
        let props = properties();
        let mut previous = f64::INFINITY;
        for step in 0..=10 {
            let liquid = step as f64 / 10.0;
            let fractions = SoilComposition::new(0.5, 1.0, liquid, 0.0, SoilTexture::Sand)
                .unwrap()
                .volumetric_fractions();
            let conductivity = props.bulk_conductivity(&fractions);
            assert!(conductivity <= previous);
            previous = conductivity;
        }
    }

    #[test]
    fn heat_capacity_is_monotone_in_the_water_share() {
        let props = properties();
        let mut previous = -f64::INFINITY;
        for step in 0..=10 {
            let saturation = step as f64 / 10.0;
            let fractions = SoilComposition::new(0.5, saturation, 1.0, 0.0, SoilTexture::Sand)
                .unwrap()
                .volumetric_fractions();
            // Water (4.18e6) replaces air (1.25e3): capacity rises.
            let capacity = props.bulk_heat_capacity(&fractions);
            assert!(capacity >= previous);
            previous = capacity;
        }
    }

    #[test]
    fn degenerate_heat_capacity_is_a_construction_error() {
        let good = ConstituentProperties {
            conductivity: 1.0,
            heat_capacity: 1.0e6,
        };
        let degenerate = ConstituentProperties {
            conductivity: 1.0,
            heat_capacity: 0.0,
        };
        let result = ThermalProperties::new(good, good, degenerate, good, good);
        assert!(matches!(result, Err(ModelError::DegenerateHeatCapacity)));
    }
}
