use crate::soil::check_fraction;
use permacolumn_core::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// One horizon of the soil profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    /// Depth of the layer's lower boundary below the surface
    /// unit: m
    pub lower_depth: f64,
    /// Pore share of the total volume
    /// unit: 1
    pub porosity: f64,
    /// Organic share of the solid phase
    /// unit: 1
    pub organic_fraction: f64,
}

/// Parameters for the stratigraphy process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratigraphyParameters {
    /// Soil horizons, ordered top down by increasing lower depth. Cells
    /// below the last horizon take its values.
    pub layers: Vec<SoilLayer>,
}

impl StratigraphyParameters {
    pub fn validate(&self) -> ModelResult<()> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidConfiguration(
                "stratigraphy requires at least one layer".to_string(),
            ));
        }
        let mut previous_depth = 0.0;
        for layer in &self.layers {
            if layer.lower_depth <= previous_depth {
                return Err(ModelError::InvalidConfiguration(format!(
                    "layer depths must increase monotonically, got {} after {}",
                    layer.lower_depth, previous_depth
                )));
            }
            previous_depth = layer.lower_depth;
            check_fraction("porosity", layer.porosity)?;
            check_fraction("organic_fraction", layer.organic_fraction)?;
        }
        Ok(())
    }

    /// The layer containing the given depth.
    pub fn layer_at(&self, depth: f64) -> &SoilLayer {
        self.layers
            .iter()
            .find(|layer| depth < layer.lower_depth)
            .unwrap_or_else(|| &self.layers[self.layers.len() - 1])
    }
}

impl Default for StratigraphyParameters {
    fn default() -> Self {
        Self {
            layers: vec![
                SoilLayer {
                    lower_depth: 0.2,
                    porosity: 0.75,
                    organic_fraction: 0.8,
                },
                SoilLayer {
                    lower_depth: 10.0,
                    porosity: 0.4,
                    organic_fraction: 0.05,
                },
            ],
        }
    }
}
