//! Vertical discretization of the soil column.
//!
//! The grid is the only piece of spatial information this crate consumes:
//! cell thicknesses (for flux divergence and column integrals) and cell
//! midpoints (for depth-dependent profiles). Cells are ordered top down,
//! index 0 at the surface.

use crate::errors::{ModelError, ModelResult};
use crate::state::FloatValue;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnGrid {
    thickness: Array1<FloatValue>,
    midpoints: Array1<FloatValue>,
}

impl ColumnGrid {
    /// Build a grid from per-cell thicknesses in metres, top down.
    pub fn from_thicknesses(thickness: Vec<FloatValue>) -> ModelResult<Self> {
        if thickness.is_empty() {
            return Err(ModelError::InvalidConfiguration(
                "column grid requires at least one cell".to_string(),
            ));
        }
        if let Some(dz) = thickness.iter().find(|dz| **dz <= 0.0) {
            return Err(ModelError::InvalidConfiguration(format!(
                "cell thicknesses must be positive, got {dz}"
            )));
        }
        let mut midpoints = Vec::with_capacity(thickness.len());
        let mut top = 0.0;
        for dz in &thickness {
            midpoints.push(top + dz / 2.0);
            top += dz;
        }
        Ok(Self {
            thickness: Array1::from(thickness),
            midpoints: Array1::from(midpoints),
        })
    }

    /// A grid of `n_cells` equal cells of thickness `dz`.
    pub fn uniform(n_cells: usize, dz: FloatValue) -> ModelResult<Self> {
        Self::from_thicknesses(vec![dz; n_cells])
    }

    pub fn n_cells(&self) -> usize {
        self.thickness.len()
    }

    pub fn thickness(&self) -> &Array1<FloatValue> {
        &self.thickness
    }

    pub fn cell_thickness(&self, cell: usize) -> FloatValue {
        self.thickness[cell]
    }

    /// Depth of a cell centre below the surface.
    pub fn midpoint(&self, cell: usize) -> FloatValue {
        self.midpoints[cell]
    }

    pub fn midpoints(&self) -> &Array1<FloatValue> {
        &self.midpoints
    }

    /// Midpoint-to-midpoint distance across the interface below `upper`.
    pub fn interface_spacing(&self, upper: usize) -> FloatValue {
        self.midpoints[upper + 1] - self.midpoints[upper]
    }

    pub fn total_depth(&self) -> FloatValue {
        self.thickness.sum()
    }

    /// Thickness-weighted column integral of a per-cell quantity.
    pub fn column_integral(&self, values: &Array1<FloatValue>) -> FloatValue {
        self.thickness.dot(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn uniform_grid_geometry() {
        let grid = ColumnGrid::uniform(4, 0.5).unwrap();
        assert_eq!(grid.n_cells(), 4);
        assert_eq!(grid.total_depth(), 2.0);
        assert_eq!(grid.midpoint(0), 0.25);
        assert_eq!(grid.midpoint(3), 1.75);
        assert_eq!(grid.interface_spacing(0), 0.5);
    }

    #[test]
    fn non_uniform_midpoints() {
        let grid = ColumnGrid::from_thicknesses(vec![0.1, 0.3, 0.6]).unwrap();
        assert_eq!(grid.midpoint(0), 0.05);
        assert_eq!(grid.midpoint(1), 0.25);
        assert_eq!(grid.midpoint(2), 0.7);
        assert_eq!(grid.interface_spacing(1), 0.45);
    }

    #[test]
    fn column_integral_weights_by_thickness() {
        let grid = ColumnGrid::from_thicknesses(vec![0.5, 1.5]).unwrap();
        let values = array![2.0, 4.0];
        assert_eq!(grid.column_integral(&values), 7.0);
    }

    #[test]
    fn rejects_empty_and_non_positive_cells() {
        assert!(ColumnGrid::from_thicknesses(vec![]).is_err());
        assert!(ColumnGrid::from_thicknesses(vec![0.1, 0.0]).is_err());
        assert!(ColumnGrid::from_thicknesses(vec![-0.1]).is_err());
    }
}
