#![allow(dead_code)]

//! Small processes used by this crate's own tests.

use crate::errors::{ModelError, ModelResult};
use crate::grid::ColumnGrid;
use crate::process::Process;
use crate::state::{FloatValue, StateContainer};
use crate::variable::{Dimensionality, VariableDefinition};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub(crate) const VAR_TRACER: &str = "tracer_concentration";

fn tracer_definition() -> VariableDefinition {
    VariableDefinition::prognostic(VAR_TRACER, "kg/m^3", Dimensionality::Column)
}

/// First-order decay of a column tracer, `du/dt = -rate * u`.
///
/// The linear test ODE with known exponential solution, used to check
/// integration-scheme accuracy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ExponentialDecay {
    /// Decay rate constant, 1/s.
    pub rate: FloatValue,
    /// Initial tracer concentration, kg/m^3.
    pub initial_value: FloatValue,
}

#[typetag::serde]
impl Process for ExponentialDecay {
    fn name(&self) -> &str {
        "exponential_decay"
    }

    fn variables(&self) -> Vec<VariableDefinition> {
        vec![tracer_definition()]
    }

    fn initialize(&self, _grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        state.get_mut(VAR_TRACER)?.fill(self.initial_value);
        Ok(())
    }

    fn compute_auxiliary(&self, _grid: &ColumnGrid, _state: &mut StateContainer) -> ModelResult<()> {
        Ok(())
    }

    fn compute_tendencies(&self, _grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        let contribution = state.get(VAR_TRACER)?.mapv(|u| -self.rate * u);
        state.accumulate_tendency(VAR_TRACER, &contribution)
    }
}

/// Constant volumetric source for the same tracer.
///
/// Declares the tracer identically to [`ExponentialDecay`] so both processes
/// accumulate into one shared tendency buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ConstantSource {
    /// Source strength, kg/m^3/s.
    pub strength: FloatValue,
}

#[typetag::serde]
impl Process for ConstantSource {
    fn name(&self) -> &str {
        "constant_source"
    }

    fn variables(&self) -> Vec<VariableDefinition> {
        vec![tracer_definition()]
    }

    fn initialize(&self, _grid: &ColumnGrid, _state: &mut StateContainer) -> ModelResult<()> {
        Ok(())
    }

    fn compute_auxiliary(&self, _grid: &ColumnGrid, _state: &mut StateContainer) -> ModelResult<()> {
        Ok(())
    }

    fn compute_tendencies(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        let contribution = Array1::from_elem(grid.n_cells(), self.strength);
        state.accumulate_tendency(VAR_TRACER, &contribution)
    }
}

/// A process whose tendency pass always fails, for step-failure tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AlwaysFailing;

#[typetag::serde]
impl Process for AlwaysFailing {
    fn name(&self) -> &str {
        "always_failing"
    }

    fn compute_auxiliary(&self, _grid: &ColumnGrid, _state: &mut StateContainer) -> ModelResult<()> {
        Ok(())
    }

    fn compute_tendencies(&self, _grid: &ColumnGrid, _state: &mut StateContainer) -> ModelResult<()> {
        Err(ModelError::InvalidConfiguration(
            "kernel substrate unavailable".to_string(),
        ))
    }
}
