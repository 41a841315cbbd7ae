//! Run-level orchestration of a model and an integrator.
//!
//! A [`Simulation`] walks the run state machine
//! Uninitialized -> Initialized -> Stepping -> Finalized. Input-role
//! variables are refreshed from an [`InputSource`] once per step, before the
//! auxiliary pass runs, and are read-only for the rest of the step.
//!
//! A step is atomic from the caller's perspective: there is no mid-step
//! cancellation, and a failed step leaves the state invalid. The failure is
//! reported as [`ModelError::StepFailure`] and is never retried here; the
//! caller decides whether to restore a checkpoint, retry with a smaller
//! step, or abort.

use crate::errors::{ModelError, ModelResult};
use crate::integrator::Integrator;
use crate::model::Model;
use crate::state::{FloatValue, StateContainer, Time};
use crate::variable::VariableRole;
use is_close::is_close;
use log::{trace, warn};
use num::Float;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

/// Supplies fresh values for input-role variables.
///
/// How the values are produced (files, an atmosphere model, a boundary
/// scheme) is outside this crate; the simulation only requires that inputs
/// are in place before each step.
pub trait InputSource: Debug {
    fn update_inputs(&self, state: &mut StateContainer) -> ModelResult<()>;
}

/// The trivial input source: every named input holds a fixed value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstantInputs {
    values: HashMap<String, FloatValue>,
}

impl ConstantInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: FloatValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }
}

impl InputSource for ConstantInputs {
    fn update_inputs(&self, state: &mut StateContainer) -> ModelResult<()> {
        for (name, value) in &self.values {
            match state.schema().record(name).map(|r| r.role) {
                Some(VariableRole::Input) => state.get_mut(name)?.fill(*value),
                Some(role) => {
                    return Err(ModelError::InvalidConfiguration(format!(
                        "input source writes '{name}', which is a {role} variable"
                    )))
                }
                None => return Err(ModelError::UnknownVariable { name: name.clone() }),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Uninitialized,
    Initialized,
    Stepping,
    Finalized,
}

#[derive(Debug, Clone)]
struct ConservationCheck {
    variable: String,
    rel_tol: FloatValue,
}

/// Drives repeated steps of a model with a fixed-step integrator.
#[derive(Debug)]
pub struct Simulation<I: Integrator> {
    model: Model,
    integrator: I,
    state: Option<StateContainer>,
    inputs: Option<Box<dyn InputSource>>,
    conservation: Option<ConservationCheck>,
    status: RunStatus,
}

impl<I: Integrator> Simulation<I> {
    pub fn new(model: Model, integrator: I) -> Self {
        Self {
            model,
            integrator,
            state: None,
            inputs: None,
            conservation: None,
            status: RunStatus::Uninitialized,
        }
    }

    pub fn with_input_source(mut self, inputs: Box<dyn InputSource>) -> Self {
        self.inputs = Some(inputs);
        self
    }

    /// Watch the thickness-weighted column integral of a column variable
    /// across each step of [`Simulation::run`]. A residual beyond the
    /// relative tolerance is logged as a warning, never raised: the caller
    /// keeps the last word on non-fatal numerical anomalies.
    pub fn with_conservation_check(mut self, variable: impl Into<String>, rel_tol: FloatValue) -> Self {
        self.conservation = Some(ConservationCheck {
            variable: variable.into(),
            rel_tol,
        });
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn state(&self) -> Option<&StateContainer> {
        self.state.as_ref()
    }

    /// Current model time, or NaN before initialization.
    pub fn time(&self) -> Time {
        self.state.as_ref().map_or(Time::nan(), |s| s.time())
    }

    /// Allocate and fill a fresh state container from the model.
    pub fn initialize(&mut self) -> ModelResult<()> {
        let mut state = self.model.initialize()?;
        if let Some(inputs) = &self.inputs {
            inputs.update_inputs(&mut state)?;
        }
        self.state = Some(state);
        self.status = RunStatus::Initialized;
        Ok(())
    }

    /// Advance the state by one step of length `dt` seconds.
    pub fn timestep(&mut self, dt: Time) -> ModelResult<()> {
        let state = self.state.as_mut().ok_or_else(|| {
            ModelError::InvalidConfiguration(
                "timestep called before initialize".to_string(),
            )
        })?;
        let start = state.time();
        if let Some(inputs) = &self.inputs {
            inputs
                .update_inputs(state)
                .map_err(|source| ModelError::StepFailure {
                    time: start,
                    source: Box::new(source),
                })?;
        }
        self.integrator
            .step(&self.model, state, dt)
            .map_err(|source| ModelError::StepFailure {
                time: start,
                source: Box::new(source),
            })?;
        self.status = RunStatus::Stepping;
        trace!(
            "{} step complete: t={} s, step {}",
            self.integrator.name(),
            state.time(),
            state.step_count()
        );
        Ok(())
    }

    /// Take `n_steps` steps of length `dt`, with the optional conservation
    /// diagnostic evaluated across each step.
    pub fn run(&mut self, n_steps: usize, dt: Time) -> ModelResult<()> {
        for _ in 0..n_steps {
            let before = self.conservation_integral()?;
            self.timestep(dt)?;
            if let (Some(check), Some(before)) = (&self.conservation, before) {
                let after = self
                    .conservation_integral()?
                    .expect("state exists after a successful step");
                if !is_close!(before, after, rel_tol = check.rel_tol) {
                    warn!(
                        "column integral of '{}' drifted within one step: {before} -> {after}",
                        check.variable
                    );
                }
            }
        }
        Ok(())
    }

    /// Trailing auxiliary recompute so derived quantities are consistent
    /// with the final prognostic values for read-out.
    pub fn finalize(&mut self) -> ModelResult<()> {
        let state = self.state.as_mut().ok_or_else(|| {
            ModelError::InvalidConfiguration(
                "finalize called before initialize".to_string(),
            )
        })?;
        self.model.compute_auxiliary(state)?;
        self.status = RunStatus::Finalized;
        Ok(())
    }

    /// Consume the simulation, yielding the final state.
    pub fn into_state(self) -> Option<StateContainer> {
        self.state
    }

    fn conservation_integral(&self) -> ModelResult<Option<FloatValue>> {
        match (&self.conservation, &self.state) {
            (Some(check), Some(state)) => {
                let values = state.get(&check.variable)?;
                Ok(Some(self.model.grid().column_integral(values)))
            }
            _ => Ok(None),
        }
    }
}
