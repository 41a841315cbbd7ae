//! A model is an ordered aggregate of processes solved on a common column.
//!
//! The model merges the variable declarations of its processes, dispatches
//! the auxiliary and tendency passes to each process in the order they were
//! added, and applies the closures attached to prognostic variables. The
//! execution order is part of the model definition: a process may read
//! auxiliary values only from processes added before it.
//!
//! A model is an immutable configuration, created once and reused across
//! runs; a fresh [`StateContainer`] is allocated from it at each
//! [`Model::initialize`].

use crate::closure::Closure;
use crate::errors::{ModelError, ModelResult};
use crate::grid::ColumnGrid;
use crate::process::Process;
use crate::state::StateContainer;
use crate::variable::{merge_definitions, VariableDefinition, VariableRole};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    processes: Vec<Arc<dyn Process>>,
    /// Merged declarations: process variables in execution order, then
    /// externally declared inputs.
    variables: Vec<VariableDefinition>,
    closures: Vec<Arc<dyn Closure>>,
    grid: Arc<ColumnGrid>,
}

impl Model {
    pub fn grid(&self) -> &ColumnGrid {
        &self.grid
    }

    pub fn processes(&self) -> &[Arc<dyn Process>] {
        &self.processes
    }

    /// The merged variable declarations, order-preserving.
    pub fn variables(&self) -> &[VariableDefinition] {
        &self.variables
    }

    /// Allocate a fresh state container and fill it with initial values.
    ///
    /// Each process initializes in execution order, then every closure
    /// evaluates its forward direction once, then one full auxiliary pass
    /// runs so all derived values are consistent.
    pub fn initialize(&self) -> ModelResult<StateContainer> {
        let mut state = StateContainer::allocate(&self.variables, &self.grid)?;
        debug!(
            "initializing model: {} variables over {} cells",
            state.schema().len(),
            self.grid.n_cells()
        );
        for process in &self.processes {
            process.initialize(&self.grid, &mut state)?;
        }
        for closure in &self.closures {
            closure.initialize(&mut state)?;
        }
        self.compute_auxiliary(&mut state)?;
        Ok(state)
    }

    /// Dispatch the auxiliary pass to each process in order.
    pub fn compute_auxiliary(&self, state: &mut StateContainer) -> ModelResult<()> {
        for process in &self.processes {
            process.compute_auxiliary(&self.grid, state)?;
        }
        Ok(())
    }

    /// Zero all tendency buffers, then dispatch the tendency pass to each
    /// process in order.
    pub fn compute_tendencies(&self, state: &mut StateContainer) -> ModelResult<()> {
        state.zero_tendencies();
        for process in &self.processes {
            process.compute_tendencies(&self.grid, state)?;
        }
        Ok(())
    }

    /// Refresh closure-derived auxiliary quantities from the prognostic
    /// values.
    pub fn invert_closures(&self, state: &mut StateContainer) -> ModelResult<()> {
        for closure in &self.closures {
            closure.invert(state)?;
        }
        Ok(())
    }
}

/// Builder for [`Model`].
///
/// Processes are dispatched in the order they are added; that order is the
/// model's fixed execution order.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    processes: Vec<Arc<dyn Process>>,
    input_variables: Vec<VariableDefinition>,
    grid: Option<Arc<ColumnGrid>>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(mut self, grid: ColumnGrid) -> Self {
        self.grid = Some(Arc::new(grid));
        self
    }

    pub fn with_process(mut self, process: Arc<dyn Process>) -> Self {
        self.processes.push(process);
        self
    }

    /// Declare an input-role variable not owned by any process, e.g. a
    /// boundary-condition value produced outside the model.
    pub fn with_input_variable(mut self, definition: VariableDefinition) -> Self {
        self.input_variables.push(definition);
        self
    }

    /// Validate the configuration and build an immutable [`Model`].
    pub fn build(self) -> ModelResult<Model> {
        let grid = self.grid.ok_or_else(|| {
            ModelError::InvalidConfiguration("model requires a column grid".to_string())
        })?;
        if self.processes.is_empty() {
            return Err(ModelError::InvalidConfiguration(
                "model requires at least one process".to_string(),
            ));
        }
        for definition in &self.input_variables {
            if definition.role != VariableRole::Input {
                return Err(ModelError::InvalidConfiguration(format!(
                    "externally declared variable '{}' must have the input role",
                    definition.name
                )));
            }
        }

        let variables = merge_definitions(
            self.processes
                .iter()
                .map(|p| p.variables())
                .chain([self.input_variables.clone()]),
        )?;

        let mut closures: Vec<Arc<dyn Closure>> = Vec::new();
        for definition in &variables {
            if let Some(closure) = &definition.closure {
                if definition.role != VariableRole::Prognostic {
                    return Err(ModelError::InvalidConfiguration(format!(
                        "closure '{}' attached to {} variable '{}'; closures require a prognostic variable",
                        closure.name(),
                        definition.role,
                        definition.name
                    )));
                }
                if closure.prognostic_variable() != definition.name {
                    return Err(ModelError::InvalidConfiguration(format!(
                        "closure '{}' targets variable '{}' but is attached to '{}'",
                        closure.name(),
                        closure.prognostic_variable(),
                        definition.name
                    )));
                }
                closures.push(Arc::clone(closure));
            }
        }

        // Surface any collision between closure-derived quantities and the
        // declared variables now rather than at the first allocation.
        merge_definitions(
            [variables.clone()]
                .into_iter()
                .chain(closures.iter().map(|c| c.derived_variables())),
        )?;

        debug!(
            "built model: {} processes, {} variables, {} closures",
            self.processes.len(),
            variables.len(),
            closures.len()
        );
        Ok(Model {
            processes: self.processes,
            variables,
            closures,
            grid,
        })
    }
}
