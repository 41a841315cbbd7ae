//! The process contract.
//!
//! A process is a parameterized, stateless (apart from its own constant
//! configuration) physical submodel. It declares the variables it owns,
//! writes its own auxiliary variables from current prognostic and input
//! values, and accumulates additive contributions into the tendency buffers
//! of its own prognostic variables.
//!
//! Any value implementing this capability interface qualifies as a process;
//! a model is an explicit, ordered aggregate of process instances, not a
//! type hierarchy. A process may read auxiliary values written by processes
//! earlier in the model's fixed execution order, and must never write
//! variables it does not own.
//!
//! Both passes are pure, elementwise functions of a pre-pass snapshot: each
//! cell writes only its own outputs, there is no cross-cell write ordering,
//! and no I/O or blocking occurs inside them.

use crate::errors::ModelResult;
use crate::grid::ColumnGrid;
use crate::state::StateContainer;
use crate::variable::VariableDefinition;
use std::fmt::Debug;

#[typetag::serde]
pub trait Process: Debug + Send + Sync {
    /// Stable identifier used in diagnostics.
    fn name(&self) -> &str;

    /// The variables this process owns (possibly empty).
    fn variables(&self) -> Vec<VariableDefinition> {
        Vec::new()
    }

    /// Write initial values for this process's variables.
    ///
    /// The default writes the auxiliary variables; processes with prognostic
    /// state override this to set initial profiles.
    fn initialize(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()> {
        self.compute_auxiliary(grid, state)
    }

    /// Recompute this process's auxiliary variables from current prognostic
    /// and input values.
    fn compute_auxiliary(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()>;

    /// Accumulate this process's contributions into the tendency buffers of
    /// its prognostic variables.
    fn compute_tendencies(&self, grid: &ColumnGrid, state: &mut StateContainer) -> ModelResult<()>;
}
