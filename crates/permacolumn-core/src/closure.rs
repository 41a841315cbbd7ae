//! Bidirectional relations between prognostic and derived quantities.
//!
//! A closure maps one prognostic quantity to one or more derived auxiliary
//! quantities and back, parameterized by physical constants and the current
//! soil composition. The forward direction runs exactly once, at model
//! initialization, when the derived quantities are already known and the
//! prognostic one is not. The inverse direction runs after every explicit
//! update to refresh the derived quantities from the freshly stepped
//! prognostic values.

use crate::errors::ModelResult;
use crate::state::StateContainer;
use crate::variable::VariableDefinition;
use std::fmt::Debug;

#[typetag::serde]
pub trait Closure: Debug + Send + Sync {
    /// Stable identifier used for duplicate detection and diagnostics.
    fn name(&self) -> &str;

    /// Name of the prognostic variable this closure is attached to.
    fn prognostic_variable(&self) -> &str;

    /// Auxiliary declarations for the derived quantities.
    ///
    /// These are allocated as ordinary auxiliary variables so downstream
    /// code reads them like any other state.
    fn derived_variables(&self) -> Vec<VariableDefinition>;

    /// Forward direction: compute the prognostic variable from the derived
    /// quantities. Used only at initialization.
    fn initialize(&self, state: &mut StateContainer) -> ModelResult<()>;

    /// Inverse direction: recompute the derived quantities from the
    /// prognostic variable. Applied after every explicit step.
    fn invert(&self, state: &mut StateContainer) -> ModelResult<()>;
}
