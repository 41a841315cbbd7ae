//! Variable declarations for the model state.
//!
//! Every quantity a process reads or writes is declared up front as a
//! [`VariableDefinition`] with a role and a dimensionality. The union of all
//! declarations in a model forms the schema from which the state container is
//! allocated; after allocation the schema is never restructured.
//!
//! Variable names must be unique across the union of all processes in a
//! model. Two processes may declare the same variable only if the
//! declarations are identical; a non-identical collision is a configuration
//! error, reported by [`merge_definitions`].

use crate::closure::Closure;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// How a variable participates in the time-integration cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableRole {
    /// Integrated forward in time via its tendency buffer.
    Prognostic,
    /// Derived each step from prognostic and input values.
    Auxiliary,
    /// Supplied from outside the model, refreshed once per step.
    Input,
}

impl std::fmt::Display for VariableRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableRole::Prognostic => write!(f, "prognostic"),
            VariableRole::Auxiliary => write!(f, "auxiliary"),
            VariableRole::Input => write!(f, "input"),
        }
    }
}

/// Spatial extent of a variable's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimensionality {
    /// One value per vertical grid cell.
    Column,
    /// A single value for the horizontal surface.
    Surface,
}

/// Declaration of a named model quantity.
///
/// Prognostic variables implicitly own a tendency buffer of identical
/// dimensionality, allocated alongside the variable itself. A prognostic
/// variable may carry a [`Closure`] relating it to derived auxiliary
/// quantities; those derived quantities are allocated as ordinary auxiliary
/// variables so downstream code treats them uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Unique identifier, e.g. `"internal_energy"`.
    pub name: String,
    /// Canonical unit, e.g. `"J/m^3"`.
    pub unit: String,
    pub role: VariableRole,
    pub dims: Dimensionality,
    /// Human-readable description.
    pub description: String,
    /// Optional bidirectional relation to derived auxiliary quantities.
    /// Only meaningful on prognostic variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closure: Option<Arc<dyn Closure>>,
}

impl VariableDefinition {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        role: VariableRole,
        dims: Dimensionality,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            role,
            dims,
            description: String::new(),
            closure: None,
        }
    }

    pub fn prognostic(name: impl Into<String>, unit: impl Into<String>, dims: Dimensionality) -> Self {
        Self::new(name, unit, VariableRole::Prognostic, dims)
    }

    pub fn auxiliary(name: impl Into<String>, unit: impl Into<String>, dims: Dimensionality) -> Self {
        Self::new(name, unit, VariableRole::Auxiliary, dims)
    }

    pub fn input(name: impl Into<String>, unit: impl Into<String>, dims: Dimensionality) -> Self {
        Self::new(name, unit, VariableRole::Input, dims)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach a closure to this (prognostic) variable.
    pub fn with_closure(mut self, closure: Arc<dyn Closure>) -> Self {
        self.closure = Some(closure);
        self
    }

    fn closure_name(&self) -> Option<&str> {
        self.closure.as_deref().map(|c| c.name())
    }
}

impl PartialEq for VariableDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.unit == other.unit
            && self.role == other.role
            && self.dims == other.dims
            && self.closure_name() == other.closure_name()
    }
}

/// Merge variable declarations from several sources into one ordered list.
///
/// Order is preserved from the order of the input lists. Identical repeated
/// declarations collapse to a single entry; a name collision with a
/// non-identical definition fails with [`DuplicateVariable`].
///
/// [`DuplicateVariable`]: crate::errors::ModelError::DuplicateVariable
pub fn merge_definitions<I>(lists: I) -> crate::errors::ModelResult<Vec<VariableDefinition>>
where
    I: IntoIterator<Item = Vec<VariableDefinition>>,
{
    let mut merged: Vec<VariableDefinition> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for list in lists {
        for definition in list {
            match index.get(&definition.name) {
                None => {
                    index.insert(definition.name.clone(), merged.len());
                    merged.push(definition);
                }
                Some(&at) => {
                    if merged[at] != definition {
                        return Err(crate::errors::ModelError::DuplicateVariable {
                            name: definition.name,
                        });
                    }
                }
            }
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ModelError;

    fn energy() -> VariableDefinition {
        VariableDefinition::prognostic("internal_energy", "J/m^3", Dimensionality::Column)
    }

    #[test]
    fn merge_preserves_order() {
        let a = vec![
            VariableDefinition::auxiliary("porosity", "1", Dimensionality::Column),
            VariableDefinition::auxiliary("organic_fraction", "1", Dimensionality::Column),
        ];
        let b = vec![energy()];
        let merged = merge_definitions([a, b]).unwrap();
        let names: Vec<_> = merged.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["porosity", "organic_fraction", "internal_energy"]);
    }

    #[test]
    fn merge_collapses_identical_declarations() {
        let merged = merge_definitions([vec![energy()], vec![energy()]]).unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn merge_rejects_conflicting_declarations() {
        let conflicting =
            VariableDefinition::auxiliary("internal_energy", "J/m^3", Dimensionality::Column);
        let result = merge_definitions([vec![energy()], vec![conflicting]]);
        assert!(matches!(
            result,
            Err(ModelError::DuplicateVariable { name }) if name == "internal_energy"
        ));
    }

    #[test]
    fn descriptions_do_not_affect_identity() {
        let described = energy().with_description("volumetric internal energy");
        let merged = merge_definitions([vec![energy()], vec![described]]).unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn definition_serialization_round_trips() {
        let var = energy().with_description("volumetric internal energy");
        let json = serde_json::to_string(&var).unwrap();
        let deserialized: VariableDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, var);
    }
}
