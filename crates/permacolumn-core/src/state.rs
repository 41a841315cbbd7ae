//! The model state container.
//!
//! A [`StateContainer`] owns one array per declared variable, keyed by flat
//! name and partitioned into prognostic, auxiliary, input and tendency
//! groups, together with the simulation clock. It is allocated once per run
//! from the merged variable declarations and its schema is never
//! restructured afterwards.
//!
//! The container is a plain aggregate of independent arrays with a clock and
//! holds no hidden references, so an external checkpointing layer can
//! deep-copy (`Clone`) and restore it without cooperation from this crate.

use crate::errors::{ModelError, ModelResult};
use crate::grid::ColumnGrid;
use crate::variable::{merge_definitions, Dimensionality, VariableDefinition, VariableRole};
use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

pub type FloatValue = f64;
pub type Time = f64;

/// Role and extent of one allocated variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub role: VariableRole,
    pub dims: Dimensionality,
}

/// Fixed mapping from variable name to storage layout, built once at
/// allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSchema {
    records: HashMap<String, VariableRecord>,
    /// Declaration order, preserved for deterministic iteration.
    order: Vec<String>,
}

impl StateSchema {
    fn from_definitions(definitions: &[VariableDefinition]) -> Self {
        let mut records = HashMap::with_capacity(definitions.len());
        let mut order = Vec::with_capacity(definitions.len());
        for definition in definitions {
            records.insert(
                definition.name.clone(),
                VariableRecord {
                    role: definition.role,
                    dims: definition.dims,
                },
            );
            order.push(definition.name.clone());
        }
        Self { records, order }
    }

    pub fn record(&self, name: &str) -> Option<&VariableRecord> {
        self.records.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn names_with_role(&self, role: VariableRole) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .map(String::as_str)
            .filter(move |name| self.records[*name].role == role)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Owns the arrays for every declared variable plus the simulation clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateContainer {
    schema: Arc<StateSchema>,
    values: HashMap<String, Array1<FloatValue>>,
    /// One buffer per prognostic variable, zeroed before each accumulation
    /// pass.
    tendencies: HashMap<String, Array1<FloatValue>>,
    time: Time,
    step: u64,
}

impl StateContainer {
    /// Allocate storage for the given declarations on a grid.
    ///
    /// Column variables get one value per grid cell, surface variables a
    /// single value. Every prognostic variable additionally gets a tendency
    /// buffer of identical shape. Derived quantities of an attached closure
    /// are allocated as ordinary auxiliary variables; a closure attached to
    /// a non-prognostic variable is a configuration error.
    pub fn allocate(definitions: &[VariableDefinition], grid: &ColumnGrid) -> ModelResult<Self> {
        let mut expanded: Vec<Vec<VariableDefinition>> = vec![definitions.to_vec()];
        for definition in definitions {
            if let Some(closure) = &definition.closure {
                if definition.role != VariableRole::Prognostic {
                    return Err(ModelError::InvalidConfiguration(format!(
                        "closure '{}' attached to {} variable '{}'; closures require a prognostic variable",
                        closure.name(),
                        definition.role,
                        definition.name
                    )));
                }
                expanded.push(closure.derived_variables());
            }
        }
        let merged = merge_definitions(expanded)?;

        let shape_for = |dims: Dimensionality| match dims {
            Dimensionality::Column => grid.n_cells(),
            Dimensionality::Surface => 1,
        };

        let mut values = HashMap::with_capacity(merged.len());
        let mut tendencies = HashMap::new();
        for definition in &merged {
            values.insert(
                definition.name.clone(),
                Array1::zeros(shape_for(definition.dims)),
            );
            if definition.role == VariableRole::Prognostic {
                tendencies.insert(
                    definition.name.clone(),
                    Array1::zeros(shape_for(definition.dims)),
                );
            }
        }

        Ok(Self {
            schema: Arc::new(StateSchema::from_definitions(&merged)),
            values,
            tendencies,
            time: 0.0,
            step: 0,
        })
    }

    pub fn schema(&self) -> &StateSchema {
        &self.schema
    }

    /// Look up a variable by flat name, regardless of role.
    pub fn get(&self, name: &str) -> ModelResult<&Array1<FloatValue>> {
        self.values.get(name).ok_or_else(|| ModelError::UnknownVariable {
            name: name.to_string(),
        })
    }

    pub fn get_mut(&mut self, name: &str) -> ModelResult<&mut Array1<FloatValue>> {
        self.values
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Value of a surface variable (or the first cell of a column variable).
    pub fn get_scalar(&self, name: &str) -> ModelResult<FloatValue> {
        Ok(self.get(name)?[0])
    }

    pub fn set_scalar(&mut self, name: &str, value: FloatValue) -> ModelResult<()> {
        self.get_mut(name)?[0] = value;
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Tendency buffer of a prognostic variable.
    pub fn tendency(&self, name: &str) -> ModelResult<&Array1<FloatValue>> {
        self.tendencies
            .get(name)
            .ok_or_else(|| ModelError::UnknownVariable {
                name: name.to_string(),
            })
    }

    pub fn tendency_mut(&mut self, name: &str) -> ModelResult<&mut Array1<FloatValue>> {
        self.tendencies
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Add a contribution to a tendency buffer.
    ///
    /// Contributions accumulate additively; a process never overwrites
    /// another process's contribution to a shared tendency.
    pub fn accumulate_tendency(
        &mut self,
        name: &str,
        contribution: &Array1<FloatValue>,
    ) -> ModelResult<()> {
        let tendency = self.tendency_mut(name)?;
        Zip::from(tendency)
            .and(contribution)
            .for_each(|t, c| *t += c);
        Ok(())
    }

    pub fn zero_tendencies(&mut self) {
        for tendency in self.tendencies.values_mut() {
            tendency.fill(0.0);
        }
    }

    /// Elementwise `u <- u + dt * du/dt` for every prognostic variable.
    pub fn apply_explicit_update(&mut self, dt: Time) {
        for (name, tendency) in &self.tendencies {
            let values = self
                .values
                .get_mut(name)
                .expect("schema invariant: every tendency has a value array");
            values.scaled_add(dt, tendency);
        }
    }

    /// Replace each tendency with the mean of it and `other`'s.
    ///
    /// Used by multi-stage schemes to average stage tendencies; `other` must
    /// share this container's schema.
    pub fn average_tendencies_with(&mut self, other: &StateContainer) -> ModelResult<()> {
        for (name, tendency) in self.tendencies.iter_mut() {
            let stage = other
                .tendencies
                .get(name)
                .ok_or_else(|| ModelError::UnknownVariable { name: name.clone() })?;
            Zip::from(tendency).and(stage).for_each(|t, s| *t = 0.5 * (*t + *s));
        }
        Ok(())
    }

    pub fn prognostic_names(&self) -> impl Iterator<Item = &str> {
        self.schema.names_with_role(VariableRole::Prognostic)
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn advance(&mut self, dt: Time) {
        self.time += dt;
        self.step += 1;
    }
}

impl Index<&str> for StateContainer {
    type Output = Array1<FloatValue>;

    /// Panics if the variable is unknown; use [`StateContainer::get`] for a
    /// fallible lookup.
    fn index(&self, name: &str) -> &Self::Output {
        self.get(name).expect("unknown variable")
    }
}
