//! Process parameters.
//!
//! This module contains parameter structures for all standard processes.
//! Each struct provides defaults describing a moist, organic-topped mineral
//! soil column and is deserializable from the model configuration file.

mod biogeochemistry;
mod energy;
mod hydrology;
mod stratigraphy;

pub use biogeochemistry::BiogeochemistryParameters;
pub use energy::{EnergyParameters, UpperBoundary};
pub use hydrology::HydrologyParameters;
pub use stratigraphy::{SoilLayer, StratigraphyParameters};
