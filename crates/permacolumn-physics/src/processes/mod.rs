//! The standard processes.
//!
//! A model dispatches to its processes in a fixed order; a process may read
//! auxiliary values only from processes earlier in that order. The standard
//! order is:
//!
//! 1. [`Stratigraphy`] — composition profiles from the layer table
//! 2. [`Hydrology`] — pore saturation and the surface water store
//! 3. [`EnergyBalance`] — heat conduction with freeze/thaw
//! 4. [`Biogeochemistry`] — decomposition of soil organic carbon

mod biogeochemistry;
mod energy;
mod hydrology;
mod stratigraphy;

pub use biogeochemistry::Biogeochemistry;
pub use energy::EnergyBalance;
pub use hydrology::Hydrology;
pub use stratigraphy::Stratigraphy;
