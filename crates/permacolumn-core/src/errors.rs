use thiserror::Error;

/// Error type for invalid operations.
///
/// Configuration errors are raised eagerly, at construction time, so that an
/// invalid physical state can never reach a flux computation. A
/// [`ModelError::StepFailure`] means the whole step is treated as not having
/// happened; it is never retried automatically.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("variable '{name}' is declared more than once with conflicting definitions")]
    DuplicateVariable { name: String },
    #[error("{quantity} must lie within [0, 1], got {value}")]
    FractionOutOfRange { quantity: String, value: f64 },
    #[error("constituent heat capacities must be strictly positive")]
    DegenerateHeatCapacity,
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },
    #[error("invalid model configuration: {0}")]
    InvalidConfiguration(String),
    #[error("step starting at t={time} s failed: {source}")]
    StepFailure {
        time: f64,
        #[source]
        source: Box<ModelError>,
    },
}

/// Convenience type for `Result<T, ModelError>`.
pub type ModelResult<T> = Result<T, ModelError>;
