use std::error::Error;
use std::fmt::{
    Display,
    Formatter,
};

/// Invalid or missing key in the configuration of a preprocessing call.
///
/// Returned inside an [`anyhow::Error`]; use
/// `err.downcast_ref::<ConfigurationError>()` to match on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Batch key is not a column of the row annotations.
    InvalidBatchKey(String),
    /// Layer key is not among the registered layers.
    InvalidLayerKey(String),
    /// Cell measurement name is not registered.
    InvalidMeasurementKey(String),
    /// One column name is used for two different columns of a call.
    DuplicateKey(String),
    /// Batch column holds a null label at the given row.
    NullBatchLabel { key: String, row: usize },
    /// Component row count differs from the primary matrix.
    ShapeMismatch {
        what:     String,
        expected: usize,
        actual:   usize,
    },
}

impl Display for ConfigurationError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ConfigurationError::InvalidBatchKey(key) => {
                write!(f, "batch_key '{}' not valid key in obs dataframe", key)
            },
            ConfigurationError::InvalidLayerKey(key) => {
                write!(f, "layer_key '{}' not a valid key for layers", key)
            },
            ConfigurationError::InvalidMeasurementKey(key) => {
                write!(f, "'{}' is not a registered cell measurement", key)
            },
            ConfigurationError::DuplicateKey(key) => {
                write!(f, "key '{}' is used for more than one column", key)
            },
            ConfigurationError::NullBatchLabel { key, row } => {
                write!(f, "batch column '{}' has a null label at row {}", key, row)
            },
            ConfigurationError::ShapeMismatch {
                what,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{} has {} rows, expected {}",
                    what, actual, expected
                )
            },
        }
    }
}

impl Error for ConfigurationError {}
