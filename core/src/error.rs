use crate::sample::PartitionKey;
use thiserror::Error;

/// Why a single raw record could not become a `CostSample`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleDefect {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Malformed sample #{index} in {partition}: {source}")]
    MalformedSample {
        partition: PartitionKey,
        index: usize,
        #[source]
        source: SampleDefect,
    },

    /// Input JSON could not be parsed into the expected shape.
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    /// An export could not be encoded as JSON.
    #[error("Serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Insufficient data in {partition}: {found} samples, at least {required} required")]
    InsufficientData {
        partition: PartitionKey,
        found: usize,
        required: usize,
    },

    #[error("Division by zero while computing '{metric}'")]
    DivisionByZero { metric: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Report rendering failed: {0}")]
    Render(#[from] std::fmt::Error),
}

impl AnalysisError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

pub type CoreResult<T> = Result<T, AnalysisError>;
