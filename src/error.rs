use nuts_rs::LogpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrdinalError>;

#[derive(Debug, Error)]
pub enum OrdinalError {
    #[error("ordinal model needs at least 2 classes, got {n_classes}")]
    InvalidClassCount { n_classes: usize },

    #[error("cutpoints must be strictly increasing: c[{index}] = {next} does not exceed {prev}")]
    NotStrictlyIncreasing { index: usize, prev: f64, next: f64 },

    #[error("{what}: expected length {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("observation {row} has class {class}, but the model has {n_classes} classes")]
    ClassOutOfRange {
        row: usize,
        class: usize,
        n_classes: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("sampler failed: {0}")]
    Sampler(#[from] anyhow::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

// The density might fail in a recoverable or non-recoverable manner...
#[derive(Debug, Error)]
pub enum PosteriorLogpError {
    #[error("log density is not finite ({0})")]
    NonFinite(f64),
}

impl LogpError for PosteriorLogpError {
    fn is_recoverable(&self) -> bool {
        match self {
            // NUTS treats this as a divergent proposal and moves on.
            Self::NonFinite(_) => true,
        }
    }
}
