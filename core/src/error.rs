use crate::kernel::KernelOpError;
use thiserror::Error;

/// Errors raised by the decomposition pipeline.
///
/// Kernel failures are wrapped unchanged; the pipeline never retries them.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("entity name '{name}' has no valid index after label '{label}'")]
    MalformedName { name: String, label: String },

    #[error("only one open region is allowed, found {0}")]
    MultipleOpenRegions(usize),

    #[error("closed problem has no enclosure conductor (Conductor_0)")]
    MissingEnclosure,

    /// Never returned by the pipeline itself; degenerate geometry is logged
    /// and meshing is left to fail on its own.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error(transparent)]
    Kernel(#[from] KernelOpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
