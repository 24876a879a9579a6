//! Error types for transpilation.

use thiserror::Error;

/// Errors that can occur during transpilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranspileError {
    /// Neither a basis nor a target was given.
    #[error("Transpilation needs a basis gate set or a target device")]
    MissingConstraints,

    /// The circuit does not fit on the target device.
    #[error("Circuit needs {circuit} qubits but target '{target}' has {available}")]
    TargetTooSmall {
        circuit: u32,
        target: String,
        available: u32,
    },

    /// A gate cannot be rewritten into the requested basis.
    #[error("Gate '{gate}' cannot be rewritten into basis [{basis}]")]
    UnsupportedGate { gate: String, basis: String },

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] skarv_ir::IrError),
}

/// Result type for transpilation operations.
pub type TranspileResult<T> = Result<T, TranspileError>;
