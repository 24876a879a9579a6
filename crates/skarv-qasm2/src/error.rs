//! Error types for the QASM2 loader.

use thiserror::Error;

/// Errors that can occur while loading a circuit description.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Failed to read the input file.
    #[error("Failed to read circuit file: {0}")]
    Io(#[from] std::io::Error),

    /// Lexer error (invalid token).
    #[error("Lexer error at line {line}: {message}")]
    LexerError { line: usize, message: String },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// Invalid or missing version header.
    #[error("Invalid OPENQASM version: {0} (expected 2.0)")]
    InvalidVersion(String),

    /// Unknown include file.
    #[error("Unknown include: {0} (only \"qelib1.inc\" is built in)")]
    UnknownInclude(String),

    /// Unknown gate name.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// Undefined register.
    #[error("Undefined register: {0}")]
    UndefinedRegister(String),

    /// Duplicate declaration.
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// Wrong number of qubit arguments.
    #[error("Gate '{gate}' expects {expected} qubits, got {got}")]
    WrongQubitCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Wrong number of parameters.
    #[error("Gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Index out of bounds.
    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: u32,
        size: u32,
    },

    /// Register operands of mismatched size in one statement.
    #[error("Register broadcast mismatch: {0}")]
    BroadcastMismatch(String),

    /// Unknown identifier in a parameter expression.
    #[error("Undefined identifier in expression: {0}")]
    UndefinedIdentifier(String),

    /// Construct the loader does not support.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] skarv_ir::IrError),
}

/// Result type for loading operations.
pub type ParseResult<T> = Result<T, ParseError>;
