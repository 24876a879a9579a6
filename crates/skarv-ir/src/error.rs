//! Error types for the circuit IR.

use thiserror::Error;

use crate::qubit::{ClbitId, QubitId};

/// Errors that can occur while building circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A qubit operand is outside the circuit's register.
    #[error("Qubit {qubit} out of range for circuit with {num_qubits} qubits")]
    QubitOutOfRange { qubit: QubitId, num_qubits: u32 },

    /// A classical bit operand is outside the circuit's register.
    #[error("Classical bit {clbit} out of range for circuit with {num_clbits} bits")]
    ClbitOutOfRange { clbit: ClbitId, num_clbits: u32 },

    /// The same qubit appears twice in one instruction's operands.
    #[error("Duplicate qubit operand {qubit} in instruction '{name}'")]
    DuplicateOperand { name: String, qubit: QubitId },

    /// An instruction received the wrong number of qubit operands.
    #[error("Instruction '{name}' expects {expected} qubits, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
