//! Skarv Circuit Intermediate Representation
//!
//! This crate provides the in-memory circuit model shared by the loader and
//! the transpilation service: an ordered sequence of instructions over a
//! fixed-size qubit register, plus the operation-count summaries the demo
//! driver reports.
//!
//! # Example
//!
//! ```rust
//! use skarv_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit
//!     .h(QubitId(0)).unwrap()
//!     .cx(QubitId(0), QubitId(1)).unwrap()
//!     .measure(QubitId(0), ClbitId(0)).unwrap()
//!     .measure(QubitId(1), ClbitId(1)).unwrap();
//!
//! let counts = circuit.count_ops();
//! assert_eq!(counts.get("cx"), 1);
//! assert_eq!(counts.get("measure"), 2);
//! ```

pub mod circuit;
pub mod counts;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use counts::OpCounts;
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
