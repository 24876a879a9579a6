//! Transpilation for Skarv
//!
//! Rewrites [`skarv_ir::Circuit`] values toward a basis gate set or a
//! target device. The seam is the [`Transpiler`] trait; the one shipped
//! implementation, [`MockTranspiler`], does fixed basis decomposition and
//! seeded trivial layout rather than real optimization, which is enough to
//! drive op-count comparisons end to end.
//!
//! # Example
//!
//! ```rust
//! use skarv_ir::Circuit;
//! use skarv_transpile::{Target, TranspileOptions, transpile};
//!
//! let circuit = Circuit::bell().unwrap();
//!
//! let options = TranspileOptions::new()
//!     .with_target(Target::tokyo())
//!     .with_seed(11)
//!     .with_optimization_level(3);
//!
//! let mapped = transpile(&circuit, &options).unwrap();
//! assert_eq!(mapped.num_qubits(), 20);
//! ```

mod error;
mod mock;
mod options;
mod service;
mod target;

pub use error::{TranspileError, TranspileResult};
pub use mock::MockTranspiler;
pub use options::{MAX_OPTIMIZATION_LEVEL, TranspileOptions};
pub use service::Transpiler;
pub use target::{BasisGates, CouplingGraph, Target};

use skarv_ir::Circuit;

/// Transpile a circuit with the default transpiler.
pub fn transpile(circuit: &Circuit, options: &TranspileOptions) -> TranspileResult<Circuit> {
    MockTranspiler::new().transpile(circuit, options)
}
