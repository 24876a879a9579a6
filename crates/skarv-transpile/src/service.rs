//! The transpiler seam.

use skarv_ir::Circuit;

use crate::error::TranspileResult;
use crate::options::TranspileOptions;

/// A circuit transpiler.
///
/// Implementations take a loaded circuit and produce a new circuit whose
/// gates satisfy the constraints in the options; the input is never
/// modified. Measurements, resets, and barriers survive every
/// implementation unchanged.
pub trait Transpiler {
    /// Transpile a circuit under the given options.
    fn transpile(&self, circuit: &Circuit, options: &TranspileOptions) -> TranspileResult<Circuit>;
}
