//! Per-call transpilation options.

use crate::target::{BasisGates, Target};

/// Highest supported optimization level.
pub const MAX_OPTIMIZATION_LEVEL: u8 = 3;

/// Options for a single transpile call.
///
/// At least one of `basis_gates` and `target` must be set; when both are,
/// the target's native gate set wins.
#[derive(Debug, Clone, Default)]
pub struct TranspileOptions {
    basis_gates: Option<BasisGates>,
    target: Option<Target>,
    seed: Option<u64>,
    optimization_level: u8,
}

impl TranspileOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict output to a basis gate set.
    #[must_use]
    pub fn with_basis_gates(mut self, basis: BasisGates) -> Self {
        self.basis_gates = Some(basis);
        self
    }

    /// Compile for a target device.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Seed the layout selection.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the optimization level, clamped to [`MAX_OPTIMIZATION_LEVEL`].
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(MAX_OPTIMIZATION_LEVEL);
        self
    }

    /// The requested basis gate set, if any.
    pub fn basis_gates(&self) -> Option<&BasisGates> {
        self.basis_gates.as_ref()
    }

    /// The requested target, if any.
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// The layout seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// The optimization level.
    pub fn optimization_level(&self) -> u8 {
        self.optimization_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TranspileOptions::new();
        assert!(options.basis_gates().is_none());
        assert!(options.target().is_none());
        assert!(options.seed().is_none());
        assert_eq!(options.optimization_level(), 0);
    }

    #[test]
    fn test_level_clamped() {
        let options = TranspileOptions::new().with_optimization_level(7);
        assert_eq!(options.optimization_level(), 3);
    }

    #[test]
    fn test_builder() {
        let options = TranspileOptions::new()
            .with_basis_gates(BasisGates::new(["u3", "cx"]))
            .with_seed(11)
            .with_optimization_level(3);
        assert_eq!(options.seed(), Some(11));
        assert_eq!(options.optimization_level(), 3);
        assert!(options.basis_gates().is_some_and(|b| b.contains("cx")));
    }
}
