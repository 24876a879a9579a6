//! A stand-in transpiler: basis rewriting plus a seeded trivial layout.
//!
//! This is not an optimizing compiler. Gates outside the requested basis
//! are rewritten through fixed `qelib1` decompositions until every gate is
//! native; when a target is given, the circuit is widened onto the device
//! and its qubits are placed by a seeded permutation. No routing or gate
//! cancellation happens, so op counts reflect decomposition alone.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use skarv_ir::{Circuit, Gate, Instruction, InstructionKind, QubitId, StandardGate};

use crate::error::{TranspileError, TranspileResult};
use crate::options::TranspileOptions;
use crate::service::Transpiler;
use crate::target::BasisGates;

/// The stand-in transpiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockTranspiler;

impl MockTranspiler {
    /// Create a new transpiler.
    pub fn new() -> Self {
        Self
    }

    /// Rewrite one gate into the basis, appending the result.
    fn rewrite_gate(
        &self,
        out: &mut Vec<(StandardGate, Vec<QubitId>)>,
        gate: &StandardGate,
        qubits: &[QubitId],
        basis: &BasisGates,
    ) -> TranspileResult<()> {
        if basis.contains(gate.name()) {
            out.push((gate.clone(), qubits.to_vec()));
            return Ok(());
        }

        let Some(substitution) = substitute(gate) else {
            return Err(TranspileError::UnsupportedGate {
                gate: gate.name().to_string(),
                basis: basis.to_string(),
            });
        };

        for (sub_gate, operand_slots) in substitution {
            let sub_qubits: Vec<QubitId> = operand_slots
                .iter()
                .map(|&slot| qubits[slot as usize])
                .collect();
            self.rewrite_gate(out, &sub_gate, &sub_qubits, basis)?;
        }
        Ok(())
    }
}

impl Transpiler for MockTranspiler {
    fn transpile(&self, circuit: &Circuit, options: &TranspileOptions) -> TranspileResult<Circuit> {
        let basis = options
            .target()
            .map(|t| t.basis())
            .or_else(|| options.basis_gates())
            .ok_or(TranspileError::MissingConstraints)?;

        debug!(
            circuit = circuit.name(),
            level = options.optimization_level(),
            seed = options.seed(),
            target = options.target().map(|t| t.name()),
            "transpiling"
        );

        // Layout: with a target the circuit widens to the device and its
        // qubits are placed by a seeded permutation of the physical qubits.
        let (num_qubits, layout) = match options.target() {
            Some(target) => {
                if circuit.num_qubits() > target.num_qubits() {
                    return Err(TranspileError::TargetTooSmall {
                        circuit: circuit.num_qubits(),
                        target: target.name().to_string(),
                        available: target.num_qubits(),
                    });
                }
                let mut rng = StdRng::seed_from_u64(options.seed().unwrap_or(0));
                let mut physical: Vec<u32> = (0..target.num_qubits()).collect();
                physical.shuffle(&mut rng);
                (target.num_qubits(), Some(physical))
            }
            None => (circuit.num_qubits(), None),
        };
        let place = |q: QubitId| match &layout {
            Some(physical) => QubitId(physical[q.0 as usize]),
            None => q,
        };

        let mut output = Circuit::with_size(circuit.name(), num_qubits, circuit.num_clbits());

        for inst in circuit.instructions() {
            let qubits: Vec<QubitId> = inst.qubits.iter().copied().map(place).collect();
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    let mut rewritten = Vec::with_capacity(1);
                    self.rewrite_gate(&mut rewritten, &gate.gate, &qubits, basis)?;
                    for (sub_gate, sub_qubits) in rewritten {
                        let mut out_gate = Gate::new(sub_gate);
                        if let Some(condition) = &gate.condition {
                            out_gate = out_gate.with_condition(condition.clone());
                        }
                        output.apply(Instruction::gate(out_gate, sub_qubits))?;
                    }
                }
                InstructionKind::Measure => {
                    output.apply(Instruction::measure(qubits[0], inst.clbits[0]))?;
                }
                InstructionKind::Reset => {
                    output.apply(Instruction::reset(qubits[0]))?;
                }
                InstructionKind::Barrier => {
                    output.apply(Instruction::barrier(qubits))?;
                }
            }
        }

        debug!(
            input_ops = circuit.len(),
            output_ops = output.len(),
            "transpile finished"
        );
        Ok(output)
    }
}

/// Fixed `qelib1` decomposition of one gate.
///
/// Each entry is a gate plus the operand slots (indices into the original
/// gate's qubits) it acts on. `None` means the gate is a base gate with no
/// decomposition; an empty list means the gate vanishes.
fn substitute(gate: &StandardGate) -> Option<Vec<(StandardGate, Vec<u8>)>> {
    use StandardGate::*;

    let subs = match gate {
        I => vec![],
        X => vec![(U3(PI, 0.0, PI), vec![0])],
        Y => vec![(U3(PI, FRAC_PI_2, FRAC_PI_2), vec![0])],
        Z => vec![(U1(PI), vec![0])],
        H => vec![(U2(0.0, PI), vec![0])],
        S => vec![(U1(FRAC_PI_2), vec![0])],
        Sdg => vec![(U1(-FRAC_PI_2), vec![0])],
        T => vec![(U1(FRAC_PI_4), vec![0])],
        Tdg => vec![(U1(-FRAC_PI_4), vec![0])],
        Rx(theta) => vec![(U3(*theta, -FRAC_PI_2, FRAC_PI_2), vec![0])],
        Ry(theta) => vec![(U3(*theta, 0.0, 0.0), vec![0])],
        Rz(lambda) => vec![(U1(*lambda), vec![0])],
        U1(lambda) => vec![(U3(0.0, 0.0, *lambda), vec![0])],
        U2(phi, lambda) => vec![(U3(FRAC_PI_2, *phi, *lambda), vec![0])],

        // Base gates: everything above bottoms out here.
        U3(..) | CX => return None,

        CY => vec![(Sdg, vec![1]), (CX, vec![0, 1]), (S, vec![1])],
        CZ => vec![(H, vec![1]), (CX, vec![0, 1]), (H, vec![1])],
        CH => vec![
            (H, vec![1]),
            (Sdg, vec![1]),
            (CX, vec![0, 1]),
            (H, vec![1]),
            (T, vec![1]),
            (CX, vec![0, 1]),
            (T, vec![1]),
            (H, vec![1]),
            (S, vec![1]),
            (X, vec![1]),
            (S, vec![0]),
        ],
        Swap => vec![(CX, vec![0, 1]), (CX, vec![1, 0]), (CX, vec![0, 1])],
        CRz(lambda) => vec![
            (U1(lambda / 2.0), vec![1]),
            (CX, vec![0, 1]),
            (U1(-lambda / 2.0), vec![1]),
            (CX, vec![0, 1]),
        ],
        CU1(lambda) => vec![
            (U1(lambda / 2.0), vec![0]),
            (CX, vec![0, 1]),
            (U1(-lambda / 2.0), vec![1]),
            (CX, vec![0, 1]),
            (U1(lambda / 2.0), vec![1]),
        ],
        CU3(theta, phi, lambda) => vec![
            (U1((lambda + phi) / 2.0), vec![0]),
            (U1((lambda - phi) / 2.0), vec![1]),
            (CX, vec![0, 1]),
            (U3(-theta / 2.0, 0.0, -(phi + lambda) / 2.0), vec![1]),
            (CX, vec![0, 1]),
            (U3(theta / 2.0, *phi, 0.0), vec![1]),
        ],
        CCX => vec![
            (H, vec![2]),
            (CX, vec![1, 2]),
            (Tdg, vec![2]),
            (CX, vec![0, 2]),
            (T, vec![2]),
            (CX, vec![1, 2]),
            (Tdg, vec![2]),
            (CX, vec![0, 2]),
            (T, vec![1]),
            (T, vec![2]),
            (H, vec![2]),
            (CX, vec![0, 1]),
            (T, vec![0]),
            (Tdg, vec![1]),
            (CX, vec![0, 1]),
        ],
        CSwap => vec![(CX, vec![2, 1]), (CCX, vec![0, 1, 2]), (CX, vec![2, 1])],
    };
    Some(subs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Target;
    use skarv_ir::ClbitId;

    fn demo_basis() -> BasisGates {
        BasisGates::new(["u3", "t", "tdg", "s", "sdg", "cx", "x", "y", "z", "h"])
    }

    #[test]
    fn test_missing_constraints() {
        let circuit = Circuit::bell().unwrap();
        let err = MockTranspiler::new()
            .transpile(&circuit, &TranspileOptions::new())
            .unwrap_err();
        assert!(matches!(err, TranspileError::MissingConstraints));
    }

    #[test]
    fn test_native_gates_kept() {
        let circuit = Circuit::bell().unwrap();
        let options = TranspileOptions::new().with_basis_gates(demo_basis());
        let out = MockTranspiler::new().transpile(&circuit, &options).unwrap();

        let counts = out.count_ops();
        assert_eq!(counts.get("h"), 1);
        assert_eq!(counts.get("cx"), 1);
        assert_eq!(counts.get("measure"), 2);
    }

    #[test]
    fn test_h_rewritten_to_u3_basis() {
        let mut circuit = Circuit::with_size("test", 1, 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let options =
            TranspileOptions::new().with_basis_gates(BasisGates::new(["u1", "u2", "u3", "cx"]));
        let out = MockTranspiler::new().transpile(&circuit, &options).unwrap();

        let counts = out.count_ops();
        assert_eq!(counts.get("u2"), 1);
        assert_eq!(counts.get("measure"), 1);
        assert!(!counts.contains("h"));
    }

    #[test]
    fn test_swap_decomposes_to_three_cx() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.swap(QubitId(0), QubitId(1)).unwrap();

        let options = TranspileOptions::new().with_basis_gates(BasisGates::new(["u3", "cx"]));
        let out = MockTranspiler::new().transpile(&circuit, &options).unwrap();
        assert_eq!(out.count_ops().get("cx"), 3);
    }

    #[test]
    fn test_toffoli_decomposition_closed() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();

        let options = TranspileOptions::new().with_basis_gates(BasisGates::new(["u3", "cx"]));
        let out = MockTranspiler::new().transpile(&circuit, &options).unwrap();

        for inst in out.instructions() {
            let gate = inst.as_gate().unwrap();
            assert!(matches!(gate.gate, StandardGate::U3(..) | StandardGate::CX));
        }
        assert_eq!(out.count_ops().get("cx"), 6);
    }

    #[test]
    fn test_identity_dropped_outside_basis() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit
            .apply(Instruction::single_qubit_gate(StandardGate::I, QubitId(0)))
            .unwrap();

        let options = TranspileOptions::new().with_basis_gates(BasisGates::new(["u3", "cx"]));
        let out = MockTranspiler::new().transpile(&circuit, &options).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_unsupported_gate() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.h(QubitId(0)).unwrap();

        // No path from h down to a basis containing only z.
        let options = TranspileOptions::new().with_basis_gates(BasisGates::new(["z"]));
        let err = MockTranspiler::new()
            .transpile(&circuit, &options)
            .unwrap_err();
        assert!(matches!(err, TranspileError::UnsupportedGate { .. }));
    }

    #[test]
    fn test_target_widens_circuit() {
        let circuit = Circuit::bell().unwrap();
        let options = TranspileOptions::new()
            .with_target(Target::tokyo())
            .with_seed(11);
        let out = MockTranspiler::new().transpile(&circuit, &options).unwrap();

        assert_eq!(out.num_qubits(), 20);
        assert_eq!(out.num_clbits(), 2);
        assert_eq!(out.count_ops().get("measure"), 2);
    }

    #[test]
    fn test_target_too_small() {
        let circuit = Circuit::ghz(25).unwrap();
        let options = TranspileOptions::new().with_target(Target::tokyo());
        let err = MockTranspiler::new()
            .transpile(&circuit, &options)
            .unwrap_err();
        assert!(matches!(
            err,
            TranspileError::TargetTooSmall {
                circuit: 25,
                available: 20,
                ..
            }
        ));
    }

    #[test]
    fn test_seeded_layout_deterministic() {
        let circuit = Circuit::ghz(5).unwrap();
        let options = TranspileOptions::new()
            .with_target(Target::tokyo())
            .with_seed(11);

        let a = MockTranspiler::new().transpile(&circuit, &options).unwrap();
        let b = MockTranspiler::new().transpile(&circuit, &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let circuit = Circuit::ghz(5).unwrap();
        let base = TranspileOptions::new().with_target(Target::tokyo());

        let a = MockTranspiler::new()
            .transpile(&circuit, &base.clone().with_seed(11))
            .unwrap();
        let b = MockTranspiler::new()
            .transpile(&circuit, &base.with_seed(12))
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_condition_survives_decomposition() {
        use skarv_ir::ClassicalCondition;

        let mut circuit = Circuit::with_size("test", 1, 1);
        let gate = Gate::new(StandardGate::Y).with_condition(ClassicalCondition::new("c", 1));
        circuit.apply(Instruction::gate(gate, [QubitId(0)])).unwrap();

        let options = TranspileOptions::new().with_basis_gates(BasisGates::new(["u3", "cx"]));
        let out = MockTranspiler::new().transpile(&circuit, &options).unwrap();

        assert_eq!(out.len(), 1);
        let rewritten = out.instructions()[0].as_gate().unwrap();
        assert!(rewritten.condition.is_some());
    }

    #[test]
    fn test_target_basis_wins_over_basis_gates() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.h(QubitId(0)).unwrap();

        // h is in the explicit basis, but the target's native set rules.
        let options = TranspileOptions::new()
            .with_basis_gates(demo_basis())
            .with_target(Target::tokyo());
        let out = MockTranspiler::new().transpile(&circuit, &options).unwrap();
        assert_eq!(out.count_ops().get("u2"), 1);
        assert!(!out.count_ops().contains("h"));
    }
}
