// Circuit scheduler: layers records by depth, pairs two-qubit gates and runs
// the resulting operations through the engine.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace, warn};

use crate::circuit::{Circuit, Gate};
use crate::config::{ConflictPolicy, SimulatorConfig};
use crate::engine::{apply_cnot, apply_gate, apply_swap};
use crate::error::Result;
use crate::gates::GateKind;
use crate::measurement::{analyze, MeasurementResult};
use crate::state::StateVector;

/// A resolved action on the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// One of H, X, Y, Z, S, T.
    Single { kind: GateKind, qubit: usize },
    Cnot { control: usize, target: usize },
    Swap { a: usize, b: usize },
    /// Reported only; probabilities are evaluated analytically.
    Measure { qubit: usize },
}

/// All operations of one depth, in the order they are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub depth: usize,
    pub ops: Vec<Operation>,
}

/// Group `circuit.gates` by depth and resolve each layer into operations.
///
/// Does not validate; call `Circuit::validate` first when the input is
/// untrusted.
pub fn schedule(circuit: &Circuit, policy: ConflictPolicy) -> Vec<Layer> {
    let mut by_depth: BTreeMap<usize, Vec<&Gate>> = BTreeMap::new();
    for g in &circuit.gates {
        by_depth.entry(g.depth).or_default().push(g);
    }
    by_depth
        .into_iter()
        .map(|(depth, gates)| Layer {
            depth,
            ops: resolve_layer(&gates, policy),
        })
        .collect()
}

/// Marks single-qubit gate records that a later one on the same qubit
/// replaces. MEASURE records never take part.
fn overridden_records(layer: &[&Gate]) -> Vec<bool> {
    let mut seen = HashSet::new();
    let mut overridden = vec![false; layer.len()];
    for (i, g) in layer.iter().enumerate().rev() {
        if g.kind.matrix().is_some() && !seen.insert(g.qubit) {
            overridden[i] = true;
        }
    }
    overridden
}

fn resolve_layer(layer: &[&Gate], policy: ConflictPolicy) -> Vec<Operation> {
    let overridden = match policy {
        ConflictPolicy::LastWins => overridden_records(layer),
        ConflictPolicy::Reject => vec![false; layer.len()],
    };
    let mut consumed = vec![false; layer.len()];
    let mut ops = Vec::with_capacity(layer.len());

    for i in 0..layer.len() {
        if consumed[i] {
            continue;
        }
        let g = layer[i];
        consumed[i] = true;

        if g.kind.is_two_qubit() {
            let partner = (0..layer.len())
                .find(|&j| !consumed[j] && layer[j].kind == g.kind && layer[j].qubit != g.qubit);
            let Some(j) = partner else {
                debug!("Dropping unpaired {} on qubit {} at depth {}", g.kind, g.qubit, g.depth);
                continue;
            };
            consumed[j] = true;
            let other = layer[j].qubit;
            ops.push(match g.kind {
                GateKind::Cnot => Operation::Cnot {
                    control: g.qubit.min(other),
                    target: g.qubit.max(other),
                },
                _ => Operation::Swap { a: g.qubit, b: other },
            });
        } else if overridden[i] {
            debug!(
                "Skipping {} on qubit {} at depth {}: replaced by a later gate",
                g.kind, g.qubit, g.depth
            );
        } else if g.kind == GateKind::Measure {
            ops.push(Operation::Measure { qubit: g.qubit });
        } else {
            ops.push(Operation::Single {
                kind: g.kind,
                qubit: g.qubit,
            });
        }
    }
    ops
}

/// Apply one operation, returning the new state. `Measure` leaves it as is.
pub fn apply_operation(state: StateVector, op: Operation) -> StateVector {
    match op {
        Operation::Single { kind, qubit } => apply_gate(&state, kind, qubit),
        Operation::Cnot { control, target } => apply_cnot(&state, control, target),
        Operation::Swap { a, b } => apply_swap(&state, a, b),
        Operation::Measure { .. } => state,
    }
}

// ---- Simulator ----

/// Validates circuits and runs them from `|0...0>`.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Simulator { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    fn execute(&self, circuit: &Circuit) -> Result<(StateVector, Vec<usize>)> {
        circuit.validate(&self.config)?;

        let mut state = StateVector::zero(circuit.qubits);
        let mut measured = Vec::new();
        for layer in schedule(circuit, self.config.conflict_policy) {
            debug!("Applying {} operation(s) at depth {}", layer.ops.len(), layer.depth);
            for op in layer.ops {
                trace!("{:?}", op);
                if let Operation::Measure { qubit } = op {
                    measured.push(qubit);
                }
                state = apply_operation(state, op);
            }
        }
        measured.sort_unstable();
        measured.dedup();
        Ok((state, measured))
    }

    /// Final amplitudes of `circuit`.
    pub fn final_state(&self, circuit: &Circuit) -> Result<StateVector> {
        self.execute(circuit).map(|(state, _)| state)
    }

    /// Simulate `circuit` and derive its measurement statistics.
    pub fn run(&self, circuit: &Circuit) -> Result<MeasurementResult> {
        let (state, measured) = self.execute(circuit)?;
        let result = analyze(&state, measured);
        let total: f64 = result.probabilities.iter().sum();
        if total > 0.0 && !result.is_normalized(self.config.normalization_tolerance) {
            warn!("Outcome probabilities sum to {total}, outside tolerance");
        }
        Ok(result)
    }

    /// Simulate independent circuits in parallel. Results keep input order.
    pub fn run_batch(&self, circuits: &[Circuit]) -> Vec<Result<MeasurementResult>> {
        circuits.par_iter().map(|c| self.run(c)).collect()
    }
}

/// Simulate `circuit` with the default configuration.
pub fn simulate_circuit(circuit: &Circuit) -> Result<MeasurementResult> {
    Simulator::default().run(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::ZERO;
    use crate::error::SimError;
    use crate::gates::H_GATE;
    use num_complex::Complex64;

    fn assert_probs(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    fn bell() -> Circuit {
        Circuit::new(2, 2).h(0, 0).cnot(0, 1, 1).unwrap()
    }

    // -- Scheduling --

    #[test]
    fn test_schedule_orders_layers() {
        let c = Circuit::new(2, 4).x(1, 3).h(0, 0).z(0, 3);
        let layers = schedule(&c, ConflictPolicy::LastWins);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].depth, 0);
        assert_eq!(layers[1].depth, 3);
        assert_eq!(
            layers[1].ops,
            vec![
                Operation::Single { kind: GateKind::X, qubit: 1 },
                Operation::Single { kind: GateKind::Z, qubit: 0 },
            ]
        );
    }

    #[test]
    fn test_cnot_control_is_lower_qubit() {
        // Records listed target first still pick qubit 0 as control.
        let mut c = Circuit::new(2, 1);
        c.push(Gate::new(GateKind::Cnot, 1, 0));
        c.push(Gate::new(GateKind::Cnot, 0, 0));
        let layers = schedule(&c, ConflictPolicy::LastWins);
        assert_eq!(layers[0].ops, vec![Operation::Cnot { control: 0, target: 1 }]);
    }

    #[test]
    fn test_three_cnot_records() {
        let c = Circuit::new(3, 1)
            .gate(GateKind::Cnot, 2, 0)
            .gate(GateKind::Cnot, 0, 0)
            .gate(GateKind::Cnot, 1, 0);
        let layers = schedule(&c, ConflictPolicy::LastWins);
        assert_eq!(layers[0].ops, vec![Operation::Cnot { control: 0, target: 2 }]);
    }

    #[test]
    fn test_duplicate_cnot_records_do_not_self_pair() {
        let c = Circuit::new(2, 1)
            .gate(GateKind::Cnot, 0, 0)
            .gate(GateKind::Cnot, 0, 0);
        let layers = schedule(&c, ConflictPolicy::LastWins);
        assert!(layers[0].ops.is_empty());
    }

    #[test]
    fn test_cnot_and_swap_pair_separately() {
        let c = Circuit::new(4, 1)
            .gate(GateKind::Swap, 3, 0)
            .gate(GateKind::Cnot, 0, 0)
            .gate(GateKind::Swap, 1, 0)
            .gate(GateKind::Cnot, 2, 0);
        let layers = schedule(&c, ConflictPolicy::LastWins);
        assert_eq!(
            layers[0].ops,
            vec![
                Operation::Swap { a: 3, b: 1 },
                Operation::Cnot { control: 0, target: 2 },
            ]
        );
    }

    #[test]
    fn test_last_wins_policy() {
        let c = Circuit::new(1, 1).x(0, 0).h(0, 0);
        let layers = schedule(&c, ConflictPolicy::LastWins);
        assert_eq!(layers[0].ops, vec![Operation::Single { kind: GateKind::H, qubit: 0 }]);

        let result = simulate_circuit(&c).unwrap();
        assert_probs(&result.probabilities, &[0.5, 0.5]);
    }

    #[test]
    fn test_measure_keeps_gate_on_same_cell() {
        let c = Circuit::new(1, 1).x(0, 0).measure(0, 0);
        let layers = schedule(&c, ConflictPolicy::LastWins);
        assert_eq!(
            layers[0].ops,
            vec![
                Operation::Single { kind: GateKind::X, qubit: 0 },
                Operation::Measure { qubit: 0 },
            ]
        );
        let result = simulate_circuit(&c).unwrap();
        assert_probs(&result.probabilities, &[0.0, 1.0]);
        assert_eq!(result.measured, vec![0]);

        // Listed first, MEASURE is still reported and X still applied.
        let c = Circuit::new(1, 1).measure(0, 0).x(0, 0);
        let result = simulate_circuit(&c).unwrap();
        assert_probs(&result.probabilities, &[0.0, 1.0]);
        assert_eq!(result.measured, vec![0]);
    }

    #[test]
    fn test_oversized_register_is_rejected() {
        let sim = Simulator::new(SimulatorConfig::default().with_max_qubits(64));
        assert_eq!(
            sim.run(&Circuit::new(64, 1)),
            Err(SimError::InvalidQubitCount {
                qubits: 64,
                max: crate::config::MAX_SUPPORTED_QUBITS
            })
        );
    }

    #[test]
    fn test_reject_policy() {
        let c = Circuit::new(1, 1).x(0, 0).h(0, 0);
        let sim = Simulator::new(SimulatorConfig::default().with_conflict_policy(ConflictPolicy::Reject));
        assert_eq!(sim.run(&c), Err(SimError::CellConflict { qubit: 0, depth: 0 }));
    }

    // -- End-to-end properties --

    #[test]
    fn test_identity_circuit() {
        let result = simulate_circuit(&Circuit::new(3, 4)).unwrap();
        assert_probs(&result.probabilities, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        for m in &result.qubit_marginals {
            assert_eq!((m.prob0, m.prob1), (1.0, 0.0));
        }
    }

    #[test]
    fn test_single_hadamard() {
        let result = simulate_circuit(&Circuit::new(1, 1).h(0, 0)).unwrap();
        assert_probs(&result.probabilities, &[0.5, 0.5]);
        assert!((result.qubit_marginals[0].prob0 - 0.5).abs() < 1e-9);
        assert!((result.qubit_marginals[0].prob1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_bit_flip() {
        let result = simulate_circuit(&Circuit::new(1, 1).x(0, 0)).unwrap();
        assert_probs(&result.probabilities, &[0.0, 1.0]);
    }

    #[test]
    fn test_bell_state() {
        let result = simulate_circuit(&bell()).unwrap();
        assert_probs(&result.probabilities, &[0.5, 0.0, 0.0, 0.5]);
        for m in &result.qubit_marginals {
            assert!((m.prob0 - 0.5).abs() < 1e-9);
            assert!((m.prob1 - 0.5).abs() < 1e-9);
        }
        let state = Simulator::default().final_state(&bell()).unwrap();
        let s2 = std::f64::consts::FRAC_1_SQRT_2;
        assert!(state.isclose_slice(&[s2, 0.0, 0.0, s2]));
    }

    #[test]
    fn test_ghz_state() {
        let c = Circuit::new(3, 3)
            .h(0, 0)
            .cnot(0, 1, 1)
            .and_then(|c| c.cnot(1, 2, 2))
            .unwrap();
        let result = simulate_circuit(&c).unwrap();
        assert_probs(&result.probabilities, &[0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_swap_round_trip() {
        // Prepare an asymmetric state, then SWAP twice in successive layers.
        let prep = Circuit::new(2, 4).h(0, 0).t(0, 1);
        let twice = prep.clone().swap(0, 1, 2).and_then(|c| c.swap(0, 1, 3)).unwrap();
        let sim = Simulator::default();
        let before = sim.final_state(&prep).unwrap();
        let after = sim.final_state(&twice).unwrap();
        assert!(after.isclose(&before));

        let once = sim.final_state(&prep.clone().swap(0, 1, 2).unwrap()).unwrap();
        assert!(!once.isclose(&before));
    }

    #[test]
    fn test_cnot_twice_is_identity() {
        let prep = Circuit::new(2, 4).h(0, 0).y(1, 0).s(0, 1);
        let twice = prep.clone().cnot(0, 1, 2).and_then(|c| c.cnot(0, 1, 3)).unwrap();
        let sim = Simulator::default();
        assert!(sim.final_state(&twice).unwrap().isclose(&sim.final_state(&prep).unwrap()));
    }

    #[test]
    fn test_unpaired_cnot_is_noop() {
        let prep = Circuit::new(2, 2).h(0, 0);
        let with_stray = prep.clone().gate(GateKind::Cnot, 0, 1);
        let sim = Simulator::default();
        assert_eq!(
            sim.final_state(&with_stray).unwrap(),
            sim.final_state(&prep).unwrap()
        );
    }

    #[test]
    fn test_measure_does_not_change_probabilities() {
        let plain = simulate_circuit(&bell()).unwrap();
        let c = Circuit::new(2, 3).h(0, 0).cnot(0, 1, 1).unwrap().measure(1, 2).measure(0, 2).measure(1, 1);
        let measured = simulate_circuit(&c).unwrap();
        assert_eq!(plain.probabilities, measured.probabilities);
        assert_eq!(measured.measured, vec![0, 1]);
    }

    #[test]
    fn test_entanglement_demo() {
        let result = simulate_circuit(&Circuit::entanglement_demo()).unwrap();
        let total: f64 = result.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(result.measured, vec![0, 1, 2]);
        // The last CNOT copies qubit 1 onto qubit 2, so the weight is shared
        // by the four states with q1 == q2.
        for (x, &p) in result.probabilities.iter().enumerate() {
            let q1 = (x >> 1) & 1;
            let q2 = (x >> 2) & 1;
            let expected = if q1 == q2 { 0.25 } else { 0.0 };
            assert!((p - expected).abs() < 1e-9, "p[{x}] = {p}");
        }
    }

    #[test]
    fn test_normalization_over_many_gates() {
        let mut c = Circuit::new(4, 12);
        for d in 0..12 {
            let q = d % 4;
            c = match d % 3 {
                0 => c.h(q, d),
                1 => c.t((q + 2) % 4, d).cnot(q, (q + 1) % 4, d).unwrap(),
                _ => c.swap(q, (q + 2) % 4, d).unwrap(),
            };
        }
        let result = Simulator::new(SimulatorConfig::default()).run(&c).unwrap();
        assert!(result.is_normalized(1e-9));
    }

    #[test]
    fn test_run_rejects_invalid() {
        assert_eq!(
            simulate_circuit(&Circuit::new(0, 1)),
            Err(SimError::InvalidQubitCount { qubits: 0, max: 8 })
        );
        assert!(matches!(
            simulate_circuit(&Circuit::new(2, 1).h(5, 0)),
            Err(SimError::QubitOutOfRange { qubit: 5, .. })
        ));
    }

    #[test]
    fn test_run_batch_keeps_order() {
        let circuits = vec![
            Circuit::new(1, 1).x(0, 0),
            Circuit::new(0, 1),
            bell(),
            Circuit::new(1, 1),
        ];
        let results = Simulator::default().run_batch(&circuits);
        assert_eq!(results.len(), 4);
        assert_probs(&results[0].as_ref().unwrap().probabilities, &[0.0, 1.0]);
        assert!(results[1].is_err());
        assert_probs(&results[2].as_ref().unwrap().probabilities, &[0.5, 0.0, 0.0, 0.5]);
        assert_probs(&results[3].as_ref().unwrap().probabilities, &[1.0, 0.0]);
    }

    #[test]
    fn test_apply_operation_matches_engine() {
        let s = StateVector::from_amplitudes(vec![
            Complex64::new(1.0, 0.0),
            ZERO,
        ])
        .unwrap();
        let via_op = apply_operation(s.clone(), Operation::Single { kind: GateKind::H, qubit: 0 });
        let direct = crate::engine::apply_single_qubit_gate(&s, &H_GATE, 0);
        assert_eq!(via_op, direct);
        assert_eq!(apply_operation(s.clone(), Operation::Measure { qubit: 0 }), s);
    }
}
