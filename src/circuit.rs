// Circuit description: qubit count, depth and a flat list of gate records.

use std::collections::HashSet;
use std::fmt;

use crate::config::{ConflictPolicy, SimulatorConfig};
use crate::error::{Result, SimError};
use crate::gates::GateKind;

/// One gate record placed on a `(qubit, depth)` cell.
///
/// CNOT and SWAP are written as two records with the same kind and depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gate {
    pub kind: GateKind,
    pub qubit: usize,
    pub depth: usize,
}

impl Gate {
    pub fn new(kind: GateKind, qubit: usize, depth: usize) -> Self {
        Gate { kind, qubit, depth }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} q{}@{}", self.kind, self.qubit, self.depth)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    pub qubits: usize,
    pub depth: usize,
    pub gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(qubits: usize, depth: usize) -> Self {
        Circuit {
            qubits,
            depth,
            gates: Vec::new(),
        }
    }

    /// Build a circuit from `(tag, qubit, depth)` records such as
    /// `("CNOT", 0, 1)`. Only the tags are checked here; bounds are checked
    /// by `validate`.
    pub fn from_records(qubits: usize, depth: usize, records: &[(&str, usize, usize)]) -> Result<Self> {
        let gates = records
            .iter()
            .map(|&(tag, qubit, d)| -> Result<Gate> { Ok(Gate::new(tag.parse()?, qubit, d)) })
            .collect::<Result<Vec<_>>>()?;
        Ok(Circuit { qubits, depth, gates })
    }

    /// The designer's starting circuit: a three-qubit entanglement chain
    /// measured in the last column.
    pub fn entanglement_demo() -> Self {
        Circuit::new(3, 8)
            .h(0, 0)
            .gate(GateKind::Cnot, 0, 1)
            .gate(GateKind::Cnot, 1, 1)
            .h(1, 2)
            .gate(GateKind::Cnot, 1, 3)
            .gate(GateKind::Cnot, 2, 3)
            .measure(0, 7)
            .measure(1, 7)
            .measure(2, 7)
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Append a raw record.
    pub fn push(&mut self, gate: Gate) -> &mut Self {
        self.gates.push(gate);
        self
    }

    fn push_pair(&mut self, kind: GateKind, a: usize, b: usize, depth: usize) {
        self.gates.push(Gate::new(kind, a, depth));
        self.gates.push(Gate::new(kind, b, depth));
    }

    // ---- Builder methods (consume self for chaining) ----

    /// Place any gate kind as a single record.
    pub fn gate(mut self, kind: GateKind, qubit: usize, depth: usize) -> Self {
        self.gates.push(Gate::new(kind, qubit, depth));
        self
    }

    pub fn h(self, qubit: usize, depth: usize) -> Self {
        self.gate(GateKind::H, qubit, depth)
    }

    pub fn x(self, qubit: usize, depth: usize) -> Self {
        self.gate(GateKind::X, qubit, depth)
    }

    pub fn y(self, qubit: usize, depth: usize) -> Self {
        self.gate(GateKind::Y, qubit, depth)
    }

    pub fn z(self, qubit: usize, depth: usize) -> Self {
        self.gate(GateKind::Z, qubit, depth)
    }

    pub fn s(self, qubit: usize, depth: usize) -> Self {
        self.gate(GateKind::S, qubit, depth)
    }

    pub fn t(self, qubit: usize, depth: usize) -> Self {
        self.gate(GateKind::T, qubit, depth)
    }

    pub fn measure(self, qubit: usize, depth: usize) -> Self {
        self.gate(GateKind::Measure, qubit, depth)
    }

    /// Place a CNOT on qubits `a` and `b`. The lower index is the control.
    pub fn cnot(mut self, a: usize, b: usize, depth: usize) -> Result<Self> {
        if a == b {
            return Err(SimError::SelfPairedGate {
                kind: GateKind::Cnot,
                qubit: a,
                depth,
            });
        }
        self.push_pair(GateKind::Cnot, a, b, depth);
        Ok(self)
    }

    /// Place a SWAP on qubits `a` and `b`.
    pub fn swap(mut self, a: usize, b: usize, depth: usize) -> Result<Self> {
        if a == b {
            return Err(SimError::SelfPairedGate {
                kind: GateKind::Swap,
                qubit: a,
                depth,
            });
        }
        self.push_pair(GateKind::Swap, a, b, depth);
        Ok(self)
    }

    // ---- Validation ----

    /// Reject circuits that cannot be simulated under `config`.
    pub fn validate(&self, config: &SimulatorConfig) -> Result<()> {
        let limit = config.qubit_limit();
        if self.qubits == 0 || self.qubits > limit {
            return Err(SimError::InvalidQubitCount {
                qubits: self.qubits,
                max: limit,
            });
        }
        for g in &self.gates {
            if g.qubit >= self.qubits {
                return Err(SimError::QubitOutOfRange {
                    qubit: g.qubit,
                    depth: g.depth,
                    qubits: self.qubits,
                });
            }
            if g.depth >= self.depth {
                return Err(SimError::DepthOutOfRange {
                    depth: g.depth,
                    max: self.depth,
                });
            }
        }
        if config.conflict_policy == ConflictPolicy::Reject {
            let mut cells = HashSet::with_capacity(self.gates.len());
            // MEASURE only reports its qubit, so it shares a cell freely.
            for g in self.gates.iter().filter(|g| g.kind != GateKind::Measure) {
                if !cells.insert((g.qubit, g.depth)) {
                    return Err(SimError::CellConflict {
                        qubit: g.qubit,
                        depth: g.depth,
                    });
                }
            }
        }
        Ok(())
    }
}
