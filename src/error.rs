// Error types for circuit validation and simulation.

use thiserror::Error;

use crate::gates::GateKind;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors a caller can get back from the simulator.
///
/// Out-of-range indices handed directly to the gate engine are not
/// represented here; those are programmer errors and panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("Invalid qubit count {qubits}. Must be in [1, {max}]")]
    InvalidQubitCount { qubits: usize, max: usize },

    #[error("Gate at depth {depth} targets qubit {qubit}, circuit has {qubits} qubits")]
    QubitOutOfRange {
        qubit: usize,
        depth: usize,
        qubits: usize,
    },

    #[error("Invalid depth {depth}. Must be below circuit depth {max}")]
    DepthOutOfRange { depth: usize, max: usize },

    #[error("{kind} at depth {depth} pairs qubit {qubit} with itself")]
    SelfPairedGate {
        kind: GateKind,
        qubit: usize,
        depth: usize,
    },

    #[error("More than one gate occupies qubit {qubit} at depth {depth}")]
    CellConflict { qubit: usize, depth: usize },

    #[error("Unknown gate type '{0}'. Valid: H, X, Y, Z, S, T, CNOT, SWAP, MEASURE")]
    UnknownGate(String),

    #[error("State vector length must be a power of 2, got {0}")]
    InvalidStateLength(usize),

    #[error("Cannot sample from an all-zero probability distribution")]
    DegenerateDistribution,
}
