// qlab-sim - quantum circuit state-vector simulator
//
// A circuit is a qubit count, a depth and a flat list of gate records placed
// on (qubit, depth) cells. The scheduler runs the records layer by layer on a
// state vector and the measurement module turns the final amplitudes into
// outcome probabilities and per-qubit marginals.

pub mod circuit;
pub mod complex;
pub mod config;
pub mod engine;
pub mod error;
pub mod gates;
pub mod measurement;
pub mod scheduler;
pub mod state;

pub use circuit::{Circuit, Gate};
pub use config::{ConflictPolicy, SimulatorConfig, MAX_SUPPORTED_QUBITS};
pub use error::{Result, SimError};
pub use gates::{GateKind, GateMatrix};
pub use measurement::{MeasurementResult, Outcome, QubitLabel, QubitMarginal};
pub use scheduler::{simulate_circuit, Simulator};
pub use state::StateVector;

// ---- Python Bindings ----

#[cfg(feature = "pyo3")]
mod python;
