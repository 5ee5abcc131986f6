// PyO3 Python bindings for qlab-sim
//
// - Circuit(qubits, depth) with gate methods H, X, Y, Z, S, T, MEASURE,
//   CNOT, SWAP (uppercase, method chaining)
// - Circuit.simulate() -> SimulationResult, Circuit.amplitudes() -> [complex]
// - simulate(qubits, depth, [(tag, qubit, depth), ...]) for plain records

#![allow(non_snake_case)]

use num_complex::Complex64;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::{thread_rng, SeedableRng};

use crate::{
    Circuit as RustCircuit, Gate, GateKind, MeasurementResult, SimError, Simulator, SimulatorConfig,
};

fn to_py_err(err: SimError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn simulator(max_qubits: Option<usize>) -> Simulator {
    let config = match max_qubits {
        Some(max) => SimulatorConfig::default().with_max_qubits(max),
        None => SimulatorConfig::default(),
    };
    Simulator::new(config)
}

/// Python wrapper for Circuit
#[pyclass(name = "Circuit")]
pub struct PyCircuit {
    inner: RustCircuit,
}

impl PyCircuit {
    fn place(slf: Py<Self>, kind: GateKind, qubit: usize, depth: usize, py: Python<'_>) -> Py<Self> {
        {
            let mut this = slf.borrow_mut(py);
            this.inner.push(Gate::new(kind, qubit, depth));
        }
        slf
    }

    fn place_pair(
        slf: Py<Self>,
        kind: GateKind,
        a: usize,
        b: usize,
        depth: usize,
        py: Python<'_>,
    ) -> PyResult<Py<Self>> {
        {
            let mut this = slf.borrow_mut(py);
            let placed = match kind {
                GateKind::Cnot => this.inner.clone().cnot(a, b, depth),
                _ => this.inner.clone().swap(a, b, depth),
            };
            this.inner = placed.map_err(to_py_err)?;
        }
        Ok(slf)
    }
}

#[pymethods]
impl PyCircuit {
    #[new]
    fn new(qubits: usize, depth: usize) -> Self {
        PyCircuit {
            inner: RustCircuit::new(qubits, depth),
        }
    }

    #[getter]
    fn qubits(&self) -> usize {
        self.inner.qubits
    }

    #[getter]
    fn depth(&self) -> usize {
        self.inner.depth
    }

    /// Gate records as (tag, qubit, depth) tuples
    #[getter]
    fn gates(&self) -> Vec<(String, usize, usize)> {
        self.inner
            .gates
            .iter()
            .map(|g| (g.kind.to_string(), g.qubit, g.depth))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "Circuit(qubits={}, depth={}, gates={})",
            self.inner.qubits,
            self.inner.depth,
            self.inner.gates.len()
        )
    }

    // ---- Single-qubit gates ----

    fn H(slf: Py<Self>, qubit: usize, depth: usize, py: Python<'_>) -> Py<Self> {
        Self::place(slf, GateKind::H, qubit, depth, py)
    }

    fn X(slf: Py<Self>, qubit: usize, depth: usize, py: Python<'_>) -> Py<Self> {
        Self::place(slf, GateKind::X, qubit, depth, py)
    }

    fn Y(slf: Py<Self>, qubit: usize, depth: usize, py: Python<'_>) -> Py<Self> {
        Self::place(slf, GateKind::Y, qubit, depth, py)
    }

    fn Z(slf: Py<Self>, qubit: usize, depth: usize, py: Python<'_>) -> Py<Self> {
        Self::place(slf, GateKind::Z, qubit, depth, py)
    }

    fn S(slf: Py<Self>, qubit: usize, depth: usize, py: Python<'_>) -> Py<Self> {
        Self::place(slf, GateKind::S, qubit, depth, py)
    }

    fn T(slf: Py<Self>, qubit: usize, depth: usize, py: Python<'_>) -> Py<Self> {
        Self::place(slf, GateKind::T, qubit, depth, py)
    }

    fn MEASURE(slf: Py<Self>, qubit: usize, depth: usize, py: Python<'_>) -> Py<Self> {
        Self::place(slf, GateKind::Measure, qubit, depth, py)
    }

    // ---- Two-qubit gates ----

    /// Controlled-NOT; the lower qubit index is the control
    fn CNOT(slf: Py<Self>, a: usize, b: usize, depth: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::place_pair(slf, GateKind::Cnot, a, b, depth, py)
    }

    fn SWAP(slf: Py<Self>, a: usize, b: usize, depth: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::place_pair(slf, GateKind::Swap, a, b, depth, py)
    }

    // ---- Simulation ----

    /// Simulate the circuit, optionally allowing more than 8 qubits
    #[pyo3(signature = (max_qubits=None))]
    fn simulate(&self, max_qubits: Option<usize>) -> PyResult<PySimulationResult> {
        simulator(max_qubits)
            .run(&self.inner)
            .map(|inner| PySimulationResult { inner })
            .map_err(to_py_err)
    }

    /// Final-state amplitudes as a list of complex numbers
    #[pyo3(signature = (max_qubits=None))]
    fn amplitudes(&self, max_qubits: Option<usize>) -> PyResult<Vec<Complex64>> {
        simulator(max_qubits)
            .final_state(&self.inner)
            .map(|state| state.amplitudes().to_vec())
            .map_err(to_py_err)
    }
}

/// Python wrapper for MeasurementResult
#[pyclass(name = "SimulationResult")]
pub struct PySimulationResult {
    inner: MeasurementResult,
}

#[pymethods]
impl PySimulationResult {
    #[getter]
    fn probabilities(&self) -> Vec<f64> {
        self.inner.probabilities.clone()
    }

    /// Per-qubit (prob0, prob1) pairs
    #[getter]
    fn marginals(&self) -> Vec<(f64, f64)> {
        self.inner
            .qubit_marginals
            .iter()
            .map(|m| (m.prob0, m.prob1))
            .collect()
    }

    #[getter]
    fn labels(&self) -> Vec<String> {
        self.inner.labels().iter().map(|l| l.to_string()).collect()
    }

    #[getter]
    fn measured(&self) -> Vec<usize> {
        self.inner.measured.clone()
    }

    /// (label, probability, amplitude) for outcomes above threshold
    #[pyo3(signature = (threshold=0.001))]
    fn outcomes(&self, threshold: f64) -> Vec<(String, f64, f64)> {
        self.inner
            .outcomes(threshold)
            .into_iter()
            .map(|o| (o.label, o.probability, o.amplitude))
            .collect()
    }

    /// Shot counts per basis state
    #[pyo3(signature = (shots, seed=None))]
    fn sample(&self, shots: usize, seed: Option<u64>) -> PyResult<Vec<usize>> {
        let counts = match seed {
            Some(seed) => self.inner.sample(shots, &mut StdRng::seed_from_u64(seed)),
            None => self.inner.sample(shots, &mut thread_rng()),
        };
        counts.map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!("SimulationResult(probabilities={:?})", self.inner.probabilities)
    }
}

/// Simulate a circuit given as (tag, qubit, depth) records
///
/// Example: simulate(2, 2, [("H", 0, 0), ("CNOT", 0, 1), ("CNOT", 1, 1)])
#[pyfunction]
fn simulate(qubits: usize, depth: usize, gates: Vec<(String, usize, usize)>) -> PyResult<PySimulationResult> {
    let records: Vec<(&str, usize, usize)> = gates
        .iter()
        .map(|(tag, qubit, d)| (tag.as_str(), *qubit, *d))
        .collect();
    let circuit = RustCircuit::from_records(qubits, depth, &records).map_err(to_py_err)?;
    Simulator::default()
        .run(&circuit)
        .map(|inner| PySimulationResult { inner })
        .map_err(to_py_err)
}

/// Python module definition
#[pymodule]
fn qlab_sim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCircuit>()?;
    m.add_class::<PySimulationResult>()?;
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    Ok(())
}
