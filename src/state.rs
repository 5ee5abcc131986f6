// State vector storage and normalization helpers.

use ndarray::Array1;
use num_complex::Complex64;
use std::fmt;

use crate::complex::{magnitude_squared, ONE};
use crate::error::{Result, SimError};

// ---- Utility Functions ----

/// Return the number of qubits for a state vector of length `vl`.
pub fn nqubits(vl: usize) -> usize {
    assert!(vl > 0, "Vector length must be positive, got {vl}");
    vl.trailing_zeros() as usize
}

/// Flip bit `b` in index `i` using XOR.
#[inline]
pub fn conjugate_index(i: usize, b: usize) -> usize {
    i ^ (1 << b)
}

/// Value of bit `b` of index `i`.
#[inline]
pub fn bit(i: usize, b: usize) -> usize {
    (i >> b) & 1
}

/// Ket label of basis index `i` on `n` qubits, highest qubit leftmost.
pub fn basis_label(i: usize, n: usize) -> String {
    format!("{:0>width$b}", i, width = n)
}

// ---- Formatting ----

/// Round to `n` significant figures to eliminate floating-point ULP noise.
fn round_sigfigs(x: f64, n: i32) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    let d = x.abs().log10().ceil() as i32;
    let power = 10f64.powi(n - d);
    (x * power).round() / power
}

/// Format a float to always include a decimal point.
fn format_real(x: f64) -> String {
    let x = round_sigfigs(x, 15);
    let s = format!("{}", x);
    if !s.contains('.') && !s.contains('e') && !s.contains('E') {
        format!("{s}.0")
    } else {
        s
    }
}

/// Real part alone when the amplitude is real, otherwise `re+imi`.
fn qcoef(a: Complex64) -> String {
    let re = round_sigfigs(a.re, 15);
    let im = round_sigfigs(a.im, 15);
    if im.abs() < 1e-8 {
        format_real(re)
    } else {
        format!("{}+{}i", format_real(re), format_real(im))
    }
}

fn qterm(i: usize, qi: Complex64, n: usize) -> String {
    format!("{}|{}>", qcoef(qi), basis_label(i, n))
}

// ---- State Vector ----

/// Amplitudes of an n-qubit register over the computational basis.
///
/// Bit `q` of an index is the value of qubit `q`, so index 1 on two qubits
/// is `|01>` (qubit 0 set).
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    amplitudes: Array1<Complex64>,
    qubits: usize,
}

impl StateVector {
    /// The `|0...0>` state on `n` qubits.
    pub fn zero(n: usize) -> Self {
        assert!(n > 0, "A state needs at least one qubit");
        assert!(
            n < usize::BITS as usize,
            "Cannot index {n} qubits with usize"
        );
        let mut amplitudes = Array1::zeros(1 << n);
        amplitudes[0] = ONE;
        StateVector { amplitudes, qubits: n }
    }

    /// Wrap raw amplitudes. The length must be a power of 2; no
    /// normalization is performed.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> Result<Self> {
        let len = amplitudes.len();
        if len < 2 || !len.is_power_of_two() {
            return Err(SimError::InvalidStateLength(len));
        }
        Ok(StateVector {
            amplitudes: Array1::from_vec(amplitudes),
            qubits: nqubits(len),
        })
    }

    pub(crate) fn from_array(amplitudes: Array1<Complex64>) -> Self {
        let len = amplitudes.len();
        assert!(len > 1 && len.is_power_of_two());
        StateVector {
            amplitudes,
            qubits: nqubits(len),
        }
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    pub fn num_qubits(&self) -> usize {
        self.qubits
    }

    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    pub fn amplitude(&self, index: usize) -> Complex64 {
        self.amplitudes[index]
    }

    pub(crate) fn amplitudes_mut(&mut self) -> &mut Array1<Complex64> {
        &mut self.amplitudes
    }

    /// Calculate the L2 norm of the state vector.
    pub fn norm(&self) -> f64 {
        self.probabilities().iter().sum::<f64>().sqrt()
    }

    /// Unnormalized `|a|^2` for every basis index.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|&a| magnitude_squared(a)).collect()
    }

    /// Normalize in place. Returns false, leaving the state untouched, when
    /// every amplitude is zero.
    pub fn normalize(&mut self) -> bool {
        let norm = self.norm();
        if norm == 0.0 {
            return false;
        }
        self.amplitudes.mapv_inplace(|x| x / norm);
        true
    }

    /// Return string representation of significant terms in the quantum state.
    pub fn terms(&self) -> String {
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(_, qi)| qi.norm() > 1e-8)
            .map(|(i, &qi)| qterm(i, qi, self.qubits))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check if this quantum state is close to another.
    pub fn isclose(&self, other: &StateVector) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .all(|(a, b)| (a - b).norm() < 1e-5)
    }

    /// Check if this quantum state is close to a slice of f64 values (treated as real).
    pub fn isclose_slice(&self, other: &[f64]) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.amplitudes
            .iter()
            .zip(other.iter())
            .all(|(a, b)| (a - b).norm() < 1e-5)
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terms())
    }
}
