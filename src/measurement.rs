// Measurement analysis: outcome probabilities, per-qubit marginals and shot
// sampling, all derived from the final amplitudes.

use rand::Rng;
use std::fmt;

use crate::complex::magnitude_squared;
use crate::error::{Result, SimError};
use crate::state::{basis_label, bit, StateVector};

/// Reduced single-qubit distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QubitMarginal {
    pub prob0: f64,
    pub prob1: f64,
}

/// Coarse description of a qubit's marginal, as shown next to each wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QubitLabel {
    Zero,
    One,
    Plus,
    Superposition,
}

impl fmt::Display for QubitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QubitLabel::Zero => "|0⟩",
            QubitLabel::One => "|1⟩",
            QubitLabel::Plus => "|+⟩",
            QubitLabel::Superposition => "α|0⟩ + β|1⟩",
        };
        f.write_str(s)
    }
}

impl QubitMarginal {
    pub fn label(&self) -> QubitLabel {
        if self.prob1 > 0.95 {
            QubitLabel::One
        } else if self.prob0 > 0.95 {
            QubitLabel::Zero
        } else if (self.prob0 - 0.5).abs() < 0.1 && (self.prob1 - 0.5).abs() < 0.1 {
            QubitLabel::Plus
        } else {
            QubitLabel::Superposition
        }
    }

    /// `(prob0, prob1)` scaled to percent.
    pub fn percentages(&self) -> (f64, f64) {
        (self.prob0 * 100.0, self.prob1 * 100.0)
    }
}

/// One basis state worth showing in a results chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub index: usize,
    /// Ket label such as `|010⟩`, highest qubit leftmost.
    pub label: String,
    pub probability: f64,
    /// `|a|`, before normalization.
    pub amplitude: f64,
}

/// Everything a caller gets back from a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementResult {
    pub qubits: usize,
    /// Normalized `|a|^2` per basis index (length `2^qubits`).
    pub probabilities: Vec<f64>,
    pub qubit_marginals: Vec<QubitMarginal>,
    /// Raw `|a|^2` per basis index.
    pub amplitude_magnitudes: Vec<f64>,
    /// Qubits carrying a MEASURE gate, sorted.
    pub measured: Vec<usize>,
}

/// Outcome probabilities normalized by their sum; all zeros stay zeros.
pub fn outcome_probabilities(state: &StateVector) -> Vec<f64> {
    let mut probs = state.probabilities();
    let total: f64 = probs.iter().sum();
    if total > 0.0 {
        probs.iter_mut().for_each(|p| *p /= total);
    }
    probs
}

/// Marginal `{prob0, prob1}` of every qubit, computed straight from the
/// amplitude magnitudes.
pub fn qubit_marginals(state: &StateVector) -> Vec<QubitMarginal> {
    let weights = state.probabilities();
    (0..state.num_qubits())
        .map(|q| {
            let (mut prob0, mut prob1) = (0.0, 0.0);
            for (x, &w) in weights.iter().enumerate() {
                if bit(x, q) == 0 {
                    prob0 += w;
                } else {
                    prob1 += w;
                }
            }
            let total = prob0 + prob1;
            if total > 0.0 {
                prob0 /= total;
                prob1 /= total;
            }
            QubitMarginal { prob0, prob1 }
        })
        .collect()
}

pub fn analyze(state: &StateVector, measured: Vec<usize>) -> MeasurementResult {
    MeasurementResult {
        qubits: state.num_qubits(),
        probabilities: outcome_probabilities(state),
        qubit_marginals: qubit_marginals(state),
        amplitude_magnitudes: state.amplitudes().iter().map(|&a| magnitude_squared(a)).collect(),
        measured,
    }
}

impl MeasurementResult {
    /// True when the probabilities sum to 1 within `tolerance`.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.probabilities.iter().sum::<f64>() - 1.0).abs() <= tolerance
    }

    pub fn labels(&self) -> Vec<QubitLabel> {
        self.qubit_marginals.iter().map(QubitMarginal::label).collect()
    }

    /// Basis outcomes with probability above `threshold`, in basis order.
    pub fn outcomes(&self, threshold: f64) -> Vec<Outcome> {
        self.probabilities
            .iter()
            .enumerate()
            .filter(|(_, p)| **p > threshold)
            .map(|(index, &probability)| Outcome {
                index,
                label: format!("|{}⟩", basis_label(index, self.qubits)),
                probability,
                amplitude: self.amplitude_magnitudes[index].sqrt(),
            })
            .collect()
    }

    /// Draw `shots` samples from the outcome distribution and return the
    /// count per basis index.
    pub fn sample(&self, shots: usize, rng: &mut impl Rng) -> Result<Vec<usize>> {
        let total: f64 = self.probabilities.iter().sum();
        if total <= 0.0 {
            return Err(SimError::DegenerateDistribution);
        }
        // Rounding can leave the cumulative sum just short of r; fall back to
        // the last outcome that has any weight.
        let last = self
            .probabilities
            .iter()
            .rposition(|&p| p > 0.0)
            .ok_or(SimError::DegenerateDistribution)?;

        let mut counts = vec![0; self.probabilities.len()];
        for _ in 0..shots {
            let r = rng.r#gen::<f64>() * total;
            let mut acc = 0.0;
            let mut outcome = last;
            for (i, &p) in self.probabilities.iter().enumerate() {
                acc += p;
                if r < acc {
                    outcome = i;
                    break;
                }
            }
            counts[outcome] += 1;
        }
        Ok(counts)
    }
}
