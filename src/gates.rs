// Gate catalog: the closed set of gate kinds and the single-qubit matrices.

use ndarray::{array, Array2};
use num_complex::Complex64;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::complex::{EXP_I_PI_4, IM, NEG1, NEG_IM, NEG_S2, ONE, S2, ZERO};
use crate::error::SimError;

/// A 2x2 unitary acting on one qubit.
pub type GateMatrix = Array2<Complex64>;

// ---- Gate Matrices ----

pub static H_GATE: LazyLock<GateMatrix> = LazyLock::new(|| {
    array![[S2, S2], [S2, NEG_S2]]
});

pub static X_GATE: LazyLock<GateMatrix> = LazyLock::new(|| {
    array![[ZERO, ONE], [ONE, ZERO]]
});

pub static Y_GATE: LazyLock<GateMatrix> = LazyLock::new(|| {
    array![[ZERO, NEG_IM], [IM, ZERO]]
});

pub static Z_GATE: LazyLock<GateMatrix> = LazyLock::new(|| {
    array![[ONE, ZERO], [ZERO, NEG1]]
});

pub static S_GATE: LazyLock<GateMatrix> = LazyLock::new(|| {
    array![[ONE, ZERO], [ZERO, IM]]
});

pub static T_GATE: LazyLock<GateMatrix> = LazyLock::new(|| {
    array![[ONE, ZERO], [ZERO, EXP_I_PI_4]]
});

// ---- Gate Kinds ----

/// Every gate a circuit record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    H,
    X,
    Y,
    Z,
    S,
    T,
    Cnot,
    Swap,
    Measure,
}

impl GateKind {
    pub const ALL: [GateKind; 9] = [
        GateKind::H,
        GateKind::X,
        GateKind::Y,
        GateKind::Z,
        GateKind::S,
        GateKind::T,
        GateKind::Cnot,
        GateKind::Swap,
        GateKind::Measure,
    ];

    /// True for gates made of two records sharing a depth.
    pub fn is_two_qubit(self) -> bool {
        matches!(self, GateKind::Cnot | GateKind::Swap)
    }

    /// Catalog matrix for the single-qubit unitaries, `None` otherwise.
    pub fn matrix(self) -> Option<&'static GateMatrix> {
        let m: &'static LazyLock<GateMatrix> = match self {
            GateKind::H => &H_GATE,
            GateKind::X => &X_GATE,
            GateKind::Y => &Y_GATE,
            GateKind::Z => &Z_GATE,
            GateKind::S => &S_GATE,
            GateKind::T => &T_GATE,
            GateKind::Cnot | GateKind::Swap | GateKind::Measure => return None,
        };
        Some(LazyLock::force(m))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GateKind::H => "H",
            GateKind::X => "X",
            GateKind::Y => "Y",
            GateKind::Z => "Z",
            GateKind::S => "S",
            GateKind::T => "T",
            GateKind::Cnot => "CNOT",
            GateKind::Swap => "SWAP",
            GateKind::Measure => "MEASURE",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GateKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        GateKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| SimError::UnknownGate(s.to_string()))
    }
}
