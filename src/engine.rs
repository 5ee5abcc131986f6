// Gate application engine.
//
// Every function here is pure: it borrows the input state and returns a new
// one. Qubit indices are trusted to be valid; the scheduler validates circuits
// before anything reaches this module, so bad indices panic.

use ndarray::Array1;
use num_complex::Complex64;

use crate::complex::{add, multiply};
use crate::gates::{GateKind, GateMatrix};
use crate::state::{bit, conjugate_index, StateVector};

fn check_qubit(state: &StateVector, qubit: usize, role: &str) {
    assert!(
        qubit < state.num_qubits(),
        "Invalid {role} qubit {qubit}. Must be in [0, {})",
        state.num_qubits()
    );
}

/// Apply a 2x2 matrix to `target`, identity on every other qubit.
///
/// Each output amplitude at `y` gathers `m[bit(y)][0] * state[y0] +
/// m[bit(y)][1] * state[y1]`, where `y0`/`y1` are `y` with the target bit
/// cleared/set.
pub fn apply_single_qubit_gate(
    state: &StateVector,
    m: &GateMatrix,
    target: usize,
) -> StateVector {
    check_qubit(state, target, "target");
    assert_eq!(m.dim(), (2, 2), "Single-qubit gate must be 2x2");

    let mask = 1usize << target;
    let v = state.amplitudes();
    let out: Array1<Complex64> = Array1::from_shape_fn(v.len(), |y| {
        let a = bit(y, target);
        let y0 = y & !mask;
        let y1 = y | mask;
        add(multiply(m[[a, 0]], v[y0]), multiply(m[[a, 1]], v[y1]))
    });
    StateVector::from_array(out)
}

/// Controlled-NOT: flip `target` on every basis state where `control` is 1.
pub fn apply_cnot(state: &StateVector, control: usize, target: usize) -> StateVector {
    check_qubit(state, control, "control");
    check_qubit(state, target, "target");
    assert!(control != target, "Control and target must be different qubits");

    let cmask = 1usize << control;
    let tmask = 1usize << target;
    let mut out = state.clone();
    let v = out.amplitudes_mut();
    // Only visit the target-0 member of each pair so no pair swaps twice.
    for x in 0..v.len() {
        if x & cmask != 0 && x & tmask == 0 {
            v.swap(x, conjugate_index(x, target));
        }
    }
    out
}

/// Exchange qubits `a` and `b`.
pub fn apply_swap(state: &StateVector, a: usize, b: usize) -> StateVector {
    check_qubit(state, a, "first");
    check_qubit(state, b, "second");
    assert!(a != b, "SWAP needs two different qubits");

    let amask = 1usize << a;
    let bmask = 1usize << b;
    let mut out = state.clone();
    let v = out.amplitudes_mut();
    // Indices with equal bits are fixed points; the (1, 0) member of each
    // moving pair does the swap.
    for x in 0..v.len() {
        if x & amask != 0 && x & bmask == 0 {
            v.swap(x, x ^ amask ^ bmask);
        }
    }
    out
}

/// Apply a catalog gate by kind. Panics for kinds without a 2x2 matrix.
pub fn apply_gate(state: &StateVector, kind: GateKind, target: usize) -> StateVector {
    let m = kind
        .matrix()
        .unwrap_or_else(|| panic!("{kind} is not a single-qubit matrix gate"));
    apply_single_qubit_gate(state, m, target)
}
