// Complex arithmetic on top of num-complex.

pub use num_complex::Complex64;

pub const ZERO: Complex64 = Complex64::new(0.0, 0.0);
pub const ONE: Complex64 = Complex64::new(1.0, 0.0);
pub const NEG1: Complex64 = Complex64::new(-1.0, 0.0);
pub const IM: Complex64 = Complex64::new(0.0, 1.0);
pub const NEG_IM: Complex64 = Complex64::new(0.0, -1.0);
pub const S2: Complex64 = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
pub const NEG_S2: Complex64 = Complex64::new(-std::f64::consts::FRAC_1_SQRT_2, 0.0);

/// e^{iπ/4}
pub const EXP_I_PI_4: Complex64 = Complex64::new(
    std::f64::consts::FRAC_1_SQRT_2,
    std::f64::consts::FRAC_1_SQRT_2,
);

#[inline]
pub fn add(a: Complex64, b: Complex64) -> Complex64 {
    Complex64::new(a.re + b.re, a.im + b.im)
}

#[inline]
pub fn multiply(a: Complex64, b: Complex64) -> Complex64 {
    Complex64::new(a.re * b.re - a.im * b.im, a.re * b.im + a.im * b.re)
}

/// Squared magnitude `re² + im²`, the probability weight of an amplitude.
#[inline]
pub fn magnitude_squared(c: Complex64) -> f64 {
    c.re * c.re + c.im * c.im
}
