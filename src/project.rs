//! Lie-algebra projections.
//!
//! Tangent fields in this crate live in the traceless Hermitian representation
//! of su(N); both projections here are orthogonal (self-adjoint and
//! idempotent) under the real Frobenius inner product
//! `⟨A,B⟩ = Re Σ_x tr(A(x)† B(x))`.

use crate::field::{ColorMatrix, Complex64, Field, MatrixField};

/// Traceless Hermitian part of a single matrix:
/// `(m + m†)/2 − tr(m + m†)/(2N)·I`.
#[inline]
pub fn traceless_hermitian_site<const N: usize>(m: &ColorMatrix<N>) -> ColorMatrix<N> {
    let h = (m + m.adjoint()) * Complex64::new(0.5, 0.0);
    let t = h.trace() / (N as f64);
    h - ColorMatrix::<N>::identity() * t
}

/// Traceless anti-Hermitian part of a single matrix:
/// `(m − m†)/2 − tr(m − m†)/(2N)·I`.
#[inline]
pub fn traceless_anti_hermitian_site<const N: usize>(m: &ColorMatrix<N>) -> ColorMatrix<N> {
    let a = (m - m.adjoint()) * Complex64::new(0.5, 0.0);
    let t = a.trace() / (N as f64);
    a - ColorMatrix::<N>::identity() * t
}

/// Site-wise traceless Hermitian projection.
pub fn traceless_hermitian<const N: usize>(f: &MatrixField<N>) -> MatrixField<N> {
    f.map(|m| traceless_hermitian_site(&m))
}

/// Site-wise traceless anti-Hermitian projection.
pub fn traceless_anti_hermitian<const N: usize>(f: &MatrixField<N>) -> MatrixField<N> {
    f.map(|m| traceless_anti_hermitian_site(&m))
}

/// Zero tangent field for each link direction, on the links' grid.
pub fn cartesian<const N: usize>(links: &[MatrixField<N>]) -> Vec<MatrixField<N>> {
    links
        .iter()
        .map(|u| Field::constant(u.grid(), ColorMatrix::<N>::zeros()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> ColorMatrix<3> {
        ColorMatrix::<3>::from_fn(|i, j| Complex64::new(0.3 * (i as f64) - 0.1, 0.2 * (j as f64)))
    }

    #[test]
    fn hermitian_projection_is_idempotent_and_traceless() {
        let m = sample();
        let h = traceless_hermitian_site(&m);
        assert_abs_diff_eq!(h.trace().norm(), 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!((h - h.adjoint()).norm(), 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!((traceless_hermitian_site(&h) - h).norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn anti_hermitian_projection_is_idempotent_and_traceless() {
        let m = sample();
        let a = traceless_anti_hermitian_site(&m);
        assert_abs_diff_eq!(a.trace().norm(), 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!((a + a.adjoint()).norm(), 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(
            (traceless_anti_hermitian_site(&a) - a).norm(),
            0.0,
            epsilon = 1e-14
        );
    }

    #[test]
    fn projections_are_complementary_on_traceless_input() {
        let m = sample();
        let traceless = m - ColorMatrix::<3>::identity() * (m.trace() / 3.0);
        let h = traceless_hermitian_site(&traceless);
        let a = traceless_anti_hermitian_site(&traceless);
        assert_abs_diff_eq!((h + a - traceless).norm(), 0.0, epsilon = 1e-14);
    }
}
