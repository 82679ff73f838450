//! Shared helpers for the integration tests.

#![allow(dead_code)]

use cloverleaf::{
    adj, cshift, inner_product, ColorMatrix, Complex64, Field, Grid, MatrixField, ND,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Matrix exponential by truncated Taylor series; ample accuracy for the
/// small exponents used in these tests.
pub fn mat_exp<const N: usize>(m: &ColorMatrix<N>) -> ColorMatrix<N> {
    let mut term = ColorMatrix::<N>::identity();
    let mut sum = term;
    for k in 1..=24 {
        term = term * m * Complex64::new(1.0 / k as f64, 0.0);
        sum += term;
    }
    sum
}

/// Random traceless Hermitian matrix with entries of order one.
pub fn random_algebra_site<const N: usize>(rng: &mut ChaCha8Rng) -> ColorMatrix<N> {
    let m = ColorMatrix::<N>::from_fn(|_, _| {
        Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    });
    let h = (m + m.adjoint()) * Complex64::new(0.5, 0.0);
    h - ColorMatrix::<N>::identity() * (h.trace() / N as f64)
}

/// Seeded non-trivial gauge configuration: `U_d(x) = exp(0.3·i·H_d(x))`
/// with `H` traceless Hermitian, so every link is special unitary.
pub fn random_links<const N: usize>(grid: Grid, seed: u64) -> Vec<MatrixField<N>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..ND)
        .map(|_| {
            Field::from_fn(grid, |_| {
                mat_exp(&(random_algebra_site::<N>(&mut rng) * Complex64::new(0.0, 0.3)))
            })
        })
        .collect()
}

/// One traceless Hermitian tangent field per direction.
pub fn random_tangents<const N: usize>(grid: Grid, seed: u64) -> Vec<MatrixField<N>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..ND)
        .map(|_| Field::from_fn(grid, |_| random_algebra_site::<N>(&mut rng)))
        .collect()
}

/// Unconstrained random matrix field (cotangent seeds).
pub fn random_matrix_field<const N: usize>(grid: Grid, seed: u64) -> MatrixField<N> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Field::from_fn(grid, |_| {
        ColorMatrix::<N>::from_fn(|_, _| {
            Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        })
    })
}

/// Random real scalar field with values in `[0, 1)`.
pub fn random_mask(grid: Grid, seed: u64) -> Field<Complex64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Field::from_fn(grid, |_| Complex64::new(rng.gen_range(0.0..1.0), 0.0))
}

/// Links displaced along a tangent: `U_d(x) ↦ exp(i·ε·T_d(x))·U_d(x)`.
pub fn perturbed_links<const N: usize>(
    u: &[MatrixField<N>],
    t: &[MatrixField<N>],
    eps: f64,
) -> Vec<MatrixField<N>> {
    u.iter()
        .zip(t)
        .map(|(ud, td)| {
            Field::from_fn(ud.grid(), |s| {
                mat_exp(&(td[s] * Complex64::new(0.0, eps))) * ud[s]
            })
        })
        .collect()
}

/// Directional derivative pairing: a coordinate gradient `g` paired with a
/// tangent `t` gives `dφ/dε = 2·Re Σ_ρ Σ_x tr(g_ρ(x)·t_ρ(x))`.
pub fn pairing<const N: usize>(g: &[MatrixField<N>], t: &[MatrixField<N>]) -> f64 {
    2.0 * g
        .iter()
        .zip(t)
        .map(|(a, b)| inner_product(a, b).re)
        .sum::<f64>()
}

/// `Re Σ_x tr(a(x)·b(x))`, the no-dagger pairing of the stencil seeds.
pub fn re_tr_sum<const N: usize>(a: &MatrixField<N>, b: &MatrixField<N>) -> f64 {
    inner_product(&adj(a), b).re
}

/// Site-local gauge rotation `U_d(x) ↦ Ω(x)·U_d(x)·Ω(x+d̂)†`.
pub fn gauge_transform<const N: usize>(
    u: &[MatrixField<N>],
    omega: &MatrixField<N>,
) -> Vec<MatrixField<N>> {
    u.iter()
        .enumerate()
        .map(|(d, ud)| omega * ud * adj(&cshift(omega, d, 1)))
        .collect()
}

/// Random special unitary site field.
pub fn random_gauge_rotation<const N: usize>(grid: Grid, seed: u64) -> MatrixField<N> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Field::from_fn(grid, |_| {
        mat_exp(&(random_algebra_site::<N>(&mut rng) * Complex64::new(0.0, 0.7)))
    })
}

/// Central finite difference of `f` at zero.
pub fn central_difference(f: impl Fn(f64) -> f64, eps: f64) -> f64 {
    (f(eps) - f(-eps)) / (2.0 * eps)
}
