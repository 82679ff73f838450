//! Topological charge and clover field strength.
//!
//! The charge is assembled from the six clover-leaf plaquette sums by a
//! compiled stencil program; the forward and reverse gradient rules in
//! [`crate::gradient`] and [`crate::adjoint`] differentiate the equivalent
//! closed form `Q = c · Σ_x Re tr(Σ_i B_i(x)·E_i(x))`.

use std::sync::Arc;

use crate::cache::{CacheKey, StencilCache};
use crate::field::{adj, cshift, scalar_mul, trace, MatrixField, ScalarField};
use crate::grid::ND;
use crate::path::topological_charge_code;
use crate::transport::CompiledTransport;

/// Clover staple difference entering the field strength in the (μ,ν) plane:
///
/// `v = S_μ(U_ν)·S_ν(U_μ)†·U_ν† − S_ν⁻¹(S_μ(U_ν)†·U_μ†·U_ν)`
///
/// with `S_d` the forward shift in direction `d`.
pub fn v<const N: usize>(u: &[MatrixField<N>], mu: usize, nu: usize) -> MatrixField<N> {
    assert_eq!(u.len(), ND, "expected one link field per direction");
    cshift(&u[nu], mu, 1) * adj(&cshift(&u[mu], nu, 1)) * adj(&u[nu])
        - cshift(&(adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu]) * &u[nu]), nu, -1)
}

/// Anti-Hermitian clover field strength `0.125·(F − F†)` with
/// `F = U_μ·v + S_μ⁻¹(v·U_μ)`.
pub fn field_strength<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
) -> MatrixField<N> {
    let v_val = v(u, mu, nu);
    let f = &u[mu] * &v_val + cshift(&(&v_val * &u[mu]), mu, -1);
    (&f - adj(&f)) * 0.125
}

fn charge_program<const N: usize>(
    u: &[MatrixField<N>],
    cache: &StencilCache,
) -> Arc<CompiledTransport> {
    assert_eq!(u.len(), ND, "expected one link field per direction");
    let grid = u[0].grid();
    cache.transport(CacheKey::for_links(u), || {
        CompiledTransport::build(topological_charge_code(&grid), 1)
    })
}

/// Per-site topological charge matrix (the un-traced stencil output).
pub fn topological_charge_matrix<const N: usize>(
    u: &[MatrixField<N>],
    cache: &StencilCache,
) -> MatrixField<N> {
    let program = charge_program(u, cache);
    program
        .evaluate(u)
        .into_iter()
        .next()
        .expect("stencil program produced no output slot")
}

/// Per-site topological charge density, optionally masked.
///
/// The density carries the global `gsites` normalization of the stencil
/// program; summing it and dividing by `gsites` recovers the charge.
pub fn topological_charge_density<const N: usize>(
    u: &[MatrixField<N>],
    mask: Option<&ScalarField>,
    cache: &StencilCache,
) -> ScalarField {
    let density = trace(&topological_charge_matrix(u, cache));
    match mask {
        Some(mask) => density * mask,
        None => density,
    }
}

/// Global topological charge `Q`, optionally restricted by a per-site mask.
pub fn topological_charge<const N: usize>(
    u: &[MatrixField<N>],
    mask: Option<&ScalarField>,
    cache: &StencilCache,
) -> f64 {
    let density = topological_charge_density(u, mask, cache);
    density.sum().re / u[0].grid().gsites() as f64
}

/// Mask applied to a matrix-valued per-site quantity.
pub(crate) fn masked<const N: usize>(
    mask: Option<&ScalarField>,
    f: &MatrixField<N>,
) -> MatrixField<N> {
    match mask {
        Some(mask) => scalar_mul(mask, f),
        None => f.clone(),
    }
}
