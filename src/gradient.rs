//! Forward projected-gradient propagators.
//!
//! Each rule returns one tangent field per link direction; every accumulated
//! contribution is pushed into the algebra by `traceless_hermitian(·/2i)`, so
//! the outputs are coordinate gradients in the traceless Hermitian basis.

use crate::field::{adj, cshift, Complex64, MatrixField, ScalarField};
use crate::grid::ND;
use crate::project::{cartesian, traceless_hermitian};
use crate::topology::{field_strength, masked, v};

/// `1/(2i)`.
pub(crate) const HALF_OVER_I: Complex64 = Complex64::new(0.0, -0.5);

/// Gradient of `⟨right_left, v(U, μ, ν)⟩` with respect to every link.
pub fn v_projected_gradient<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
    right_left: &MatrixField<N>,
) -> Vec<MatrixField<N>> {
    assert_eq!(u.len(), ND, "expected one link field per direction");
    let mut grad = cartesian(u);

    grad[mu] += cshift(
        &(adj(&u[nu]) * right_left * cshift(&u[nu], mu, 1)),
        nu,
        -1,
    ) * adj(&u[mu]);
    grad[mu] -= &u[nu] * cshift(right_left, nu, 1) * adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu]);

    grad[nu] -= &u[nu]
        * cshift(
            &(adj(&cshift(&u[mu], nu, 1)) * adj(&u[nu]) * right_left),
            mu,
            -1,
        );
    grad[nu] -= cshift(
        &(adj(&u[mu]) * &u[nu] * cshift(right_left, nu, 1)),
        mu,
        -1,
    ) * adj(&u[nu]);

    grad[nu] += right_left * cshift(&u[nu], mu, 1) * adj(&cshift(&u[mu], nu, 1)) * adj(&u[nu]);
    grad[nu] += &u[nu] * cshift(right_left, nu, 1) * adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu]);

    grad[mu] = traceless_hermitian(&(&grad[mu] * HALF_OVER_I));
    grad[nu] = traceless_hermitian(&(&grad[nu] * HALF_OVER_I));

    grad
}

/// Gradient of `⟨right_left, F(U, μ, ν)⟩` with
/// `F = U_μ·v + S_μ⁻¹(v·U_μ)`, i.e. the clover sum before
/// anti-symmetrization.
pub fn f_projected_gradient<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
    right_left: &MatrixField<N>,
) -> Vec<MatrixField<N>> {
    assert_eq!(u.len(), ND, "expected one link field per direction");
    let right_left_s = cshift(right_left, mu, 1);
    let v_val = v(u, mu, nu);

    let mut grad = v_projected_gradient(u, mu, nu, &(right_left * &u[mu]));
    let grad2 = v_projected_gradient(u, mu, nu, &(&u[mu] * &right_left_s));
    for (g, g2) in grad.iter_mut().zip(grad2) {
        *g += g2;
    }

    grad[mu] -= traceless_hermitian(&(&u[mu] * &v_val * right_left * HALF_OVER_I));
    grad[mu] -= traceless_hermitian(&(&u[mu] * &right_left_s * v_val * HALF_OVER_I));

    grad
}

/// Gradient of `⟨right_left, field_strength(U, μ, ν)⟩`.
pub fn field_strength_projected_gradient<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
    right_left: &MatrixField<N>,
) -> Vec<MatrixField<N>> {
    let fg1 = f_projected_gradient(u, mu, nu, right_left);
    let fg2 = f_projected_gradient(u, mu, nu, &adj(right_left));
    fg1.iter()
        .zip(fg2.iter())
        .map(|(g1, g2)| (g1 - adj(g2)) * 0.125)
        .collect()
}

/// The six field-strength planes paired in the charge reduction: each entry
/// is `((μ_B, ν_B), (μ_E, ν_E))` for one magnetic/electric product.
pub(crate) const CHARGE_PLANE_PAIRS: [((usize, usize), (usize, usize)); 3] =
    [((1, 2), (3, 0)), ((2, 0), (3, 1)), ((0, 1), (3, 2))];

/// `8/(32π²)`, the continuum normalization of the charge density.
pub(crate) const CHARGE_COEFF: f64 = 8.0 / (32.0 * std::f64::consts::PI * std::f64::consts::PI);

/// Coordinate gradient of the (optionally masked) topological charge with
/// respect to every link.
pub fn topological_charge_gradient<const N: usize>(
    u: &[MatrixField<N>],
    mask: Option<&ScalarField>,
) -> Vec<MatrixField<N>> {
    assert_eq!(u.len(), ND, "expected one link field per direction");

    let mut delta = cartesian(u);
    for ((mu_b, nu_b), (mu_e, nu_e)) in CHARGE_PLANE_PAIRS {
        let b = field_strength(u, mu_b, nu_b);
        let e = field_strength(u, mu_e, nu_e);
        let db = field_strength_projected_gradient(u, mu_b, nu_b, &masked(mask, &e));
        let de = field_strength_projected_gradient(u, mu_e, nu_e, &masked(mask, &b));
        for ((d, db_rho), de_rho) in delta.iter_mut().zip(db).zip(de) {
            *d += db_rho;
            *d += de_rho;
        }
    }

    delta.into_iter().map(|d| d * CHARGE_COEFF).collect()
}
