//! Reverse-mode (adjoint) propagators.
//!
//! The forward rules in [`crate::gradient`] map a cotangent seed `right_left`
//! to one tangent field per link. The functions here transpose those maps: a
//! seed `outer_right_left` (one traceless Hermitian field per direction,
//! paired as `h(U) = Σ_ρ Re Σ_x tr(w_ρ · G_ρ(U))`) is pulled back to the
//! coordinate gradient of `h` with respect to every link.
//!
//! All adjoints are taken under the real Frobenius inner product
//! `⟨A,B⟩ = Re Σ_x tr(A(x)† B(x))`, for which the traceless (anti-)Hermitian
//! projections are self-adjoint, `cshift(·, d, s)` has adjoint
//! `cshift(·, d, −s)`, and `X ↦ A·X·B` has adjoint `Y ↦ A†·Y·B†`.

use crate::field::{adj, cshift, scalar_mul, trace, Complex64, MatrixField, ScalarField};
use crate::gradient::{
    field_strength_projected_gradient, CHARGE_COEFF, CHARGE_PLANE_PAIRS, HALF_OVER_I,
};
use crate::grid::ND;
use crate::project::{cartesian, traceless_anti_hermitian, traceless_hermitian};
use crate::topology::{field_strength, masked, v};

/// `i/2 = −1/(2i)`, the conjugate of the forward `1/(2i)` factor.
const HALF_I: Complex64 = Complex64::new(0.0, 0.5);

/// Gradient of `⟨r_l, traceless_hermitian(U_R·U_L)⟩` with the tangent
/// inserted between `U_R` and `U_L`:
///
/// `TAH(U_L·R_L·U_R·0.5 − 0.5·U_R†·R_L·U_L†)·0.5i
///   − (1/2N)·TAH(U − U†)·tr(R_L + R_L†)·0.25i`,  `U = U_L·U_R`.
pub fn projected_gradient_traceless_hermitian<const N: usize>(
    u_l: &MatrixField<N>,
    u_r: &MatrixField<N>,
    r_l: &MatrixField<N>,
) -> MatrixField<N> {
    let u = u_l * u_r;
    let a = traceless_anti_hermitian(&(u_l * r_l * u_r * 0.5 - adj(u_r) * r_l * adj(u_l) * 0.5))
        * Complex64::new(0.0, 0.5);
    let tr_rl = trace(&(r_l + adj(r_l)));
    let correction = scalar_mul(&tr_rl, &traceless_anti_hermitian(&(&u - adj(&u))))
        * Complex64::new(0.0, 0.25 / (2.0 * N as f64));
    a - correction
}

/// Reverse propagator of [`crate::gradient::v_projected_gradient`].
///
/// The forward seed is factorized as `right·U_μ·left`; the fixed seed enters
/// through `right` and `left` while `outer_right_left` carries the adjoint
/// seed being pulled back.
pub fn projected_gradient_v_projected_gradient<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
    right: &MatrixField<N>,
    left: &MatrixField<N>,
    outer_right_left: &[MatrixField<N>],
) -> Vec<MatrixField<N>> {
    assert_eq!(u.len(), ND, "expected one link field per direction");
    assert_eq!(
        outer_right_left.len(),
        ND,
        "expected one seed field per direction"
    );
    let rl = right * &u[mu] * left;
    let one = MatrixField::<N>::identity(u[0].grid());
    let outer = outer_right_left;
    let mut grad = cartesian(u);

    // adjoint of: grad[mu] += S_nu^-1(U_nu^dag · rl · S_mu(U_nu)) · U_mu^dag
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu]
            * cshift(&(cshift(&adj(&u[nu]), mu, 1) * adj(&rl) * &u[nu]), nu, -1)
            * HALF_I),
        &one,
        &outer[mu],
    );
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu] * left * cshift(&u[nu], mu, 1) * cshift(&adj(&u[mu]), nu, 1) * HALF_OVER_I),
        &(adj(&u[nu]) * right),
        &cshift(&outer[mu], nu, 1),
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * HALF_I),
        &(cshift(&u[mu], nu, 1) * cshift(&adj(&u[nu]), mu, 1) * adj(&rl)),
        &cshift(&outer[mu], nu, 1),
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&cshift(&adj(&u[mu]), nu, 1), mu, -1) * HALF_OVER_I),
        &cshift(&(adj(&u[nu]) * &rl), mu, -1),
        &cshift(&cshift(&outer[mu], nu, 1), mu, -1),
    );

    // adjoint of: grad[mu] -= U_nu · S_nu(rl) · S_mu(U_nu)^dag · U_mu^dag
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * cshift(&u[nu], mu, 1) * cshift(&adj(&rl), nu, 1) * adj(&u[nu])
            * HALF_I),
        &one,
        &outer[mu],
    );
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * left * cshift(&(cshift(&adj(&u[nu]), mu, 1) * adj(&u[mu])), nu, -1)
            * HALF_OVER_I),
        &(cshift(&u[nu], nu, -1) * right),
        &cshift(&outer[mu], nu, -1),
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&rl, nu, 1) * adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu]) * HALF_OVER_I),
        &one,
        &outer[mu],
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&(cshift(&adj(&rl), nu, 1) * adj(&u[nu])), mu, -1) * HALF_I),
        &cshift(&u[mu], mu, -1),
        &cshift(&outer[mu], mu, -1),
    );

    // adjoint of: grad[nu] -= U_nu · S_mu^-1(S_nu(U_mu)^dag · U_nu^dag · rl)
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * cshift(&cshift(&adj(&u[nu]), mu, 1), nu, -1) * HALF_I),
        &cshift(&(adj(&rl) * &u[nu]), nu, -1),
        &cshift(&cshift(&outer[nu], mu, 1), nu, -1),
    );
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * left * HALF_OVER_I),
        &(cshift(&u[nu], mu, 1) * adj(&cshift(&u[mu], nu, 1)) * adj(&u[nu]) * right),
        &cshift(&outer[nu], mu, 1),
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu]
            * cshift(&(adj(&cshift(&u[mu], nu, 1)) * adj(&u[nu]) * &rl), mu, -1)
            * HALF_OVER_I),
        &one,
        &outer[nu],
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&u[mu], nu, 1) * cshift(&adj(&u[nu]), mu, 1) * HALF_I),
        &adj(&rl),
        &cshift(&outer[nu], mu, 1),
    );

    // adjoint of: grad[nu] -= S_mu^-1(U_mu^dag · U_nu · S_nu(rl)) · U_nu^dag
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * HALF_I),
        &(cshift(&u[nu], mu, 1) * cshift(&adj(&rl), nu, 1) * adj(&u[nu])),
        &cshift(&outer[nu], mu, 1),
    );
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * left * cshift(&cshift(&adj(&u[nu]), mu, 1), nu, -1) * HALF_OVER_I),
        &(cshift(&(adj(&u[mu]) * &u[nu]), nu, -1) * right),
        &cshift(&cshift(&outer[nu], mu, 1), nu, -1),
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&rl, nu, 1) * cshift(&adj(&u[nu]), mu, 1) * HALF_OVER_I),
        &adj(&u[mu]),
        &cshift(&outer[nu], mu, 1),
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu]
            * cshift(&(cshift(&adj(&rl), nu, 1) * adj(&u[nu]) * &u[mu]), mu, -1)
            * HALF_I),
        &one,
        &outer[nu],
    );

    // adjoint of: grad[nu] += rl · S_mu(U_nu) · S_nu(U_mu)^dag · U_nu^dag
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu] * cshift(&(cshift(&adj(&u[nu]), mu, 1) * adj(&rl)), nu, -1) * HALF_I),
        &cshift(&u[nu], nu, -1),
        &cshift(&outer[nu], nu, -1),
    );
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu] * left * cshift(&u[nu], mu, 1) * adj(&cshift(&u[mu], nu, 1)) * adj(&u[nu])
            * HALF_OVER_I),
        right,
        &outer[nu],
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&(adj(&cshift(&u[mu], nu, 1)) * adj(&u[nu])), mu, -1) * HALF_OVER_I),
        &cshift(&rl, mu, -1),
        &cshift(&outer[nu], mu, -1),
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&u[mu], nu, 1) * cshift(&adj(&u[nu]), mu, 1) * adj(&rl)
            * HALF_I),
        &one,
        &outer[nu],
    );

    // adjoint of: grad[nu] += U_nu · S_nu(rl) · S_mu(U_nu)^dag · U_mu^dag
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu] * cshift(&u[nu], mu, 1) * cshift(&adj(&rl), nu, 1) * adj(&u[nu])
            * HALF_I),
        &one,
        &outer[nu],
    );
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu] * left * cshift(&(adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu])), nu, -1)
            * HALF_OVER_I),
        &(cshift(&u[nu], nu, -1) * right),
        &cshift(&outer[nu], nu, -1),
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&rl, nu, 1) * adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu]) * HALF_OVER_I),
        &one,
        &outer[nu],
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * adj(&cshift(&(&u[nu] * cshift(&rl, nu, 1)), mu, -1)) * HALF_I),
        &cshift(&u[mu], mu, -1),
        &cshift(&outer[nu], mu, -1),
    );

    grad
}

/// Reverse propagator of [`crate::gradient::f_projected_gradient`].
pub fn projected_gradient_f_projected_gradient<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
    right_left: &MatrixField<N>,
    outer_right_left: &[MatrixField<N>],
) -> Vec<MatrixField<N>> {
    assert_eq!(u.len(), ND, "expected one link field per direction");
    let right_left_s = cshift(right_left, mu, 1);
    let one = MatrixField::<N>::identity(u[0].grid());
    let rl = right_left;
    let rls = &right_left_s;
    let outer = outer_right_left;

    let mut grad = projected_gradient_v_projected_gradient(u, mu, nu, rl, &one, outer);
    let grad2 = projected_gradient_v_projected_gradient(u, mu, nu, &one, rls, outer);
    for (g, g2) in grad.iter_mut().zip(grad2) {
        *g += g2;
    }

    // adjoint of: grad[mu] -= TH(U_mu · v · rl / 2i), first staple term
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * cshift(&u[nu], mu, 1) * adj(&cshift(&u[mu], nu, 1)) * adj(&u[nu]) * rl
            * HALF_OVER_I),
        &one,
        &outer[mu],
    );
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * adj(&cshift(&(&u[mu] * cshift(&u[nu], mu, 1)), nu, -1)) * HALF_I),
        &cshift(&(adj(rl) * &u[nu]), nu, -1),
        &cshift(&outer[mu], nu, -1),
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu]
            * cshift(&(cshift(&adj(&u[mu]), nu, 1) * adj(&u[nu]) * rl), mu, -1)
            * HALF_OVER_I),
        &cshift(&u[mu], mu, -1),
        &cshift(&outer[mu], mu, -1),
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&u[mu], nu, 1) * cshift(&adj(&u[nu]), mu, 1) * adj(&u[mu])
            * HALF_I),
        &adj(rl),
        &outer[mu],
    );

    // adjoint of: grad[mu] -= TH(U_mu · v · rl / 2i), second staple term
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu]
            * cshift(&(adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu]) * &u[nu]), nu, -1)
            * rl
            * HALF_OVER_I),
        &one,
        &outer[mu],
    );
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu] * adj(&(cshift(&u[mu], nu, 1) * adj(&cshift(&u[nu], mu, 1)))) * HALF_I),
        &adj(&(&u[nu] * cshift(rl, nu, 1))),
        &cshift(&outer[mu], nu, 1),
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&cshift(&adj(&u[mu]), nu, 1), mu, -1) * HALF_I),
        &adj(&cshift(&(adj(&u[mu]) * &u[nu] * cshift(rl, nu, 1)), mu, -1)),
        &cshift(&cshift(&outer[mu], nu, 1), mu, -1),
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(rl, nu, 1) * HALF_OVER_I),
        &(cshift(&u[mu], nu, 1) * adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu])),
        &cshift(&outer[mu], nu, 1),
    );

    // adjoint of: grad[mu] -= TH(U_mu · S_mu(rl) · v / 2i), first staple term
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * rls * cshift(&u[nu], mu, 1) * adj(&cshift(&u[mu], nu, 1)) * adj(&u[nu])
            * HALF_OVER_I),
        &one,
        &outer[mu],
    );
    grad[mu] -= projected_gradient_traceless_hermitian(
        &(&u[mu] * adj(&cshift(&(&u[mu] * rls * cshift(&u[nu], mu, 1)), nu, -1))
            * HALF_I),
        &adj(&cshift(&adj(&u[nu]), nu, -1)),
        &cshift(&outer[mu], nu, -1),
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&(cshift(&adj(&u[mu]), nu, 1) * adj(&u[nu])), mu, -1) * HALF_OVER_I),
        &cshift(&(&u[mu] * rls), mu, -1),
        &cshift(&outer[mu], mu, -1),
    );
    grad[nu] -= projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&u[mu], nu, 1) * cshift(&adj(&u[nu]), mu, 1) * adj(&(&u[mu] * rls))
            * HALF_I),
        &one,
        &outer[mu],
    );

    // adjoint of: grad[mu] -= TH(U_mu · S_mu(rl) · v / 2i), second staple term
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu]
            * rls
            * cshift(&(adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu]) * &u[nu]), nu, -1)
            * HALF_OVER_I),
        &one,
        &outer[mu],
    );
    grad[mu] += projected_gradient_traceless_hermitian(
        &(&u[mu] * adj(&(cshift(&(&u[mu] * rls), nu, 1) * adj(&cshift(&u[nu], mu, 1))))
            * HALF_I),
        &adj(&u[nu]),
        &cshift(&outer[mu], nu, 1),
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * cshift(&cshift(&adj(&(&u[mu] * rls)), nu, 1), mu, -1) * HALF_I),
        &adj(&cshift(&(adj(&u[mu]) * &u[nu]), mu, -1)),
        &cshift(&cshift(&outer[mu], nu, 1), mu, -1),
    );
    grad[nu] += projected_gradient_traceless_hermitian(
        &(&u[nu] * HALF_OVER_I),
        &(cshift(&(&u[mu] * rls), nu, 1) * adj(&cshift(&u[nu], mu, 1)) * adj(&u[mu])),
        &cshift(&outer[mu], nu, 1),
    );

    grad
}

/// Reverse propagator of
/// [`crate::gradient::field_strength_projected_gradient`].
pub fn projected_gradient_field_strength_projected_gradient<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
    right_left: &MatrixField<N>,
    outer_right_left: &[MatrixField<N>],
) -> Vec<MatrixField<N>> {
    let fg1 = projected_gradient_f_projected_gradient(u, mu, nu, right_left, outer_right_left);
    let fg2 = projected_gradient_f_projected_gradient(
        u,
        mu,
        nu,
        &adj(right_left),
        outer_right_left,
    );
    fg1.iter()
        .zip(fg2.iter())
        .map(|(g1, g2)| (g1 - adj(g2)) * 0.125)
        .collect()
}

/// Adjoint of the seed map `right_left ↦ v_projected_gradient(U, μ, ν, ·)`.
///
/// Pulls one tangent field per direction back to a single cotangent on the
/// `right_left` argument. The seed is projected into the algebra on entry;
/// for seeds already traceless Hermitian the projection is the identity.
pub fn v_projected_gradient_right_left_adjoint<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
    outer_right_left: &[MatrixField<N>],
) -> MatrixField<N> {
    assert_eq!(u.len(), ND, "expected one link field per direction");
    let w_mu = traceless_hermitian(&outer_right_left[mu]);
    let w_nu = traceless_hermitian(&outer_right_left[nu]);

    let mut theta = &u[nu] * cshift(&(&w_mu * &u[mu]), nu, 1) * adj(&cshift(&u[nu], mu, 1));
    theta -= cshift(&(adj(&u[nu]) * &w_mu * &u[mu] * cshift(&u[nu], mu, 1)), nu, -1);
    theta -= &u[nu] * cshift(&u[mu], nu, 1) * cshift(&(adj(&u[nu]) * &w_nu), mu, 1);
    theta -= cshift(&(adj(&u[nu]) * &u[mu] * cshift(&(&w_nu * &u[nu]), mu, 1)), nu, -1);
    theta += &w_nu * &u[nu] * cshift(&u[mu], nu, 1) * adj(&cshift(&u[nu], mu, 1));
    theta += cshift(&(adj(&u[nu]) * &w_nu * &u[mu] * cshift(&u[nu], mu, 1)), nu, -1);
    theta * HALF_I
}

/// Adjoint of the seed map `right_left ↦ f_projected_gradient(U, μ, ν, ·)`.
pub fn f_projected_gradient_right_left_adjoint<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
    outer_right_left: &[MatrixField<N>],
) -> MatrixField<N> {
    let theta = v_projected_gradient_right_left_adjoint(u, mu, nu, outer_right_left);
    let w_mu = traceless_hermitian(&outer_right_left[mu]);
    let v_val = v(u, mu, nu);

    let mut psi = &theta * adj(&u[mu]) + cshift(&(adj(&u[mu]) * &theta), mu, -1);
    psi -= adj(&v_val) * adj(&u[mu]) * &w_mu * HALF_I;
    psi -= cshift(&(adj(&u[mu]) * &w_mu * adj(&v_val)), mu, -1) * HALF_I;
    psi
}

/// Adjoint of the seed map
/// `right_left ↦ field_strength_projected_gradient(U, μ, ν, ·)`, expressed
/// in the no-dagger pairing `tr(right_left · F)` so the result can seed a
/// forward propagator directly.
pub fn field_strength_projected_gradient_right_left_adjoint<const N: usize>(
    u: &[MatrixField<N>],
    mu: usize,
    nu: usize,
    outer_right_left: &[MatrixField<N>],
) -> MatrixField<N> {
    let psi = f_projected_gradient_right_left_adjoint(u, mu, nu, outer_right_left);
    (adj(&psi) - &psi) * 0.125
}

/// Reverse propagator of [`crate::gradient::topological_charge_gradient`]:
/// the Hessian-vector product of the (optionally masked) charge.
///
/// Per field-strength pair the rule combines (a) the fixed-seed reverse
/// propagators of both planes and (b) the chain terms through each partner
/// field strength, routed through the `*_right_left_adjoint` maps.
pub fn projected_gradient_topological_charge_gradient<const N: usize>(
    u: &[MatrixField<N>],
    mask: Option<&ScalarField>,
    outer_right_left: &[MatrixField<N>],
) -> Vec<MatrixField<N>> {
    assert_eq!(u.len(), ND, "expected one link field per direction");
    assert_eq!(
        outer_right_left.len(),
        ND,
        "expected one seed field per direction"
    );

    let mut hw = cartesian(u);
    for ((a_mu, a_nu), (b_mu, b_nu)) in CHARGE_PLANE_PAIRS {
        let f_a = field_strength(u, a_mu, a_nu);
        let f_b = field_strength(u, b_mu, b_nu);

        let fixed_a = projected_gradient_field_strength_projected_gradient(
            u,
            a_mu,
            a_nu,
            &masked(mask, &f_b),
            outer_right_left,
        );
        let fixed_b = projected_gradient_field_strength_projected_gradient(
            u,
            b_mu,
            b_nu,
            &masked(mask, &f_a),
            outer_right_left,
        );

        let chi_a =
            field_strength_projected_gradient_right_left_adjoint(u, a_mu, a_nu, outer_right_left);
        let chi_b =
            field_strength_projected_gradient_right_left_adjoint(u, b_mu, b_nu, outer_right_left);
        let chain_b = field_strength_projected_gradient(u, b_mu, b_nu, &masked(mask, &chi_a));
        let chain_a = field_strength_projected_gradient(u, a_mu, a_nu, &masked(mask, &chi_b));

        for ((((h, t1), t2), t3), t4) in hw
            .iter_mut()
            .zip(fixed_a)
            .zip(fixed_b)
            .zip(chain_b)
            .zip(chain_a)
        {
            *h += t1;
            *h += t2;
            *h += t3;
            *h += t4;
        }
    }

    hw.into_iter().map(|h| h * CHARGE_COEFF).collect()
}
