mod common;

use approx::assert_abs_diff_eq;
use cloverleaf::{
    projected_gradient_traceless_hermitian, traceless_anti_hermitian, traceless_hermitian, Grid,
    MatrixField,
};
use common::*;

fn max_trace_norm<const N: usize>(f: &MatrixField<N>) -> f64 {
    (0..f.grid().gsites())
        .map(|s| f[s].trace().norm())
        .fold(0.0, f64::max)
}

fn max_hermiticity_defect<const N: usize>(f: &MatrixField<N>) -> f64 {
    (0..f.grid().gsites())
        .map(|s| (f[s] - f[s].adjoint()).norm())
        .fold(0.0, f64::max)
}

fn max_anti_hermiticity_defect<const N: usize>(f: &MatrixField<N>) -> f64 {
    (0..f.grid().gsites())
        .map(|s| (f[s] + f[s].adjoint()).norm())
        .fold(0.0, f64::max)
}

#[test]
fn hermitian_projection_output_is_traceless_hermitian() {
    let grid = Grid::new([3, 2, 4, 2]);
    let f = random_matrix_field::<3>(grid, 11);
    let h = traceless_hermitian(&f);
    assert_abs_diff_eq!(max_trace_norm(&h), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(max_hermiticity_defect(&h), 0.0, epsilon = 1e-12);
}

#[test]
fn anti_hermitian_projection_output_is_traceless_anti_hermitian() {
    let grid = Grid::new([3, 2, 4, 2]);
    let f = random_matrix_field::<3>(grid, 12);
    let a = traceless_anti_hermitian(&f);
    assert_abs_diff_eq!(max_trace_norm(&a), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(max_anti_hermiticity_defect(&a), 0.0, epsilon = 1e-12);
}

#[test]
fn projections_are_idempotent_fieldwise() {
    let grid = Grid::new([2, 2, 2, 2]);
    let f = random_matrix_field::<2>(grid, 13);
    let h = traceless_hermitian(&f);
    let a = traceless_anti_hermitian(&f);
    for s in 0..grid.gsites() {
        assert_abs_diff_eq!((traceless_hermitian(&h)[s] - h[s]).norm(), 0.0, epsilon = 1e-13);
        assert_abs_diff_eq!(
            (traceless_anti_hermitian(&a)[s] - a[s]).norm(),
            0.0,
            epsilon = 1e-13
        );
    }
}

#[test]
fn lie_projection_gradient_lives_in_the_algebra() {
    let grid = Grid::new([2, 3, 2, 3]);
    let u_l = random_matrix_field::<3>(grid, 21);
    let u_r = random_matrix_field::<3>(grid, 22);
    let r_l = random_matrix_field::<3>(grid, 23);
    let a = projected_gradient_traceless_hermitian(&u_l, &u_r, &r_l);
    assert_abs_diff_eq!(max_trace_norm(&a), 0.0, epsilon = 1e-11);
    assert_abs_diff_eq!(max_hermiticity_defect(&a), 0.0, epsilon = 1e-11);
}

#[test]
fn gradient_outputs_are_algebra_valued() {
    let grid = Grid::new([4, 4, 4, 4]);
    let links = random_links::<2>(grid, 31);
    let seed = random_matrix_field::<2>(grid, 32);
    for g in cloverleaf::v_projected_gradient(&links, 0, 1, &seed) {
        assert_abs_diff_eq!(max_trace_norm(&g), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(max_hermiticity_defect(&g), 0.0, epsilon = 1e-10);
    }
    for g in cloverleaf::topological_charge_gradient(&links, None) {
        assert_abs_diff_eq!(max_trace_norm(&g), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(max_hermiticity_defect(&g), 0.0, epsilon = 1e-10);
    }
}
