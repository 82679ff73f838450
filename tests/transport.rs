mod common;

use approx::assert_abs_diff_eq;
use cloverleaf::{
    adj, cshift, topological_charge_code, CodeBuilder, CompiledTransport, Factor, Grid,
    MatrixField, Path, Term, ND,
};
use common::*;

fn max_site_distance<const N: usize>(a: &MatrixField<N>, b: &MatrixField<N>) -> f64 {
    (0..a.grid().gsites())
        .map(|s| (a[s] - b[s]).norm())
        .fold(0.0, f64::max)
}

#[test]
fn plaquette_path_matches_manual_link_product() {
    let grid = Grid::new([3, 4, 2, 5]);
    let links = random_links::<2>(grid, 41);
    let mut b = CodeBuilder::new();
    b.append(0, 1.0, Term::Transport(Path::new().f(0).f(1).b(0).b(1)));
    let out = CompiledTransport::build(b.finish(), 1).evaluate(&links);

    let manual = &links[0]
        * cshift(&links[1], 0, 1)
        * adj(&cshift(&links[0], 1, 1))
        * adj(&links[1]);
    assert_abs_diff_eq!(max_site_distance(&out[0], &manual), 0.0, epsilon = 1e-12);
}

#[test]
fn dagger_factor_conjugates_the_slot() {
    let grid = Grid::new([2, 3, 2, 2]);
    let links = random_links::<3>(grid, 42);
    let mut b = CodeBuilder::new();
    b.append(1, 1.0, Term::Transport(Path::new().f(0).f(2)));
    b.append(
        0,
        1.0,
        Term::Slots(vec![Factor {
            slot: 1,
            offset: [0; ND],
            dagger: true,
        }]),
    );
    let out = CompiledTransport::build(b.finish(), 1).evaluate(&links);
    let open = &links[0] * cshift(&links[2], 0, 1);
    assert_abs_diff_eq!(max_site_distance(&out[0], &adj(&open)), 0.0, epsilon = 1e-12);
}

#[test]
fn offset_factor_reads_the_shifted_site() {
    let grid = Grid::new([3, 2, 2, 4]);
    let links = random_links::<2>(grid, 43);
    let mut b = CodeBuilder::new();
    b.append(1, 1.0, Term::Transport(Path::new().f(3)));
    b.append(
        0,
        1.0,
        Term::Slots(vec![Factor {
            slot: 1,
            offset: [1, 0, 0, -1],
            dagger: false,
        }]),
    );
    let out = CompiledTransport::build(b.finish(), 1).evaluate(&links);
    let expected = cshift(&cshift(&links[3], 0, 1), 3, -1);
    assert_abs_diff_eq!(max_site_distance(&out[0], &expected), 0.0, epsilon = 1e-12);
}

#[test]
fn charge_program_is_reproducible() {
    let grid = Grid::new([4, 4, 4, 4]);
    let links = random_links::<2>(grid, 44);
    let program = CompiledTransport::build(topological_charge_code(&grid), 1);
    assert_eq!(program.len(), 33);
    assert!(!program.is_empty());
    let first = program.evaluate(&links);
    let second = program.evaluate(&links);
    assert_abs_diff_eq!(max_site_distance(&first[0], &second[0]), 0.0, epsilon = 0.0);
}
