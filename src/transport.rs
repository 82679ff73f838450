//! Compiled parallel-transport evaluator.
//!
//! [`CompiledTransport::build`] validates an instruction list once; the
//! resulting program can then be evaluated against any set of gauge links on
//! any grid. Evaluation is deterministic and side-effect free: the only
//! output is the returned slot fields.

use crate::field::{adj, cshift, ColorMatrix, MatrixField};
use crate::grid::{Grid, ND};
use crate::path::{Instruction, Step, Term};

/// A validated stencil program.
#[derive(Debug)]
pub struct CompiledTransport {
    code: Vec<Instruction>,
    n_outputs: usize,
    n_slots: usize,
}

impl CompiledTransport {
    /// Validate `code` and fix the number of output slots.
    ///
    /// # Panics
    ///
    /// Panics if `n_outputs` is zero, if an accumulation source or slot
    /// factor references a slot no earlier instruction has written, or if the
    /// program leaves an output slot unwritten.
    pub fn build(code: Vec<Instruction>, n_outputs: usize) -> Self {
        assert!(n_outputs > 0, "stencil program must produce output slots");
        let n_slots = code
            .iter()
            .map(|i| i.target + 1)
            .max()
            .unwrap_or(0)
            .max(n_outputs);
        let mut written = vec![false; n_slots];
        for insn in &code {
            if let Some(source) = insn.source {
                assert!(
                    written[source],
                    "accumulation source slot {} read before first write",
                    source
                );
            }
            if let Term::Slots(factors) = &insn.term {
                for f in factors {
                    assert!(
                        f.slot < n_slots && written[f.slot],
                        "slot factor {} read before first write",
                        f.slot
                    );
                }
            }
            written[insn.target] = true;
        }
        for (slot, &w) in written.iter().enumerate().take(n_outputs) {
            assert!(w, "output slot {} never written", slot);
        }
        CompiledTransport {
            code,
            n_outputs,
            n_slots,
        }
    }

    /// Number of instructions in the program.
    #[inline]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Run the program against `links` and return the output slots.
    ///
    /// # Panics
    ///
    /// Panics if `links` does not hold one field per lattice direction or if
    /// the link fields live on different grids.
    pub fn evaluate<const N: usize>(&self, links: &[MatrixField<N>]) -> Vec<MatrixField<N>> {
        assert_eq!(links.len(), ND, "expected one link field per direction");
        let grid = links[0].grid();
        for u in links {
            assert_eq!(u.grid(), grid, "link fields live on different grids");
        }

        let mut slots: Vec<MatrixField<N>> = vec![MatrixField::zeros(grid); self.n_slots];
        for insn in &self.code {
            let term = match &insn.term {
                Term::Transport(path) => transport(links, grid, path.steps()),
                Term::Slots(factors) => {
                    let mut acc = MatrixField::<N>::identity(grid);
                    for f in factors {
                        let mut value = offset_field(&slots[f.slot], f.offset);
                        if f.dagger {
                            value = adj(&value);
                        }
                        acc = acc * value;
                    }
                    acc
                }
            };
            let contribution = term * insn.coefficient;
            slots[insn.target] = match insn.source {
                Some(source) => &slots[source] + contribution,
                None => contribution,
            };
        }
        slots.truncate(self.n_outputs);
        slots
    }
}

/// Ordered link product along `steps`, starting at every site.
fn transport<const N: usize>(
    links: &[MatrixField<N>],
    grid: Grid,
    steps: &[Step],
) -> MatrixField<N> {
    MatrixField::from_fn(grid, |site| {
        let mut m = ColorMatrix::<N>::identity();
        let mut cur = site;
        for &step in steps {
            match step {
                Step::Forward(d) => {
                    m *= links[d][cur];
                    cur = grid.shifted_index(cur, d, 1);
                }
                Step::Backward(d) => {
                    cur = grid.shifted_index(cur, d, -1);
                    m *= links[d][cur].adjoint();
                }
            }
        }
        m
    })
}

/// `f` read at `x + offset` for every site `x`.
fn offset_field<const N: usize>(f: &MatrixField<N>, offset: [i32; ND]) -> MatrixField<N> {
    if offset == [0; ND] {
        return f.clone();
    }
    let mut out = f.clone();
    for (d, &disp) in offset.iter().enumerate() {
        if disp != 0 {
            out = cshift(&out, d, disp);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Complex64;
    use crate::path::{CodeBuilder, Factor, Path};
    use approx::assert_abs_diff_eq;

    fn unit_links(grid: Grid) -> Vec<MatrixField<2>> {
        (0..ND).map(|_| MatrixField::identity(grid)).collect()
    }

    #[test]
    fn closed_loop_on_unit_configuration_is_identity() {
        let grid = Grid::new([2, 2, 2, 2]);
        let links = unit_links(grid);
        let mut b = CodeBuilder::new();
        b.append(0, 1.0, Term::Transport(Path::new().f(0).f(1).b(0).b(1)));
        let program = CompiledTransport::build(b.finish(), 1);
        let out = program.evaluate(&links);
        for site in 0..grid.gsites() {
            assert_abs_diff_eq!(
                (out[0][site] - ColorMatrix::<2>::identity()).norm(),
                0.0,
                epsilon = 1e-14
            );
        }
    }

    #[test]
    fn accumulation_adds_onto_current_slot_value() {
        let grid = Grid::new([2, 2, 2, 2]);
        let links = unit_links(grid);
        let mut b = CodeBuilder::new();
        b.append(0, 2.0, Term::Transport(Path::new()));
        b.append_accumulate(
            0,
            3.0,
            Term::Slots(vec![Factor {
                slot: 0,
                offset: [0; ND],
                dagger: false,
            }]),
        );
        let out = CompiledTransport::build(b.finish(), 1).evaluate(&links);
        // 2·I + 3·(2·I)
        for site in 0..grid.gsites() {
            assert_abs_diff_eq!(
                (out[0][site] - ColorMatrix::<2>::identity() * Complex64::new(8.0, 0.0)).norm(),
                0.0,
                epsilon = 1e-14
            );
        }
    }

    #[test]
    fn transport_walks_the_running_offset() {
        let grid = Grid::new([4, 2, 2, 2]);
        // diagonal links that vary along direction 0 only
        let links: Vec<MatrixField<2>> = (0..ND)
            .map(|d| {
                MatrixField::from_fn(grid, |site| {
                    let c = grid.coordinate(site);
                    let phase = if d == 0 { c[0] as f64 + 1.0 } else { 1.0 };
                    ColorMatrix::<2>::identity() * Complex64::new(phase, 0.0)
                })
            })
            .collect();
        let mut b = CodeBuilder::new();
        b.append(0, 1.0, Term::Transport(Path::new().f(0).f(0)));
        let out = CompiledTransport::build(b.finish(), 1).evaluate(&links);
        let site = grid.index([1, 0, 0, 0]);
        // U_0(x)·U_0(x+0̂) at x = (1,0,0,0) has phase 2·3
        assert_abs_diff_eq!(
            (out[0][site] - ColorMatrix::<2>::identity() * Complex64::new(6.0, 0.0)).norm(),
            0.0,
            epsilon = 1e-14
        );
    }

    #[test]
    #[should_panic(expected = "read before first write")]
    fn forward_slot_reference_is_rejected() {
        let mut b = CodeBuilder::new();
        b.append(
            0,
            1.0,
            Term::Slots(vec![Factor {
                slot: 1,
                offset: [0; ND],
                dagger: false,
            }]),
        );
        let _ = CompiledTransport::build(b.finish(), 1);
    }
}
