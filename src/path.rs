//! Parallel-transport instruction lists.
//!
//! A stencil program is an ordered list of [`Instruction`]s. Each instruction
//! writes one slot of the evaluator's workspace: either it starts a fresh
//! accumulation (`source == None`) or it adds onto the current value of a
//! previously written slot. The right-hand side is a coefficient times a
//! [`Term`], which is either a closed or open [`Path`] of gauge links or a
//! product of already computed slots.

use std::f64::consts::PI;

use crate::field::Complex64;
use crate::grid::{Grid, ND};

/// One hop of a transport path.
///
/// `Forward(d)` multiplies by the link in direction `d` at the running
/// offset, then advances the offset; `Backward(d)` retreats the offset, then
/// multiplies by the adjoint link there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    Forward(usize),
    Backward(usize),
}

/// An ordered product of forward links and backward adjoint links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// Empty path (the identity transport).
    pub fn new() -> Self {
        Path { steps: Vec::new() }
    }

    /// Append a forward hop in direction `d`.
    ///
    /// # Panics
    ///
    /// Panics if `d` is not a lattice direction.
    pub fn f(mut self, d: usize) -> Self {
        assert!(d < ND, "path direction {} out of range", d);
        self.steps.push(Step::Forward(d));
        self
    }

    /// Append a backward hop in direction `d`.
    ///
    /// # Panics
    ///
    /// Panics if `d` is not a lattice direction.
    pub fn b(mut self, d: usize) -> Self {
        assert!(d < ND, "path direction {} out of range", d);
        self.steps.push(Step::Backward(d));
        self
    }

    /// The hops in order.
    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// One factor of a slot-product term: a previously computed slot read at a
/// relative site offset, optionally conjugate-transposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Factor {
    pub slot: usize,
    pub offset: [i32; ND],
    pub dagger: bool,
}

/// Right-hand side of an instruction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    /// Transport along a path of gauge links.
    Transport(Path),
    /// Ordered product of previously computed slots.
    Slots(Vec<Factor>),
}

/// One assignment of the stencil program.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    pub target: usize,
    /// Slot whose current value seeds the accumulation; `None` starts fresh.
    pub source: Option<usize>,
    pub coefficient: Complex64,
    pub term: Term,
}

/// Incremental builder for a stencil program.
///
/// `append` starts a fresh accumulation into `target`; `append_accumulate`
/// adds onto the target's current value. Instructions execute in append
/// order, so a slot-product term may reference any slot written earlier,
/// including the target itself.
#[derive(Debug, Default)]
pub struct CodeBuilder {
    code: Vec<Instruction>,
}

impl CodeBuilder {
    pub fn new() -> Self {
        CodeBuilder { code: Vec::new() }
    }

    /// `target = coefficient · term`.
    pub fn append(
        &mut self,
        target: usize,
        coefficient: impl Into<Complex64>,
        term: Term,
    ) -> &mut Self {
        self.code.push(Instruction {
            target,
            source: None,
            coefficient: coefficient.into(),
            term,
        });
        self
    }

    /// `target = target + coefficient · term`.
    pub fn append_accumulate(
        &mut self,
        target: usize,
        coefficient: impl Into<Complex64>,
        term: Term,
    ) -> &mut Self {
        self.code.push(Instruction {
            target,
            source: Some(target),
            coefficient: coefficient.into(),
            term,
        });
        self
    }

    /// The finished instruction list.
    pub fn finish(self) -> Vec<Instruction> {
        self.code
    }
}

/// `(temporary slot − 1, μ, ν)` for the six clover leaves: the magnetic
/// planes (1,2), (2,0), (0,1) and the electric planes (3,0), (3,1), (3,2).
const TEMPORARIES: [(usize, usize, usize); 6] =
    [(0, 1, 2), (1, 2, 0), (2, 0, 1), (3, 3, 0), (4, 3, 1), (5, 3, 2)];

/// Stencil program for the per-site topological charge matrix.
///
/// Slot 0 receives the output; slots 1..=6 hold the six anti-symmetrized
/// clover sums, each built from the four plaquette orientations in its plane
/// with signs {+1, −1, +1, −1} followed by subtraction of its own adjoint.
/// The final reduction pairs magnetic and electric slots with the
/// normalization `8/(32π²) · 0.125² · gsites`.
pub fn topological_charge_code(grid: &Grid) -> Vec<Instruction> {
    let origin = [0i32; ND];
    let mut builder = CodeBuilder::new();

    for (tmp, mu, nu) in TEMPORARIES {
        let t = 1 + tmp;
        builder.append(t, 1.0, Term::Transport(Path::new().f(mu).f(nu).b(mu).b(nu)));
        builder.append_accumulate(t, -1.0, Term::Transport(Path::new().f(mu).b(nu).b(mu).f(nu)));
        builder.append_accumulate(t, 1.0, Term::Transport(Path::new().f(nu).b(mu).b(nu).f(mu)));
        builder.append_accumulate(t, -1.0, Term::Transport(Path::new().b(nu).b(mu).f(nu).f(mu)));
        builder.append_accumulate(
            t,
            -1.0,
            Term::Slots(vec![Factor {
                slot: t,
                offset: origin,
                dagger: true,
            }]),
        );
    }

    let coeff = 8.0 / (32.0 * PI * PI) * 0.125 * 0.125 * grid.gsites() as f64;
    for i in 0..3 {
        let term = Term::Slots(vec![
            Factor {
                slot: 1 + i,
                offset: origin,
                dagger: false,
            },
            Factor {
                slot: 4 + i,
                offset: origin,
                dagger: false,
            },
        ]);
        if i == 0 {
            builder.append(0, coeff, term);
        } else {
            builder.append_accumulate(0, coeff, term);
        }
    }

    builder.finish()
}
