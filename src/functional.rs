//! Differentiable functional interface.
//!
//! Optimizers and samplers drive observables through this trait: a scalar
//! `call` and a per-link `gradient`, with the caller selecting which links it
//! wants derivatives for.

use crate::cache::default_cache;
use crate::field::{MatrixField, ScalarField};
use crate::gradient::topological_charge_gradient;
use crate::topology::topological_charge;

/// A scalar functional of a gauge configuration with a hand-derived
/// gradient.
pub trait DifferentiableFunctional<const N: usize> {
    /// Value at `u`.
    fn call(&self, u: &[MatrixField<N>]) -> f64;

    /// Coordinate gradient with respect to the links selected by `du`
    /// (indices into `u`), in the order given.
    fn gradient(&self, u: &[MatrixField<N>], du: &[usize]) -> Vec<MatrixField<N>>;
}

/// The (optionally masked) topological charge as a differentiable
/// functional.
#[derive(Clone, Debug, Default)]
pub struct TopologicalCharge {
    mask: Option<ScalarField>,
}

impl TopologicalCharge {
    pub fn new() -> Self {
        TopologicalCharge { mask: None }
    }

    /// Restrict the charge to the support of a per-site mask.
    pub fn with_mask(mask: ScalarField) -> Self {
        TopologicalCharge { mask: Some(mask) }
    }
}

impl<const N: usize> DifferentiableFunctional<N> for TopologicalCharge {
    fn call(&self, u: &[MatrixField<N>]) -> f64 {
        topological_charge(u, self.mask.as_ref(), default_cache())
    }

    fn gradient(&self, u: &[MatrixField<N>], du: &[usize]) -> Vec<MatrixField<N>> {
        let gradient = topological_charge_gradient(u, self.mask.as_ref());
        du.iter().map(|&i| gradient[i].clone()).collect()
    }
}
