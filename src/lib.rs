//! Differentiable lattice gauge observables.
//!
//! `cloverleaf` evaluates the clover-discretized topological charge of a
//! 4-dimensional periodic gauge configuration and its hand-derived
//! derivatives: forward projected-gradient propagators for every building
//! block (clover staple difference, clover sum, field strength, charge) and
//! the matching reverse-mode propagators, including the Hessian-vector
//! product of the charge itself.
//!
//! The charge is computed by a stencil program compiled once per
//! (representation, grid, dimension) key and cached; gradients live in the
//! traceless Hermitian representation of the gauge algebra.
//!
//! ```
//! use cloverleaf::{default_cache, topological_charge, Grid, MatrixField, ND};
//!
//! let grid = Grid::new([4, 4, 4, 4]);
//! let links: Vec<MatrixField<3>> = (0..ND).map(|_| MatrixField::identity(grid)).collect();
//! let q = topological_charge(&links, None, default_cache());
//! assert!(q.abs() < 1e-12);
//! ```

pub mod adjoint;
pub mod cache;
pub mod field;
pub mod functional;
pub mod gradient;
pub mod grid;
pub mod path;
pub mod project;
pub mod topology;
pub mod transport;

pub use adjoint::{
    f_projected_gradient_right_left_adjoint, field_strength_projected_gradient_right_left_adjoint,
    projected_gradient_f_projected_gradient,
    projected_gradient_field_strength_projected_gradient,
    projected_gradient_topological_charge_gradient, projected_gradient_traceless_hermitian,
    projected_gradient_v_projected_gradient, v_projected_gradient_right_left_adjoint,
};
pub use cache::{default_cache, CacheKey, Representation, StencilCache};
pub use field::{
    adj, cshift, inner_product, scalar_mul, trace, ColorMatrix, Complex64, Field, MatrixField,
    ScalarField,
};
pub use functional::{DifferentiableFunctional, TopologicalCharge};
pub use gradient::{
    f_projected_gradient, field_strength_projected_gradient, topological_charge_gradient,
    v_projected_gradient,
};
pub use grid::{coordinates, CoordinateSource, Grid, Parity, ND};
pub use path::{topological_charge_code, CodeBuilder, Factor, Instruction, Path, Step, Term};
pub use project::{cartesian, traceless_anti_hermitian, traceless_hermitian};
pub use topology::{
    field_strength, topological_charge, topological_charge_density, topological_charge_matrix, v,
};
pub use transport::CompiledTransport;
