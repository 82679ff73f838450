//! Per-site tensor storage over a periodic lattice.
//!
//! [`Field<T>`] assigns one value of `T` to every site of a [`Grid`].
//! `MatrixField<N>` (gauge links, Lie-algebra tangents) and [`ScalarField`]
//! (traces, masks) are the two instantiations the observables use. All
//! arithmetic is site-wise; mixing fields from different grids is a fatal
//! assertion, mirroring a representation mismatch in the stencil formulas.

use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use nalgebra::SMatrix;
use num_complex::Complex;
use num_traits::Zero;

use crate::grid::{Grid, ND};

/// Complex double-precision scalar.
pub type Complex64 = Complex<f64>;

/// N×N complex matrix attached to a single site.
pub type ColorMatrix<const N: usize> = SMatrix<Complex64, N, N>;

/// A lattice of per-site values.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T> {
    grid: Grid,
    data: Vec<T>,
}

/// Group-valued or algebra-valued matrix field.
pub type MatrixField<const N: usize> = Field<ColorMatrix<N>>;

/// Complex scalar field (per-site traces, masks).
pub type ScalarField = Field<Complex64>;

impl<T: Copy> Field<T> {
    /// Field with the same value at every site.
    pub fn constant(grid: Grid, value: T) -> Self {
        Field {
            grid,
            data: vec![value; grid.gsites()],
        }
    }

    /// Field built site by site from a linear-index closure.
    pub fn from_fn(grid: Grid, mut f: impl FnMut(usize) -> T) -> Self {
        Field {
            grid,
            data: (0..grid.gsites()).map(|s| f(s)).collect(),
        }
    }

    /// The grid this field lives on.
    #[inline]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Overwrite every site with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Site values in lexicographic order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Apply `f` at every site.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Field<U> {
        Field {
            grid: self.grid,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Sum over all sites (a blocking collective in a distributed setting).
    pub fn sum(&self) -> T
    where
        T: Zero + Add<Output = T>,
    {
        self.data.iter().fold(T::zero(), |acc, &x| acc + x)
    }
}

impl<T> Index<usize> for Field<T> {
    type Output = T;
    #[inline]
    fn index(&self, site: usize) -> &T {
        &self.data[site]
    }
}

impl<T> IndexMut<usize> for Field<T> {
    #[inline]
    fn index_mut(&mut self, site: usize) -> &mut T {
        &mut self.data[site]
    }
}

#[inline]
fn zip<T: Copy, U: Copy, V>(a: &Field<T>, b: &Field<U>, f: impl Fn(T, U) -> V) -> Field<V> {
    assert_eq!(
        a.grid, b.grid,
        "site-wise operation on fields from different grids"
    );
    Field {
        grid: a.grid,
        data: a
            .data
            .iter()
            .zip(b.data.iter())
            .map(|(&x, &y)| f(x, y))
            .collect(),
    }
}

impl<const N: usize> MatrixField<N> {
    /// Zero matrix at every site.
    pub fn zeros(grid: Grid) -> Self {
        Field::constant(grid, ColorMatrix::<N>::zeros())
    }

    /// Identity matrix at every site.
    pub fn identity(grid: Grid) -> Self {
        Field::constant(grid, ColorMatrix::<N>::identity())
    }
}

/// Covariant shift: `cshift(f, d, disp)(x) = f(x + disp·d̂)`, periodic.
///
/// # Panics
///
/// Panics if `d` is not a lattice direction.
pub fn cshift<T: Copy>(f: &Field<T>, d: usize, disp: i32) -> Field<T> {
    assert!(d < ND, "shift direction {} out of range", d);
    let grid = f.grid;
    Field::from_fn(grid, |site| f.data[grid.shifted_index(site, d, disp)])
}

/// Site values with a conjugate-transpose.
pub trait SiteAdjoint {
    fn site_adjoint(&self) -> Self;
}

impl SiteAdjoint for Complex64 {
    #[inline]
    fn site_adjoint(&self) -> Self {
        self.conj()
    }
}

impl<const N: usize> SiteAdjoint for ColorMatrix<N> {
    #[inline]
    fn site_adjoint(&self) -> Self {
        self.adjoint()
    }
}

/// Site-wise conjugate transpose.
pub fn adj<T: Copy + SiteAdjoint>(f: &Field<T>) -> Field<T> {
    f.map(|x| x.site_adjoint())
}

/// Site-wise matrix trace.
pub fn trace<const N: usize>(f: &MatrixField<N>) -> ScalarField {
    f.map(|m| m.trace())
}

/// `Σ_x tr(a(x)† · b(x))` (a blocking collective in a distributed setting).
pub fn inner_product<const N: usize>(a: &MatrixField<N>, b: &MatrixField<N>) -> Complex64 {
    assert_eq!(
        a.grid, b.grid,
        "inner product of fields from different grids"
    );
    let mut acc = Complex64::zero();
    for (ma, mb) in a.data.iter().zip(b.data.iter()) {
        for (x, y) in ma.iter().zip(mb.iter()) {
            acc += x.conj() * y;
        }
    }
    acc
}

/// Point-wise product of a scalar field with a matrix field.
pub fn scalar_mul<const N: usize>(s: &ScalarField, f: &MatrixField<N>) -> MatrixField<N> {
    zip(s, f, |c, m| m * c)
}

// ──────────────────────────────────────────────
//  Site-wise operators (owned/borrowed combos)
// ──────────────────────────────────────────────

macro_rules! impl_field_binop {
    ($trait:ident, $method:ident) => {
        impl<'a, 'b, T> $trait<&'b Field<T>> for &'a Field<T>
        where
            T: Copy + $trait<Output = T>,
        {
            type Output = Field<T>;
            fn $method(self, rhs: &'b Field<T>) -> Field<T> {
                zip(self, rhs, |x, y| x.$method(y))
            }
        }

        impl<'a, T> $trait<Field<T>> for &'a Field<T>
        where
            T: Copy + $trait<Output = T>,
        {
            type Output = Field<T>;
            fn $method(self, rhs: Field<T>) -> Field<T> {
                self.$method(&rhs)
            }
        }

        impl<'a, T> $trait<&'a Field<T>> for Field<T>
        where
            T: Copy + $trait<Output = T>,
        {
            type Output = Field<T>;
            fn $method(self, rhs: &'a Field<T>) -> Field<T> {
                (&self).$method(rhs)
            }
        }

        impl<T> $trait<Field<T>> for Field<T>
        where
            T: Copy + $trait<Output = T>,
        {
            type Output = Field<T>;
            fn $method(self, rhs: Field<T>) -> Field<T> {
                (&self).$method(&rhs)
            }
        }
    };
}

impl_field_binop!(Add, add);
impl_field_binop!(Sub, sub);
impl_field_binop!(Mul, mul);

impl<T> Neg for &Field<T>
where
    T: Copy + Neg<Output = T>,
{
    type Output = Field<T>;
    fn neg(self) -> Field<T> {
        self.map(|x| -x)
    }
}

impl<T> Neg for Field<T>
where
    T: Copy + Neg<Output = T>,
{
    type Output = Field<T>;
    fn neg(self) -> Field<T> {
        -&self
    }
}

impl<T> AddAssign<&Field<T>> for Field<T>
where
    T: Copy + Add<Output = T>,
{
    fn add_assign(&mut self, rhs: &Field<T>) {
        assert_eq!(
            self.grid, rhs.grid,
            "site-wise operation on fields from different grids"
        );
        for (x, y) in self.data.iter_mut().zip(rhs.data.iter()) {
            *x = *x + *y;
        }
    }
}

impl<T> AddAssign<Field<T>> for Field<T>
where
    T: Copy + Add<Output = T>,
{
    fn add_assign(&mut self, rhs: Field<T>) {
        *self += &rhs;
    }
}

impl<T> SubAssign<&Field<T>> for Field<T>
where
    T: Copy + Sub<Output = T>,
{
    fn sub_assign(&mut self, rhs: &Field<T>) {
        assert_eq!(
            self.grid, rhs.grid,
            "site-wise operation on fields from different grids"
        );
        for (x, y) in self.data.iter_mut().zip(rhs.data.iter()) {
            *x = *x - *y;
        }
    }
}

impl<T> SubAssign<Field<T>> for Field<T>
where
    T: Copy + Sub<Output = T>,
{
    fn sub_assign(&mut self, rhs: Field<T>) {
        *self -= &rhs;
    }
}

macro_rules! impl_field_scalar_mul {
    ($scalar:ty, $to_complex:expr) => {
        impl<'a, T> Mul<$scalar> for &'a Field<T>
        where
            T: Copy + Mul<Complex64, Output = T>,
        {
            type Output = Field<T>;
            fn mul(self, rhs: $scalar) -> Field<T> {
                let c = $to_complex(rhs);
                self.map(|x| x * c)
            }
        }

        impl<T> Mul<$scalar> for Field<T>
        where
            T: Copy + Mul<Complex64, Output = T>,
        {
            type Output = Field<T>;
            fn mul(self, rhs: $scalar) -> Field<T> {
                (&self).mul(rhs)
            }
        }
    };
}

impl_field_scalar_mul!(Complex64, |c| c);
impl_field_scalar_mul!(f64, |r| Complex64::new(r, 0.0));
