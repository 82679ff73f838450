//! 4-dimensional periodic lattice geometry.
//!
//! Sites are stored in lexicographic order, coordinate 0 fastest. All shift
//! arithmetic wraps periodically; there is no halo, every neighbor access is
//! a local index computation.

use crate::field::Field;

/// Number of lattice directions. The stencil formulas in this crate are
/// hard-coded for four dimensions.
pub const ND: usize = 4;

/// Checkerboard parity of a site (sum of coordinates mod 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

/// A 4-dimensional periodic lattice.
///
/// `Grid` is a value type: two grids with the same dimensions are the same
/// grid for every purpose in this crate, including stencil cache identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    dims: [usize; ND],
    gsites: usize,
}

impl Grid {
    /// Create a grid with the given dimensions.
    ///
    /// # Panics
    ///
    /// Panics if any dimension is zero.
    pub fn new(dims: [usize; ND]) -> Self {
        for (d, &l) in dims.iter().enumerate() {
            assert!(l > 0, "grid dimension {} must be non-zero", d);
        }
        let gsites = dims.iter().product();
        Grid { dims, gsites }
    }

    /// Lattice extent in each direction.
    #[inline]
    pub fn dims(&self) -> [usize; ND] {
        self.dims
    }

    /// Global number of sites.
    #[inline]
    pub fn gsites(&self) -> usize {
        self.gsites
    }

    /// Linear index of a coordinate (coordinate 0 fastest).
    #[inline]
    pub fn index(&self, coord: [usize; ND]) -> usize {
        let mut idx = 0;
        for d in (0..ND).rev() {
            debug_assert!(coord[d] < self.dims[d]);
            idx = idx * self.dims[d] + coord[d];
        }
        idx
    }

    /// Coordinate of a linear index.
    #[inline]
    pub fn coordinate(&self, mut site: usize) -> [usize; ND] {
        debug_assert!(site < self.gsites);
        let mut coord = [0; ND];
        for d in 0..ND {
            coord[d] = site % self.dims[d];
            site /= self.dims[d];
        }
        coord
    }

    /// Checkerboard parity of a site.
    #[inline]
    pub fn checkerboard(&self, site: usize) -> Parity {
        let coord = self.coordinate(site);
        if coord.iter().sum::<usize>() % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    /// Linear index of the site displaced by `disp` steps in direction `d`,
    /// wrapping periodically.
    #[inline]
    pub fn shifted_index(&self, site: usize, d: usize, disp: i32) -> usize {
        debug_assert!(d < ND, "direction {} out of range", d);
        let mut coord = self.coordinate(site);
        let l = self.dims[d] as i64;
        coord[d] = (((coord[d] as i64 + disp as i64) % l + l) % l) as usize;
        self.index(coord)
    }
}

/// Source of a coordinate enumeration.
///
/// One tagged variant per caller shape; [`coordinates`] is the single
/// dispatch point, no runtime type inspection anywhere.
pub enum CoordinateSource<'a, T> {
    /// Every site of a grid.
    GridOnly(&'a Grid),
    /// Sites of one checkerboard parity of a grid.
    GridWithCheckerboard(&'a Grid, Parity),
    /// Every site of the grid a field lives on.
    LatticeField(&'a Field<T>),
    /// An axis-aligned sub-block `[top, bottom)` of a grid.
    CartesianView {
        grid: &'a Grid,
        top: [usize; ND],
        bottom: [usize; ND],
    },
}

/// Enumerate the coordinates described by `source`, in lexicographic site
/// order.
///
/// # Panics
///
/// Panics if a `CartesianView` block exceeds the grid extent.
pub fn coordinates<T: Copy>(source: CoordinateSource<'_, T>) -> Vec<[usize; ND]> {
    match source {
        CoordinateSource::GridOnly(grid) => (0..grid.gsites()).map(|s| grid.coordinate(s)).collect(),
        CoordinateSource::GridWithCheckerboard(grid, parity) => (0..grid.gsites())
            .filter(|&s| grid.checkerboard(s) == parity)
            .map(|s| grid.coordinate(s))
            .collect(),
        CoordinateSource::LatticeField(field) => {
            let grid = field.grid();
            (0..grid.gsites()).map(|s| grid.coordinate(s)).collect()
        }
        CoordinateSource::CartesianView { grid, top, bottom } => {
            for d in 0..ND {
                assert!(
                    top[d] <= bottom[d] && bottom[d] <= grid.dims()[d],
                    "cartesian view block [{}, {}) exceeds grid extent in direction {}",
                    top[d],
                    bottom[d],
                    d
                );
            }
            let mut out = Vec::new();
            for site in 0..grid.gsites() {
                let c = grid.coordinate(site);
                if (0..ND).all(|d| c[d] >= top[d] && c[d] < bottom[d]) {
                    out.push(c);
                }
            }
            out
        }
    }
}
