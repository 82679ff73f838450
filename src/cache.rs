//! Structural cache for compiled stencil programs.
//!
//! A program's identity is its [`CacheKey`]: matrix representation, grid, and
//! dimension count. The cache is append-only; a key goes from absent to
//! present exactly once, and [`StencilCache::build_count`] exposes how many
//! programs were actually compiled.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::field::MatrixField;
use crate::grid::{Grid, ND};
use crate::transport::CompiledTransport;

/// Matrix representation of the gauge links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Representation {
    pub group_dim: usize,
}

/// Structural identity of a compiled stencil program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub representation: Representation,
    pub grid: Grid,
    pub nd: usize,
}

impl CacheKey {
    /// Key for a gauge configuration.
    pub fn for_links<const N: usize>(links: &[MatrixField<N>]) -> Self {
        CacheKey {
            representation: Representation { group_dim: N },
            grid: links[0].grid(),
            nd: ND,
        }
    }
}

/// Append-only map from [`CacheKey`] to compiled program.
#[derive(Debug, Default)]
pub struct StencilCache {
    entries: Mutex<HashMap<CacheKey, Arc<CompiledTransport>>>,
    builds: AtomicUsize,
}

impl StencilCache {
    pub fn new() -> Self {
        StencilCache::default()
    }

    /// The compiled program for `key`, building it with `build` on first use.
    pub fn transport(
        &self,
        key: CacheKey,
        build: impl FnOnce() -> CompiledTransport,
    ) -> Arc<CompiledTransport> {
        let mut entries = self.entries.lock().expect("stencil cache mutex poisoned");
        if let Some(program) = entries.get(&key) {
            return Arc::clone(program);
        }
        self.builds.fetch_add(1, Ordering::Relaxed);
        let program = Arc::new(build());
        entries.insert(key, Arc::clone(&program));
        program
    }

    /// Number of cached programs.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("stencil cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of programs compiled so far. With a warm cache this stays
    /// constant across evaluations.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

/// Process-lifetime cache used when the caller does not inject one.
pub fn default_cache() -> &'static StencilCache {
    static CACHE: Lazy<StencilCache> = Lazy::new(StencilCache::new);
    &CACHE
}
