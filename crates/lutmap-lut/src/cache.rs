//! Thread-safe transform caching.
//!
//! Building a transform sorts keys and allocates tables; applying the same
//! specification repeatedly should pay that once.
//!
//! ```rust
//! use lutmap_core::MapSpec;
//! use lutmap_lut::{BuildOptions, TransformCache};
//!
//! let cache = TransformCache::<u8, u8>::new();
//! let spec = MapSpec::from_pairs([(1, 2)]);
//! let options = BuildOptions::new();
//!
//! // First call builds
//! let a = cache.get_or_build(&spec, &options).unwrap();
//! // Second call returns the same transform
//! let b = cache.get_or_build(&spec, &options).unwrap();
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use lutmap_core::{Element, MapSpec, Result};
use tracing::trace;

use crate::builder::{build_transform, BuildOptions};
use crate::transform::CompiledTransform;

/// Default number of transforms kept.
pub const DEFAULT_CAPACITY: usize = 16;

struct CacheEntry<S: Element, D: Element> {
    hash: u64,
    spec: MapSpec,
    options: BuildOptions,
    transform: Arc<CompiledTransform<S, D>>,
}

/// Thread-safe cache of compiled transforms.
///
/// Entries are keyed by the specification and build options; a structural
/// hash narrows the search and full equality decides a hit. When full, the
/// oldest entry is evicted.
pub struct TransformCache<S: Element, D: Element> {
    capacity: usize,
    entries: RwLock<VecDeque<CacheEntry<S, D>>>,
}

impl<S: Element, D: Element> Default for TransformCache<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Element, D: Element> TransformCache<S, D> {
    /// Create empty cache with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create empty cache holding at most `capacity` transforms (min 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::new()),
        }
    }

    /// Get or build the transform for `spec` with `options`.
    ///
    /// # Errors
    ///
    /// Whatever [`build_transform`] returns; failures are not cached.
    pub fn get_or_build(&self, spec: &MapSpec, options: &BuildOptions) -> Result<Arc<CompiledTransform<S, D>>> {
        let hash = fingerprint(spec, options);

        // Try read lock first (fast path)
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = find(&entries, hash, spec, options) {
                trace!(hash, "transform cache hit");
                return Ok(hit);
            }
        }

        let transform = Arc::new(build_transform::<S, D>(spec, options)?);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // another thread may have built it meanwhile
        if let Some(hit) = find(&entries, hash, spec, options) {
            return Ok(hit);
        }
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(CacheEntry {
            hash,
            spec: spec.clone(),
            options: options.clone(),
            transform: Arc::clone(&transform),
        });
        trace!(hash, cached = entries.len(), "transform cache miss");
        Ok(transform)
    }

    /// Maximum number of cached transforms.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached transforms.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all cached transforms.
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

fn fingerprint(spec: &MapSpec, options: &BuildOptions) -> u64 {
    let mut hasher = DefaultHasher::new();
    spec.hash(&mut hasher);
    options.hash(&mut hasher);
    hasher.finish()
}

fn find<S: Element, D: Element>(
    entries: &VecDeque<CacheEntry<S, D>>,
    hash: u64,
    spec: &MapSpec,
    options: &BuildOptions,
) -> Option<Arc<CompiledTransform<S, D>>> {
    entries
        .iter()
        .find(|e| e.hash == hash && e.spec == *spec && e.options == *options)
        .map(|e| Arc::clone(&e.transform))
}
