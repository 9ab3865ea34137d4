//! Decode cache for recently decoded tile rectangles.
//!
//! Callers commonly issue many small, spatially adjacent reads against
//! the same tile (scanline-at-a-time viewers), so the compositor keeps
//! the most recently decoded tile bytes around. One slot is enough for
//! that access pattern and is the default; the capacity is configurable
//! for callers that interleave a few tiles.
//!
//! The cache is private to its compositor instance and never shared
//! across threads.

use std::num::NonZeroUsize;

use bytes::Bytes;
use lru::LruCache;

use crate::catalog::TileId;
use crate::geom::Region;

/// Default number of cached decodes.
pub const DEFAULT_CACHE_SLOTS: usize = 1;

/// Cache key: a tile plus the exact rectangle that was decoded.
///
/// Keying on the rectangle keeps whole-tile decodes (crop path) and
/// subregion decodes distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeKey {
    pub tile: TileId,
    pub rect: Region,
}

/// LRU cache over decoded tile bytes.
pub struct DecodeCache {
    entries: LruCache<DecodeKey, Bytes>,
}

impl DecodeCache {
    /// Create a cache with `slots` entries.
    pub fn new(slots: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(slots),
        }
    }

    /// Look up a decoded rectangle, marking it recently used.
    pub fn get(&mut self, key: &DecodeKey) -> Option<Bytes> {
        self.entries.get(key).cloned()
    }

    /// Store a decoded rectangle, evicting the least recently used entry
    /// when full.
    pub fn put(&mut self, key: DecodeKey, data: Bytes) {
        self.entries.put(key, data);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for DecodeCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_SLOTS).unwrap())
    }
}
