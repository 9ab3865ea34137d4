//! Raw in-memory tile source.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::SourceError;
use crate::geom::Region;

use super::{extract_region, TileSource};

/// A tile already extracted into memory: its pixel geometry plus the raw
/// row-major sample bytes.
#[derive(Debug, Clone)]
struct MemoryTile {
    width: u32,
    pixel_bytes: usize,
    data: Bytes,
}

/// Decode context for a memory tile. The data is a cheap [`Bytes`] clone
/// of the registered buffer.
#[derive(Debug)]
pub struct MemoryContext {
    width: u32,
    pixel_bytes: usize,
    data: Bytes,
}

/// Uncompressed tiles held in memory, keyed by an arbitrary string.
///
/// Format initializers use this for containers whose tiles are plain
/// embedded streams (already located during header parsing); the test
/// suite uses it as the reference source. Handles are the registration
/// keys.
///
/// # Example
///
/// ```
/// use planestitch::{MemoryTileSource, Region, TileSource};
///
/// let mut source = MemoryTileSource::new();
/// source.insert("t0", 4, 1, vec![0, 1, 2, 3, 4, 5, 6, 7]);
///
/// let mut context = source.open(&"t0".to_string()).unwrap();
/// let row = source.decode(&mut context, Region::new(0, 1, 4, 1)).unwrap();
/// assert_eq!(&row[..], &[4, 5, 6, 7]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryTileSource {
    tiles: HashMap<String, MemoryTile>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self {
            tiles: HashMap::new(),
        }
    }

    /// Register a tile's raw bytes under `key`. The buffer must hold
    /// complete rows of `width` pixels at `pixel_bytes` each; its length
    /// determines the tile height.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        width: u32,
        pixel_bytes: usize,
        data: impl Into<Bytes>,
    ) {
        self.tiles.insert(
            key.into(),
            MemoryTile {
                width,
                pixel_bytes,
                data: data.into(),
            },
        );
    }

    /// Remove a registered tile, e.g. to model a stream that disappeared
    /// between discovery and read.
    pub fn remove(&mut self, key: &str) -> bool {
        self.tiles.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileSource for MemoryTileSource {
    type Handle = String;
    type Context = MemoryContext;

    fn open(&self, handle: &String) -> Result<MemoryContext, SourceError> {
        let tile = self
            .tiles
            .get(handle)
            .ok_or_else(|| SourceError::Unavailable {
                reason: format!("no tile registered under key {handle:?}"),
            })?;
        Ok(MemoryContext {
            width: tile.width,
            pixel_bytes: tile.pixel_bytes,
            data: tile.data.clone(),
        })
    }

    fn decode(&self, context: &mut MemoryContext, rect: Region) -> Result<Bytes, SourceError> {
        extract_region(&context.data, context.width, context.pixel_bytes, rect)
    }
}
