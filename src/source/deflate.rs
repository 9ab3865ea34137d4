//! Deflate-compressed tile source.

use std::collections::HashMap;
use std::io::Read;

use bytes::Bytes;
use flate2::read::ZlibDecoder;

use crate::error::SourceError;
use crate::geom::Region;

use super::{extract_region, TileSource};

#[derive(Debug, Clone)]
struct DeflateTile {
    width: u32,
    height: u32,
    pixel_bytes: usize,
    compressed: Bytes,
}

/// Decode context holding the inflated tile.
#[derive(Debug)]
pub struct DeflateContext {
    width: u32,
    pixel_bytes: usize,
    decoded: Vec<u8>,
}

/// Zlib-compressed whole-tile streams, keyed by an arbitrary string.
///
/// Deflate has no random access, so the entire tile is inflated when the
/// context opens and [`supports_subregion`](TileSource::supports_subregion)
/// is `false`: the compositor requests the full tile and crops. The
/// inflated byte count is validated against the declared geometry; short
/// streams fail as truncated rather than producing a partial tile.
#[derive(Debug, Default)]
pub struct DeflateTileSource {
    tiles: HashMap<String, DeflateTile>,
}

impl DeflateTileSource {
    pub fn new() -> Self {
        Self {
            tiles: HashMap::new(),
        }
    }

    /// Register a compressed tile under `key`. `width`/`height` and
    /// `pixel_bytes` declare the decoded geometry.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        width: u32,
        height: u32,
        pixel_bytes: usize,
        compressed: impl Into<Bytes>,
    ) {
        self.tiles.insert(
            key.into(),
            DeflateTile {
                width,
                height,
                pixel_bytes,
                compressed: compressed.into(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileSource for DeflateTileSource {
    type Handle = String;
    type Context = DeflateContext;

    fn open(&self, handle: &String) -> Result<DeflateContext, SourceError> {
        let tile = self
            .tiles
            .get(handle)
            .ok_or_else(|| SourceError::Unavailable {
                reason: format!("no tile registered under key {handle:?}"),
            })?;

        let expected =
            tile.width as usize * tile.height as usize * tile.pixel_bytes;
        let mut decoded = Vec::with_capacity(expected);
        let mut decoder = ZlibDecoder::new(&tile.compressed[..]);
        decoder
            .read_to_end(&mut decoded)
            .map_err(|e| SourceError::Codec {
                reason: format!("inflate failed: {e}"),
            })?;
        if decoded.len() != expected {
            return Err(SourceError::Truncated {
                expected,
                actual: decoded.len(),
            });
        }

        Ok(DeflateContext {
            width: tile.width,
            pixel_bytes: tile.pixel_bytes,
            decoded,
        })
    }

    fn decode(&self, context: &mut DeflateContext, rect: Region) -> Result<Bytes, SourceError> {
        extract_region(&context.decoded, context.width, context.pixel_bytes, rect)
    }

    fn supports_subregion(&self) -> bool {
        false
    }
}
