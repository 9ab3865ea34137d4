//! The codec/I-O seam.
//!
//! This module defines the [`TileSource`] trait, the contract the region
//! compositor requires of the codec and I/O layer. Format-specific setup
//! chooses the codec (raw copy, deflate, DCT-based, wavelet); the core
//! treats that choice as an opaque strategy behind this trait.
//!
//! Two adapters ship in-crate:
//! - [`MemoryTileSource`] for raw, uncompressed tiles held in memory
//!   (embedded streams already extracted by a format initializer)
//! - [`DeflateTileSource`] for zlib-compressed whole-tile streams
//!
//! Both decode into row-major sample bytes; everything else (palette
//! lookup, color conversion, metadata) lives outside this core.

use bytes::Bytes;

use crate::error::SourceError;
use crate::geom::Region;

mod deflate;
mod memory;

pub use deflate::{DeflateContext, DeflateTileSource};
pub use memory::{MemoryContext, MemoryTileSource};

/// Contract required of the codec/I-O layer.
///
/// A source opens a tile's physical handle into a decode context, decodes
/// requested rectangles out of it, and closes the context when the
/// compositor is done. A context holds the source's internal read cursor,
/// so it must not be shared across threads without external
/// synchronization; the compositor opens and closes contexts within a
/// single read call.
///
/// Implementations that can only decode whole tiles (certain wavelet
/// codecs) return `false` from [`supports_subregion`](TileSource::supports_subregion);
/// the compositor then requests the full tile rectangle and crops the
/// output itself.
pub trait TileSource {
    /// Opaque physical address of a tile, stored by the catalog. A file
    /// path, an (offset, length) pair into an embedded stream, whatever
    /// the format initializer registered.
    type Handle;

    /// An open decode context.
    type Context;

    /// Open a tile for decoding.
    fn open(&self, handle: &Self::Handle) -> Result<Self::Context, SourceError>;

    /// Decode `rect` (in tile-local coordinates) into row-major sample
    /// bytes with row stride `rect.width * bytes_per_sample *
    /// samples_per_pixel`.
    fn decode(&self, context: &mut Self::Context, rect: Region) -> Result<Bytes, SourceError>;

    /// Release a context. The default drops it.
    fn close(&self, context: Self::Context) {
        drop(context);
    }

    /// Whether `decode` accepts arbitrary sub-rectangles. Whole-tile-only
    /// sources return `false`.
    fn supports_subregion(&self) -> bool {
        true
    }
}

/// Extract `rect` from a row-major buffer of `width`-pixel rows.
///
/// Returns the cropped rows with stride `rect.width * pixel_bytes`. This
/// is the shared crop primitive used by the in-crate adapters and by the
/// compositor when a source only decodes whole tiles.
pub fn extract_region(
    data: &[u8],
    width: u32,
    pixel_bytes: usize,
    rect: Region,
) -> Result<Bytes, SourceError> {
    let src_row = width as usize * pixel_bytes;
    let height = if src_row == 0 { 0 } else { data.len() / src_row };
    let bounds = Region::new(0, 0, width, height as u32);
    if !bounds.contains(&rect) {
        return Err(SourceError::RegionOutOfBounds {
            requested: rect,
            bounds,
        });
    }

    let out_row = rect.width as usize * pixel_bytes;
    let mut out = Vec::with_capacity(out_row * rect.height as usize);
    for row in 0..rect.height as usize {
        let start = (rect.y as usize + row) * src_row + rect.x as usize * pixel_bytes;
        out.extend_from_slice(&data[start..start + out_row]);
    }
    Ok(Bytes::from(out))
}
