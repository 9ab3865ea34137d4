//! # planestitch
//!
//! Tile addressing and region compositing core for multi-dimensional
//! microscopy image containers.
//!
//! Proprietary microscopy formats frequently store one logical image
//! plane as a set of independently encoded tiles scattered across files
//! or embedded streams, each tile addressed only by an absolute pixel
//! offset inside the plane. This crate is the engine those readers share:
//! given a request for an arbitrary sub-rectangle of a numbered plane in
//! a multi-dimensional (Z/C/T) series, it determines which tiles
//! contribute, has each tile's source decode its relevant piece, and
//! composites the bytes into the caller's buffer with correct strides,
//! channel counts and overlap resolution.
//!
//! What it deliberately does **not** do: parse format headers, discover
//! companion files, build color lookup tables, or implement codecs.
//! Format initializers populate a [`DimensionModel`] per series and a
//! [`TileCatalog`], implement (or reuse) a [`TileSource`], and hand all
//! three to a [`RegionCompositor`].
//!
//! ## Architecture
//!
//! - [`dims`] - per-series dimension declarations and plane index math
//! - [`geom`] - pixel-space rectangles
//! - [`catalog`] - the registry of physically stored tiles
//! - [`source`] - the codec/I-O seam and the in-crate adapters
//! - [`region`] - the read orchestrator and its decode cache
//! - [`error`] - layered errors and non-fatal diagnostics
//!
//! ## Example
//!
//! ```
//! use planestitch::{
//!     DimensionModel, MemoryTileSource, PlaneCoordinate, Region, RegionCompositor, TileCatalog,
//! };
//!
//! // Normally done by a format initializer after header parsing:
//! let models =
//!     vec![DimensionModel::new(512, 512, 1, 2, 3, "XYCZT".parse().unwrap()).unwrap()];
//!
//! let mut source = MemoryTileSource::new();
//! source.insert("plane0", 512, 1, vec![0u8; 512 * 512]);
//!
//! let mut catalog = TileCatalog::new();
//! catalog.register_tile(
//!     0,
//!     PlaneCoordinate::new(0, 0, 0),
//!     0,
//!     Region::new(0, 0, 512, 512),
//!     "plane0".to_string(),
//! );
//!
//! // The uniform read surface consumed by viewers and converters:
//! let mut compositor = RegionCompositor::new(&models, &catalog, &source);
//! assert_eq!(compositor.coordinate(0, 4).unwrap(), PlaneCoordinate::new(0, 0, 2));
//! let bytes = compositor.read_bytes(0, 0, Region::new(128, 128, 64, 64)).unwrap();
//! assert_eq!(bytes.len(), 64 * 64);
//! ```

pub mod catalog;
pub mod dims;
pub mod error;
pub mod geom;
pub mod region;
pub mod source;

// Re-export commonly used types
pub use catalog::{Tile, TileCatalog, TileId};
pub use dims::{Axis, DimensionModel, DimensionOrder, PlaneCoordinate, PlaneIndexer};
pub use error::{Diagnostic, DimensionError, ReadError, SourceError};
pub use geom::Region;
pub use region::{
    CompositorOptions, DecodeCache, DecodeKey, ReadOutcome, RegionCompositor, DEFAULT_CACHE_SLOTS,
};
pub use source::{extract_region, DeflateTileSource, MemoryTileSource, TileSource};
