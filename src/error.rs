use thiserror::Error;

use crate::catalog::TileId;
use crate::dims::PlaneCoordinate;
use crate::geom::Region;

/// Errors raised while building a dimension model or converting between
/// plane indices and coordinates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    /// Dimension order string is malformed (must be "XY" followed by
    /// distinct letters drawn from Z, C, T)
    #[error("invalid dimension order {order:?}: {reason}")]
    InvalidOrder { order: String, reason: String },

    /// One of the declared axis sizes is zero
    #[error("invalid size for axis {axis}: must be positive")]
    InvalidSize { axis: char },

    /// bytes_per_sample or samples_per_pixel is zero
    #[error("invalid sample geometry: bytes per sample and samples per pixel must be positive")]
    InvalidSampleGeometry,

    /// samples_per_pixel does not divide size_c, so the effective channel
    /// count is undefined
    #[error("samples per pixel {samples_per_pixel} does not divide channel count {size_c}")]
    InvalidPacking { size_c: u32, samples_per_pixel: u32 },

    /// Plane index is outside [0, plane_count)
    #[error("plane index {index} out of range: series has {count} planes")]
    PlaneIndexOutOfRange { index: usize, count: usize },

    /// A coordinate lies outside the effective axis bounds
    #[error(
        "coordinate {coordinate} out of range: effective bounds are Z<{size_z}, C<{size_c}, T<{size_t}"
    )]
    CoordinateOutOfRange {
        coordinate: PlaneCoordinate,
        size_z: u32,
        size_c: u32,
        size_t: u32,
    },
}

/// Errors raised by the tile source layer when opening or decoding a tile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The tile's physical source cannot be opened or read
    #[error("tile source unavailable: {reason}")]
    Unavailable { reason: String },

    /// The codec failed while decoding an otherwise reachable tile
    #[error("codec failure: {reason}")]
    Codec { reason: String },

    /// The requested rectangle does not lie inside the tile
    #[error("requested rectangle {requested} exceeds tile bounds {bounds}")]
    RegionOutOfBounds { requested: Region, bounds: Region },

    /// The decoded stream ended before the expected byte count
    #[error("truncated tile data: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Errors raised by [`RegionCompositor`](crate::region::RegionCompositor)
/// reads.
///
/// Every variant is fatal to the individual call and never corrupts
/// compositor state; recoverable conditions travel as [`Diagnostic`]
/// values instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Series index beyond the number of declared series
    #[error("unknown series {series}: dataset has {count} series")]
    UnknownSeries { series: usize, count: usize },

    /// Invalid plane index or coordinate
    #[error(transparent)]
    Dimension(#[from] DimensionError),

    /// Requested rectangle extends past the plane bounds.
    ///
    /// Raised before any byte is written to the destination.
    #[error("region {region} out of range: plane is {size_x}x{size_y}")]
    RegionOutOfRange {
        region: Region,
        size_x: u32,
        size_y: u32,
    },

    /// Destination stride is shorter than one row of the requested region
    #[error("destination stride {stride} too small: rows are {row_bytes} bytes")]
    StrideTooSmall { stride: usize, row_bytes: usize },

    /// Destination buffer cannot hold the requested rows at the given stride
    #[error("destination buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// A registered tile's source could not be opened (strict mode only)
    #[error("tile {tile} unavailable: {source}")]
    TileUnavailable { tile: TileId, source: SourceError },

    /// A registered tile failed to decode (strict mode only)
    #[error("tile {tile} failed to decode: {source}")]
    CodecFailure { tile: TileId, source: SourceError },
}

/// Non-fatal conditions observed during a read.
///
/// Collected into [`ReadOutcome`](crate::region::ReadOutcome) in the order
/// they were observed; [`read_bytes`](crate::region::RegionCompositor::read_bytes)
/// logs them at warn level instead of returning them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The catalog's registered tile count disagrees with the declared
    /// plane count (truncated or mis-declared acquisition)
    DimensionMismatch { declared: usize, registered: usize },

    /// A tile could not be opened; its destination region was left
    /// untouched. `tile` is `None` when the requested plane has no
    /// registered tiles at all.
    TileUnavailable {
        tile: Option<TileId>,
        reason: String,
    },

    /// A tile failed to decode; its destination region was left untouched
    CodecFailure { tile: TileId, reason: String },
}
