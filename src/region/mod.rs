//! Region compositing: the read orchestrator.
//!
//! [`RegionCompositor`] answers the question every higher-level consumer
//! asks: "give me this sub-rectangle of plane N in series S". It resolves
//! the plane index, asks the catalog which tiles intersect the request,
//! has each tile's source decode its local piece (through the decode
//! cache), and copies the bytes row by row into the caller's buffer.
//!
//! ```text
//! read_region(series, plane, region, dest, stride)
//!     │
//!     ├─ PlaneIndexer ── validate plane index, decode to (z,c,t)
//!     ├─ bounds check ── region within plane, buffer large enough
//!     ├─ TileCatalog ─── overlapping tiles in registration order
//!     └─ per tile: decode (cache / TileSource) → row copy → reversal
//! ```
//!
//! Overlaps resolve last-registered-wins because tiles are visited in
//! registration order and each copy overwrites. Bytes covered by no tile
//! are never written; callers wanting zero fill pre-zero the buffer (as
//! [`read_bytes`](RegionCompositor::read_bytes) does for its own
//! allocation).

use std::num::NonZeroUsize;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::catalog::{Tile, TileCatalog};
use crate::dims::{DimensionModel, PlaneCoordinate};
use crate::error::{Diagnostic, ReadError, SourceError};
use crate::geom::Region;
use crate::source::{extract_region, TileSource};

mod cache;

pub use cache::{DecodeCache, DecodeKey, DEFAULT_CACHE_SLOTS};

// =============================================================================
// Options
// =============================================================================

/// Compositor behavior switches, supplied by format-specific setup.
#[derive(Debug, Clone)]
pub struct CompositorOptions {
    /// Escalate unavailable tiles and codec failures to fatal errors
    /// instead of recording diagnostics. Default false: a best-effort,
    /// partially populated image beats total failure.
    pub strict: bool,

    /// Reverse the bytes of each pixel group after copying, for formats
    /// whose stored sample order is the reverse of the destination
    /// convention.
    pub reverse_samples: bool,

    /// Decode cache capacity in entries.
    pub cache_slots: NonZeroUsize,
}

impl CompositorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_reverse_samples(mut self, reverse_samples: bool) -> Self {
        self.reverse_samples = reverse_samples;
        self
    }

    pub fn with_cache_slots(mut self, cache_slots: NonZeroUsize) -> Self {
        self.cache_slots = cache_slots;
        self
    }
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            strict: false,
            reverse_samples: false,
            cache_slots: NonZeroUsize::new(DEFAULT_CACHE_SLOTS).unwrap(),
        }
    }
}

// =============================================================================
// Read outcome
// =============================================================================

/// What a successful read observed.
#[derive(Debug, Clone, Default)]
pub struct ReadOutcome {
    /// Non-fatal conditions, in the order they were observed.
    pub diagnostics: Vec<Diagnostic>,

    /// Number of tiles whose bytes were copied into the destination.
    pub tiles_composited: usize,
}

impl ReadOutcome {
    /// Whether the read completed without any diagnostic.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// =============================================================================
// RegionCompositor
// =============================================================================

/// The read orchestrator.
///
/// Borrows the frozen per-series models and tile catalog built by the
/// format initializer, plus the tile source; owns only its options and
/// decode cache. One instance runs one read at a time; independent
/// instances (each with their own source contexts) may run concurrently.
///
/// # Example
///
/// ```
/// use planestitch::{
///     DimensionModel, MemoryTileSource, PlaneCoordinate, Region, RegionCompositor, TileCatalog,
/// };
///
/// let models = vec![DimensionModel::new(4, 4, 1, 1, 1, "XYZCT".parse().unwrap()).unwrap()];
///
/// let mut source = MemoryTileSource::new();
/// source.insert("t0", 4, 1, vec![9u8; 16]);
///
/// let mut catalog = TileCatalog::new();
/// catalog.register_tile(
///     0,
///     PlaneCoordinate::new(0, 0, 0),
///     0,
///     Region::new(0, 0, 4, 4),
///     "t0".to_string(),
/// );
///
/// let mut compositor = RegionCompositor::new(&models, &catalog, &source);
/// let bytes = compositor.read_bytes(0, 0, Region::new(0, 0, 4, 4)).unwrap();
/// assert_eq!(&bytes[..], &[9u8; 16]);
/// ```
pub struct RegionCompositor<'a, S: TileSource> {
    models: &'a [DimensionModel],
    catalog: &'a TileCatalog<S::Handle>,
    source: &'a S,
    options: CompositorOptions,
    cache: DecodeCache,
}

impl<'a, S: TileSource> RegionCompositor<'a, S> {
    /// Create a compositor with default options.
    pub fn new(
        models: &'a [DimensionModel],
        catalog: &'a TileCatalog<S::Handle>,
        source: &'a S,
    ) -> Self {
        Self::with_options(models, catalog, source, CompositorOptions::default())
    }

    /// Create a compositor with explicit options.
    pub fn with_options(
        models: &'a [DimensionModel],
        catalog: &'a TileCatalog<S::Handle>,
        source: &'a S,
        options: CompositorOptions,
    ) -> Self {
        let cache = DecodeCache::new(options.cache_slots);
        Self {
            models,
            catalog,
            source,
            options,
            cache,
        }
    }

    /// The dimension model of a series.
    pub fn model(&self, series: usize) -> Result<&'a DimensionModel, ReadError> {
        self.models.get(series).ok_or(ReadError::UnknownSeries {
            series,
            count: self.models.len(),
        })
    }

    /// Number of addressable planes in a series.
    ///
    /// When fewer distinct coordinates are registered than the model
    /// declares (truncated acquisition), the count is clamped to the
    /// registered number and a warning is logged. Individual plane reads
    /// keep validating against the declared bounds.
    pub fn plane_count(&self, series: usize) -> Result<usize, ReadError> {
        let declared = self.model(series)?.plane_count();
        let registered = self.catalog.coordinate_count(series);
        if registered > 0 && registered < declared {
            warn!(
                series,
                declared, registered, "catalog disagrees with declared plane count, clamping"
            );
            return Ok(registered);
        }
        Ok(declared)
    }

    /// Decode a raster plane index into its (Z, C, T) coordinate.
    pub fn coordinate(
        &self,
        series: usize,
        plane_index: usize,
    ) -> Result<PlaneCoordinate, ReadError> {
        Ok(self.model(series)?.indexer().to_coordinate(plane_index)?)
    }

    /// Encode a (Z, C, T) coordinate into its raster plane index.
    pub fn index_of(
        &self,
        series: usize,
        coordinate: PlaneCoordinate,
    ) -> Result<usize, ReadError> {
        Ok(self.model(series)?.indexer().to_index(coordinate)?)
    }

    /// Read a sub-rectangle of one plane into a zero-filled allocation
    /// with the natural row stride, returning the bytes.
    ///
    /// Diagnostics are logged at warn level as they occur; callers that
    /// need them programmatically use
    /// [`read_region`](RegionCompositor::read_region).
    pub fn read_bytes(
        &mut self,
        series: usize,
        plane_index: usize,
        region: Region,
    ) -> Result<Bytes, ReadError> {
        let row_bytes = region.width as usize * self.model(series)?.pixel_bytes();
        let mut buffer = vec![0u8; row_bytes * region.height as usize];
        self.read_region(series, plane_index, region, &mut buffer, row_bytes)?;
        Ok(Bytes::from(buffer))
    }

    /// Read a sub-rectangle of one plane into `dest`.
    ///
    /// `dest_stride` is the byte pitch between destination rows; it must
    /// be at least `region.width * bytes_per_sample * samples_per_pixel`.
    /// Row `r` of the region lands at `dest[r * dest_stride ..]`.
    ///
    /// Guarantees:
    /// - every destination byte covered by one or more tiles holds the
    ///   last-registered covering tile's value;
    /// - bytes covered by no tile are left untouched;
    /// - on any error, either no bytes were written (validation errors)
    ///   or the write stopped at a tile boundary (strict-mode failures).
    pub fn read_region(
        &mut self,
        series: usize,
        plane_index: usize,
        region: Region,
        dest: &mut [u8],
        dest_stride: usize,
    ) -> Result<ReadOutcome, ReadError> {
        let model = self.model(series)?;
        let catalog = self.catalog;
        let source = self.source;

        let indexer = model.indexer();
        let coordinate = indexer.to_coordinate(plane_index)?;

        if region.right() > model.size_x() as u64 || region.bottom() > model.size_y() as u64 {
            return Err(ReadError::RegionOutOfRange {
                region,
                size_x: model.size_x(),
                size_y: model.size_y(),
            });
        }

        let pixel_bytes = model.pixel_bytes();
        let row_bytes = region.width as usize * pixel_bytes;
        if dest_stride < row_bytes {
            return Err(ReadError::StrideTooSmall {
                stride: dest_stride,
                row_bytes,
            });
        }
        let needed = if region.height == 0 {
            0
        } else {
            (region.height as usize - 1) * dest_stride + row_bytes
        };
        if dest.len() < needed {
            return Err(ReadError::BufferTooSmall {
                needed,
                actual: dest.len(),
            });
        }

        let mut outcome = ReadOutcome::default();

        let declared = indexer.plane_count();
        let registered = catalog.coordinate_count(series);
        if registered > 0 && registered != declared {
            warn!(
                series,
                declared, registered, "catalog disagrees with declared plane count"
            );
            outcome.diagnostics.push(Diagnostic::DimensionMismatch {
                declared,
                registered,
            });
        }

        if region.is_empty() {
            return Ok(outcome);
        }

        let overlapping = catalog.query_overlapping(series, coordinate, region);
        if overlapping.is_empty() {
            if registered > 0 && !catalog.has_coordinate(series, coordinate) {
                // The plane exists in the declared dimensions but nothing
                // was ever registered for it: a missing constituent file.
                warn!(series, plane_index, %coordinate, "no tiles registered for plane");
                outcome.diagnostics.push(Diagnostic::TileUnavailable {
                    tile: None,
                    reason: format!("no tiles registered for plane {coordinate}"),
                });
            }
            return Ok(outcome);
        }

        for (tile, intersection) in overlapping {
            let bounds = tile.bounds();
            let local = intersection.relative_to(bounds.x, bounds.y);
            if local.is_empty() {
                continue;
            }

            let decode_rect = if source.supports_subregion() {
                local
            } else {
                Region::new(0, 0, bounds.width, bounds.height)
            };

            let decoded = match self.decode_tile(tile, decode_rect, pixel_bytes, &mut outcome)? {
                Some(bytes) => bytes,
                None => continue,
            };

            // Whole-tile decode: crop down to the piece we need.
            let data = if decode_rect == local {
                decoded
            } else {
                match extract_region(&decoded, bounds.width, pixel_bytes, local) {
                    Ok(cropped) => cropped,
                    Err(err) => {
                        if self.options.strict {
                            return Err(ReadError::CodecFailure {
                                tile: tile.id(),
                                source: err,
                            });
                        }
                        warn!(tile = %tile.id(), error = %err, "tile crop failed");
                        outcome.diagnostics.push(Diagnostic::CodecFailure {
                            tile: tile.id(),
                            reason: err.to_string(),
                        });
                        continue;
                    }
                }
            };

            let dest_col = (intersection.x - region.x) as usize * pixel_bytes;
            let dest_row0 = (intersection.y - region.y) as usize;
            let copy_bytes = local.width as usize * pixel_bytes;
            for row in 0..local.height as usize {
                let src = &data[row * copy_bytes..(row + 1) * copy_bytes];
                let start = (dest_row0 + row) * dest_stride + dest_col;
                dest[start..start + copy_bytes].copy_from_slice(src);
                if self.options.reverse_samples && pixel_bytes > 1 {
                    reverse_pixel_groups(&mut dest[start..start + copy_bytes], pixel_bytes);
                }
            }
            outcome.tiles_composited += 1;
        }

        debug!(
            series,
            plane_index,
            %region,
            tiles = outcome.tiles_composited,
            "composited region"
        );
        Ok(outcome)
    }

    /// Decode one tile rectangle, consulting the cache first.
    ///
    /// Returns `Ok(None)` when the tile failed in non-strict mode (the
    /// diagnostic has been recorded and the caller skips the tile).
    fn decode_tile(
        &mut self,
        tile: &Tile<S::Handle>,
        decode_rect: Region,
        pixel_bytes: usize,
        outcome: &mut ReadOutcome,
    ) -> Result<Option<Bytes>, ReadError> {
        let key = DecodeKey {
            tile: tile.id(),
            rect: decode_rect,
        };
        if let Some(hit) = self.cache.get(&key) {
            debug!(tile = %tile.id(), rect = %decode_rect, "decode cache hit");
            return Ok(Some(hit));
        }

        let mut context = match self.source.open(tile.handle()) {
            Ok(context) => context,
            Err(err) => {
                if self.options.strict {
                    return Err(ReadError::TileUnavailable {
                        tile: tile.id(),
                        source: err,
                    });
                }
                warn!(tile = %tile.id(), error = %err, "tile unavailable, leaving region untouched");
                outcome.diagnostics.push(Diagnostic::TileUnavailable {
                    tile: Some(tile.id()),
                    reason: err.to_string(),
                });
                return Ok(None);
            }
        };

        let result = self.source.decode(&mut context, decode_rect);
        self.source.close(context);

        let decoded = match result {
            Ok(decoded) => decoded,
            Err(err) => {
                if self.options.strict {
                    return Err(ReadError::CodecFailure {
                        tile: tile.id(),
                        source: err,
                    });
                }
                warn!(tile = %tile.id(), error = %err, "tile decode failed, leaving region untouched");
                outcome.diagnostics.push(Diagnostic::CodecFailure {
                    tile: tile.id(),
                    reason: err.to_string(),
                });
                return Ok(None);
            }
        };

        // A source lying about its output size would corrupt the copy
        // arithmetic; treat it as a codec failure.
        let expected = decode_rect.pixel_count() as usize * pixel_bytes;
        if decoded.len() != expected {
            let err = SourceError::Truncated {
                expected,
                actual: decoded.len(),
            };
            if self.options.strict {
                return Err(ReadError::CodecFailure {
                    tile: tile.id(),
                    source: err,
                });
            }
            warn!(tile = %tile.id(), error = %err, "tile decode failed, leaving region untouched");
            outcome.diagnostics.push(Diagnostic::CodecFailure {
                tile: tile.id(),
                reason: err.to_string(),
            });
            return Ok(None);
        }

        self.cache.put(key, decoded.clone());
        Ok(Some(decoded))
    }
}

/// Reverse the bytes of each `pixel_bytes`-wide group in place.
fn reverse_pixel_groups(row: &mut [u8], pixel_bytes: usize) {
    for group in row.chunks_exact_mut(pixel_bytes) {
        group.reverse();
    }
}
