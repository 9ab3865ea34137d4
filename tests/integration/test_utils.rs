//! Shared fixtures for the integration tests.
//!
//! Provides instrumented tile sources (request counting, injected
//! failures, whole-tile-only decoding) plus helpers for building small
//! catalogs with recognizable pixel patterns.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use bytes::Bytes;

use planestitch::source::MemoryContext;
use planestitch::{
    DimensionModel, MemoryTileSource, PlaneCoordinate, Region, SourceError, TileCatalog,
    TileSource,
};

// =============================================================================
// Pixel patterns
// =============================================================================

/// A tile filled with one value.
pub fn solid(width: u32, height: u32, pixel_bytes: usize, value: u8) -> Vec<u8> {
    vec![value; width as usize * height as usize * pixel_bytes]
}

/// A tile whose byte at (x, y) is `(x + y * width) % 251`. The odd
/// modulus keeps rows from repeating on power-of-two widths.
pub fn gradient(width: u32, height: u32) -> Vec<u8> {
    (0..width as usize * height as usize)
        .map(|i| (i % 251) as u8)
        .collect()
}

// =============================================================================
// Scenario builder
// =============================================================================

/// One series, one memory source, one catalog.
pub struct Scenario {
    pub models: Vec<DimensionModel>,
    pub source: MemoryTileSource,
    pub catalog: TileCatalog<String>,
}

impl Scenario {
    pub fn new(model: DimensionModel) -> Self {
        Self {
            models: vec![model],
            source: MemoryTileSource::new(),
            catalog: TileCatalog::new(),
        }
    }

    /// A single-series model with one plane of `width` x `height` pixels,
    /// one byte per pixel.
    pub fn single_plane(width: u32, height: u32) -> Self {
        Self::new(DimensionModel::new(width, height, 1, 1, 1, "XYZCT".parse().unwrap()).unwrap())
    }

    /// Register a tile with the given pixel data, generating its source
    /// key from the coordinate and field. Returns the key.
    pub fn add_tile(
        &mut self,
        coordinate: PlaneCoordinate,
        field: u32,
        bounds: Region,
        data: Vec<u8>,
    ) -> String {
        let key = format!(
            "z{}c{}t{}f{}",
            coordinate.z, coordinate.c, coordinate.t, field
        );
        let pixel_bytes = self.models[0].pixel_bytes();
        self.source
            .insert(key.clone(), bounds.width, pixel_bytes, data);
        self.catalog
            .register_tile(0, coordinate, field, bounds, key.clone());
        key
    }
}

pub fn origin() -> PlaneCoordinate {
    PlaneCoordinate::new(0, 0, 0)
}

// =============================================================================
// Counting source
// =============================================================================

/// Wraps a [`MemoryTileSource`] and counts opens/decodes, recording every
/// decoded rectangle. Optionally reports itself as whole-tile-only to
/// exercise the compositor's crop path.
pub struct CountingSource {
    inner: MemoryTileSource,
    subregion: bool,
    opens: AtomicUsize,
    decodes: AtomicUsize,
    decode_rects: Mutex<Vec<Region>>,
}

impl CountingSource {
    pub fn new(inner: MemoryTileSource) -> Self {
        Self {
            inner,
            subregion: true,
            opens: AtomicUsize::new(0),
            decodes: AtomicUsize::new(0),
            decode_rects: Mutex::new(Vec::new()),
        }
    }

    pub fn whole_tile_only(inner: MemoryTileSource) -> Self {
        Self {
            subregion: false,
            ..Self::new(inner)
        }
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }

    pub fn decode_rects(&self) -> Vec<Region> {
        self.decode_rects.lock().unwrap().clone()
    }
}

impl TileSource for CountingSource {
    type Handle = String;
    type Context = MemoryContext;

    fn open(&self, handle: &String) -> Result<MemoryContext, SourceError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.inner.open(handle)
    }

    fn decode(&self, context: &mut MemoryContext, rect: Region) -> Result<Bytes, SourceError> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        self.decode_rects.lock().unwrap().push(rect);
        self.inner.decode(context, rect)
    }

    fn supports_subregion(&self) -> bool {
        self.subregion
    }
}

// =============================================================================
// Flaky source
// =============================================================================

/// Wraps a [`MemoryTileSource`] and fails selected handles: listed in
/// `fail_open`, the handle refuses to open; listed in `fail_decode`, it
/// opens but the decode reports a codec failure.
pub struct FlakySource {
    inner: MemoryTileSource,
    fail_open: Vec<String>,
    fail_decode: Vec<String>,
}

impl FlakySource {
    pub fn new(inner: MemoryTileSource) -> Self {
        Self {
            inner,
            fail_open: Vec::new(),
            fail_decode: Vec::new(),
        }
    }

    pub fn fail_open(mut self, key: impl Into<String>) -> Self {
        self.fail_open.push(key.into());
        self
    }

    pub fn fail_decode(mut self, key: impl Into<String>) -> Self {
        self.fail_decode.push(key.into());
        self
    }
}

impl TileSource for FlakySource {
    type Handle = String;
    type Context = (String, MemoryContext);

    fn open(&self, handle: &String) -> Result<Self::Context, SourceError> {
        if self.fail_open.contains(handle) {
            return Err(SourceError::Unavailable {
                reason: format!("file backing {handle:?} is gone"),
            });
        }
        Ok((handle.clone(), self.inner.open(handle)?))
    }

    fn decode(&self, context: &mut Self::Context, rect: Region) -> Result<Bytes, SourceError> {
        if self.fail_decode.contains(&context.0) {
            return Err(SourceError::Codec {
                reason: format!("corrupt stream in {:?}", context.0),
            });
        }
        self.inner.decode(&mut context.1, rect)
    }
}
