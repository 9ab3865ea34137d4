//! Per-series dimension declarations.
//!
//! A series is one independently dimensioned image stack (one well, one
//! stage position). Its [`DimensionModel`] declares the plane geometry and
//! the Z/C/T plane counts together with the [`DimensionOrder`] used to
//! linearize coordinates into the raster plane indices exposed to callers.
//!
//! Models are built once by the format initializer and frozen; the
//! compositor only ever borrows them. They serialize with `serde` so
//! initializers can persist layout declarations alongside their own
//! metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DimensionError;
use crate::geom::Region;

mod indexer;

pub use indexer::PlaneIndexer;

// =============================================================================
// Axes and dimension order
// =============================================================================

/// One of the three linearized axes. X and Y are never linearized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Z,
    C,
    T,
}

impl Axis {
    /// The axis letter used in dimension order strings.
    pub fn letter(self) -> char {
        match self {
            Axis::Z => 'Z',
            Axis::C => 'C',
            Axis::T => 'T',
        }
    }

    fn from_letter(letter: char) -> Option<Axis> {
        match letter {
            'Z' => Some(Axis::Z),
            'C' => Some(Axis::C),
            'T' => Some(Axis::T),
            _ => None,
        }
    }
}

/// The declared nesting order of the Z, C and T axes.
///
/// Parsed from strings like `"XYCZT"`: a mandatory `XY` prefix followed by
/// distinct letters drawn from Z, C, T. The first letter after `XY` varies
/// fastest in the raster plane index. A letter may be omitted, which
/// implies the corresponding axis has effective size 1.
///
/// ```
/// use planestitch::DimensionOrder;
///
/// let order: DimensionOrder = "XYCZT".parse().unwrap();
/// assert_eq!(order.to_string(), "XYCZT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DimensionOrder {
    axes: Vec<Axis>,
}

impl DimensionOrder {
    /// The canonical `XYZCT` order used when a format declares none.
    pub fn zct() -> Self {
        Self {
            axes: vec![Axis::Z, Axis::C, Axis::T],
        }
    }

    /// The linearized axes, fastest-varying first.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Whether the order names the given axis.
    pub fn declares(&self, axis: Axis) -> bool {
        self.axes.contains(&axis)
    }
}

impl FromStr for DimensionOrder {
    type Err = DimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DimensionError::InvalidOrder {
            order: s.to_string(),
            reason: reason.to_string(),
        };

        let rest = s
            .strip_prefix("XY")
            .ok_or_else(|| invalid("must start with XY"))?;
        let mut axes = Vec::with_capacity(3);
        for letter in rest.chars() {
            let axis =
                Axis::from_letter(letter).ok_or_else(|| invalid("letters after XY must be Z, C or T"))?;
            if axes.contains(&axis) {
                return Err(invalid("repeated axis letter"));
            }
            axes.push(axis);
        }
        Ok(Self { axes })
    }
}

impl TryFrom<String> for DimensionOrder {
    type Error = DimensionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DimensionOrder> for String {
    fn from(order: DimensionOrder) -> String {
        order.to_string()
    }
}

impl fmt::Display for DimensionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XY")?;
        for axis in &self.axes {
            write!(f, "{}", axis.letter())?;
        }
        Ok(())
    }
}

// =============================================================================
// Plane coordinates
// =============================================================================

/// A (Z, C, T) plane coordinate within a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaneCoordinate {
    pub z: u32,
    pub c: u32,
    pub t: u32,
}

impl PlaneCoordinate {
    pub fn new(z: u32, c: u32, t: u32) -> Self {
        Self { z, c, t }
    }

    /// The component along the given axis.
    pub fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Z => self.z,
            Axis::C => self.c,
            Axis::T => self.t,
        }
    }
}

impl fmt::Display for PlaneCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(z={}, c={}, t={})", self.z, self.c, self.t)
    }
}

// =============================================================================
// Dimension model
// =============================================================================

/// Declared dimensions of one series.
///
/// The invariant `size_x * size_y * bytes_per_sample * samples_per_pixel ==
/// plane_bytes()` holds by construction; the constructor rejects zero sizes
/// and sample geometries that make the effective channel count undefined.
///
/// # Example
///
/// ```
/// use planestitch::DimensionModel;
///
/// let model = DimensionModel::new(512, 512, 1, 2, 3, "XYCZT".parse().unwrap()).unwrap();
/// assert_eq!(model.plane_count(), 6);
/// assert_eq!(model.plane_bytes(), 512 * 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionModel {
    size_x: u32,
    size_y: u32,
    size_z: u32,
    size_c: u32,
    size_t: u32,
    dimension_order: DimensionOrder,
    bytes_per_sample: u32,
    samples_per_pixel: u32,
    indexed_color: bool,
}

impl DimensionModel {
    /// Create a model with 1 byte per sample, 1 sample per pixel and no
    /// indexed color. All sizes must be positive.
    pub fn new(
        size_x: u32,
        size_y: u32,
        size_z: u32,
        size_c: u32,
        size_t: u32,
        dimension_order: DimensionOrder,
    ) -> Result<Self, DimensionError> {
        for (size, axis) in [
            (size_x, 'X'),
            (size_y, 'Y'),
            (size_z, 'Z'),
            (size_c, 'C'),
            (size_t, 'T'),
        ] {
            if size == 0 {
                return Err(DimensionError::InvalidSize { axis });
            }
        }
        Ok(Self {
            size_x,
            size_y,
            size_z,
            size_c,
            size_t,
            dimension_order,
            bytes_per_sample: 1,
            samples_per_pixel: 1,
            indexed_color: false,
        })
    }

    /// Set the sample geometry. `samples_per_pixel > 1` declares packed
    /// color (e.g. interleaved RGB) and must divide `size_c`.
    pub fn with_sample_geometry(
        mut self,
        bytes_per_sample: u32,
        samples_per_pixel: u32,
    ) -> Result<Self, DimensionError> {
        if bytes_per_sample == 0 || samples_per_pixel == 0 {
            return Err(DimensionError::InvalidSampleGeometry);
        }
        if self.size_c % samples_per_pixel != 0 {
            return Err(DimensionError::InvalidPacking {
                size_c: self.size_c,
                samples_per_pixel,
            });
        }
        self.bytes_per_sample = bytes_per_sample;
        self.samples_per_pixel = samples_per_pixel;
        Ok(self)
    }

    /// Flag the series as indexed color (palette lookup happens outside
    /// this core).
    pub fn with_indexed_color(mut self, indexed_color: bool) -> Self {
        self.indexed_color = indexed_color;
        self
    }

    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    pub fn size_y(&self) -> u32 {
        self.size_y
    }

    pub fn size_z(&self) -> u32 {
        self.size_z
    }

    pub fn size_c(&self) -> u32 {
        self.size_c
    }

    pub fn size_t(&self) -> u32 {
        self.size_t
    }

    pub fn dimension_order(&self) -> &DimensionOrder {
        &self.dimension_order
    }

    pub fn bytes_per_sample(&self) -> u32 {
        self.bytes_per_sample
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn indexed_color(&self) -> bool {
        self.indexed_color
    }

    /// Channel planes stored separately. With packed color the declared
    /// channels are folded into pixel samples, so `size_c /
    /// samples_per_pixel` planes remain per (Z, T).
    pub fn effective_size_c(&self) -> u32 {
        self.size_c / self.samples_per_pixel
    }

    /// The effective length of an axis as used for linearization: the
    /// declared size when the order names the axis, 1 otherwise.
    pub fn effective_len(&self, axis: Axis) -> u32 {
        if !self.dimension_order.declares(axis) {
            return 1;
        }
        match axis {
            Axis::Z => self.size_z,
            Axis::C => self.effective_size_c(),
            Axis::T => self.size_t,
        }
    }

    /// Number of addressable planes in the series.
    pub fn plane_count(&self) -> usize {
        self.effective_len(Axis::Z) as usize
            * self.effective_len(Axis::C) as usize
            * self.effective_len(Axis::T) as usize
    }

    /// Bytes per pixel: `bytes_per_sample * samples_per_pixel`.
    pub fn pixel_bytes(&self) -> usize {
        self.bytes_per_sample as usize * self.samples_per_pixel as usize
    }

    /// Bytes in one full row of a plane.
    pub fn row_bytes(&self) -> usize {
        self.size_x as usize * self.pixel_bytes()
    }

    /// Byte length of one fully covered plane.
    pub fn plane_bytes(&self) -> usize {
        self.size_y as usize * self.row_bytes()
    }

    /// The full plane as a region, for whole-plane reads.
    pub fn plane_region(&self) -> Region {
        Region::new(0, 0, self.size_x, self.size_y)
    }

    /// Build the indexer for this model.
    pub fn indexer(&self) -> PlaneIndexer {
        PlaneIndexer::new(self)
    }
}
