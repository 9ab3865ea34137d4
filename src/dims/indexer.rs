//! Raster plane index to (Z, C, T) conversion.

use crate::error::DimensionError;

use super::{Axis, DimensionModel, PlaneCoordinate};

/// Pure conversion between linear raster plane indices and (Z, C, T)
/// coordinates, using generalized mixed-radix arithmetic over the axis
/// lengths in dimension-order sequence.
///
/// The first axis named after `XY` varies fastest. Axes omitted from the
/// order contribute length 1 and accept only coordinate 0.
///
/// The conversions are exact inverses of each other over every valid
/// model, and both fail with an out-of-range error rather than wrapping.
#[derive(Debug, Clone)]
pub struct PlaneIndexer {
    // Axis at each radix position, fastest first; omitted axes are
    // appended with length 1 so lookups stay total.
    axes: [Axis; 3],
    lens: [u32; 3],
    count: usize,
}

impl PlaneIndexer {
    pub fn new(model: &DimensionModel) -> Self {
        let mut axes = [Axis::Z; 3];
        let mut lens = [1u32; 3];
        let mut filled = 0;
        for &axis in model.dimension_order().axes() {
            axes[filled] = axis;
            lens[filled] = model.effective_len(axis);
            filled += 1;
        }
        for axis in [Axis::Z, Axis::C, Axis::T] {
            if !model.dimension_order().declares(axis) {
                axes[filled] = axis;
                lens[filled] = 1;
                filled += 1;
            }
        }
        let count = lens.iter().map(|&l| l as usize).product();
        Self { axes, lens, count }
    }

    /// Number of addressable planes.
    pub fn plane_count(&self) -> usize {
        self.count
    }

    /// Effective bound along one axis.
    pub fn bound(&self, axis: Axis) -> u32 {
        let position = self.axes.iter().position(|&a| a == axis).unwrap();
        self.lens[position]
    }

    /// Decode a raster index into its (Z, C, T) coordinate.
    pub fn to_coordinate(&self, index: usize) -> Result<PlaneCoordinate, DimensionError> {
        if index >= self.count {
            return Err(DimensionError::PlaneIndexOutOfRange {
                index,
                count: self.count,
            });
        }

        let len0 = self.lens[0] as usize;
        let len1 = self.lens[1] as usize;
        let digits = [index % len0, index / len0 % len1, index / len0 / len1];

        let mut coordinate = PlaneCoordinate::new(0, 0, 0);
        for (position, &axis) in self.axes.iter().enumerate() {
            let value = digits[position] as u32;
            match axis {
                Axis::Z => coordinate.z = value,
                Axis::C => coordinate.c = value,
                Axis::T => coordinate.t = value,
            }
        }
        Ok(coordinate)
    }

    /// Encode a (Z, C, T) coordinate into its raster index.
    pub fn to_index(&self, coordinate: PlaneCoordinate) -> Result<usize, DimensionError> {
        for axis in [Axis::Z, Axis::C, Axis::T] {
            if coordinate.get(axis) >= self.bound(axis) {
                return Err(DimensionError::CoordinateOutOfRange {
                    coordinate,
                    size_z: self.bound(Axis::Z),
                    size_c: self.bound(Axis::C),
                    size_t: self.bound(Axis::T),
                });
            }
        }

        let mut index = 0usize;
        let mut weight = 1usize;
        for (position, &axis) in self.axes.iter().enumerate() {
            index += coordinate.get(axis) as usize * weight;
            weight *= self.lens[position] as usize;
        }
        Ok(index)
    }
}
