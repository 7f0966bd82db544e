use super::{Point3, Vector3};
use crate::kernel::{Entity, GeometryKernel, GeometrySession, KernelOpError, KernelResult};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box as reported by the kernel.
///
/// Derived on demand and never stored in the model. Zero-size boxes are
/// valid; a box with `max < min` on any axis is not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// The zero-size box at the origin.
    pub fn zero() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }

    /// Builds a box from the kernel's `[xmin, ymin, zmin, xmax, ymax, zmax]` layout.
    pub fn from_coords(coords: [f64; 6]) -> KernelResult<Self> {
        let bbox = Self::new(
            Point3::new(coords[0], coords[1], coords[2]),
            Point3::new(coords[3], coords[4], coords[5]),
        );
        if bbox.is_valid() {
            Ok(bbox)
        } else {
            Err(KernelOpError::InvalidGeometry(format!(
                "bounding box max is below min: {:?}",
                coords
            )))
        }
    }

    pub fn to_coords(&self) -> [f64; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }

    pub fn is_valid(&self) -> bool {
        self.to_coords().iter().all(|c| c.is_finite())
            && self.max.x >= self.min.x
            && self.max.y >= self.min.y
            && self.max.z >= self.min.z
    }

    pub fn origin(&self) -> Point3 {
        self.min
    }

    pub fn center(&self) -> Point3 {
        na::center(&self.min, &self.max)
    }

    /// Side lengths along x, y and z.
    pub fn lengths(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn diagonal(&self) -> f64 {
        self.lengths().norm()
    }

    pub fn max_side(&self) -> f64 {
        self.lengths().max()
    }

    /// Shortest side in the xy plane.
    pub fn min_planar_side(&self) -> f64 {
        let lengths = self.lengths();
        lengths.x.min(lengths.y)
    }

    pub fn union(&self, other: &BoundingBox) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Smallest box enclosing every entity.
    ///
    /// An empty list yields [`BoundingBox::zero`] rather than an error.
    pub fn of_entities<K: GeometryKernel>(
        session: &GeometrySession<K>,
        entities: &[Entity],
    ) -> KernelResult<Self> {
        let mut boxes = entities
            .iter()
            .map(|entity| session.bounding_box(*entity).and_then(Self::from_coords));

        let first = match boxes.next() {
            Some(bbox) => bbox?,
            None => return Ok(Self::zero()),
        };
        boxes.try_fold(first, |acc, bbox| Ok(acc.union(&bbox?)))
    }
}
