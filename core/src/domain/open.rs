use crate::geometry::{BoundingBox, Point3, Vector3};
use serde::Serialize;

/// Near-region side as a multiple of the material's largest side.
pub const NEAR_SCALE: f64 = 1.2;
/// Far-region diameter as a multiple of the material's bounding-box diagonal.
pub const FAR_SCALE: f64 = 4.0;
/// Near-region side divided by this gives the element size hint.
pub const MESH_SIZE_DIVISOR: f64 = 20.0;

/// Size and placement of a synthesized near/far open domain.
///
/// Depends only on the bounding box of the non-vacuum material, so the same
/// material always yields the same domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpenDomainSizing {
    pub center: Point3,
    /// Side of the square near region.
    pub near_side: f64,
    /// Diameter of the far disk.
    pub far_diameter: f64,
    /// Target element size on the near region's outline.
    pub mesh_size: f64,
}

impl OpenDomainSizing {
    pub fn from_bbox(bbox: &BoundingBox) -> Self {
        let center = bbox.center();
        let near_side = bbox.max_side() * NEAR_SCALE;
        let near = Self::square(center, near_side);
        Self {
            center,
            near_side,
            far_diameter: bbox.diagonal() * FAR_SCALE,
            mesh_size: near.min_planar_side() / MESH_SIZE_DIVISOR,
        }
    }

    pub fn far_radius(&self) -> f64 {
        self.far_diameter / 2.0
    }

    /// Lower-left corner of the near square.
    pub fn near_corner(&self) -> Point3 {
        self.near_box().min
    }

    pub fn near_box(&self) -> BoundingBox {
        Self::square(self.center, self.near_side)
    }

    fn square(center: Point3, side: f64) -> BoundingBox {
        let half = Vector3::new(side / 2.0, side / 2.0, 0.0);
        BoundingBox::new(center - half, center + half)
    }
}
