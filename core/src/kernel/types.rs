//! Common types for the kernel abstraction layer.
//!
//! These types are kernel-agnostic and used to communicate between
//! the decomposition pipeline and the kernel implementation.

use crate::geometry::{ApproxEq, Point2, EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Topological dimension of a kernel entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dim {
    Point = 0,
    Curve = 1,
    Surface = 2,
}

impl Dim {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// An opaque `(dimension, tag)` handle to geometry owned by the kernel.
///
/// The pipeline never owns the geometry behind an entity; it only passes
/// handles back into the kernel. Tags returned by
/// [`GeometryKernel::boundary`](super::GeometryKernel::boundary) may be
/// negative, the sign encoding the curve orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub dim: Dim,
    pub tag: i32,
}

impl Entity {
    pub fn new(dim: Dim, tag: i32) -> Self {
        Self { dim, tag }
    }

    pub fn curve(tag: i32) -> Self {
        Self::new(Dim::Curve, tag)
    }

    pub fn surface(tag: i32) -> Self {
        Self::new(Dim::Surface, tag)
    }

    /// The same entity with a non-negative tag.
    pub fn unsigned(self) -> Self {
        Self::new(self.dim, self.tag.abs())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dim, self.tag)
    }
}

/// Operand retention flags for boolean operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanOptions {
    /// Delete the object entities once the result is built.
    pub remove_object: bool,
    /// Delete the tool entities once the result is built.
    pub remove_tool: bool,
}

impl BooleanOptions {
    /// Both operands survive the operation.
    pub fn keep_all() -> Self {
        Self {
            remove_object: false,
            remove_tool: false,
        }
    }

    /// The result replaces the objects; tools survive.
    pub fn replace_object() -> Self {
        Self {
            remove_object: true,
            remove_tool: false,
        }
    }
}

impl Default for BooleanOptions {
    fn default() -> Self {
        Self {
            remove_object: true,
            remove_tool: true,
        }
    }
}

/// A named, dimension-tagged collection of entities handed to the mesher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalGroup {
    pub dim: Dim,
    pub tag: i32,
    pub name: String,
    pub entities: Vec<i32>,
}

impl PhysicalGroup {
    /// The member entities as `(dim, tag)` handles.
    pub fn members(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().map(move |tag| Entity::new(self.dim, *tag))
    }
}

/// Planar primitive outline in the z = 0 plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Disk { center: [f64; 2], radius: f64 },
    Rectangle { min: [f64; 2], max: [f64; 2] },
}

impl Primitive {
    pub fn disk(center: Point2, radius: f64) -> Self {
        Self::Disk {
            center: [center.x, center.y],
            radius,
        }
    }

    pub fn rectangle(min: Point2, max: Point2) -> Self {
        Self::Rectangle {
            min: [min.x, min.y],
            max: [max.x, max.y],
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Self::Disk { radius, .. } => PI * radius * radius,
            Self::Rectangle { min, max } => (max[0] - min[0]) * (max[1] - min[1]),
        }
    }

    /// Outline length.
    pub fn perimeter(&self) -> f64 {
        match self {
            Self::Disk { radius, .. } => 2.0 * PI * radius,
            Self::Rectangle { min, max } => 2.0 * ((max[0] - min[0]) + (max[1] - min[1])),
        }
    }

    /// `[xmin, ymin, xmax, ymax]`.
    pub fn extent(&self) -> [f64; 4] {
        match self {
            Self::Disk { center, radius } => [
                center[0] - radius,
                center[1] - radius,
                center[0] + radius,
                center[1] + radius,
            ],
            Self::Rectangle { min, max } => [min[0], min[1], max[0], max[1]],
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Self::Disk { center, radius } => {
                center.iter().all(|c| c.is_finite()) && radius.is_finite() && *radius >= 0.0
            }
            Self::Rectangle { min, max } => {
                min.iter().chain(max.iter()).all(|c| c.is_finite())
                    && max[0] >= min[0]
                    && max[1] >= min[1]
            }
        }
    }

    pub fn approx_eq(&self, other: &Primitive) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() < EPSILON;
        match (self, other) {
            (Self::Disk { center: c1, radius: r1 }, Self::Disk { center: c2, radius: r2 }) => {
                Point2::from(*c1).approx_eq(&Point2::from(*c2)) && close(*r1, *r2)
            }
            (Self::Rectangle { min: a0, max: a1 }, Self::Rectangle { min: b0, max: b1 }) => {
                close(a0[0], b0[0]) && close(a0[1], b0[1]) && close(a1[0], b1[0]) && close(a1[1], b1[1])
            }
            _ => false,
        }
    }

    /// Whether `self` lies inside `other` (boundary contact allowed).
    pub fn is_inside(&self, other: &Primitive) -> bool {
        match (self, other) {
            (Self::Disk { center: c1, radius: r1 }, Self::Disk { center: c2, radius: r2 }) => {
                distance(*c1, *c2) + r1 <= r2 + EPSILON
            }
            (Self::Rectangle { min, max }, Self::Disk { center, radius }) => corners(*min, *max)
                .iter()
                .all(|corner| distance(*corner, *center) <= radius + EPSILON),
            (inner, Self::Rectangle { min, max }) => {
                let e = inner.extent();
                e[0] >= min[0] - EPSILON
                    && e[1] >= min[1] - EPSILON
                    && e[2] <= max[0] + EPSILON
                    && e[3] <= max[1] + EPSILON
            }
        }
    }

    /// Whether `point` lies in the interior, at least `EPSILON` away from the outline.
    pub fn contains_point(&self, point: [f64; 2]) -> bool {
        match self {
            Self::Disk { center, radius } => distance(point, *center) < radius - EPSILON,
            Self::Rectangle { min, max } => {
                point[0] > min[0] + EPSILON
                    && point[0] < max[0] - EPSILON
                    && point[1] > min[1] + EPSILON
                    && point[1] < max[1] - EPSILON
            }
        }
    }

    /// Split the outline into `segments` pieces (rounded up to a multiple of
    /// four), returning each piece's midpoint and length.
    ///
    /// Pieces run counter-clockwise. Rectangle sides are split evenly.
    pub fn outline_samples(&self, segments: usize) -> Vec<([f64; 2], f64)> {
        let per_side = segments.div_ceil(4).max(1);
        match self {
            Self::Disk { center, radius } => {
                let count = per_side * 4;
                let step = 2.0 * PI / count as f64;
                (0..count)
                    .map(|k| {
                        let angle = (k as f64 + 0.5) * step;
                        let point = [center[0] + radius * angle.cos(), center[1] + radius * angle.sin()];
                        (point, radius * step)
                    })
                    .collect()
            }
            Self::Rectangle { min, max } => {
                let corners = corners(*min, *max);
                let mut samples = Vec::with_capacity(per_side * 4);
                for side in 0..4 {
                    let from = corners[side];
                    let to = corners[(side + 1) % 4];
                    let length = distance(from, to) / per_side as f64;
                    for k in 0..per_side {
                        let t = (k as f64 + 0.5) / per_side as f64;
                        let point = [from[0] + t * (to[0] - from[0]), from[1] + t * (to[1] - from[1])];
                        samples.push((point, length));
                    }
                }
                samples
            }
        }
    }
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

fn corners(min: [f64; 2], max: [f64; 2]) -> [[f64; 2]; 4] {
    [min, [max[0], min[1]], max, [min[0], max[1]]]
}
