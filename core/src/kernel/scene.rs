//! JSON scene format read by [`PlanarKernel`](super::PlanarKernel).
//!
//! A scene is the planar kernel's stand-in for a STEP assembly: a flat list
//! of named shapes, each an outline primitive with optional holes. Names
//! follow the same `<Label>_<index>` convention STEP exports use.

use super::types::Primitive;
use super::KernelResult;
use crate::geometry::Point2;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub shapes: Vec<SceneShape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneShape {
    pub name: String,
    pub outline: Primitive,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Primitive>,
}

impl SceneShape {
    pub fn new(name: impl Into<String>, outline: Primitive) -> Self {
        Self {
            name: name.into(),
            outline,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: Primitive) -> Self {
        self.holes.push(hole);
        self
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> KernelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> KernelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn with_shape(mut self, shape: SceneShape) -> Self {
        self.shapes.push(shape);
        self
    }

    /// Append a named disk.
    pub fn with_disk(self, name: &str, cx: f64, cy: f64, radius: f64) -> Self {
        self.with_shape(SceneShape::new(
            name,
            Primitive::disk(Point2::new(cx, cy), radius),
        ))
    }
}
