//! Meshing options and run configuration.

use crate::error::DomainResult;
use crate::units::LengthUnit;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Kernel option that scales imported coordinates to meters.
pub const SCALING_FACTOR: &str = "Mesh.ScalingFactor";

pub const DEFAULT_MESHING_OPTIONS: [(&str, f64); 9] = [
    // MFEM reads version 2.2 only.
    ("Mesh.MshFileVersion", 2.2),
    ("Mesh.MeshSizeFromCurvature", 50.0),
    ("Mesh.ElementOrder", 3.0),
    (SCALING_FACTOR, 1e-3),
    ("Mesh.SurfaceFaces", 1.0),
    ("Mesh.MeshSizeMax", 50.0),
    ("General.DrawBoundingBoxes", 1.0),
    ("General.Axes", 1.0),
    ("Geometry.SurfaceType", 2.0),
];

/// Kernel option name -> value, passed to the kernel verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshingOptions(BTreeMap<String, f64>);

impl Default for MeshingOptions {
    fn default() -> Self {
        DEFAULT_MESHING_OPTIONS
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }
}

impl FromIterator<(String, f64)> for MeshingOptions {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl MeshingOptions {
    /// Parse a JSON object of option overrides.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Overlay `overrides`; their values win.
    pub fn merge(&mut self, overrides: &MeshingOptions) {
        for (name, value) in overrides.iter() {
            self.set(name.clone(), *value);
        }
    }

    pub fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.set(SCALING_FACTOR, unit.scaling_factor());
        self
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything a mesher run needs besides the input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MesherConfig {
    pub options: MeshingOptions,
    /// File extensions written after meshing, one output file each.
    pub output_formats: Vec<String>,
    pub output_dir: PathBuf,
    pub export_areas: bool,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            options: MeshingOptions::default(),
            output_formats: vec!["msh".into(), "vtk".into()],
            output_dir: PathBuf::from("."),
            export_areas: true,
        }
    }
}
