//! Per-group area metrics, the conservation oracle of a decomposition.

use crate::error::DomainResult;
use crate::kernel::{Dim, GeometryKernel, GeometrySession, KernelResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use tracing::info;

/// Suffix appended to the case name of the metrics file.
pub const AREAS_SUFFIX: &str = ".areas.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedArea {
    pub geometry: String,
    pub area: f64,
}

/// Collects one area record per physical-group entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaExporter {
    geometries: Vec<ComputedArea>,
}

impl AreaExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_computed_area(&mut self, geometry: impl Into<String>, area: f64) {
        self.geometries.push(ComputedArea {
            geometry: geometry.into(),
            area,
        });
    }

    /// Record every entity of every physical group of dimension `dim`.
    ///
    /// Curves are read as circle circumferences and reported as the area of
    /// that circle. Unnamed groups are skipped.
    pub fn add_physical_model_of_dimension<K: GeometryKernel>(
        &mut self,
        session: &GeometrySession<K>,
        dim: Dim,
    ) -> KernelResult<()> {
        for group in session.physical_groups()?.iter().filter(|g| g.dim == dim) {
            if group.name.is_empty() {
                continue;
            }
            for entity in group.members() {
                let mass = session.mass(entity)?;
                let area = match dim {
                    Dim::Curve => {
                        let radius = mass / (2.0 * PI);
                        radius * radius * PI
                    }
                    _ => mass,
                };
                self.add_computed_area(group.name.clone(), area);
            }
        }
        Ok(())
    }

    pub fn geometries(&self) -> &[ComputedArea] {
        &self.geometries
    }

    /// Sum of the areas recorded under `geometry`.
    pub fn total(&self, geometry: &str) -> f64 {
        self.geometries
            .iter()
            .filter(|g| g.geometry == geometry)
            .map(|g| g.area)
            .sum()
    }

    /// Write `<dir>/<case>.areas.json` and return its path.
    pub fn export_to_json(&self, dir: &Path, case_name: &str) -> DomainResult<PathBuf> {
        let path = dir.join(format!("{}{}", case_name, AREAS_SUFFIX));
        let file = std::fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, self)?;
        info!(path = %path.display(), records = self.geometries.len(), "areas exported");
        Ok(path)
    }

    pub fn from_path(path: &Path) -> DomainResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
