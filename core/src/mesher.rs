//! Pipeline orchestration: import, decompose, configure, mesh and export.

use crate::boundary::{deduplicate, extract_boundaries};
use crate::classify::Classification;
use crate::config::MesherConfig;
use crate::domain::{
    resolve_dielectric_overlaps, subtract_conductors, DomainPolicy, VacuumDomainBuilder,
};
use crate::error::{DomainError, DomainResult};
use crate::kernel::{Dim, Entity, GeometryKernel, GeometrySession, PhysicalGroup};
use crate::metrics::AreaExporter;
use crate::physical::PhysicalGroupAssigner;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a decomposition produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionReport {
    pub policy: DomainPolicy,
    pub open: bool,
    pub conductors: usize,
    pub dielectrics: usize,
    pub vacuum_regions: usize,
    pub mesh_size_hint: Option<f64>,
    pub groups: Vec<PhysicalGroup>,
    /// Scratch entities removed from the model.
    pub pruned: usize,
}

impl DecompositionReport {
    pub fn group(&self, name: &str) -> Option<&PhysicalGroup> {
        self.groups.iter().find(|group| group.name == name)
    }
}

/// Files written by [`Mesher::run_from_input`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub case_name: String,
    pub report: DecompositionReport,
    pub outputs: Vec<PathBuf>,
    pub areas: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct Mesher {
    config: MesherConfig,
}

impl Mesher {
    pub fn new(config: MesherConfig) -> Self {
        Self { config }
    }

    /// Turn imported entities into tagged vacuum, dielectric and conductor
    /// groups, then drop everything left untagged.
    pub fn decompose<K: GeometryKernel>(
        session: &mut GeometrySession<K>,
        entities: &[Entity],
    ) -> DomainResult<DecompositionReport> {
        info!(model = session.model(), entities = entities.len(), "decomposition started");

        let mut classification = Classification::new(session, entities)?;
        resolve_dielectric_overlaps(session, &mut classification)?;
        subtract_conductors(session, &mut classification)?;

        let policy = DomainPolicy::select(&classification);
        let vacuum = VacuumDomainBuilder::new(session).build(&policy, &classification)?;

        let boundaries = extract_boundaries(session, &classification.conductors)?;
        let conductor_curves = deduplicate(&boundaries);

        let mut assigner = PhysicalGroupAssigner::new(session);
        let groups = assigner.assign(&conductor_curves, &classification.dielectrics, &vacuum)?;
        let pruned = assigner.prune_unassigned()?;

        Ok(DecompositionReport {
            policy,
            open: classification.is_open(),
            conductors: classification.conductors.len(),
            dielectrics: classification.dielectrics.len(),
            vacuum_regions: vacuum.regions.len(),
            mesh_size_hint: vacuum.mesh_size_hint,
            groups,
            pruned,
        })
    }

    /// Import `input`, decompose it, apply the meshing options and mesh in 2-D.
    pub fn mesh_from_file<K: GeometryKernel>(
        &self,
        session: &mut GeometrySession<K>,
        input: &Path,
    ) -> DomainResult<DecompositionReport> {
        let entities = session.import_shapes(input)?;
        info!(input = %input.display(), entities = entities.len(), "shapes imported");

        let report = Self::decompose(session, &entities)?;
        for (name, value) in self.config.options.iter() {
            session.set_option(name, *value)?;
        }
        session.generate_mesh(Dim::Surface)?;
        info!(groups = report.groups.len(), "mesh generated");
        Ok(report)
    }

    /// Write `<case>.areas.json` for every named 2-D and 1-D group.
    pub fn export_areas<K: GeometryKernel>(
        &self,
        session: &GeometrySession<K>,
        case_name: &str,
    ) -> DomainResult<PathBuf> {
        let mut exporter = AreaExporter::new();
        exporter.add_physical_model_of_dimension(session, Dim::Surface)?;
        exporter.add_physical_model_of_dimension(session, Dim::Curve)?;
        exporter.export_to_json(&self.config.output_dir, case_name)
    }

    /// Full run on a fresh model named after the input file.
    ///
    /// The kernel is finalized when this returns, whether or not it succeeded.
    pub fn run_from_input<K: GeometryKernel>(
        &self,
        kernel: K,
        input: &Path,
    ) -> DomainResult<RunSummary> {
        let case_name = case_name(input)?;
        let mut session = GeometrySession::open(kernel, &case_name)?;
        let report = self.mesh_from_file(&mut session, input)?;

        std::fs::create_dir_all(&self.config.output_dir)?;
        let areas = if self.config.export_areas {
            Some(self.export_areas(&session, &case_name)?)
        } else {
            None
        };

        let mut outputs = Vec::with_capacity(self.config.output_formats.len());
        for format in &self.config.output_formats {
            let path = self.config.output_dir.join(format!("{}.{}", case_name, format));
            session.write(&path)?;
            outputs.push(path);
        }
        info!(case = %case_name, outputs = outputs.len(), "run finished");

        Ok(RunSummary {
            case_name,
            report,
            outputs,
            areas,
        })
    }
}

fn case_name(input: &Path) -> DomainResult<String> {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            DomainError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot derive a case name from '{}'", input.display()),
            ))
        })
}
