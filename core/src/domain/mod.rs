//! Material overlap resolution and vacuum-domain construction.
//!
//! The vacuum is built once per run by a [`DomainPolicy`] chosen from the
//! classification: a closed cavity inside the enclosure conductor, an
//! explicit open region supplied with the model, or a synthesized near/far
//! pair sized from the material's bounding box.

mod open;
mod overlap;


pub use open::{OpenDomainSizing, FAR_SCALE, MESH_SIZE_DIVISOR, NEAR_SCALE};
pub use overlap::{resolve_dielectric_overlaps, subtract_conductors};

use crate::classify::{Classification, ShapeGroup};
use crate::error::{DomainError, DomainResult};
use crate::geometry::BoundingBox;
use crate::kernel::{BooleanOptions, Entity, GeometryKernel, GeometrySession, KernelResult};
use serde::Serialize;
use tracing::{debug, info, warn};

/// How the background region of a problem is obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DomainPolicy {
    /// The enclosure conductor bounds the domain.
    Closed,
    /// A supplied open-region entity bounds the domain.
    ExplicitOpen { index: usize, region: Vec<Entity> },
    /// No enclosure and no open region: build one around the material.
    SynthesizedOpen,
}

impl DomainPolicy {
    pub fn select(classification: &Classification) -> Self {
        if !classification.is_open() {
            if !classification.open_boundary.is_empty() {
                warn!("open region supplied for a closed problem, ignoring it");
            }
            return Self::Closed;
        }
        match classification.open_boundary.iter().next() {
            Some((index, region)) => Self::ExplicitOpen {
                index: *index,
                region: region.clone(),
            },
            None => Self::SynthesizedOpen,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::ExplicitOpen { .. } => "explicit-open",
            Self::SynthesizedOpen => "synthesized-open",
        }
    }
}

/// Background regions of the domain.
///
/// Region 0 is the near (or only) vacuum; region 1, when present, is the
/// synthesized far region.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VacuumDomain {
    pub regions: ShapeGroup,
    /// Index and curves of the truncation boundary of an open problem.
    pub open_boundary: Option<(usize, Vec<Entity>)>,
    /// Element size requested on the near region's outline.
    pub mesh_size_hint: Option<f64>,
}

/// Builds the vacuum domain for a resolved classification.
pub struct VacuumDomainBuilder<'s, K: GeometryKernel> {
    session: &'s mut GeometrySession<K>,
}

impl<'s, K: GeometryKernel> VacuumDomainBuilder<'s, K> {
    pub fn new(session: &'s mut GeometrySession<K>) -> Self {
        Self { session }
    }

    /// Dielectrics must already be overlap-free and have conductors removed.
    pub fn build(
        &mut self,
        policy: &DomainPolicy,
        classification: &Classification,
    ) -> DomainResult<VacuumDomain> {
        let domain = match policy {
            DomainPolicy::Closed => self.closed(classification)?,
            DomainPolicy::ExplicitOpen { index, region } => {
                self.explicit_open(*index, region, classification)?
            }
            DomainPolicy::SynthesizedOpen => self.synthesized_open(classification)?,
        };
        info!(
            policy = policy.name(),
            regions = domain.regions.len(),
            "vacuum domain built"
        );
        Ok(domain)
    }

    fn closed(&mut self, classification: &Classification) -> DomainResult<VacuumDomain> {
        let enclosure = classification
            .conductors
            .enclosure
            .as_ref()
            .ok_or(DomainError::MissingEnclosure)?;

        let vacuum = self.subtract(enclosure, &classification.non_vacuum(), BooleanOptions::keep_all())?;
        Ok(VacuumDomain {
            regions: [(0, vacuum)].into_iter().collect(),
            ..Default::default()
        })
    }

    fn explicit_open(
        &mut self,
        index: usize,
        region: &[Entity],
        classification: &Classification,
    ) -> DomainResult<VacuumDomain> {
        let outline = self.outline(region)?;
        let vacuum = self.subtract(region, &classification.non_vacuum(), BooleanOptions::keep_all())?;
        debug!(index, curves = outline.len(), "open boundary taken from supplied region");
        Ok(VacuumDomain {
            regions: [(0, vacuum)].into_iter().collect(),
            open_boundary: Some((index, outline)),
            mesh_size_hint: None,
        })
    }

    fn synthesized_open(&mut self, classification: &Classification) -> DomainResult<VacuumDomain> {
        let material = classification.non_vacuum();
        let bbox = BoundingBox::of_entities(&*self.session, &material)?;
        if material.is_empty() {
            let err = DomainError::DegenerateGeometry(
                "no conductors or dielectrics to surround".into(),
            );
            warn!(%err, "open domain synthesized around a zero-size box");
        }

        let sizing = OpenDomainSizing::from_bbox(&bbox);
        let near = self
            .session
            .add_rectangle(sizing.near_corner(), sizing.near_side, sizing.near_side)?;
        let far = self.session.add_disk(sizing.center, sizing.far_radius())?;
        let near_outline = self.outline(&[near])?;

        let far_ring = self.session.cut(&[far], &[near], BooleanOptions::replace_object())?;
        let near_vacuum = self.subtract(&[near], &material, BooleanOptions::replace_object())?;

        if !near_outline.is_empty() {
            self.session.set_mesh_size(&near_outline, sizing.mesh_size)?;
        }

        let open_curves: Vec<Entity> = self
            .outline(&far_ring)?
            .into_iter()
            .filter(|curve| !near_outline.contains(curve))
            .collect();

        debug!(
            near_side = sizing.near_side,
            far_diameter = sizing.far_diameter,
            mesh_size = sizing.mesh_size,
            "open domain synthesized"
        );
        Ok(VacuumDomain {
            regions: [(0, near_vacuum), (1, far_ring)].into_iter().collect(),
            open_boundary: Some((0, open_curves)),
            mesh_size_hint: Some(sizing.mesh_size),
        })
    }

    /// `objects` minus `tools`; with no tools the objects are the result.
    fn subtract(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>> {
        if tools.is_empty() {
            return Ok(objects.to_vec());
        }
        self.session.cut(objects, tools, options)
    }

    /// Boundary curves of `surfaces` without orientation, in kernel order.
    fn outline(&self, surfaces: &[Entity]) -> KernelResult<Vec<Entity>> {
        if surfaces.is_empty() {
            return Ok(Vec::new());
        }
        let mut curves: Vec<Entity> = Vec::new();
        for curve in self.session.boundary(surfaces, false)? {
            let curve = curve.unsigned();
            if !curves.contains(&curve) {
                curves.push(curve);
            }
        }
        Ok(curves)
    }
}
