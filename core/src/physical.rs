//! Physical-group tagging and removal of untagged scratch geometry.

use crate::classify::ShapeGroup;
use crate::domain::VacuumDomain;
use crate::error::DomainResult;
use crate::kernel::{Dim, Entity, GeometryKernel, GeometrySession, KernelResult, PhysicalGroup};
use crate::naming::Label;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Prefix of vacuum region groups.
pub const VACUUM_PREFIX: &str = "Vacuum_";

/// Creates the named physical groups of a decomposed model.
pub struct PhysicalGroupAssigner<'s, K: GeometryKernel> {
    session: &'s mut GeometrySession<K>,
}

impl<'s, K: GeometryKernel> PhysicalGroupAssigner<'s, K> {
    pub fn new(session: &'s mut GeometrySession<K>) -> Self {
        Self { session }
    }

    /// Tag conductor curves, the open boundary, vacuum and dielectric regions,
    /// in that order. Returns the groups as the kernel now holds them.
    pub fn assign(
        &mut self,
        conductor_boundaries: &ShapeGroup,
        dielectrics: &ShapeGroup,
        vacuum: &VacuumDomain,
    ) -> DomainResult<Vec<PhysicalGroup>> {
        self.add_groups(Label::Conductor.group_prefix(), conductor_boundaries, Dim::Curve)?;
        if let Some((index, curves)) = &vacuum.open_boundary {
            let open: ShapeGroup = [(*index, curves.clone())].into_iter().collect();
            self.add_groups(Label::OpenBoundary.group_prefix(), &open, Dim::Curve)?;
        }
        self.add_groups(VACUUM_PREFIX, &vacuum.regions, Dim::Surface)?;
        self.add_groups(Label::Dielectric.group_prefix(), dielectrics, Dim::Surface)?;

        let groups = self.session.physical_groups()?;
        info!(groups = groups.len(), "physical groups assigned");
        Ok(groups)
    }

    fn add_groups(&mut self, prefix: &str, shapes: &ShapeGroup, dim: Dim) -> KernelResult<()> {
        for (index, entities) in shapes {
            let name = format!("{}{}", prefix, index);
            if entities.is_empty() {
                warn!(%name, "no entities left, group skipped");
                continue;
            }
            let tags: Vec<i32> = entities.iter().map(|entity| entity.tag).collect();
            let tag = self.session.add_physical_group(dim, &tags, &name)?;
            debug!(%name, tag, entities = tags.len(), "physical group added");
        }
        Ok(())
    }

    /// Remove every entity that belongs to no physical group.
    ///
    /// Removal is non-recursive: curves still bounding a kept surface stay.
    /// Returns how many entities actually disappeared from the model.
    pub fn prune_unassigned(&mut self) -> KernelResult<usize> {
        let tagged: BTreeSet<Entity> = self
            .session
            .physical_groups()?
            .iter()
            .flat_map(|group| group.members().collect::<Vec<_>>())
            .collect();

        let all = self.session.entities(None)?;
        let untagged: Vec<Entity> = all
            .iter()
            .filter(|entity| !tagged.contains(entity))
            .copied()
            .collect();
        if !untagged.is_empty() {
            self.session.remove_entities(&untagged, false)?;
        }

        let removed = all.len() - self.session.entities(None)?.len();
        info!(candidates = untagged.len(), removed, "untagged geometry pruned");
        Ok(removed)
    }
}
