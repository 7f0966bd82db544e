//! Classification of imported entities into typed, indexed shape groups.

mod topology;

#[cfg(test)]
mod tests_classify;

pub use topology::is_open_problem;

use crate::error::{DomainError, DomainResult};
use crate::kernel::{Dim, Entity, GeometryKernel, GeometrySession};
use crate::naming::Label;
use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Index -> entities mapping for one label, iterated in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ShapeGroup(BTreeMap<usize, Vec<Entity>>);

impl ShapeGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entities at `index`, returning what was there before.
    pub fn insert(&mut self, index: usize, entities: Vec<Entity>) -> Option<Vec<Entity>> {
        self.0.insert(index, entities)
    }

    pub fn get(&self, index: usize) -> Option<&Vec<Entity>> {
        self.0.get(&index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Vec<Entity>> {
        self.0.remove(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, usize, Vec<Entity>> {
        self.0.iter()
    }

    /// Every entity of every index, in index order.
    pub fn entities(&self) -> Vec<Entity> {
        self.0.values().flatten().copied().collect()
    }
}

impl FromIterator<(usize, Vec<Entity>)> for ShapeGroup {
    fn from_iter<I: IntoIterator<Item = (usize, Vec<Entity>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ShapeGroup {
    type Item = (&'a usize, &'a Vec<Entity>);
    type IntoIter = btree_map::Iter<'a, usize, Vec<Entity>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Conductors with the closed-problem enclosure split out of the indexed group.
///
/// `enclosure` is only set for closed problems. In open problems index 0 is
/// an ordinary solid conductor and stays in `group`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Conductors {
    pub enclosure: Option<Vec<Entity>>,
    pub group: ShapeGroup,
}

impl Conductors {
    /// Conductor regions by index, enclosure included as index 0.
    pub fn owners(&self) -> ShapeGroup {
        let mut owners = self.group.clone();
        if let Some(enclosure) = &self.enclosure {
            owners.insert(0, enclosure.clone());
        }
        owners
    }

    /// Solid conductor material, i.e. everything but the enclosure.
    pub fn material(&self) -> Vec<Entity> {
        self.group.entities()
    }

    pub fn len(&self) -> usize {
        self.group.len() + usize::from(self.enclosure.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group the surfaces of `entities` whose name carries `label`.
///
/// Non-surface entities and names without the label are skipped. A second
/// surface with an index already seen replaces the first.
pub fn classify<K: GeometryKernel>(
    session: &GeometrySession<K>,
    entities: &[Entity],
    label: Label,
) -> DomainResult<ShapeGroup> {
    let mut group = ShapeGroup::new();
    for entity in entities.iter().filter(|e| e.dim == Dim::Surface) {
        let name = session.entity_name(*entity)?;
        let index = match label.index_in(&name) {
            Some(index) => index?,
            None => continue,
        };
        if let Some(previous) = group.insert(index, vec![*entity]) {
            warn!(
                %label,
                index,
                ?previous,
                replacement = %entity,
                "duplicate index, keeping the last entity"
            );
        }
    }
    debug!(%label, count = group.len(), "classified");
    Ok(group)
}

/// Number of surfaces in `entities` whose name carries `label`, counting
/// every entity even when two share an index.
pub fn count_labelled<K: GeometryKernel>(
    session: &GeometrySession<K>,
    entities: &[Entity],
    label: Label,
) -> DomainResult<usize> {
    let mut count = 0;
    for entity in entities.iter().filter(|e| e.dim == Dim::Surface) {
        if label.index_in(&session.entity_name(*entity)?).is_some() {
            count += 1;
        }
    }
    Ok(count)
}

/// The imported model sorted into conductors, dielectrics and open regions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub conductors: Conductors,
    pub dielectrics: ShapeGroup,
    pub open_boundary: ShapeGroup,
    is_open: bool,
}

impl Classification {
    /// Classify `entities` and decide whether the problem is open.
    ///
    /// Every entity labelled as an open region counts, including ones that
    /// share an index. The count is checked before the topology probe, so a
    /// rejected model is left exactly as imported.
    pub fn new<K: GeometryKernel>(
        session: &mut GeometrySession<K>,
        entities: &[Entity],
    ) -> DomainResult<Self> {
        let mut conductors = classify(session, entities, Label::Conductor)?;
        let dielectrics = classify(session, entities, Label::Dielectric)?;
        let supplied = count_labelled(session, entities, Label::OpenBoundary)?;
        if supplied > 1 {
            return Err(DomainError::MultipleOpenRegions(supplied));
        }
        let open_boundary = classify(session, entities, Label::OpenBoundary)?;

        let is_open = is_open_problem(session, &conductors)?;
        let enclosure = if is_open {
            None
        } else {
            Some(conductors.remove(0).ok_or(DomainError::MissingEnclosure)?)
        };

        info!(
            conductors = conductors.len() + usize::from(enclosure.is_some()),
            dielectrics = dielectrics.len(),
            open_regions = open_boundary.len(),
            open = is_open,
            "shapes classified"
        );

        Ok(Self {
            conductors: Conductors {
                enclosure,
                group: conductors,
            },
            dielectrics,
            open_boundary,
            is_open,
        })
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Conductor material and dielectrics, the regions vacuum must avoid.
    pub fn non_vacuum(&self) -> Vec<Entity> {
        let mut entities = self.conductors.material();
        entities.extend(self.dielectrics.entities());
        entities
    }
}
