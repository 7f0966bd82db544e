//! Conductor boundary extraction and deduplication.
//!
//! The kernel reports orientation as the sign of a curve tag. That sign is
//! decoded into [`Orientation`] as soon as a boundary comes back and never
//! travels further into the pipeline.

use crate::classify::{Conductors, ShapeGroup};
use crate::kernel::{Dim, Entity, GeometryKernel, GeometrySession, KernelResult};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Orientation {
    Forward,
    Reversed,
}

/// A boundary curve and the direction its owner traverses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OrientedCurve {
    pub curve: i32,
    pub orientation: Orientation,
}

impl OrientedCurve {
    pub fn forward(curve: i32) -> Self {
        Self {
            curve,
            orientation: Orientation::Forward,
        }
    }

    /// Decode a signed boundary tag.
    pub fn from_signed(entity: Entity) -> Self {
        Self {
            curve: entity.tag.abs(),
            orientation: if entity.tag < 0 {
                Orientation::Reversed
            } else {
                Orientation::Forward
            },
        }
    }

    pub fn reversed(self) -> Self {
        let orientation = match self.orientation {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
        };
        Self { orientation, ..self }
    }

    /// The underlying curve, orientation dropped.
    pub fn entity(self) -> Entity {
        Entity::new(Dim::Curve, self.curve)
    }
}

/// Oriented boundary curves per conductor index.
pub type ConductorBoundaries = BTreeMap<usize, Vec<OrientedCurve>>;

/// Boundary curves of every conductor, enclosure included as index 0.
pub fn extract_boundaries<K: GeometryKernel>(
    session: &GeometrySession<K>,
    conductors: &Conductors,
) -> KernelResult<ConductorBoundaries> {
    let mut boundaries = ConductorBoundaries::new();
    for (index, surfaces) in &conductors.owners() {
        let curves = session
            .boundary(surfaces, false)?
            .into_iter()
            .map(OrientedCurve::from_signed)
            .collect::<Vec<_>>();
        debug!(index, curves = curves.len(), "conductor boundary extracted");
        boundaries.insert(*index, curves);
    }
    Ok(boundaries)
}

/// Give every shared curve to exactly one conductor and drop orientation.
///
/// A curve of conductor 0 whose reverse appears on another conductor is an
/// interface between the two and stays with the other conductor.
pub fn deduplicate(boundaries: &ConductorBoundaries) -> ShapeGroup {
    let inner: Vec<OrientedCurve> = boundaries
        .iter()
        .filter(|(index, _)| **index != 0)
        .flat_map(|(_, curves)| curves.iter().copied())
        .collect();

    boundaries
        .iter()
        .map(|(index, curves)| {
            let mut kept: Vec<Entity> = Vec::with_capacity(curves.len());
            for curve in curves {
                if *index == 0 && inner.contains(&curve.reversed()) {
                    debug!(curve = curve.curve, "shared curve removed from outer conductor");
                    continue;
                }
                let entity = curve.entity();
                if !kept.contains(&entity) {
                    kept.push(entity);
                }
            }
            (*index, kept)
        })
        .collect()
}
