use crate::classify::Classification;
use crate::kernel::{BooleanOptions, Entity, GeometryKernel, GeometrySession, KernelResult};
use tracing::debug;

/// Make dielectric regions pairwise disjoint.
///
/// Dielectrics are visited in ascending index order and each loses whatever
/// the already-visited ones claimed, so the lowest index wins contested area.
/// The first dielectric is never touched.
pub fn resolve_dielectric_overlaps<K: GeometryKernel>(
    session: &mut GeometrySession<K>,
    classification: &mut Classification,
) -> KernelResult<()> {
    let dielectrics = &mut classification.dielectrics;
    let indices: Vec<usize> = dielectrics.indices().collect();
    let mut claimed: Vec<Entity> = Vec::new();

    for index in indices {
        let Some(current) = dielectrics.get(index).cloned() else {
            continue;
        };
        if claimed.is_empty() {
            claimed.extend(current);
            continue;
        }
        let resolved = session.cut(&current, &claimed, BooleanOptions::replace_object())?;
        debug!(index, before = current.len(), after = resolved.len(), "dielectric overlap resolved");
        claimed.extend(resolved.iter().copied());
        dielectrics.insert(index, resolved);
    }
    Ok(())
}

/// Remove solid conductor material from every dielectric.
///
/// The enclosure of a closed problem is not material and is left out. Run
/// after [`resolve_dielectric_overlaps`].
pub fn subtract_conductors<K: GeometryKernel>(
    session: &mut GeometrySession<K>,
    classification: &mut Classification,
) -> KernelResult<()> {
    let material = classification.conductors.material();
    if material.is_empty() {
        return Ok(());
    }

    let dielectrics = &mut classification.dielectrics;
    let indices: Vec<usize> = dielectrics.indices().collect();
    for index in indices {
        let Some(current) = dielectrics.get(index).cloned() else {
            continue;
        };
        let remaining = session.cut(&current, &material, BooleanOptions::replace_object())?;
        debug!(index, pieces = remaining.len(), "conductors removed from dielectric");
        dielectrics.insert(index, remaining);
    }
    Ok(())
}
