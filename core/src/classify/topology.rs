use crate::classify::ShapeGroup;
use crate::kernel::{BooleanOptions, GeometryKernel, GeometrySession, KernelResult};
use tracing::debug;

/// Whether no two conductors overlap.
///
/// Each distinct pair is intersected with both operands kept. The first
/// overlapping pair makes the problem closed: one conductor encloses another.
pub fn is_open_problem<K: GeometryKernel>(
    session: &mut GeometrySession<K>,
    conductors: &ShapeGroup,
) -> KernelResult<bool> {
    let shapes: Vec<(usize, &Vec<_>)> = conductors.iter().map(|(i, e)| (*i, e)).collect();

    for (pos, (index, shape)) in shapes.iter().enumerate() {
        for (other_index, other) in &shapes[pos + 1..] {
            if shape == other {
                continue;
            }
            let common = session.intersect(shape, other, BooleanOptions::keep_all())?;
            if !common.is_empty() {
                debug!(index, other_index, "conductors overlap, closed problem");
                return Ok(false);
            }
        }
    }
    Ok(true)
}
