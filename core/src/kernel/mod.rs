//! Kernel abstraction layer for the geometry operations the pipeline relies on.
//!
//! The decomposition pipeline never computes geometry itself. It drives a
//! [`GeometryKernel`] (gmsh/OpenCASCADE in production, [`PlanarKernel`] in this
//! workspace) through a [`GeometrySession`], which scopes the kernel's model
//! state to a single run.

pub mod types;
mod planar;
mod scene;
mod session;

#[cfg(test)]
mod tests_planar;

pub use planar::PlanarKernel;
pub use scene::{Scene, SceneShape};
pub use session::GeometrySession;
pub use types::*;

use crate::geometry::Point3;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during kernel operations.
#[derive(Debug, Error)]
pub enum KernelOpError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(Entity),

    #[error("Kernel model is not initialized")]
    NotInitialized,

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelOpError>;

/// Abstract interface over the geometry kernel's in-process model.
///
/// Every mutating call changes shared model state (tag allocation, entity
/// removal) that later calls observe, so calls must be issued strictly in
/// sequence. Implementations report failures; they never retry.
pub trait GeometryKernel {
    /// Start a fresh, empty model, discarding anything left from a previous run.
    fn initialize(&mut self, model_name: &str) -> KernelResult<()>;

    /// Tear the model down. Must be safe to call on an uninitialized kernel.
    fn finalize(&mut self);

    /// Import every entity stored in `path`, at all dimensions.
    fn import_shapes(&mut self, path: &Path) -> KernelResult<Vec<Entity>>;

    /// The entity's name, or an empty string for unnamed entities.
    fn entity_name(&self, entity: Entity) -> KernelResult<String>;

    /// All live entities, optionally restricted to one dimension.
    fn entities(&self, dim: Option<Dim>) -> KernelResult<Vec<Entity>>;

    // === Boolean Operations ===

    /// Subtract the union of `tools` from each object (A - B).
    fn cut(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>>;

    /// Intersect the union of `objects` with the union of `tools` (A ∩ B).
    /// An empty result means the operands do not overlap.
    fn intersect(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>>;

    /// Split all operands along each other's boundaries into disjoint pieces.
    fn fragment(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>>;

    // === Primitive Creation ===

    /// Add a planar disk surface.
    fn add_disk(&mut self, center: Point3, radius: f64) -> KernelResult<Entity>;

    /// Add an axis-aligned planar rectangle surface with one corner at `corner`.
    fn add_rectangle(&mut self, corner: Point3, dx: f64, dy: f64) -> KernelResult<Entity>;

    // === Queries ===

    /// `[xmin, ymin, zmin, xmax, ymax, zmax]`.
    fn bounding_box(&self, entity: Entity) -> KernelResult<[f64; 6]>;

    /// Boundary of the combined `entities`, as signed tags: a negative tag is
    /// the curve traversed against its own orientation.
    fn boundary(&self, entities: &[Entity], recursive: bool) -> KernelResult<Vec<Entity>>;

    /// Length of a curve or area of a surface.
    fn mass(&self, entity: Entity) -> KernelResult<f64>;

    // === Physical Model ===

    fn add_physical_group(&mut self, dim: Dim, tags: &[i32], name: &str) -> KernelResult<i32>;

    fn physical_groups(&self) -> KernelResult<Vec<PhysicalGroup>>;

    fn remove_entities(&mut self, entities: &[Entity], recursive: bool) -> KernelResult<()>;

    // === Meshing ===

    /// Target element size on the given entities. A hint; the kernel's mesher decides.
    fn set_mesh_size(&mut self, entities: &[Entity], size: f64) -> KernelResult<()>;

    /// Set a named kernel option (e.g. `Mesh.ElementOrder`).
    fn set_option(&mut self, name: &str, value: f64) -> KernelResult<()>;

    fn generate_mesh(&mut self, dim: Dim) -> KernelResult<()>;

    /// Write the model or mesh; the format follows the file extension.
    fn write(&self, path: &Path) -> KernelResult<()>;
}

/// Lets a caller lend its kernel to a session and inspect it afterwards.
impl<K: GeometryKernel + ?Sized> GeometryKernel for &mut K {
    fn initialize(&mut self, model_name: &str) -> KernelResult<()> {
        (**self).initialize(model_name)
    }

    fn finalize(&mut self) {
        (**self).finalize()
    }

    fn import_shapes(&mut self, path: &Path) -> KernelResult<Vec<Entity>> {
        (**self).import_shapes(path)
    }

    fn entity_name(&self, entity: Entity) -> KernelResult<String> {
        (**self).entity_name(entity)
    }

    fn entities(&self, dim: Option<Dim>) -> KernelResult<Vec<Entity>> {
        (**self).entities(dim)
    }

    fn cut(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>> {
        (**self).cut(objects, tools, options)
    }

    fn intersect(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>> {
        (**self).intersect(objects, tools, options)
    }

    fn fragment(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>> {
        (**self).fragment(objects, tools, options)
    }

    fn add_disk(&mut self, center: Point3, radius: f64) -> KernelResult<Entity> {
        (**self).add_disk(center, radius)
    }

    fn add_rectangle(&mut self, corner: Point3, dx: f64, dy: f64) -> KernelResult<Entity> {
        (**self).add_rectangle(corner, dx, dy)
    }

    fn bounding_box(&self, entity: Entity) -> KernelResult<[f64; 6]> {
        (**self).bounding_box(entity)
    }

    fn boundary(&self, entities: &[Entity], recursive: bool) -> KernelResult<Vec<Entity>> {
        (**self).boundary(entities, recursive)
    }

    fn mass(&self, entity: Entity) -> KernelResult<f64> {
        (**self).mass(entity)
    }

    fn add_physical_group(&mut self, dim: Dim, tags: &[i32], name: &str) -> KernelResult<i32> {
        (**self).add_physical_group(dim, tags, name)
    }

    fn physical_groups(&self) -> KernelResult<Vec<PhysicalGroup>> {
        (**self).physical_groups()
    }

    fn remove_entities(&mut self, entities: &[Entity], recursive: bool) -> KernelResult<()> {
        (**self).remove_entities(entities, recursive)
    }

    fn set_mesh_size(&mut self, entities: &[Entity], size: f64) -> KernelResult<()> {
        (**self).set_mesh_size(entities, size)
    }

    fn set_option(&mut self, name: &str, value: f64) -> KernelResult<()> {
        (**self).set_option(name, value)
    }

    fn generate_mesh(&mut self, dim: Dim) -> KernelResult<()> {
        (**self).generate_mesh(dim)
    }

    fn write(&self, path: &Path) -> KernelResult<()> {
        (**self).write(path)
    }
}

/// Get the default kernel implementation.
pub fn default_kernel() -> PlanarKernel {
    PlanarKernel::new()
}
