//! In-memory planar implementation of the geometry kernel.
//!
//! Geometry is kept as a planar arrangement. Every primitive outline (disk or
//! rectangle) splits the cells it crosses, so each cell is the region covered
//! by exactly one set of primitives, its signature. Cell shapes are `geo`
//! polygons and are only touched when a primitive is inserted. Surfaces are
//! sets of cells, which turns the boolean operators into exact set operations.
//!
//! Curves are the pieces of each outline that separate two cells. A piece is
//! identified by the primitives lying on either side of it, and the boundary
//! of a set of cells is the signed sum of the pieces it has on one side only.

use super::scene::Scene;
use super::types::*;
use super::{GeometryKernel, KernelOpError, KernelResult};
use crate::geometry::{Point2, Point3, EPSILON};
use geo::{Area, BooleanOps, BoundingRect, LineString, MultiPolygon, Polygon};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;
use std::path::Path;
use tracing::{debug, trace};

/// Polygon vertices per disk, and outline samples per primitive.
const OUTLINE_SEGMENTS: usize = 256;

/// Pieces smaller than this fraction of the smaller operand are dropped.
const RELATIVE_TOLERANCE: f64 = 1e-6;

/// Planar kernel with no mesher of its own.
///
/// `generate_mesh` only checks that the physical model is meshable and
/// records the request, and `write` produces a JSON model dump. It is the
/// kernel the workspace's tests and the bundled CLI run against.
#[derive(Debug, Default)]
pub struct PlanarKernel {
    model: Option<Model>,
}

impl PlanarKernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.model.is_some()
    }

    /// Add every shape of `scene` as a named surface.
    ///
    /// Returns the new surfaces in scene order followed by the curves the
    /// scene introduced.
    pub fn load_scene(&mut self, scene: &Scene) -> KernelResult<Vec<Entity>> {
        let model = self.model_mut()?;
        let first_curve = model.next_curve;

        let mut imported = Vec::with_capacity(scene.shapes.len());
        for shape in &scene.shapes {
            let outline = model.insert_primitive(shape.outline)?;
            let mut holes = Vec::with_capacity(shape.holes.len());
            for hole in &shape.holes {
                if !hole.is_inside(&shape.outline) {
                    return Err(KernelOpError::InvalidGeometry(format!(
                        "hole of '{}' is not inside its outline",
                        shape.name
                    )));
                }
                holes.push(model.insert_primitive(*hole)?);
            }

            let mut cells = model.region(outline);
            for hole in holes {
                for cell in model.region(hole) {
                    cells.remove(&cell);
                }
            }
            imported.push(model.add_surface(shape.name.clone(), cells));
        }

        imported.extend(
            model
                .curves
                .iter()
                .filter(|tag| **tag >= first_curve)
                .map(|tag| Entity::curve(*tag)),
        );
        debug!(count = imported.len(), "scene loaded");
        Ok(imported)
    }

    /// Mesh size hint recorded for an entity.
    pub fn mesh_size(&self, entity: Entity) -> Option<f64> {
        self.model.as_ref()?.mesh_sizes.get(&entity).copied()
    }

    /// Dimension of the last successful `generate_mesh` call.
    pub fn meshed_dim(&self) -> Option<Dim> {
        self.model.as_ref()?.meshed
    }

    fn model(&self) -> KernelResult<&Model> {
        self.model.as_ref().ok_or(KernelOpError::NotInitialized)
    }

    fn model_mut(&mut self) -> KernelResult<&mut Model> {
        self.model.as_mut().ok_or(KernelOpError::NotInitialized)
    }
}

/// Polygon approximation of a primitive's interior.
///
/// Disks use a circumradius slightly above the true radius so the polygon
/// keeps the disk's exact area and its axis-aligned extremes lie outside the
/// disk's extent.
fn outline_polygon(primitive: &Primitive) -> MultiPolygon<f64> {
    let ring: Vec<(f64, f64)> = match primitive {
        Primitive::Disk { center, radius } => {
            let step = 2.0 * PI / OUTLINE_SEGMENTS as f64;
            let circumradius = radius * (step / step.sin()).sqrt();
            (0..OUTLINE_SEGMENTS)
                .map(|k| {
                    let angle = k as f64 * step;
                    (
                        center[0] + circumradius * angle.cos(),
                        center[1] + circumradius * angle.sin(),
                    )
                })
                .collect()
        }
        Primitive::Rectangle { min, max } => vec![
            (min[0], min[1]),
            (max[0], min[1]),
            (max[0], max[1]),
            (min[0], max[1]),
        ],
    };
    MultiPolygon::new(vec![Polygon::new(LineString::from(ring), Vec::new())])
}

fn extents_overlap(a: [f64; 4], b: [f64; 4]) -> bool {
    a[0] < b[2] && b[0] < a[2] && a[1] < b[3] && b[1] < a[3]
}

fn empty_extent() -> [f64; 4] {
    [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY]
}

#[derive(Debug, Clone)]
struct Cell {
    /// Primitives covering the cell.
    signature: BTreeSet<usize>,
    shape: MultiPolygon<f64>,
    area: f64,
}

impl Cell {
    fn new(signature: BTreeSet<usize>, shape: MultiPolygon<f64>) -> Self {
        let area = shape.unsigned_area();
        Self {
            signature,
            shape,
            area,
        }
    }

    fn polygon_extent(&self) -> Option<[f64; 4]> {
        self.shape
            .bounding_rect()
            .map(|rect| [rect.min().x, rect.min().y, rect.max().x, rect.max().y])
    }
}

/// A piece of one primitive's outline.
#[derive(Debug, Clone)]
struct OutlinePiece {
    node: usize,
    /// Other primitives whose interior contains the piece.
    sides: BTreeSet<usize>,
    /// `sides` minus the primitives containing the whole outline. Stays
    /// stable when an enclosing primitive is added, which keeps the tag.
    key: BTreeSet<usize>,
    length: f64,
    extent: [f64; 4],
}

impl OutlinePiece {
    /// Signature of the cell on the inner side of the piece.
    fn inner(&self) -> BTreeSet<usize> {
        let mut inner = self.sides.clone();
        inner.insert(self.node);
        inner
    }
}

#[derive(Debug, Clone)]
struct Surface {
    name: String,
    cells: BTreeSet<usize>,
}

#[derive(Debug)]
struct Model {
    name: String,
    nodes: Vec<Primitive>,
    cells: Vec<Cell>,
    /// Every outline piece of the current arrangement, by curve tag.
    arcs: BTreeMap<i32, OutlinePiece>,
    /// Curve tags not yet removed.
    curves: BTreeSet<i32>,
    surfaces: BTreeMap<i32, Surface>,
    groups: Vec<PhysicalGroup>,
    mesh_sizes: BTreeMap<Entity, f64>,
    options: BTreeMap<String, f64>,
    meshed: Option<Dim>,
    next_curve: i32,
    next_surface: i32,
    next_group: i32,
}

impl Model {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            cells: Vec::new(),
            arcs: BTreeMap::new(),
            curves: BTreeSet::new(),
            surfaces: BTreeMap::new(),
            groups: Vec::new(),
            mesh_sizes: BTreeMap::new(),
            options: BTreeMap::new(),
            meshed: None,
            next_curve: 1,
            next_surface: 1,
            next_group: 1,
        }
    }

    /// Add a primitive to the arrangement, splitting the cells it crosses.
    fn insert_primitive(&mut self, primitive: Primitive) -> KernelResult<usize> {
        if !primitive.is_valid() {
            return Err(KernelOpError::InvalidGeometry(format!(
                "invalid primitive: {:?}",
                primitive
            )));
        }

        if let Some(existing) = self.nodes.iter().position(|node| node.approx_eq(&primitive)) {
            let revived: Vec<i32> = self
                .arcs
                .iter()
                .filter(|(_, arc)| arc.node == existing)
                .map(|(tag, _)| *tag)
                .collect();
            self.curves.extend(revived);
            return Ok(existing);
        }

        let id = self.nodes.len();
        if primitive.area() > 0.0 {
            self.carve(id, &primitive);
        }
        self.nodes.push(primitive);
        self.rebuild_arcs();
        Ok(id)
    }

    fn carve(&mut self, id: usize, primitive: &Primitive) {
        let outline = outline_polygon(primitive);
        let reach = primitive.extent();
        let mut uncovered = outline.clone();
        let mut carved = Vec::new();

        for (cell_id, cell) in self.cells.iter_mut().enumerate() {
            match cell.polygon_extent() {
                Some(extent) if extents_overlap(extent, reach) => {}
                _ => continue,
            }
            let tolerance = RELATIVE_TOLERANCE * cell.area.min(primitive.area());
            let inside = cell.shape.intersection(&outline);
            if inside.unsigned_area() <= tolerance {
                continue;
            }
            uncovered = uncovered.difference(&cell.shape);

            let outside = cell.shape.difference(&outline);
            if outside.unsigned_area() <= tolerance {
                cell.signature.insert(id);
                continue;
            }
            let mut signature = cell.signature.clone();
            signature.insert(id);
            carved.push((cell_id, Cell::new(signature, inside)));
            *cell = Cell::new(cell.signature.clone(), outside);
        }

        for (parent, cell) in carved {
            let child = self.cells.len();
            self.cells.push(cell);
            // The carved piece was part of the parent cell's surfaces.
            for surface in self.surfaces.values_mut() {
                if surface.cells.contains(&parent) {
                    surface.cells.insert(child);
                }
            }
        }

        if uncovered.unsigned_area() > RELATIVE_TOLERANCE * primitive.area() {
            self.cells.push(Cell::new(BTreeSet::from([id]), uncovered));
        }
        trace!(node = id, cells = self.cells.len(), "primitive carved");
    }

    /// Recompute the outline pieces, keeping the tag of every piece whose
    /// `(node, key)` survives and allocating fresh tags for the rest.
    fn rebuild_arcs(&mut self) {
        let mut arcs = BTreeMap::new();
        let mut fresh = Vec::new();

        for (id, primitive) in self.nodes.iter().enumerate() {
            let samples = primitive.outline_samples(OUTLINE_SEGMENTS);
            let mut pieces: BTreeMap<BTreeSet<usize>, (f64, [f64; 4])> = BTreeMap::new();
            for (point, length) in samples {
                let sides: BTreeSet<usize> = self
                    .nodes
                    .iter()
                    .enumerate()
                    .filter(|(other, node)| *other != id && node.contains_point(point))
                    .map(|(other, _)| other)
                    .collect();
                let piece = pieces.entry(sides).or_insert((0.0, empty_extent()));
                piece.0 += length;
                piece.1 = [
                    piece.1[0].min(point[0]),
                    piece.1[1].min(point[1]),
                    piece.1[2].max(point[0]),
                    piece.1[3].max(point[1]),
                ];
            }

            let whole = pieces.len() == 1;
            let common = pieces
                .keys()
                .skip(1)
                .fold(pieces.keys().next().cloned().unwrap_or_default(), |acc, sides| {
                    acc.intersection(sides).copied().collect()
                });

            for (sides, (length, sampled)) in pieces {
                let key: BTreeSet<usize> = sides.difference(&common).copied().collect();
                let arc = OutlinePiece {
                    node: id,
                    key,
                    sides,
                    length: if whole { primitive.perimeter() } else { length },
                    extent: if whole { primitive.extent() } else { sampled },
                };
                let kept = self
                    .arcs
                    .iter()
                    .find(|(_, old)| old.node == id && old.key == arc.key)
                    .map(|(tag, _)| *tag);
                match kept {
                    Some(tag) => {
                        arcs.insert(tag, arc);
                    }
                    None => fresh.push(arc),
                }
            }
        }

        for arc in fresh {
            let tag = self.next_curve;
            self.next_curve += 1;
            self.curves.insert(tag);
            arcs.insert(tag, arc);
        }
        self.curves.retain(|tag| arcs.contains_key(tag));
        self.arcs = arcs;
    }

    /// Cells covered by `node`.
    fn region(&self, node: usize) -> BTreeSet<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.signature.contains(&node))
            .map(|(id, _)| id)
            .collect()
    }

    fn add_surface(&mut self, name: String, cells: BTreeSet<usize>) -> Entity {
        let tag = self.next_surface;
        self.next_surface += 1;
        self.surfaces.insert(tag, Surface { name, cells });
        Entity::surface(tag)
    }

    fn surface(&self, entity: Entity) -> KernelResult<&Surface> {
        match entity.dim {
            Dim::Surface => self
                .surfaces
                .get(&entity.tag)
                .ok_or(KernelOpError::EntityNotFound(entity)),
            _ => Err(KernelOpError::NotImplemented(format!(
                "planar kernel expects a surface, got {}",
                entity
            ))),
        }
    }

    fn arc(&self, entity: Entity) -> KernelResult<&OutlinePiece> {
        let tag = entity.tag.abs();
        self.curves
            .contains(&tag)
            .then(|| self.arcs.get(&tag))
            .flatten()
            .ok_or(KernelOpError::EntityNotFound(entity))
    }

    fn cells_of(&self, entities: &[Entity]) -> KernelResult<BTreeSet<usize>> {
        let mut cells = BTreeSet::new();
        for entity in entities {
            cells.extend(self.surface(*entity)?.cells.iter().copied());
        }
        Ok(cells)
    }

    fn area(&self, cells: &BTreeSet<usize>) -> f64 {
        cells.iter().map(|cell| self.cells[*cell].area).sum()
    }

    /// Signed boundary of a set of cells: pieces with the set on their inner
    /// side only are positive, pieces with it on their outer side negative.
    fn chain(&self, cells: &BTreeSet<usize>) -> Vec<Entity> {
        let covered: BTreeSet<&BTreeSet<usize>> =
            cells.iter().map(|cell| &self.cells[*cell].signature).collect();
        self.arcs
            .iter()
            .filter_map(|(tag, arc)| {
                let inside = covered.contains(&arc.inner());
                let outside = !arc.sides.is_empty() && covered.contains(&arc.sides);
                match (inside, outside) {
                    (true, false) => Some(Entity::curve(*tag)),
                    (false, true) => Some(Entity::curve(-tag)),
                    _ => None,
                }
            })
            .collect()
    }

    /// Exact extent of the primitives covering the cell, tightened to the
    /// polygon where the polygon is clearly smaller.
    fn cell_extent(&self, cell: &Cell) -> [f64; 4] {
        let exact = cell
            .signature
            .iter()
            .map(|node| self.nodes[*node].extent())
            .fold(
                [f64::NEG_INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::INFINITY],
                |acc, e| [acc[0].max(e[0]), acc[1].max(e[1]), acc[2].min(e[2]), acc[3].min(e[3])],
            );
        let Some(polygon) = cell.polygon_extent() else {
            return exact;
        };
        let slack = EPSILON.max(RELATIVE_TOLERANCE * ((exact[2] - exact[0]) + (exact[3] - exact[1])));
        [
            if polygon[0] > exact[0] + slack { polygon[0] } else { exact[0] },
            if polygon[1] > exact[1] + slack { polygon[1] } else { exact[1] },
            if polygon[2] < exact[2] - slack { polygon[2] } else { exact[2] },
            if polygon[3] < exact[3] - slack { polygon[3] } else { exact[3] },
        ]
    }

    fn extent(&self, cells: &BTreeSet<usize>) -> [f64; 4] {
        cells
            .iter()
            .map(|cell| self.cell_extent(&self.cells[*cell]))
            .fold(empty_extent(), |acc, e| {
                [acc[0].min(e[0]), acc[1].min(e[1]), acc[2].max(e[2]), acc[3].max(e[3])]
            })
    }

    fn remove_operands(&mut self, entities: &[Entity]) {
        for entity in entities {
            self.surfaces.remove(&entity.tag);
        }
    }

    /// Curves lying on the boundary of at least one live surface.
    fn bounding_curves(&self) -> BTreeSet<i32> {
        self.surfaces
            .values()
            .flat_map(|surface| self.chain(&surface.cells))
            .map(|curve| curve.tag.abs())
            .collect()
    }

    fn is_alive(&self, entity: Entity) -> bool {
        match entity.dim {
            Dim::Surface => self.surfaces.contains_key(&entity.tag),
            Dim::Curve => self.curves.contains(&entity.tag.abs()),
            Dim::Point => false,
        }
    }
}

#[derive(Serialize)]
struct ModelDump<'a> {
    model: &'a str,
    surfaces: Vec<SurfaceDump<'a>>,
    curves: Vec<CurveDump>,
    physical_groups: &'a [PhysicalGroup],
    options: &'a BTreeMap<String, f64>,
    meshed: Option<Dim>,
}

#[derive(Serialize)]
struct SurfaceDump<'a> {
    tag: i32,
    name: &'a str,
    area: f64,
    boundary: Vec<i32>,
}

#[derive(Serialize)]
struct CurveDump {
    tag: i32,
    length: f64,
    mesh_size: Option<f64>,
}

impl GeometryKernel for PlanarKernel {
    fn initialize(&mut self, model_name: &str) -> KernelResult<()> {
        self.model = Some(Model::new(model_name));
        Ok(())
    }

    fn finalize(&mut self) {
        self.model = None;
    }

    fn import_shapes(&mut self, path: &Path) -> KernelResult<Vec<Entity>> {
        let scene = Scene::from_path(path)?;
        self.load_scene(&scene)
    }

    fn entity_name(&self, entity: Entity) -> KernelResult<String> {
        let model = self.model()?;
        match entity.dim {
            Dim::Surface => Ok(model.surface(entity)?.name.clone()),
            _ if model.is_alive(entity) => Ok(String::new()),
            _ => Err(KernelOpError::EntityNotFound(entity)),
        }
    }

    fn entities(&self, dim: Option<Dim>) -> KernelResult<Vec<Entity>> {
        let model = self.model()?;
        let curves = model.curves.iter().map(|tag| Entity::curve(*tag));
        let surfaces = model.surfaces.keys().map(|tag| Entity::surface(*tag));
        Ok(match dim {
            Some(Dim::Point) => Vec::new(),
            Some(Dim::Curve) => curves.collect(),
            Some(Dim::Surface) => surfaces.collect(),
            None => curves.chain(surfaces).collect(),
        })
    }

    fn cut(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>> {
        let model = self.model_mut()?;
        let removed = model.cells_of(tools)?;
        let mut pieces = Vec::with_capacity(objects.len());
        for object in objects {
            let cells: BTreeSet<usize> = model
                .surface(*object)?
                .cells
                .difference(&removed)
                .copied()
                .collect();
            pieces.push(cells);
        }

        if options.remove_object {
            model.remove_operands(objects);
        }
        if options.remove_tool {
            model.remove_operands(tools);
        }

        let result: Vec<Entity> = pieces
            .into_iter()
            .filter(|cells| !cells.is_empty())
            .map(|cells| model.add_surface(String::new(), cells))
            .collect();
        debug!(objects = objects.len(), tools = tools.len(), result = result.len(), "cut");
        Ok(result)
    }

    fn intersect(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>> {
        let model = self.model_mut()?;
        let common: BTreeSet<usize> = model
            .cells_of(objects)?
            .intersection(&model.cells_of(tools)?)
            .copied()
            .collect();

        if options.remove_object {
            model.remove_operands(objects);
        }
        if options.remove_tool {
            model.remove_operands(tools);
        }

        if common.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![model.add_surface(String::new(), common)])
    }

    fn fragment(
        &mut self,
        objects: &[Entity],
        tools: &[Entity],
        options: BooleanOptions,
    ) -> KernelResult<Vec<Entity>> {
        let model = self.model_mut()?;
        let operands: Vec<Entity> = objects.iter().chain(tools.iter()).copied().collect();

        // Cells covered by exactly the same operands form one piece.
        let mut pieces: BTreeMap<Vec<usize>, BTreeSet<usize>> = BTreeMap::new();
        for cell in model.cells_of(&operands)? {
            let mut signature = Vec::new();
            for (index, operand) in operands.iter().enumerate() {
                if model.surface(*operand)?.cells.contains(&cell) {
                    signature.push(index);
                }
            }
            pieces.entry(signature).or_default().insert(cell);
        }

        if options.remove_object {
            model.remove_operands(objects);
        }
        if options.remove_tool {
            model.remove_operands(tools);
        }

        let mut ordered: Vec<BTreeSet<usize>> = pieces.into_values().collect();
        ordered.sort_by_key(|cells| cells.iter().next().copied());
        Ok(ordered
            .into_iter()
            .map(|cells| model.add_surface(String::new(), cells))
            .collect())
    }

    fn add_disk(&mut self, center: Point3, radius: f64) -> KernelResult<Entity> {
        let model = self.model_mut()?;
        let node = model.insert_primitive(Primitive::disk(Point2::new(center.x, center.y), radius))?;
        let cells = model.region(node);
        Ok(model.add_surface(String::new(), cells))
    }

    fn add_rectangle(&mut self, corner: Point3, dx: f64, dy: f64) -> KernelResult<Entity> {
        let model = self.model_mut()?;
        let min = Point2::new(corner.x, corner.y);
        let max = Point2::new(corner.x + dx, corner.y + dy);
        let node = model.insert_primitive(Primitive::rectangle(min, max))?;
        let cells = model.region(node);
        Ok(model.add_surface(String::new(), cells))
    }

    fn bounding_box(&self, entity: Entity) -> KernelResult<[f64; 6]> {
        let model = self.model()?;
        let e = match entity.dim {
            Dim::Surface => model.extent(&model.surface(entity)?.cells),
            Dim::Curve => model.arc(entity)?.extent,
            Dim::Point => return Err(KernelOpError::EntityNotFound(entity)),
        };
        Ok([e[0], e[1], 0.0, e[2], e[3], 0.0])
    }

    fn boundary(&self, entities: &[Entity], recursive: bool) -> KernelResult<Vec<Entity>> {
        if recursive {
            return Err(KernelOpError::NotImplemented(
                "planar kernel does not model points".into(),
            ));
        }
        let model = self.model()?;
        Ok(model.chain(&model.cells_of(entities)?))
    }

    fn mass(&self, entity: Entity) -> KernelResult<f64> {
        let model = self.model()?;
        match entity.dim {
            Dim::Surface => Ok(model.area(&model.surface(entity)?.cells)),
            Dim::Curve => Ok(model.arc(entity)?.length),
            Dim::Point => Ok(0.0),
        }
    }

    fn add_physical_group(&mut self, dim: Dim, tags: &[i32], name: &str) -> KernelResult<i32> {
        let model = self.model_mut()?;
        for tag in tags {
            let entity = Entity::new(dim, *tag);
            if !model.is_alive(entity) {
                return Err(KernelOpError::EntityNotFound(entity));
            }
        }
        let tag = model.next_group;
        model.next_group += 1;
        model.groups.push(PhysicalGroup {
            dim,
            tag,
            name: name.to_string(),
            entities: tags.to_vec(),
        });
        Ok(tag)
    }

    fn physical_groups(&self) -> KernelResult<Vec<PhysicalGroup>> {
        Ok(self.model()?.groups.clone())
    }

    fn remove_entities(&mut self, entities: &[Entity], recursive: bool) -> KernelResult<()> {
        let model = self.model_mut()?;
        let mut ordered = entities.to_vec();
        ordered.sort_by(|a, b| b.dim.cmp(&a.dim));

        for entity in ordered {
            match entity.dim {
                Dim::Surface => {
                    let surface = model
                        .surfaces
                        .remove(&entity.tag)
                        .ok_or(KernelOpError::EntityNotFound(entity))?;
                    if recursive {
                        let still_bounding = model.bounding_curves();
                        for curve in model.chain(&surface.cells) {
                            if !still_bounding.contains(&curve.tag.abs()) {
                                model.curves.remove(&curve.tag.abs());
                            }
                        }
                    }
                }
                Dim::Curve => {
                    // Curves bounding a surviving surface stay.
                    if model.bounding_curves().contains(&entity.tag.abs()) {
                        debug!(%entity, "curve still bounds a surface, kept");
                        continue;
                    }
                    model.curves.remove(&entity.tag.abs());
                }
                Dim::Point => {}
            }
        }
        Ok(())
    }

    fn set_mesh_size(&mut self, entities: &[Entity], size: f64) -> KernelResult<()> {
        let model = self.model_mut()?;
        for entity in entities {
            if !model.is_alive(*entity) {
                return Err(KernelOpError::EntityNotFound(*entity));
            }
            model.mesh_sizes.insert(entity.unsigned(), size);
        }
        Ok(())
    }

    fn set_option(&mut self, name: &str, value: f64) -> KernelResult<()> {
        self.model_mut()?.options.insert(name.to_string(), value);
        Ok(())
    }

    fn generate_mesh(&mut self, dim: Dim) -> KernelResult<()> {
        let model = self.model_mut()?;
        if dim == Dim::Point {
            return Err(KernelOpError::OperationFailed("cannot mesh dimension 0".into()));
        }
        for group in &model.groups {
            if let Some(dead) = group.members().find(|entity| !model.is_alive(*entity)) {
                return Err(KernelOpError::OperationFailed(format!(
                    "physical group '{}' references removed entity {}",
                    group.name, dead
                )));
            }
        }
        model.meshed = Some(dim);
        debug!(model = %model.name, %dim, "mesh request recorded");
        Ok(())
    }

    fn write(&self, path: &Path) -> KernelResult<()> {
        let model = self.model()?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let dump = ModelDump {
                    model: &model.name,
                    surfaces: model
                        .surfaces
                        .iter()
                        .map(|(tag, surface)| SurfaceDump {
                            tag: *tag,
                            name: &surface.name,
                            area: model.area(&surface.cells),
                            boundary: model.chain(&surface.cells).iter().map(|c| c.tag).collect(),
                        })
                        .collect(),
                    curves: model
                        .arcs
                        .iter()
                        .filter(|(tag, _)| model.curves.contains(*tag))
                        .map(|(tag, arc)| CurveDump {
                            tag: *tag,
                            length: arc.length,
                            mesh_size: model.mesh_sizes.get(&Entity::curve(*tag)).copied(),
                        })
                        .collect(),
                    physical_groups: &model.groups,
                    options: &model.options,
                    meshed: model.meshed,
                };
                let file = std::fs::File::create(path)?;
                serde_json::to_writer_pretty(file, &dump)?;
                Ok(())
            }
            other => Err(KernelOpError::NotImplemented(format!(
                "planar kernel cannot write '{}' files",
                other.unwrap_or("")
            ))),
        }
    }
}
