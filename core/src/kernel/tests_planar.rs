// Behaviour of the planar reference kernel: cell splitting, set-based
// booleans, signed boundaries and gmsh-style entity removal.
//
// Surface areas come from polygons and are compared with a relative
// tolerance; curve lengths are exact.

use super::*;
use crate::geometry::{ApproxEq, Point3};
use std::f64::consts::PI;

fn session() -> GeometrySession<PlanarKernel> {
    GeometrySession::open(PlanarKernel::new(), "planar").expect("session")
}

fn at(x: f64, y: f64) -> Point3 {
    Point3::new(x, y, 0.0)
}

fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
    (actual - expected).abs() <= tolerance * expected.abs().max(1.0)
}

fn area(session: &GeometrySession<PlanarKernel>, entity: Entity) -> f64 {
    session.mass(entity).unwrap()
}

#[test]
fn test_nested_disk_splits_outer_cell() {
    let mut session = session();
    let outer = session.add_disk(at(0.0, 0.0), 10.0).unwrap();
    let inner = session.add_disk(at(0.0, 0.0), 4.0).unwrap();

    // Outer still covers the whole disk: inner outline cancels out.
    assert_eq!(session.boundary(&[outer], false).unwrap(), vec![Entity::curve(1)]);
    assert!(close(area(&session, outer), 100.0 * PI, 1e-6));
    assert!(close(area(&session, inner), 16.0 * PI, 1e-6));
}

#[test]
fn test_cut_leaves_reversed_hole_outline() {
    let mut session = session();
    let outer = session.add_disk(at(0.0, 0.0), 10.0).unwrap();
    let inner = session.add_disk(at(0.0, 0.0), 4.0).unwrap();

    let ring = session.cut(&[outer], &[inner], BooleanOptions::keep_all()).unwrap();
    assert_eq!(ring.len(), 1);
    assert_eq!(
        session.boundary(&ring, false).unwrap(),
        vec![Entity::curve(1), Entity::curve(-2)]
    );
    assert!(close(area(&session, ring[0]), 84.0 * PI, 1e-6));
    // Operands survive with keep_all.
    assert_eq!(session.entities(Some(Dim::Surface)).unwrap().len(), 3);
}

#[test]
fn test_cut_removes_object_when_asked() {
    let mut session = session();
    let outer = session.add_disk(at(0.0, 0.0), 10.0).unwrap();
    let inner = session.add_disk(at(0.0, 0.0), 4.0).unwrap();

    let ring = session.cut(&[outer], &[inner], BooleanOptions::replace_object()).unwrap();
    let surfaces = session.entities(Some(Dim::Surface)).unwrap();
    assert_eq!(surfaces, vec![inner, ring[0]]);
}

#[test]
fn test_cut_to_nothing_returns_no_entity() {
    let mut session = session();
    let small = session.add_disk(at(0.0, 0.0), 1.0).unwrap();
    let large = session.add_disk(at(0.0, 0.0), 5.0).unwrap();

    let result = session.cut(&[small], &[large], BooleanOptions::keep_all()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_intersect_detects_overlap() {
    let mut session = session();
    let outer = session.add_disk(at(0.0, 0.0), 10.0).unwrap();
    let inner = session.add_disk(at(2.0, 0.0), 4.0).unwrap();
    let apart = session.add_disk(at(30.0, 0.0), 2.0).unwrap();

    let common = session.intersect(&[outer], &[inner], BooleanOptions::keep_all()).unwrap();
    assert_eq!(common.len(), 1);
    assert!(close(area(&session, common[0]), 16.0 * PI, 1e-6));

    let none = session.intersect(&[inner], &[apart], BooleanOptions::keep_all()).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_fragment_splits_into_disjoint_pieces() {
    let mut session = session();
    let outer = session.add_disk(at(0.0, 0.0), 10.0).unwrap();
    let inner = session.add_disk(at(0.0, 0.0), 4.0).unwrap();

    let pieces = session.fragment(&[outer], &[inner], BooleanOptions::default()).unwrap();
    assert_eq!(pieces.len(), 2);
    assert!(close(area(&session, pieces[0]), 84.0 * PI, 1e-6));
    assert!(close(area(&session, pieces[1]), 16.0 * PI, 1e-6));
    assert_eq!(session.entities(Some(Dim::Surface)).unwrap(), pieces);
}

#[test]
fn test_identical_outlines_share_one_curve() {
    let mut session = session();
    let a = session.add_disk(at(1.0, 1.0), 3.0).unwrap();
    let b = session.add_disk(at(1.0, 1.0), 3.0).unwrap();

    assert_ne!(a, b);
    assert_eq!(
        session.boundary(&[a], false).unwrap(),
        session.boundary(&[b], false).unwrap()
    );
    assert_eq!(session.entities(Some(Dim::Curve)).unwrap().len(), 1);
}

#[test]
fn test_crossing_outlines_split_each_other() {
    let mut session = session();
    let rect = session.add_rectangle(at(0.0, 0.0), 10.0, 10.0).unwrap();
    let disk = session.add_disk(at(10.0, 5.0), 2.0).unwrap();

    // Rectangle: outside and inside the disk. Disk: inside and outside the rectangle.
    assert_eq!(session.entities(Some(Dim::Curve)).unwrap().len(), 4);
    assert_eq!(session.boundary(&[rect], false).unwrap(), vec![Entity::curve(1), Entity::curve(2)]);
    assert!(close(session.mass(Entity::curve(2)).unwrap(), 4.0, 0.05));

    let half = session.intersect(&[rect], &[disk], BooleanOptions::keep_all()).unwrap();
    assert_eq!(half.len(), 1);
    assert_eq!(session.boundary(&half, false).unwrap(), vec![Entity::curve(2), Entity::curve(4)]);
    assert!(close(area(&session, half[0]), 2.0 * PI, 1e-3));

    let notched = session.cut(&[rect], &[disk], BooleanOptions::keep_all()).unwrap();
    assert_eq!(
        session.boundary(&notched, false).unwrap(),
        vec![Entity::curve(1), Entity::curve(-4)]
    );
    assert!(close(area(&session, notched[0]) + area(&session, half[0]), 100.0, 1e-6));
}

#[test]
fn test_fragment_of_crossing_disks() {
    let mut session = session();
    let left = session.add_disk(at(-3.0, 0.0), 5.0).unwrap();
    let right = session.add_disk(at(3.0, 0.0), 5.0).unwrap();

    let pieces = session.fragment(&[left], &[right], BooleanOptions::default()).unwrap();
    assert_eq!(pieces.len(), 3);
    let total: f64 = pieces.iter().map(|piece| area(&session, *piece)).sum();
    let lens = 50.0 * 0.6f64.acos() - 24.0;
    assert!(close(total, 50.0 * PI - lens, 1e-3));

    let common = session.intersect(&[pieces[0]], &pieces[1..], BooleanOptions::keep_all()).unwrap();
    assert!(common.is_empty());
}

#[test]
fn test_bounding_box_of_rectangle_and_curve() {
    let mut session = session();
    let rect = session.add_rectangle(at(-2.0, 1.0), 4.0, 3.0).unwrap();
    assert_eq!(session.bounding_box(rect).unwrap(), [-2.0, 1.0, 0.0, 2.0, 4.0, 0.0]);

    let outline = session.boundary(&[rect], false).unwrap()[0];
    assert_eq!(session.bounding_box(outline).unwrap(), [-2.0, 1.0, 0.0, 2.0, 4.0, 0.0]);
    assert!(session.mass(outline).unwrap().approx_eq(&14.0));
}

#[test]
fn test_non_recursive_removal_keeps_bounding_curves() {
    let mut session = session();
    let outer = session.add_disk(at(0.0, 0.0), 10.0).unwrap();
    let inner = session.add_disk(at(0.0, 0.0), 4.0).unwrap();
    let ring = session.cut(&[outer], &[inner], BooleanOptions::keep_all()).unwrap()[0];

    session.remove_entities(&[outer, inner, Entity::curve(2)], false).unwrap();
    assert_eq!(session.entities(Some(Dim::Surface)).unwrap(), vec![ring]);
    assert_eq!(
        session.entities(Some(Dim::Curve)).unwrap(),
        vec![Entity::curve(1), Entity::curve(2)]
    );

    session.remove_entities(&[ring, Entity::curve(2)], false).unwrap();
    assert!(session.entities(Some(Dim::Surface)).unwrap().is_empty());
    assert_eq!(session.entities(Some(Dim::Curve)).unwrap(), vec![Entity::curve(1)]);
}

#[test]
fn test_recursive_removal_drops_orphaned_curves() {
    let mut session = session();
    let disk = session.add_disk(at(0.0, 0.0), 1.0).unwrap();
    session.remove_entities(&[disk], true).unwrap();
    assert!(session.entities(None).unwrap().is_empty());
}

#[test]
fn test_physical_group_requires_live_entities() {
    let mut session = session();
    let disk = session.add_disk(at(0.0, 0.0), 1.0).unwrap();

    let tag = session.add_physical_group(Dim::Surface, &[disk.tag], "Vacuum_0").unwrap();
    let groups = session.physical_groups().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].tag, tag);
    assert_eq!(groups[0].name, "Vacuum_0");

    let missing = session.add_physical_group(Dim::Surface, &[99], "Dielectric_1");
    assert!(matches!(missing, Err(KernelOpError::EntityNotFound(_))));
}

#[test]
fn test_generate_mesh_rejects_dangling_groups() {
    let mut session = session();
    let disk = session.add_disk(at(0.0, 0.0), 1.0).unwrap();
    session.add_physical_group(Dim::Surface, &[disk.tag], "Vacuum_0").unwrap();
    session.generate_mesh(Dim::Surface).unwrap();
    assert_eq!(session.meshed_dim(), Some(Dim::Surface));

    session.remove_entities(&[disk], false).unwrap();
    assert!(session.generate_mesh(Dim::Surface).is_err());
}

#[test]
fn test_session_drop_finalizes_kernel() {
    let mut kernel = PlanarKernel::new();
    {
        let mut session = GeometrySession::open(&mut kernel, "scoped").unwrap();
        session.add_disk(at(0.0, 0.0), 1.0).unwrap();
        assert_eq!(session.model(), "scoped");
    }
    assert!(!kernel.is_initialized());
}

#[test]
fn test_session_drop_finalizes_kernel_on_error() {
    fn failing_run(kernel: &mut PlanarKernel) -> KernelResult<()> {
        let mut session = GeometrySession::open(kernel, "failing")?;
        session.add_disk(at(0.0, 0.0), 5.0)?;
        session.add_disk(at(4.0, 0.0), -1.0)?;
        Ok(())
    }

    let mut kernel = PlanarKernel::new();
    assert!(failing_run(&mut kernel).is_err());
    assert!(!kernel.is_initialized());
}

#[test]
fn test_each_session_starts_empty() {
    let mut kernel = PlanarKernel::new();
    {
        let mut session = GeometrySession::open(&mut kernel, "first").unwrap();
        session.add_disk(at(0.0, 0.0), 1.0).unwrap();
    }
    let session = GeometrySession::open(&mut kernel, "second").unwrap();
    assert!(session.entities(None).unwrap().is_empty());
}

#[test]
fn test_calls_without_model_fail() {
    let kernel = PlanarKernel::new();
    assert!(matches!(kernel.entities(None), Err(KernelOpError::NotInitialized)));
}

#[test]
fn test_import_scene_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coax.json");
    let scene = Scene::new()
        .with_disk("Shapes/Conductor_0", 0.0, 0.0, 10.0)
        .with_disk("Shapes/Conductor_1", 0.0, 0.0, 2.0);
    std::fs::write(&path, serde_json::to_string(&scene).unwrap()).unwrap();

    let mut session = session();
    let imported = session.import_shapes(&path).unwrap();
    let surfaces: Vec<Entity> = imported.iter().filter(|e| e.dim == Dim::Surface).copied().collect();
    assert_eq!(surfaces.len(), 2);
    assert_eq!(imported.len(), 4);
    assert_eq!(session.entity_name(surfaces[1]).unwrap(), "Shapes/Conductor_1");
}

#[test]
fn test_scene_hole_must_lie_inside_outline() {
    let mut session = session();
    let scene = Scene::new().with_shape(
        SceneShape::new("Conductor_0", Primitive::disk(crate::geometry::Point2::new(0.0, 0.0), 2.0))
            .with_hole(Primitive::disk(crate::geometry::Point2::new(5.0, 0.0), 1.0)),
    );
    assert!(matches!(
        session.load_scene(&scene),
        Err(KernelOpError::InvalidGeometry(_))
    ));
}

#[test]
fn test_write_json_dump_and_reject_mesh_formats() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session();
    let disk = session.add_disk(at(0.0, 0.0), 1.0).unwrap();
    session.set_option("Mesh.ElementOrder", 3.0).unwrap();
    session.add_physical_group(Dim::Surface, &[disk.tag], "Vacuum_0").unwrap();

    let dump_path = dir.path().join("model.json");
    session.write(&dump_path).unwrap();
    let dump: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&dump_path).unwrap()).unwrap();
    assert_eq!(dump["surfaces"].as_array().unwrap().len(), 1);
    assert_eq!(dump["physical_groups"][0]["name"], "Vacuum_0");
    assert_eq!(dump["options"]["Mesh.ElementOrder"], 3.0);

    let msh = session.write(&dir.path().join("model.msh"));
    assert!(matches!(msh, Err(KernelOpError::NotImplemented(_))));
}
