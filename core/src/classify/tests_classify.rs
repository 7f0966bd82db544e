use super::*;
use crate::kernel::{PlanarKernel, Scene};

fn load(scene: &Scene) -> (GeometrySession<PlanarKernel>, Vec<Entity>) {
    let mut session = GeometrySession::open(PlanarKernel::new(), "classify").unwrap();
    let entities = session.load_scene(scene).unwrap();
    (session, entities)
}

fn coax() -> Scene {
    Scene::new()
        .with_disk("Shapes/Conductor_0", 0.0, 0.0, 10.0)
        .with_disk("Shapes/Conductor_1", 0.0, 0.0, 2.0)
        .with_disk("Shapes/Dielectric_0", 0.0, 0.0, 5.0)
}

#[test]
fn test_closed_coax_splits_enclosure() {
    let (mut session, entities) = load(&coax());
    let classification = Classification::new(&mut session, &entities).unwrap();

    assert!(!classification.is_open());
    assert_eq!(classification.conductors.enclosure, Some(vec![entities[0]]));
    assert_eq!(classification.conductors.group.indices().collect::<Vec<_>>(), vec![1]);
    assert_eq!(classification.conductors.len(), 2);
    assert_eq!(classification.dielectrics.get(0), Some(&vec![entities[2]]));
    assert!(classification.open_boundary.is_empty());
}

#[test]
fn test_closed_non_vacuum_excludes_enclosure() {
    let (mut session, entities) = load(&coax());
    let classification = Classification::new(&mut session, &entities).unwrap();
    assert_eq!(classification.non_vacuum(), vec![entities[1], entities[2]]);
}

#[test]
fn test_separate_wires_are_open() {
    let scene = Scene::new()
        .with_disk("Shapes/Conductor_0", -5.0, 0.0, 1.0)
        .with_disk("Shapes/Conductor_1", 5.0, 0.0, 1.0);
    let (mut session, entities) = load(&scene);
    let classification = Classification::new(&mut session, &entities).unwrap();

    assert!(classification.is_open());
    assert!(classification.conductors.enclosure.is_none());
    assert_eq!(classification.conductors.material(), vec![entities[0], entities[1]]);
}

#[test]
fn test_open_probe_leaves_no_scratch_surfaces() {
    let scene = Scene::new()
        .with_disk("Shapes/Conductor_0", -5.0, 0.0, 1.0)
        .with_disk("Shapes/Conductor_1", 5.0, 0.0, 1.0)
        .with_disk("Shapes/Conductor_2", 0.0, 5.0, 1.0);
    let (mut session, entities) = load(&scene);
    let before = session.entities(None).unwrap();

    let conductors = classify(&session, &entities, Label::Conductor).unwrap();
    assert!(is_open_problem(&mut session, &conductors).unwrap());
    assert_eq!(session.entities(None).unwrap(), before);
}

#[test]
fn test_duplicate_index_keeps_last() {
    let scene = Scene::new()
        .with_disk("Shapes/Conductor_3", -5.0, 0.0, 1.0)
        .with_disk("Other/Conductor_3", 5.0, 0.0, 1.0);
    let (session, entities) = load(&scene);

    let group = classify(&session, &entities, Label::Conductor).unwrap();
    assert_eq!(group.len(), 1);
    assert_eq!(group.get(3), Some(&vec![entities[1]]));
}

#[test]
fn test_unlabeled_and_curve_entities_are_ignored() {
    let scene = Scene::new()
        .with_disk("Shapes/Air", 0.0, 0.0, 30.0)
        .with_disk("Shapes/Conductor_0", 0.0, 0.0, 1.0);
    let (session, entities) = load(&scene);

    let group = classify(&session, &entities, Label::Conductor).unwrap();
    assert_eq!(group.entities(), vec![entities[1]]);
    assert!(classify(&session, &entities, Label::Dielectric).unwrap().is_empty());
}

#[test]
fn test_hierarchical_names_use_last_label() {
    let scene = Scene::new()
        .with_disk("Shapes/solid_wire_002/Conductor_002/Conductor_002", 0.0, 0.0, 1.0);
    let (session, entities) = load(&scene);

    let group = classify(&session, &entities, Label::Conductor).unwrap();
    assert!(group.contains(2));
}

#[test]
fn test_malformed_index_is_rejected() {
    let scene = Scene::new().with_disk("Shapes/Conductor_x", 0.0, 0.0, 1.0);
    let (mut session, entities) = load(&scene);

    let err = Classification::new(&mut session, &entities).unwrap_err();
    assert!(matches!(err, DomainError::MalformedName { .. }));
}

#[test]
fn test_two_open_regions_rejected_before_any_mutation() {
    // The conductors overlap, so the topology probe would add a scratch surface.
    let scene = Scene::new()
        .with_disk("Shapes/Conductor_0", 0.0, 0.0, 10.0)
        .with_disk("Shapes/Conductor_1", 0.0, 0.0, 2.0)
        .with_disk("Shapes/OpenRegion_0", 0.0, 0.0, 40.0)
        .with_disk("Shapes/OpenRegion_1", 200.0, 0.0, 40.0);
    let (mut session, entities) = load(&scene);
    let before = session.entities(None).unwrap();

    let err = Classification::new(&mut session, &entities).unwrap_err();
    assert!(matches!(err, DomainError::MultipleOpenRegions(2)));
    assert_eq!(session.entities(None).unwrap(), before);
}

#[test]
fn test_closed_problem_without_enclosure_is_rejected() {
    let scene = Scene::new()
        .with_disk("Shapes/Conductor_1", 0.0, 0.0, 10.0)
        .with_disk("Shapes/Conductor_2", 0.0, 0.0, 2.0);
    let (mut session, entities) = load(&scene);

    let err = Classification::new(&mut session, &entities).unwrap_err();
    assert!(matches!(err, DomainError::MissingEnclosure));
}

#[test]
fn test_conductor_owners_put_enclosure_first() {
    let (mut session, entities) = load(&coax());
    let classification = Classification::new(&mut session, &entities).unwrap();

    let owners = classification.conductors.owners();
    assert_eq!(owners.indices().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(owners.get(0), Some(&vec![entities[0]]));
}

#[test]
fn test_open_region_aliases_with_same_index_are_rejected() {
    let scene = Scene::new()
        .with_disk("Shapes/Conductor_0", -5.0, 0.0, 1.0)
        .with_disk("Shapes/Conductor_1", 5.0, 0.0, 1.0)
        .with_disk("Shapes/OpenRegion_0", 0.0, 0.0, 20.0)
        .with_disk("Shapes/OpenBoundary_0", 0.0, 0.0, 30.0);
    let (mut session, entities) = load(&scene);

    assert_eq!(count_labelled(&session, &entities, Label::OpenBoundary).unwrap(), 2);
    let err = Classification::new(&mut session, &entities).unwrap_err();
    assert!(matches!(err, DomainError::MultipleOpenRegions(2)));
}

#[test]
fn test_repeated_open_region_name_is_rejected() {
    let scene = Scene::new()
        .with_disk("Shapes/Conductor_0", -5.0, 0.0, 1.0)
        .with_disk("Shapes/Conductor_1", 5.0, 0.0, 1.0)
        .with_disk("Shapes/OpenRegion_0", 0.0, 0.0, 20.0)
        .with_disk("Other/OpenRegion_0", 0.0, 0.0, 30.0);
    let (mut session, entities) = load(&scene);

    let err = Classification::new(&mut session, &entities).unwrap_err();
    assert!(matches!(err, DomainError::MultipleOpenRegions(2)));
}
