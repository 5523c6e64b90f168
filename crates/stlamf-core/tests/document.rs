use stlamf_core::document::{build, DocumentBuilder, Unit, DEFAULT_GENERATOR};
use stlamf_core::error::BuildError;
use stlamf_core::geom::Vec3;
use stlamf_core::mesh::{Mesh, MeshSource, Triangle};
use stlamf_core::profile::{Profile, ProfileAssignment, ProfileValue};

fn fan(index: usize, path: &str, triangles: usize) -> Mesh {
    let tris = (0..triangles)
        .map(|i| {
            let a = i as f64;
            Triangle::new(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(a + 1.0, 0.0, 0.0),
                Vec3::new(a + 1.0, 1.0, 0.0),
            )
        })
        .collect();
    Mesh::new(MeshSource::new(index, path), tris).expect("non-empty mesh")
}

fn profile(name: &str) -> Profile {
    Profile::new(name).with_setting("infill", ProfileValue::Integer(20))
}

#[test]
fn keeps_input_order_and_numbers_objects_from_zero() {
    let meshes = vec![fan(0, "zeta.stl", 3), fan(1, "alpha.stl", 5), fan(2, "mid.stl", 1)];
    let mut assignment = ProfileAssignment::new();
    for m in &meshes {
        assignment.push(m.source().clone(), None);
    }

    let document = build(meshes, &assignment, Unit::default()).expect("document");
    let names: Vec<&str> = document.objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(vec!["zeta", "alpha", "mid"], names);

    let ids: Vec<u32> = document.objects.iter().map(|o| o.id).collect();
    assert_eq!(vec![0, 1, 2], ids);

    let counts: Vec<usize> = document.objects.iter().map(|o| o.mesh.triangle_count()).collect();
    assert_eq!(vec![3, 5, 1], counts);

    assert!(document.materials.is_empty());
    assert!(document.objects.iter().all(|o| o.material_id.is_none()));
    assert_eq!(Unit::Millimeter, document.unit);
    assert_eq!(DEFAULT_GENERATOR, document.generator);
}

#[test]
fn registers_each_profile_name_once() {
    let meshes = vec![
        fan(0, "a.stl", 1),
        fan(1, "b.stl", 1),
        fan(2, "c.stl", 1),
        fan(3, "d.stl", 1),
    ];
    let mut assignment = ProfileAssignment::new();
    assignment.push(meshes[0].source().clone(), Some(profile("dense")));
    assignment.push(meshes[1].source().clone(), Some(profile("sparse")));
    assignment.push(meshes[2].source().clone(), Some(profile("dense")));
    assignment.push(meshes[3].source().clone(), None);

    let document = build(meshes, &assignment, Unit::Millimeter).expect("document");
    let names: Vec<&str> = document
        .materials
        .iter()
        .map(|m| m.profile.name.as_str())
        .collect();
    assert_eq!(vec!["dense", "sparse"], names);

    // Material ids continue after the object ids.
    let dense = document.materials[0].id;
    let sparse = document.materials[1].id;
    assert_eq!((4, 5), (dense, sparse));

    let refs: Vec<Option<u32>> = document.objects.iter().map(|o| o.material_id).collect();
    assert_eq!(vec![Some(dense), Some(sparse), Some(dense), None], refs);
    assert_eq!("sparse", document.material(sparse).expect("material").profile.name);
}

#[test]
fn same_file_listed_twice_keeps_both_profiles() {
    let meshes = vec![fan(0, "part.stl", 2), fan(1, "part.stl", 2)];
    let mut assignment = ProfileAssignment::new();
    assignment.push(MeshSource::new(0, "part.stl"), Some(profile("dense")));
    assignment.push(MeshSource::new(1, "part.stl"), Some(profile("sparse")));

    let document = build(meshes, &assignment, Unit::Millimeter).expect("document");
    assert_eq!(2, document.materials.len());
    assert_ne!(document.objects[0].material_id, document.objects[1].material_id);
}

#[test]
fn empty_input_is_rejected() {
    let err = build(Vec::new(), &ProfileAssignment::new(), Unit::Millimeter)
        .expect_err("no meshes");
    assert!(matches!(err, BuildError::EmptyInput));
}

#[test]
fn each_build_counts_ids_from_zero() {
    let builder = DocumentBuilder::new().generator("test-suite").constellation(true);
    let assignment = ProfileAssignment::new();

    let first = builder.build(vec![fan(0, "a.stl", 1)], &assignment).expect("first");
    let second = builder.build(vec![fan(0, "b.stl", 1)], &assignment).expect("second");

    assert_eq!(0, first.objects[0].id);
    assert_eq!(0, second.objects[0].id);
    assert_eq!(Some(1), second.constellation.as_ref().map(|c| c.id));
    assert_eq!("test-suite", second.generator);
}

#[test]
fn parses_amf_unit_names() {
    assert_eq!(Ok(Unit::Inch), "INCH".parse());
    assert_eq!(Ok(Unit::Micron), "micron".parse());
    assert_eq!(Ok(Unit::Millimeter), "mm".parse());
    assert!("furlong".parse::<Unit>().is_err());
    assert_eq!("feet", Unit::Feet.to_string());
}
