use stlamf_core::error::ParseError;
use stlamf_core::geom::Vec3;
use stlamf_core::mesh::{Mesh, MeshSource, Triangle};

#[test]
fn mesh_requires_a_triangle() {
    let err = Mesh::new(MeshSource::new(0, "empty.stl"), Vec::new()).expect_err("empty mesh");
    assert!(matches!(err, ParseError::EmptyMesh));
}

#[test]
fn normal_follows_right_hand_rule_unless_stored() {
    let a = Vec3::new(0.0, 0.0, 0.0);
    let b = Vec3::new(2.0, 0.0, 0.0);
    let c = Vec3::new(0.0, 2.0, 0.0);

    assert_eq!(Vec3::new(0.0, 0.0, 1.0), Triangle::new(a, b, c).normal());
    assert_eq!(Vec3::new(0.0, 0.0, -1.0), Triangle::new(a, c, b).normal());

    let stored = Triangle::with_normal(a, b, c, Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(Some(Vec3::new(0.0, 0.0, -1.0)), stored.normal);

    let zeroed = Triangle::with_normal(a, b, c, Vec3::zero());
    assert_eq!(None, zeroed.normal);
    assert_eq!(Vec3::new(0.0, 0.0, 1.0), zeroed.normal());
}

#[test]
fn bounds_and_names_come_from_the_source() {
    let mesh = Mesh::new(
        MeshSource::new(3, "parts/bracket.v2.stl"),
        vec![Triangle::new(
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(4.0, 1.0, 2.0),
            Vec3::new(0.0, 5.0, 3.0),
        )],
    )
    .expect("mesh");
    let size = mesh.bounds().size();
    assert_eq!(Vec3::new(5.0, 5.0, 1.0), size);
    assert_eq!("bracket.v2", mesh.source().display_name());
    assert_eq!("object7", MeshSource::new(7, "").display_name());
}
