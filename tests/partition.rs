// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! End-to-end partitioning scenarios

use approx::assert_relative_eq;
use meshcleave::geometry::{check_shape_valid, weld_vertices, CollisionShape};
use meshcleave::{partition_meshes, CsgBucket, CsgConfig, CsgModel, Mesh, Primitive, Side};
use nalgebra::{Matrix4, Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

fn unit_cube() -> Mesh {
    Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh()
}

fn bucket_area(bucket: &CsgBucket) -> f64 {
    let mut area = 0.0;
    for face in bucket.indices.chunks_exact(3) {
        let a = bucket.positions[face[0]];
        let b = bucket.positions[face[1]];
        let c = bucket.positions[face[2]];
        area += (b - a).cross(&(c - a)).norm() / 2.0;
    }
    area
}

/// Concatenate buckets into one soup of positions and faces.
fn merged_shell(buckets: &[&CsgBucket]) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut positions = Vec::new();
    let mut faces = Vec::new();
    for bucket in buckets {
        let base = positions.len();
        positions.extend_from_slice(&bucket.positions);
        for face in bucket.indices.chunks_exact(3) {
            faces.push([face[0] + base, face[1] + base, face[2] + base]);
        }
    }
    (positions, faces)
}

/// A merged shell must be a closed 2-manifold: every edge twinned, and
/// V - E + F = 2 for a genus-0 surface.
fn assert_closed_shell(positions: &[Point3<f64>], faces: &[[usize; 3]]) {
    assert!(
        check_shape_valid(positions, faces),
        "shell has unmatched or over-shared edges"
    );

    let mut welded = faces.to_vec();
    weld_vertices(positions, &mut welded, true);

    let mut verts = HashSet::new();
    let mut edge_counts: HashMap<(usize, usize), usize> = HashMap::new();
    for face in &welded {
        for j in 0..3 {
            let (a, b) = (face[j], face[(j + 1) % 3]);
            verts.insert(a);
            *edge_counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }
    assert!(edge_counts.values().all(|&count| count == 2));

    let euler = verts.len() as i64 - edge_counts.len() as i64 + welded.len() as i64;
    assert_eq!(euler, 2, "expected a genus-0 shell");
}

#[test]
fn overlapping_cubes_fill_all_buckets() {
    let a = unit_cube();
    let b = unit_cube();
    let offset = Matrix4::new_translation(&Vector3::new(0.5, 0.3, 0.35));

    let partition =
        partition_meshes(&a, &Matrix4::identity(), &b, &offset, &CsgConfig::default()).unwrap();

    for object in 0..2 {
        assert!(!partition.bucket(object, Side::Inside).is_empty());
        assert!(!partition.bucket(object, Side::Outside).is_empty());
    }
}

#[test]
fn overlapping_cubes_conserve_surface_area() {
    let a = unit_cube();
    let b = unit_cube();
    let offset = Matrix4::new_translation(&Vector3::new(0.5, 0.3, 0.35));

    let partition =
        partition_meshes(&a, &Matrix4::identity(), &b, &offset, &CsgConfig::default()).unwrap();

    // Every original triangle ends up in exactly one bucket, whole or as a
    // retriangulated patch, so each cube's surface area is preserved
    for object in 0..2 {
        let total = bucket_area(partition.bucket(object, Side::Inside))
            + bucket_area(partition.bucket(object, Side::Outside));
        assert_relative_eq!(total, 6.0, epsilon = 1e-6);
    }

    // The overlap region is the box [0.5,1]x[0.3,1]x[0.35,1]; each cube
    // contributes three of its faces, clipped to the box
    let expected_inside = 0.7 * 0.65 + 0.5 * 0.65 + 0.5 * 0.7;
    for object in 0..2 {
        assert_relative_eq!(
            bucket_area(partition.bucket(object, Side::Inside)),
            expected_inside,
            epsilon = 1e-6
        );
    }
}

#[test]
fn overlapping_cubes_form_closed_shells() {
    let a = unit_cube();
    let b = unit_cube();
    let offset = Matrix4::new_translation(&Vector3::new(0.5, 0.3, 0.35));

    let partition =
        partition_meshes(&a, &Matrix4::identity(), &b, &offset, &CsgConfig::default()).unwrap();

    // Intersection solid: both inside surfaces
    let (positions, faces) = merged_shell(&[
        partition.bucket(0, Side::Inside),
        partition.bucket(1, Side::Inside),
    ]);
    assert_closed_shell(&positions, &faces);

    // Union solid: both outside surfaces
    let (positions, faces) = merged_shell(&[
        partition.bucket(0, Side::Outside),
        partition.bucket(1, Side::Outside),
    ]);
    assert_closed_shell(&positions, &faces);
}

#[test]
fn disjoint_cubes_partition_trivially() {
    let a = unit_cube();
    let b = unit_cube();
    let offset = Matrix4::new_translation(&Vector3::new(3.0, 0.0, 0.0));

    let partition =
        partition_meshes(&a, &Matrix4::identity(), &b, &offset, &CsgConfig::default()).unwrap();

    for object in 0..2 {
        assert!(partition.bucket(object, Side::Inside).is_empty());
        let outside = partition.bucket(object, Side::Outside);
        assert_eq!(outside.face_count(), 12);
        assert_relative_eq!(bucket_area(outside), 6.0, epsilon = 1e-12);
    }
}

#[test]
fn jittered_disjoint_cubes_partition_trivially() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..8 {
        let a = unit_cube();
        let b = unit_cube();
        // Anywhere at least two units away on x, jittered on y/z
        let offset = Matrix4::new_translation(&Vector3::new(
            rng.gen_range(2.0..10.0),
            rng.gen_range(-0.9..0.9),
            rng.gen_range(-0.9..0.9),
        ));

        let partition =
            partition_meshes(&a, &Matrix4::identity(), &b, &offset, &CsgConfig::default())
                .unwrap();
        for object in 0..2 {
            assert!(partition.bucket(object, Side::Inside).is_empty());
            assert_eq!(partition.bucket(object, Side::Outside).face_count(), 12);
        }
    }
}

#[test]
fn non_manifold_mesh_is_rejected() {
    let a = unit_cube();
    let mut b = unit_cube();
    // Graft a dangling fin onto one edge: that edge now has three incident
    // triangles
    let fin_tip = b.add_vertex(meshcleave::Vertex::new(
        Point3::new(2.0, 2.0, 2.0),
        Vector3::z(),
    ));
    let edge = [b.triangles[0].indices[0], b.triangles[0].indices[1]];
    b.add_triangle(meshcleave::Triangle::new([edge[0], edge[1], fin_tip]));

    let result = partition_meshes(
        &a,
        &Matrix4::identity(),
        &b,
        &Matrix4::identity(),
        &CsgConfig::default(),
    );
    assert!(result.is_err());
}

#[test]
fn difference_model_is_closed_and_textured() -> anyhow::Result<()> {
    let a = unit_cube();
    let b = unit_cube();
    let offset = Matrix4::new_translation(&Vector3::new(0.5, 0.3, 0.35));

    // Pose the meshes before interpolation so model positions line up with
    // bucket positions
    let mut posed_b = b.clone();
    posed_b.transform(&offset);

    let partition = partition_meshes(&a, &Matrix4::identity(), &b, &offset, &CsgConfig::default())?;

    // A minus B: A's outside surface plus B's inside surface, flipped so it
    // faces out of the cavity
    let mut model = CsgModel::new();
    model.add_bucket(partition.bucket(0, Side::Outside), &a, false);
    model.add_bucket(partition.bucket(1, Side::Inside), &posed_b, true);

    for uv in model.tex_coords.iter().chain(&model.tex_coords2) {
        assert!(uv.x.is_finite() && uv.y.is_finite());
        assert!((-1e-6..=1.0 + 1e-6).contains(&uv.x));
        assert!((-1e-6..=1.0 + 1e-6).contains(&uv.y));
    }

    let mesh = model.into_mesh();
    assert!(mesh.triangle_count() > 12);
    for vertex in &mesh.vertices {
        assert_relative_eq!(vertex.normal.norm(), 1.0, epsilon = 1e-9);
    }

    // The difference solid is itself a closed genus-0 shell
    let shape = CollisionShape::from_mesh(&mesh, &Matrix4::identity());
    assert!(check_shape_valid(&shape.positions, &shape.faces));
    Ok(())
}
