// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Vertex welding, triangle adjacency and manifold validation

use nalgebra::Point3;

/// Merge vertices with bit-identical coordinates by rewriting `faces` to
/// reference the first vertex of each coordinate run. The position array is
/// left untouched; orphaned duplicates simply become unreferenced.
///
/// With `remove_degenerate`, faces referencing a merged vertex more than
/// once are swap-removed from the end.
pub fn weld_vertices(
    positions: &[Point3<f64>],
    faces: &mut Vec<[usize; 3]>,
    remove_degenerate: bool,
) {
    let mut order: Vec<usize> = (0..positions.len()).collect();
    order.sort_by(|&a, &b| {
        positions[a]
            .x
            .total_cmp(&positions[b].x)
            .then(positions[a].y.total_cmp(&positions[b].y))
            .then(positions[a].z.total_cmp(&positions[b].z))
    });

    let mut merge_target = vec![0usize; positions.len()];
    for (rank, &vert) in order.iter().enumerate() {
        if rank > 0 && positions[order[rank - 1]] == positions[vert] {
            merge_target[vert] = merge_target[order[rank - 1]];
        } else {
            merge_target[vert] = vert;
        }
    }

    for face in faces.iter_mut() {
        for index in face.iter_mut() {
            *index = merge_target[*index];
        }
    }

    if remove_degenerate {
        for i in (0..faces.len()).rev() {
            let face = faces[i];
            if face[0] == face[1] || face[1] == face[2] || face[2] == face[0] {
                faces.swap_remove(i);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DirectedEdge {
    points: [usize; 2],
    tri: usize,
}

fn unordered(points: [usize; 2]) -> [usize; 2] {
    if points[0] > points[1] {
        [points[1], points[0]]
    } else {
        points
    }
}

/// Triangle adjacency built from shared edges, stored as a sorted pair list
/// with per-triangle count and first-index (CSR layout).
///
/// Each undirected edge shared by exactly two oppositely-wound triangles
/// yields one neighbor relation in each direction. Edges without such a twin
/// are collected in `unmatched`; they make the mesh non-manifold but are not
/// fatal here.
#[derive(Debug, Clone)]
pub struct TriangleNeighbors {
    pairs: Vec<(usize, usize)>,
    counts: Vec<usize>,
    first: Vec<usize>,
    pub unmatched: Vec<[usize; 2]>,
}

impl TriangleNeighbors {
    pub fn build(faces: &[[usize; 3]]) -> Self {
        let mut edges = Vec::with_capacity(faces.len() * 3);
        for (tri, face) in faces.iter().enumerate() {
            for j in 0..3 {
                edges.push(DirectedEdge {
                    points: [face[j], face[(j + 1) % 3]],
                    tri,
                });
            }
        }
        edges.sort_by_key(|e| unordered(e.points));

        // Twin candidates are adjacent after the sort; a twin must run in
        // the opposite direction, and the pairing must be exclusive
        let mut twin = vec![usize::MAX; edges.len()];
        for i in 1..edges.len() {
            if edges[i].points[0] == edges[i - 1].points[1]
                && edges[i].points[1] == edges[i - 1].points[0]
            {
                twin[i] = i - 1;
                twin[i - 1] = i;
            }
        }

        let mut pairs = Vec::new();
        let mut unmatched = Vec::new();
        for (i, edge) in edges.iter().enumerate() {
            if twin[i] != usize::MAX && twin[twin[i]] == i {
                pairs.push((edge.tri, edges[twin[i]].tri));
            } else {
                unmatched.push(edge.points);
            }
        }
        if !unmatched.is_empty() {
            log::debug!("{} edges without a twin triangle", unmatched.len());
        }

        pairs.sort_unstable();
        let mut counts = vec![0usize; faces.len()];
        let mut first = vec![usize::MAX; faces.len()];
        for (i, &(tri, _)) in pairs.iter().enumerate() {
            if first[tri] == usize::MAX {
                first[tri] = i;
            }
            counts[tri] += 1;
        }

        Self {
            pairs,
            counts,
            first,
            unmatched,
        }
    }

    pub fn count(&self, tri: usize) -> usize {
        self.counts[tri]
    }

    /// The triangles sharing an edge with `tri`.
    pub fn neighbors(&self, tri: usize) -> impl Iterator<Item = usize> + '_ {
        let first = self.first[tri];
        let count = self.counts[tri];
        (0..count).map(move |i| self.pairs[first + i].1)
    }
}

/// Number of triangles that do not have exactly three neighbors after exact
/// welding and degenerate-face removal. Zero for a closed 2-manifold.
pub fn manifold_defects(positions: &[Point3<f64>], faces: &[[usize; 3]]) -> usize {
    let mut merged = faces.to_vec();
    weld_vertices(positions, &mut merged, true);
    let neighbors = TriangleNeighbors::build(&merged);
    (0..merged.len())
        .filter(|&tri| neighbors.count(tri) != 3)
        .count()
}

/// True when the mesh is a closed, locally-manifold triangle mesh: after
/// welding, every triangle has exactly three neighbors.
pub fn check_shape_valid(positions: &[Point3<f64>], faces: &[[usize; 3]]) -> bool {
    manifold_defects(positions, faces) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CollisionShape, Primitive};
    use nalgebra::{Matrix4, Vector3};

    fn tetrahedron() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        // Outward winding
        let faces = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
        (positions, faces)
    }

    #[test]
    fn test_weld_merges_identical_coordinates() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0), // duplicate of vertex 1
        ];
        let mut faces = vec![[0, 1, 2], [0, 2, 3]];
        weld_vertices(&positions, &mut faces, false);
        assert_eq!(faces[1][2], 1);
    }

    #[test]
    fn test_weld_removes_degenerate_faces() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0), // duplicate of vertex 1
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut faces = vec![[0, 1, 2], [0, 1, 3]];
        weld_vertices(&positions, &mut faces, true);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0], [0, 1, 3]);
    }

    #[test]
    fn test_tetrahedron_neighbors() {
        let (_, faces) = tetrahedron();
        let neighbors = TriangleNeighbors::build(&faces);
        assert!(neighbors.unmatched.is_empty());
        for tri in 0..faces.len() {
            assert_eq!(neighbors.count(tri), 3);
            assert!(neighbors.neighbors(tri).all(|n| n != tri));
        }
    }

    #[test]
    fn test_tetrahedron_is_valid() {
        let (positions, faces) = tetrahedron();
        assert!(check_shape_valid(&positions, &faces));
    }

    #[test]
    fn test_cube_is_valid() {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let shape = CollisionShape::from_mesh(&mesh, &Matrix4::identity());
        assert!(check_shape_valid(&shape.positions, &shape.faces));
    }

    #[test]
    fn test_sphere_is_valid() {
        let mesh = Primitive::sphere(1.0, 12).to_mesh();
        let shape = CollisionShape::from_mesh(&mesh, &Matrix4::identity());
        assert!(check_shape_valid(&shape.positions, &shape.faces));
    }

    #[test]
    fn test_extra_face_breaks_validity() {
        let (mut positions, mut faces) = tetrahedron();
        positions.push(Point3::new(1.0, 1.0, 1.0));
        // A fifth face reusing an interior edge gives that edge three
        // incident triangles
        faces.push([0, 1, 4]);
        assert!(!check_shape_valid(&positions, &faces));
    }
}
