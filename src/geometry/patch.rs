// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Per-triangle retriangulation and inside/outside classification.
//!
//! Every triangle touched by at least one intersection segment is replaced
//! by a constrained triangulation of its own plane, with the segments as
//! constraint edges. Sub-faces bordering a segment are classified against
//! the cutting triangle's normal; the rest inherit a label through a
//! breadth-first fill over the local adjacency graph.

use super::intersection::PairIntersection;
use super::predicates::{normalize_or_zero, orient2d, triangle_normal};
use super::shape::CollisionShape;
use super::triangulate::triangulate_constrained;
use crate::config::CsgConfig;
use crate::error::CsgError;
use nalgebra::{Point2, Point3, Vector3};
use std::collections::VecDeque;

/// Classification of a patch face (or point) relative to the other mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Outside,
    Boundary,
    Inside,
    Unknown,
}

/// A vertex of one triangle's local retriangulation problem
#[derive(Debug, Clone)]
struct PatchPoint {
    flat: Point2<f64>,
    coord: Point3<f64>,
    bary: Vector3<f64>,
    id: usize,
    on_edge: [bool; 3],
    label: Label,
}

/// An edge of the local retriangulation. Intersection edges carry the
/// cutting triangle's normal and have no opposite vertex; face edges carry
/// the face's third vertex so a seed direction can be formed.
#[derive(Debug, Clone)]
struct LabeledEdge {
    points: [usize; 2],
    opposite: Option<usize>,
    label: Label,
    normal: Vector3<f64>,
    id: usize,
    tri: usize,
}

/// A vertex emitted by retriangulation: world position, barycentric
/// coordinate, and the source triangle's three global vertex ids for
/// attribute interpolation.
#[derive(Debug, Clone)]
pub struct PatchVertex {
    pub coord: Point3<f64>,
    pub bary: Vector3<f64>,
    pub source: [usize; 3],
}

/// Replacement geometry for the triangles of one object touched by
/// intersection segments. Face indices refer to `vertices`.
#[derive(Debug, Default)]
pub struct PatchOutput {
    pub removed_faces: Vec<usize>,
    pub vertices: Vec<PatchVertex>,
    pub faces: Vec<[usize; 3]>,
    pub labels: Vec<Label>,
}

/// Retriangulate every triangle of object `which` (0 or 1) that appears in
/// `intersections`. Sorts `intersections` by that object's triangle index to
/// group segments per triangle.
pub fn retriangulate_object(
    which: usize,
    intersections: &mut [PairIntersection],
    shapes: &[CollisionShape; 2],
    config: &CsgConfig,
) -> Result<PatchOutput, CsgError> {
    let mut output = PatchOutput::default();
    intersections.sort_by_key(|info| info.tris[which]);

    let len = intersections.len();
    let mut start = 0;
    for end in 1..=len {
        if end != len && intersections[end].tris[which] == intersections[start].tris[which] {
            continue;
        }
        retriangulate_group(which, &intersections[start..end], shapes, config, &mut output)?;
        start = end;
    }
    Ok(output)
}

/// Retriangulate one triangle from the segments that cut it.
fn retriangulate_group(
    which: usize,
    group: &[PairIntersection],
    shapes: &[CollisionShape; 2],
    config: &CsgConfig,
    output: &mut PatchOutput,
) -> Result<(), CsgError> {
    let tri_id = group[0].tris[which];
    output.removed_faces.push(tri_id);

    let source = shapes[which].faces[tri_id];
    let corner = shapes[which].triangle(tri_id);
    let norm = triangle_normal(&corner[0], &corner[1], &corner[2]);

    // Orthonormal basis in the triangle's plane
    let basis0 = normalize_or_zero(corner[1] - corner[0]);
    let basis1 = {
        let b = corner[2] - corner[0];
        normalize_or_zero(b - basis0 * basis0.dot(&b))
    };
    let flatten = |p: &Point3<f64>| Point2::new(basis0.dot(&p.coords), basis1.dot(&p.coords));

    let mut points: Vec<PatchPoint> = Vec::new();
    // Candidates for the boundary ring: the corners plus every segment
    // endpoint bounded by one of this triangle's own edges
    let mut boundary_points: Vec<usize> = Vec::new();
    let mut edges: Vec<[usize; 2]> = Vec::new();
    let mut labeled_edges: Vec<LabeledEdge> = Vec::new();

    for j in 0..3 {
        let mut bary = Vector3::zeros();
        bary[j] = 1.0;
        // Corner j sits on its two incident edges
        let mut on_edge = [false; 3];
        on_edge[j] = true;
        on_edge[(j + 2) % 3] = true;
        boundary_points.push(points.len());
        points.push(PatchPoint {
            flat: flatten(&corner[j]),
            coord: corner[j],
            bary,
            id: j,
            on_edge,
            label: Label::Unknown,
        });
    }
    let twice_area = orient2d(&points[0].flat, &points[1].flat, &points[2].flat);

    for info in group {
        let segment = &info.segment;
        for k in 0..2 {
            let flat = flatten(&segment.endpoints[k]);
            let bary = Vector3::new(
                orient2d(&points[1].flat, &points[2].flat, &flat) / twice_area,
                orient2d(&points[2].flat, &points[0].flat, &flat) / twice_area,
                orient2d(&points[0].flat, &points[1].flat, &flat) / twice_area,
            );
            let id = points.len();
            if segment.edge_refs[k].object == which {
                boundary_points.push(id);
            }
            points.push(PatchPoint {
                flat,
                coord: segment.endpoints[k],
                bary,
                id,
                on_edge: [false; 3],
                label: Label::Boundary,
            });
        }
        // The segment itself becomes a constraint edge, labeled with the
        // cutting triangle's normal
        let mut pair = [points.len() - 2, points.len() - 1];
        edges.push(pair);
        if pair[0] > pair[1] {
            pair.swap(0, 1);
        }
        labeled_edges.push(LabeledEdge {
            points: pair,
            opposite: None,
            label: Label::Boundary,
            normal: shapes[1 - which].triangle_normal(info.tris[1 - which]),
            id: labeled_edges.len(),
            tri: usize::MAX,
        });
    }

    // Order the boundary ring by angle around the triangle's centroid; the
    // ring doubles as the outer constraint loop
    let centroid = Point2::from(
        (points[0].flat.coords + points[1].flat.coords + points[2].flat.coords) / 3.0,
    );
    let mut ring: Vec<(f64, usize)> = boundary_points
        .iter()
        .map(|&j| {
            let offset = points[j].flat - centroid;
            (offset.y.atan2(offset.x), j)
        })
        .collect();
    ring.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    let ring_len = ring.len();
    for j in 0..ring_len {
        edges.push([ring[j].1, ring[(j + 1) % ring_len].1]);
    }

    // Walking the ring between consecutive corners assigns each boundary
    // point to its original edge
    let mut corner_pos = [0usize; 3];
    for (pos, &(_, idx)) in ring.iter().enumerate() {
        if idx < 3 {
            corner_pos[idx] = pos;
        }
    }
    for k in 0..3 {
        let stop = corner_pos[(k + 1) % 3];
        let mut j = corner_pos[k];
        loop {
            j = (j + 1) % ring_len;
            if j == stop {
                break;
            }
            points[ring[j].1].on_edge[k] = true;
        }
    }

    // Collapse points that project to the same 2-D location, keeping the
    // first of each sorted run
    points.sort_by(|a, b| {
        a.flat
            .x
            .total_cmp(&b.flat.x)
            .then(a.flat.y.total_cmp(&b.flat.y))
    });
    let mut remap = vec![0usize; points.len()];
    let mut kept: Vec<PatchPoint> = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        if i == 0
            || (points[i].flat - points[i - 1].flat).norm_squared()
                > config.patch_dedup_tolerance_sq
        {
            kept.push(points[i].clone());
        }
        remap[points[i].id] = kept.len() - 1;
    }
    for edge in &mut edges {
        edge[0] = remap[edge[0]];
        edge[1] = remap[edge[1]];
    }
    for le in &mut labeled_edges {
        le.points[0] = remap[le.points[0]];
        le.points[1] = remap[le.points[1]];
        if le.points[0] > le.points[1] {
            le.points.swap(0, 1);
        }
    }

    let flats: Vec<Point2<f64>> = kept.iter().map(|p| p.flat).collect();
    let mut faces = triangulate_constrained(&flats, &edges)?;

    let vert_start = output.vertices.len();
    for point in &kept {
        output.vertices.push(PatchVertex {
            coord: point.coord,
            bary: point.bary,
            source,
        });
    }

    // Drop slivers whose three vertices sit on the same original edge
    faces.retain(|f| {
        !(0..3).any(|k| kept[f[0]].on_edge[k] && kept[f[1]].on_edge[k] && kept[f[2]].on_edge[k])
    });

    // Restore the source triangle's orientation
    for f in &mut faces {
        let new_norm = triangle_normal(&kept[f[0]].coord, &kept[f[1]].coord, &kept[f[2]].coord);
        if new_norm.dot(&norm) < 0.0 {
            f.swap(1, 2);
        }
    }

    for (fi, f) in faces.iter().enumerate() {
        for j in 0..3 {
            let mut pair = [f[j], f[(j + 1) % 3]];
            if pair[0] > pair[1] {
                pair.swap(0, 1);
            }
            let id = labeled_edges.len();
            labeled_edges.push(LabeledEdge {
                points: pair,
                opposite: Some(f[(j + 2) % 3]),
                label: Label::Unknown,
                normal: Vector3::zeros(),
                id,
                tri: fi,
            });
        }
    }

    // Group edges by point pair: face edges coincident with a segment take
    // its label and normal; the rest pair their faces as neighbors
    let mut neighbor_pairs: Vec<(usize, usize)> = Vec::new();
    {
        let mut sorted = labeled_edges.clone();
        sorted.sort_by_key(|e| e.points);
        let mut start = 0;
        for end in 1..=sorted.len() {
            if end != sorted.len() && sorted[end].points == sorted[start].points {
                continue;
            }
            let run = &sorted[start..end];
            let mut cut_normal = None;
            for e in run {
                if e.label == Label::Boundary {
                    cut_normal = Some(e.normal);
                }
            }
            if let Some(normal) = cut_normal {
                for e in run {
                    if e.label != Label::Boundary && e.opposite.is_some() {
                        labeled_edges[e.id].label = Label::Boundary;
                        labeled_edges[e.id].normal = normal;
                    }
                }
            } else {
                for e1 in run {
                    if e1.opposite.is_none() {
                        continue;
                    }
                    for e2 in run {
                        if e1.id == e2.id || e2.opposite.is_none() {
                            continue;
                        }
                        neighbor_pairs.push((e1.tri, e2.tri));
                    }
                }
            }
            start = end;
        }
    }

    // Seed: a face bordering a segment is outside when its far vertex lies
    // along the cutting triangle's normal
    let mut labels = vec![Label::Unknown; faces.len()];
    for e in &labeled_edges {
        if e.label != Label::Boundary {
            continue;
        }
        let Some(opposite) = e.opposite else {
            continue;
        };
        let mid = Point3::from((kept[e.points[0]].coord.coords + kept[e.points[1]].coord.coords) * 0.5);
        let dir = kept[opposite].coord - mid;
        labels[e.tri] = if dir.dot(&e.normal) > 0.0 {
            Label::Outside
        } else {
            Label::Inside
        };
    }

    // Flood fill across non-segment edges
    neighbor_pairs.sort_unstable();
    let mut counts = vec![0usize; faces.len()];
    let mut first = vec![usize::MAX; faces.len()];
    for (i, &(tri, _)) in neighbor_pairs.iter().enumerate() {
        if first[tri] == usize::MAX {
            first[tri] = i;
        }
        counts[tri] += 1;
    }
    let mut queue: VecDeque<usize> = (0..labels.len())
        .filter(|&i| labels[i] != Label::Unknown)
        .collect();
    while let Some(tri) = queue.pop_front() {
        for i in 0..counts[tri] {
            let neighbor = neighbor_pairs[first[tri] + i].1;
            if labels[neighbor] == Label::Unknown {
                labels[neighbor] = labels[tri];
                queue.push_back(neighbor);
            }
        }
    }

    for f in &faces {
        output
            .faces
            .push([f[0] + vert_start, f[1] + vert_start, f[2] + vert_start]);
    }
    output.labels.extend(labels);
    Ok(())
}
