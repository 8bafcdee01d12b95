// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Bounding volume hierarchy for broad-phase candidate-pair generation

use super::BoundingBox;

const MAX_DEPTH: usize = 32;
const MIN_ITEMS: usize = 4;

/// A node of the flat BVH arena. Leaf nodes reference a contiguous run of
/// `Bvh::items`; internal nodes reference two child node indices.
#[derive(Debug, Clone)]
struct BvhNode {
    bbox: BoundingBox,
    // Children for internal nodes, item run for leaves
    left: usize,
    right: usize,
    first: usize,
    count: usize,
}

impl BvhNode {
    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Bounding volume hierarchy over triangle AABBs, stored as an index arena.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    items: Vec<usize>,
}

impl Bvh {
    /// Build from (triangle index, bbox) pairs.
    pub fn build(mut triangles: Vec<(usize, BoundingBox)>) -> Self {
        let mut bvh = Bvh {
            nodes: Vec::new(),
            items: Vec::new(),
        };
        if triangles.is_empty() {
            bvh.nodes.push(BvhNode {
                bbox: BoundingBox::empty(),
                left: 0,
                right: 0,
                first: 0,
                count: 0,
            });
            return bvh;
        }
        bvh.build_recursive(&mut triangles, 0);
        bvh
    }

    fn build_recursive(&mut self, triangles: &mut [(usize, BoundingBox)], depth: usize) -> usize {
        let bbox = triangles
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, b)| acc.union(b));

        if triangles.len() <= MIN_ITEMS || depth >= MAX_DEPTH {
            let first = self.items.len();
            self.items.extend(triangles.iter().map(|(idx, _)| *idx));
            let node = BvhNode {
                bbox,
                left: 0,
                right: 0,
                first,
                count: triangles.len(),
            };
            self.nodes.push(node);
            return self.nodes.len() - 1;
        }

        // Split along the longest axis at the median
        let size = bbox.size();
        let axis = if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        };
        triangles.sort_by(|(_, a), (_, b)| {
            a.center()[axis].partial_cmp(&b.center()[axis]).unwrap()
        });

        let mid = triangles.len() / 2;
        let (left_items, right_items) = triangles.split_at_mut(mid);
        let left = self.build_recursive(left_items, depth + 1);
        let right = self.build_recursive(right_items, depth + 1);

        self.nodes.push(BvhNode {
            bbox,
            left,
            right,
            first: 0,
            count: 0,
        });
        self.nodes.len() - 1
    }

    fn root(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Append the indices of all items whose bbox run may intersect `bbox`.
    pub fn query(&self, bbox: &BoundingBox, result: &mut Vec<usize>) {
        let mut stack = vec![self.root()];
        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id];
            if !node.bbox.intersects(bbox) {
                continue;
            }
            if node.is_leaf() {
                result.extend_from_slice(&self.items[node.first..node.first + node.count]);
            } else if node.left != node.right {
                // The empty-tree sentinel is its own child; never recurse
                stack.push(node.left);
                stack.push(node.right);
            }
        }
    }
}
