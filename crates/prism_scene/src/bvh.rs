//! Bounding volume hierarchy over the registered primitives.
//!
//! The tree lives in one flat node array so it can be uploaded as-is:
//!
//! - nodes `[0, leaf_count)` are leaves, one per bounded primitive, in input
//!   order; `data` is the primitive's index in the input list
//! - internal nodes follow, built by median split on the longest centroid axis
//! - the root is the last node
//!
//! Planes have no finite bounds and get no leaf. `build` always starts from
//! scratch.

use bytemuck::{Pod, Zeroable};
use prism_math::{Aabb, Vec3};

use crate::primitive::Primitive;

/// Link value for "no node".
pub const NONE: i32 = -1;

/// One node of the flattened tree.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct AabbNode {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub parent: i32,
    pub left: i32,
    pub right: i32,
    /// Index into the primitive list for leaves, [`NONE`] for internal nodes
    pub data: i32,
}

impl AabbNode {
    pub const STRIDE: usize = 10 * 4;

    fn leaf(aabb: Aabb, data: usize) -> Self {
        Self {
            min: aabb.min.to_array(),
            max: aabb.max.to_array(),
            parent: NONE,
            left: NONE,
            right: NONE,
            data: data as i32,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(Vec3::from_array(self.min), Vec3::from_array(self.max))
    }

    pub fn is_leaf(&self) -> bool {
        self.left == NONE
    }

    /// Primitive index for leaves.
    pub fn data_index(&self) -> Option<usize> {
        usize::try_from(self.data).ok()
    }
}

const _: () = assert!(std::mem::size_of::<AabbNode>() == AabbNode::STRIDE);

#[derive(Debug, Default, Clone)]
pub struct AabbTree {
    nodes: Vec<AabbNode>,
    leaf_count: usize,
}

impl AabbTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the whole tree from `primitives`. Accepts any list, including
    /// an empty one.
    pub fn build<'a, I>(&mut self, primitives: I)
    where
        I: IntoIterator<Item = &'a Primitive>,
    {
        self.nodes.clear();
        for (index, primitive) in primitives.into_iter().enumerate() {
            if let Some(aabb) = primitive.bounds() {
                self.nodes.push(AabbNode::leaf(aabb, index));
            }
        }
        self.leaf_count = self.nodes.len();

        if self.leaf_count > 1 {
            let mut leaves: Vec<usize> = (0..self.leaf_count).collect();
            self.build_range(&mut leaves);
        }
    }

    /// Recursive construction over a set of leaf node indices. Returns the
    /// index of the subtree root.
    fn build_range(&mut self, leaves: &mut [usize]) -> usize {
        if leaves.len() == 1 {
            return leaves[0];
        }

        // Choose split axis based on centroid spread
        let centroid_bounds = leaves.iter().fold(Aabb::EMPTY, |acc, &i| {
            acc.union_point(self.nodes[i].aabb().center())
        });
        let axis = centroid_bounds.longest_axis();

        let nodes = &self.nodes;
        leaves.sort_by(|&a, &b| {
            let ca = nodes[a].aabb().center()[axis];
            let cb = nodes[b].aabb().center()[axis];
            ca.total_cmp(&cb).then(a.cmp(&b))
        });

        let mid = leaves.len() / 2;
        let (left_leaves, right_leaves) = leaves.split_at_mut(mid);
        let left = self.build_range(left_leaves);
        let right = self.build_range(right_leaves);

        let aabb = self.nodes[left].aabb().union(&self.nodes[right].aabb());
        let index = self.nodes.len();
        self.nodes.push(AabbNode {
            min: aabb.min.to_array(),
            max: aabb.max.to_array(),
            parent: NONE,
            left: left as i32,
            right: right as i32,
            data: NONE,
        });
        self.nodes[left].parent = index as i32;
        self.nodes[right].parent = index as i32;
        index
    }

    pub fn nodes(&self) -> &[AabbNode] {
        &self.nodes
    }

    /// The flat leaf array, one entry per bounded primitive in input order.
    pub fn leaves(&self) -> &[AabbNode] {
        &self.nodes[..self.leaf_count]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_index(&self) -> Option<usize> {
        self.nodes.len().checked_sub(1)
    }

    pub fn root(&self) -> Option<&AabbNode> {
        self.nodes.last()
    }

    /// Bounds of everything in the tree, empty when the tree is.
    pub fn bounds(&self) -> Aabb {
        self.root().map(AabbNode::aabb).unwrap_or(Aabb::EMPTY)
    }

    /// Visit every node in storage order (leaves first).
    pub fn for_each_node<F: FnMut(usize, &AabbNode)>(&self, mut visit: F) {
        for (index, node) in self.nodes.iter().enumerate() {
            visit(index, node);
        }
    }

    /// Call `visit` with the primitive index of every leaf overlapping `area`.
    pub fn query<F: FnMut(usize)>(&self, area: &Aabb, mut visit: F) {
        let Some(root) = self.root_index() else {
            return;
        };

        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.aabb().overlaps(area) {
                continue;
            }
            if node.is_leaf() {
                if let Some(data) = node.data_index() {
                    visit(data);
                }
            } else {
                stack.push(node.right as usize);
                stack.push(node.left as usize);
            }
        }
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[AabbNode], index: usize) -> usize {
            let node = &nodes[index];
            if node.is_leaf() {
                1
            } else {
                1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
            }
        }

        self.root_index().map(|root| walk(&self.nodes, root)).unwrap_or(0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn row_of_spheres(n: usize) -> Vec<Primitive> {
        (0..n)
            .map(|i| {
                let center = Vec3::new(i as f32 * 3.0, 0.0, -5.0);
                Primitive::sphere(center, 0.5, Material::default())
            })
            .collect()
    }

    #[test]
    fn test_bvh_empty() {
        let mut tree = AabbTree::new();
        tree.build(std::iter::empty());

        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.bounds().is_empty());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_single_box_leaf() {
        let cube = Primitive::cuboid(Vec3::ZERO, Vec3::splat(2.0), Vec3::ZERO, Material::default());
        let mut tree = AabbTree::new();
        tree.build(std::iter::once(&cube));

        assert_eq!(tree.len(), 1);
        let leaf = tree.root().unwrap();
        assert!(leaf.is_leaf());
        assert_eq!(leaf.parent, NONE);
        assert_eq!(leaf.data_index(), Some(0));
        assert!(approx(leaf.aabb().min, Vec3::splat(-1.0)));
        assert!(approx(leaf.aabb().max, Vec3::splat(1.0)));
    }

    #[test]
    fn test_planes_are_skipped_but_indices_kept() {
        let primitives = vec![
            Primitive::plane(Vec3::ZERO, Vec3::ZERO, Material::default()),
            Primitive::sphere(Vec3::X, 1.0, Material::default()),
            Primitive::plane(Vec3::Y, Vec3::ZERO, Material::default()),
            Primitive::cuboid(Vec3::Z, Vec3::ONE, Vec3::ZERO, Material::default()),
        ];
        let mut tree = AabbTree::new();
        tree.build(&primitives);

        let data: Vec<_> = tree.leaves().iter().map(|n| n.data).collect();
        assert_eq!(data, vec![1, 3]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_leaves_follow_input_order() {
        let spheres = row_of_spheres(9);
        let mut tree = AabbTree::new();
        tree.build(&spheres);

        assert_eq!(tree.leaves().len(), 9);
        for (i, (leaf, sphere)) in tree.leaves().iter().zip(&spheres).enumerate() {
            assert_eq!(leaf.data, i as i32);
            assert_eq!(leaf.aabb(), sphere.bounds().unwrap());
        }
    }

    #[test]
    fn test_hierarchy_links_and_bounds() {
        let spheres = row_of_spheres(13);
        let mut tree = AabbTree::new();
        tree.build(&spheres);

        // n leaves need n - 1 internal nodes
        assert_eq!(tree.len(), 2 * 13 - 1);
        let root = tree.root_index().unwrap();
        assert_eq!(tree.nodes()[root].parent, NONE);

        let mut visited = 0;
        tree.for_each_node(|index, node| {
            visited += 1;
            if index != root {
                let parent = &tree.nodes()[node.parent as usize];
                assert!(parent.left == index as i32 || parent.right == index as i32);
                assert_eq!(parent.aabb().union(&node.aabb()), parent.aabb());
            }
            if !node.is_leaf() {
                assert_eq!(node.data, NONE);
                let merged = tree.nodes()[node.left as usize]
                    .aabb()
                    .union(&tree.nodes()[node.right as usize].aabb());
                assert_eq!(merged, node.aabb());
            }
        });
        assert_eq!(visited, tree.len());
        assert_eq!(tree.depth(), 5);
    }

    #[test]
    fn test_bounds_cover_every_primitive() {
        let spheres = row_of_spheres(6);
        let mut tree = AabbTree::new();
        tree.build(&spheres);

        let expected = spheres
            .iter()
            .filter_map(Primitive::bounds)
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b));
        assert_eq!(tree.bounds(), expected);
    }

    #[test]
    fn test_query_finds_overlapping_leaves() {
        let spheres = row_of_spheres(10);
        let mut tree = AabbTree::new();
        tree.build(&spheres);

        let area = Aabb::from_points(Vec3::new(5.5, -1.0, -6.0), Vec3::new(9.2, 1.0, -4.0));
        let mut hits = Vec::new();
        tree.query(&area, |data| hits.push(data));
        hits.sort_unstable();

        // Spheres at x = 6 and x = 9
        assert_eq!(hits, vec![2, 3]);
    }

    #[test]
    fn test_rebuild_replaces_previous_tree() {
        let mut tree = AabbTree::new();
        tree.build(&row_of_spheres(8));
        let first_len = tree.len();

        tree.build(&row_of_spheres(2));
        assert_ne!(tree.len(), first_len);
        assert_eq!(tree.len(), 3);

        let again = {
            let mut t = AabbTree::new();
            t.build(&row_of_spheres(2));
            t
        };
        assert_eq!(tree.nodes(), again.nodes());
    }

    #[test]
    fn test_nodes_cast_to_bytes() {
        let mut tree = AabbTree::new();
        tree.build(&row_of_spheres(4));
        assert_eq!(tree.as_bytes().len(), tree.len() * AabbNode::STRIDE);
    }
}
