use crate::geometry::{BoundingBox, HitInfo, Ray, SideMask};
use crate::math::Point;

/// Default leaf capacity (`spec.md` §3 `BVH`: `maxElementsPerNode`).
pub const DEFAULT_MAX_ELEMENTS_PER_NODE: usize = 4;

/// Explicit traversal-stack depth bound (`spec.md` §4.D).
const MAX_STACK_DEPTH: usize = 40;

enum BvhNodeKind {
    Leaf { faces: Vec<usize> },
    Internal { left: usize, right: usize },
}

struct BvhNode {
    bbox: BoundingBox,
    kind: BvhNodeKind,
}

/// A top-down median-split BVH over an arbitrary element set, addressed
/// by element index (`spec.md` §3/§4.D/§4.E). Built once before
/// rendering and traversed read-only afterwards with the explicit stack
/// in `traverse`, never recursively.
pub struct Bvh {
    nodes: Vec<BvhNode>,
    root: usize,
}

impl Bvh {
    /// Builds the tree from per-element bounding boxes and centroids.
    /// Splits on the longest axis of the centroid bounding box at the
    /// median (`spec.md` §4.E); stops when a subset is small enough or
    /// its centroids have collapsed to a point.
    pub fn build(boxes: &[BoundingBox], centroids: &[Point], max_elements_per_node: usize) -> Bvh {
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..boxes.len()).collect();
        let root = if indices.is_empty() {
            nodes.push(BvhNode { bbox: BoundingBox::empty(), kind: BvhNodeKind::Leaf { faces: Vec::new() } });
            0
        } else {
            Self::build_recursive(indices, boxes, centroids, &mut nodes, max_elements_per_node)
        };
        Bvh { nodes, root }
    }

    fn build_recursive(
        indices: Vec<usize>,
        boxes: &[BoundingBox],
        centroids: &[Point],
        nodes: &mut Vec<BvhNode>,
        max_elements_per_node: usize,
    ) -> usize {
        let mut bbox = BoundingBox::empty();
        let mut centroid_box = BoundingBox::empty();
        for &i in &indices {
            bbox = bbox.union_box(boxes[i]);
            centroid_box = centroid_box.union_point(centroids[i]);
        }

        let axis = centroid_box.longest_axis();
        let collapsed = centroid_box.extent(axis) < 1e-12;
        if indices.len() <= max_elements_per_node || collapsed {
            nodes.push(BvhNode { bbox, kind: BvhNodeKind::Leaf { faces: indices } });
            return nodes.len() - 1;
        }

        let mid = indices.len() / 2;
        let mut indices = indices;
        indices.select_nth_unstable_by(mid, |&a, &b| {
            centroids[a][axis].partial_cmp(&centroids[b][axis]).unwrap()
        });
        let right = indices.split_off(mid);
        let left = indices;

        let left_idx = Self::build_recursive(left, boxes, centroids, nodes, max_elements_per_node);
        let right_idx = Self::build_recursive(right, boxes, centroids, nodes, max_elements_per_node);
        nodes.push(BvhNode { bbox, kind: BvhNodeKind::Internal { left: left_idx, right: right_idx } });
        nodes.len() - 1
    }

    /// Strict slab test: returns `Some((entry, exit))` only if
    /// `entry < current_best && entry < exit`, matching `spec.md`
    /// §4.D's child-push condition exactly (stricter than
    /// `BoundingBox::intersect_ray`'s `<=`, which is used for the
    /// general ray/box query elsewhere).
    fn slab_test(bbox: &BoundingBox, ray: &Ray, current_best: f64) -> Option<(f64, f64)> {
        let mut entry = f64::NEG_INFINITY;
        let mut exit = f64::INFINITY;
        for axis in 0..3 {
            let d = ray.direction[axis];
            let o = ray.origin[axis];
            if d.abs() < 1e-7 {
                if o < bbox.pmin[axis] || o > bbox.pmax[axis] {
                    return None;
                }
                continue;
            }
            let inv_d = 1.0 / d;
            let mut t0 = (bbox.pmin[axis] - o) * inv_d;
            let mut t1 = (bbox.pmax[axis] - o) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            entry = entry.max(t0);
            exit = exit.min(t1);
        }
        if entry < current_best && entry < exit {
            Some((entry, exit))
        } else {
            None
        }
    }

    /// Traverses the tree with a fixed-size explicit stack, calling
    /// `test_face(face_index, ray, hit, mask)` for every leaf element in
    /// a box that could still improve on `hit`'s current `z`. Never
    /// recurses (`spec.md` §4.D/§9).
    pub fn traverse(
        &self,
        ray: &Ray,
        hit: &mut HitInfo,
        mask: SideMask,
        mut test_face: impl FnMut(usize, &Ray, &mut HitInfo, SideMask) -> bool,
    ) -> bool {
        let mut stack = [0usize; MAX_STACK_DEPTH];
        let mut sp = 0usize;
        stack[sp] = self.root;
        sp += 1;
        let mut any_hit = false;

        while sp > 0 {
            sp -= 1;
            let node = &self.nodes[stack[sp]];
            match &node.kind {
                BvhNodeKind::Leaf { faces } => {
                    for &face in faces {
                        if test_face(face, ray, hit, mask) {
                            any_hit = true;
                        }
                    }
                }
                BvhNodeKind::Internal { left, right } => {
                    let lbox = self.nodes[*left].bbox;
                    let rbox = self.nodes[*right].bbox;
                    let left_hit = Self::slab_test(&lbox, ray, hit.z);
                    let right_hit = Self::slab_test(&rbox, ray, hit.z);
                    match (left_hit, right_hit) {
                        (Some((le, _)), Some((re, _))) => {
                            // Push the farther-entry child first so the
                            // nearer is popped (and traversed) next;
                            // ties push right first.
                            if sp + 2 > MAX_STACK_DEPTH {
                                continue;
                            }
                            if le <= re {
                                stack[sp] = *right;
                                stack[sp + 1] = *left;
                            } else {
                                stack[sp] = *left;
                                stack[sp + 1] = *right;
                            }
                            sp += 2;
                        }
                        (Some(_), None) => {
                            stack[sp] = *left;
                            sp += 1;
                        }
                        (None, Some(_)) => {
                            stack[sp] = *right;
                            sp += 1;
                        }
                        (None, None) => {}
                    }
                }
            }
        }
        any_hit
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.nodes[self.root].bbox
    }

    /// Visits every leaf's face index, used by completeness tests to
    /// check every element is reachable from the root.
    pub fn all_face_indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for node in &self.nodes {
            if let BvhNodeKind::Leaf { faces } = &node.kind {
                out.extend(faces.iter().copied());
            }
        }
        out
    }

    /// Asserts every node's box contains the union of its children's
    /// boxes (and, transitively, every leaf element), used by
    /// completeness tests.
    pub fn every_box_contains_children(&self) -> bool {
        self.nodes.iter().all(|node| match &node.kind {
            BvhNodeKind::Leaf { .. } => true,
            BvhNodeKind::Internal { left, right } => {
                let lbox = self.nodes[*left].bbox;
                let rbox = self.nodes[*right].bbox;
                node.bbox.union_box(lbox) == node.bbox && node.bbox.union_box(rbox) == node.bbox
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Direction;

    fn unit_box_at(center: Point) -> BoundingBox {
        BoundingBox::new(center - Direction::new(0.1, 0.1, 0.1), center + Direction::new(0.1, 0.1, 0.1))
    }

    fn grid_bvh(n: usize) -> Bvh {
        let centroids: Vec<Point> = (0..n).map(|i| Point::new(i as f64, 0.0, 0.0)).collect();
        let boxes: Vec<BoundingBox> = centroids.iter().map(|&c| unit_box_at(c)).collect();
        Bvh::build(&boxes, &centroids, 4)
    }

    #[test]
    fn every_face_is_reachable() {
        let bvh = grid_bvh(37);
        let mut indices = bvh.all_face_indices();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices, (0..37).collect::<Vec<_>>());
    }

    #[test]
    fn every_internal_box_contains_its_children() {
        let bvh = grid_bvh(100);
        assert!(bvh.every_box_contains_children());
    }

    #[test]
    fn traversal_finds_the_single_matching_element() {
        let bvh = grid_bvh(1000);
        let ray = Ray::new(Point::new(500.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let mut hit = HitInfo::new();
        let found = bvh.traverse(&ray, &mut hit, SideMask::Both, |face, ray, hit, mask| {
            // Each element is a unit cube; a hit means the ray's x,y
            // fall within it.
            let center = Point::new(face as f64, 0.0, 0.0);
            let bbox = unit_box_at(center);
            if let Some((entry, _)) = bbox.intersect_ray(ray, hit.z) {
                hit.consider(
                    crate::geometry::Candidate {
                        z: entry,
                        p: ray.at(entry),
                        n: Direction::new(0.0, 0.0, -1.0),
                        uv: Default::default(),
                        front_hit: true,
                        material_index: None,
                    },
                    mask,
                )
            } else {
                false
            }
        });
        assert!(found);
        assert!((hit.z - 5.0).abs() < 1e-9);
    }
}
