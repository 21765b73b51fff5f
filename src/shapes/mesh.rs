use crate::geometry::{BoundingBox, Candidate, HitInfo, Ray, SideMask};
use crate::math::{Direction, Dot, Point, Vector2f};

use super::bvh::{Bvh, DEFAULT_MAX_ELEMENTS_PER_NODE};

/// One triangular face: three vertex/normal/texcoord indices into the
/// owning `TriMesh`'s tables, plus an optional material sub-id
/// (`spec.md` §3) that, when present, overrides the owning node's
/// material for just this face.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub vertices: [usize; 3],
    pub normals: [usize; 3],
    pub texcoords: [usize; 3],
    pub material_sub_id: Option<usize>,
}

/// An owned vertex/normal/texcoord table plus a face table and a BVH
/// over those faces (`spec.md` §3). The BVH is built once at
/// construction and never rebuilt.
pub struct TriMesh {
    vertices: Vec<Point>,
    normals: Vec<Direction>,
    texcoords: Vec<Vector2f>,
    faces: Vec<Face>,
    bvh: Bvh,
}

impl TriMesh {
    pub fn new(vertices: Vec<Point>, normals: Vec<Direction>, texcoords: Vec<Vector2f>, faces: Vec<Face>) -> TriMesh {
        Self::with_max_elements_per_node(vertices, normals, texcoords, faces, DEFAULT_MAX_ELEMENTS_PER_NODE)
    }

    pub fn with_max_elements_per_node(
        vertices: Vec<Point>,
        normals: Vec<Direction>,
        texcoords: Vec<Vector2f>,
        faces: Vec<Face>,
        max_elements_per_node: usize,
    ) -> TriMesh {
        let boxes: Vec<BoundingBox> = faces
            .iter()
            .map(|f| Self::face_bounding_box(&vertices, f))
            .collect();
        let centroids: Vec<Point> = boxes.iter().map(|b| b.center()).collect();
        let bvh = Bvh::build(&boxes, &centroids, max_elements_per_node);
        TriMesh { vertices, normals, texcoords, faces, bvh }
    }

    fn face_bounding_box(vertices: &[Point], face: &Face) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for &v in &face.vertices {
            bbox = bbox.union_point(vertices[v]);
        }
        bbox
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bvh.bounding_box()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn all_face_indices(&self) -> Vec<usize> {
        self.bvh.all_face_indices()
    }

    pub fn bvh_boxes_are_consistent(&self) -> bool {
        self.bvh.every_box_contains_children()
    }

    /// Drops the numerically-dominant axis of the (unnormalized) face
    /// normal and projects onto the remaining 2-D plane, per `spec.md`
    /// §4.D's triangle intersector.
    fn project(p: Point, dropped_axis: usize) -> (f64, f64) {
        match dropped_axis {
            0 => (p.y, p.z),
            1 => (p.x, p.z),
            _ => (p.x, p.y),
        }
    }

    fn edge(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
        (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
    }

    fn intersect_face(&self, face_index: usize, ray: &Ray, hit: &mut HitInfo, mask: SideMask) -> bool {
        let face = &self.faces[face_index];
        let p0 = self.vertices[face.vertices[0]];
        let p1 = self.vertices[face.vertices[1]];
        let p2 = self.vertices[face.vertices[2]];

        let face_normal = (p1 - p0).cross(p2 - p0);
        let denom = face_normal.dot(ray.direction);
        if denom.abs() < 1e-12 {
            return false;
        }
        let t = face_normal.dot(p0 - ray.origin) / denom;
        if t <= crate::math::BIAS {
            return false;
        }
        let p = ray.at(t);

        let axis = face_normal.dominant_axis();
        let p0_2d = Self::project(p0, axis);
        let p1_2d = Self::project(p1, axis);
        let p2_2d = Self::project(p2, axis);
        let p_2d = Self::project(p, axis);

        let total_area = Self::edge(p0_2d, p1_2d, p2_2d);
        if total_area.abs() < 1e-20 {
            return false;
        }
        let w0 = Self::edge(p1_2d, p2_2d, p_2d) / total_area;
        let w1 = Self::edge(p2_2d, p0_2d, p_2d) / total_area;
        let w2 = Self::edge(p0_2d, p1_2d, p_2d) / total_area;
        if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
            return false;
        }

        let n = (self.normals[face.normals[0]] * w0
            + self.normals[face.normals[1]] * w1
            + self.normals[face.normals[2]] * w2)
            .normalize();
        let uv = if self.texcoords.is_empty() {
            Vector2f::zero()
        } else {
            self.texcoords[face.texcoords[0]] * w0
                + self.texcoords[face.texcoords[1]] * w1
                + self.texcoords[face.texcoords[2]] * w2
        };
        let front_hit = face_normal.normalize().dot(ray.direction) <= 0.0;

        hit.consider(
            Candidate { z: t, p, n, uv, front_hit, material_index: face.material_sub_id },
            mask,
        )
    }

    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo, mask: SideMask) -> bool {
        self.bvh.traverse(ray, hit, mask, |face, ray, hit, mask| {
            self.intersect_face(face, ray, hit, mask)
        })
    }
}
