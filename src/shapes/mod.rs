pub mod bvh;
pub mod mesh;
pub mod plane;
pub mod sphere;

use crate::geometry::{BoundingBox, DiffHitInfo, DiffRay, HitInfo, Ray, SideMask};

pub use mesh::TriMesh;
pub use plane::Plane;
pub use sphere::Sphere;

/// Tagged union over the primitive set in scope (`spec.md` §3/§9):
/// `{Sphere, Plane, TriMesh}`. Intersectors operate in the local space
/// the owning `Node` has already transformed the ray into.
pub enum Shape {
    Sphere(Sphere),
    Plane(Plane),
    TriMesh(TriMesh),
}

impl Shape {
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Shape::Sphere(s) => s.bounding_box(),
            Shape::Plane(p) => p.bounding_box(),
            Shape::TriMesh(m) => m.bounding_box(),
        }
    }

    fn intersect_single(&self, ray: &Ray, hit: &mut HitInfo, mask: SideMask) -> bool {
        match self {
            Shape::Sphere(s) => s.intersect(ray, hit, mask),
            Shape::Plane(p) => p.intersect(ray, hit, mask),
            Shape::TriMesh(m) => m.intersect(ray, hit, mask),
        }
    }

    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo, mask: SideMask) -> bool {
        self.intersect_single(ray, hit, mask)
    }

    /// Intersects the center ray into `hit.c`, and — only when it hits —
    /// repeats the intersection for the two offset rays to obtain the
    /// offset hit points ray differentials need (`spec.md` §4.D). The
    /// offset rays are never gated by `mask`: they exist purely to
    /// estimate texture footprint, not to report a second real hit.
    pub fn intersect_differential(&self, ray: &DiffRay, hit: &mut DiffHitInfo, mask: SideMask) -> bool {
        let hit_center = self.intersect_single(&ray.c, &mut hit.c, mask);
        if hit_center {
            let mut hx = HitInfo::new();
            if self.intersect_single(&ray.x, &mut hx, SideMask::Both) {
                hit.x = Some(hx);
            }
            let mut hy = HitInfo::new();
            if self.intersect_single(&ray.y, &mut hy, SideMask::Both) {
                hit.y = Some(hy);
            }
        }
        hit_center
    }
}
