use crate::geometry::{BoundingBox, Candidate, HitInfo, Ray, SideMask};
use crate::math::{Direction, Dot, Point, Vector2f, BIAS};

/// The unit square `z=0, |x|<=1, |y|<=1` in local space (`spec.md`
/// §3/§4.D).
#[derive(Debug, Clone, Copy, Default)]
pub struct Plane;

impl Plane {
    pub fn new() -> Plane {
        Plane
    }

    pub fn bounding_box(&self) -> BoundingBox {
        // A flat box: the slab test's `|dir|<1e-7 -> unbounded axis` rule
        // keeps rays parallel to the plane from being spuriously culled
        // by a zero-thickness z extent.
        BoundingBox::new(Point::new(-1.0, -1.0, 0.0), Point::new(1.0, 1.0, 0.0))
    }

    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo, mask: SideMask) -> bool {
        if ray.direction.z.abs() < 1e-7 {
            return false;
        }
        let t = -ray.origin.z / ray.direction.z;
        if t <= BIAS {
            return false;
        }
        let p = ray.at(t);
        if p.x.abs() > 1.0 || p.y.abs() > 1.0 {
            return false;
        }
        let n = Direction::new(0.0, 0.0, 1.0);
        let front_hit = n.dot(ray.direction) <= 0.0;
        let uv = Vector2f::new((p.x + 1.0) * 0.5, (p.y + 1.0) * 0.5);
        hit.consider(Candidate { z: t, p, n, uv, front_hit, material_index: None }, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_straight_down_hits_plane_center() {
        let p = Plane::new();
        let r = Ray::new(Point::new(0.0, 0.0, 5.0), Direction::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::new();
        assert!(p.intersect(&r, &mut hit, SideMask::Both));
        assert!((hit.z - 5.0).abs() < 1e-9);
        assert_eq!(hit.uv, Vector2f::new(0.5, 0.5));
    }

    #[test]
    fn ray_outside_unit_square_misses() {
        let p = Plane::new();
        let r = Ray::new(Point::new(2.0, 2.0, 5.0), Direction::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::new();
        assert!(!p.intersect(&r, &mut hit, SideMask::Both));
    }

    #[test]
    fn ray_parallel_to_plane_misses() {
        let p = Plane::new();
        let r = Ray::new(Point::new(0.0, 0.0, 1.0), Direction::new(1.0, 0.0, 0.0));
        let mut hit = HitInfo::new();
        assert!(!p.intersect(&r, &mut hit, SideMask::Both));
    }
}
