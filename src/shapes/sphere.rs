use std::f64::consts::PI;

use crate::geometry::{BoundingBox, Candidate, HitInfo, Ray, SideMask};
use crate::math::{Dot, Point, Vector2f, BIAS};

/// The unit sphere in local space (`spec.md` §3/§4.D); non-uniform
/// scale/placement is expressed entirely by the owning node's transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sphere;

impl Sphere {
    pub fn new() -> Sphere {
        Sphere
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(Point::new(-1.0, -1.0, -1.0), Point::new(1.0, 1.0, 1.0))
    }

    /// `u = 0.5 - atan2(x,y)/(2*pi)`, `v = 0.5 + asin(z/|p|)/pi`, exactly
    /// as given by `spec.md` §4.D (note the argument order of `atan2` is
    /// `(x, y)`, not the more common `(y, x)`).
    fn uv(p: Point) -> Vector2f {
        let u = 0.5 - p.x.atan2(p.y) / (2.0 * PI);
        let v = 0.5 + (p.z / p.to_dir().length()).asin() / PI;
        Vector2f::new(u, v)
    }

    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo, mask: SideMask) -> bool {
        let o = ray.origin.to_dir();
        let d = ray.direction;
        let a = d.dot(d);
        let b = 2.0 * o.dot(d);
        let c = o.dot(o) - 1.0;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return false;
        }
        let sqrt_disc = discriminant.sqrt();
        let t0 = (-b - sqrt_disc) / (2.0 * a);
        let t1 = (-b + sqrt_disc) / (2.0 * a);
        let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };

        let t = if lo > BIAS {
            lo
        } else if hi > BIAS {
            hi
        } else {
            return false;
        };

        let p = ray.at(t);
        let n = p.to_dir().normalize();
        let front_hit = n.dot(d) <= 0.0;
        hit.consider(
            Candidate { z: t, p, n, uv: Self::uv(p), front_hit, material_index: None },
            mask,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Direction;

    #[test]
    fn ray_through_center_hits_at_z_minus_one() {
        let s = Sphere::new();
        let r = Ray::new(Point::new(0.0, 0.0, 5.0), Direction::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::new();
        assert!(s.intersect(&r, &mut hit, SideMask::Both));
        assert!((hit.z - 4.0).abs() < 1e-9);
        assert!(hit.front_hit);
    }

    #[test]
    fn ray_missing_sphere_is_no_hit() {
        let s = Sphere::new();
        let r = Ray::new(Point::new(5.0, 5.0, 5.0), Direction::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::new();
        assert!(!s.intersect(&r, &mut hit, SideMask::Both));
    }

    #[test]
    fn ray_from_inside_hits_back_face() {
        let s = Sphere::new();
        let r = Ray::new(Point::zero(), Direction::new(0.0, 0.0, 1.0));
        let mut hit = HitInfo::new();
        assert!(s.intersect(&r, &mut hit, SideMask::Both));
        assert!((hit.z - 1.0).abs() < 1e-9);
        assert!(!hit.front_hit);
    }

    #[test]
    fn back_hit_rejected_by_front_mask() {
        let s = Sphere::new();
        let r = Ray::new(Point::zero(), Direction::new(0.0, 0.0, 1.0));
        let mut hit = HitInfo::new();
        assert!(!s.intersect(&r, &mut hit, SideMask::Front));
    }
}
