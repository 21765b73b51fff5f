use crate::math::{Direction, Point, Vector2f};
use crate::scene::node::Node;

use super::ray::SideMask;

/// A candidate intersection an intersector hands to `HitInfo::consider`;
/// it is only ever committed if it passes the monotone-z and side-mask
/// checks, so intersectors never need to duplicate that logic.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub z: f64,
    pub p: Point,
    pub n: Direction,
    pub uv: Vector2f,
    pub front_hit: bool,
    pub material_index: Option<usize>,
}

/// The result of intersecting a single (non-differential) ray against
/// the scene: distance, position, shading normal, texture coordinate and
/// its owning node, reached by the node-tree traversal in
/// `crate::scene::node`.
pub struct HitInfo<'s> {
    pub z: f64,
    pub p: Point,
    pub n: Direction,
    pub uv: Vector2f,
    pub material_index: Option<usize>,
    pub node: Option<&'s Node>,
    pub front_hit: bool,
    pub has_diffuse_hit: bool,
}

impl<'s> HitInfo<'s> {
    pub fn new() -> HitInfo<'s> {
        HitInfo {
            z: f64::INFINITY,
            p: Point::zero(),
            n: Direction::zero(),
            uv: Vector2f::zero(),
            material_index: None,
            node: None,
            front_hit: true,
            has_diffuse_hit: false,
        }
    }

    pub fn with_max_distance(t_max: f64) -> HitInfo<'s> {
        let mut hit = HitInfo::new();
        hit.z = t_max;
        hit
    }

    pub fn is_hit(&self) -> bool {
        self.z.is_finite()
    }

    /// Commits `candidate` only when its distance strictly improves on
    /// the currently stored one and it satisfies `mask`. This is the
    /// sole mutation point for `z`, which is what makes the "monotone
    /// hit update" property (`spec.md` §8.1) hold by construction.
    pub fn consider(&mut self, candidate: Candidate, mask: SideMask) -> bool {
        if candidate.z < 0.0 || !mask.accepts(candidate.front_hit) {
            return false;
        }
        if candidate.z < self.z {
            self.z = candidate.z;
            self.p = candidate.p;
            self.n = candidate.n;
            self.uv = candidate.uv;
            self.front_hit = candidate.front_hit;
            self.material_index = candidate.material_index;
            true
        } else {
            false
        }
    }
}

/// The center hit plus (when available) the two offset hits used to
/// derive texture-footprint derivatives.
pub struct DiffHitInfo<'s> {
    pub c: HitInfo<'s>,
    pub x: Option<HitInfo<'s>>,
    pub y: Option<HitInfo<'s>>,
}

impl<'s> DiffHitInfo<'s> {
    pub fn new() -> DiffHitInfo<'s> {
        DiffHitInfo { c: HitInfo::new(), x: None, y: None }
    }

    /// `rdx * (uv(p_x) - uv(p))`: the screen-space derivative of the
    /// texture coordinate along the x-offset ray, where `rdx = 1/dx` is
    /// the inverse pixel spacing in screen-parameter units.
    pub fn duvw_dx(&self, rdx: f64) -> Vector2f {
        match &self.x {
            Some(hit) if self.c.is_hit() && hit.is_hit() => (hit.uv - self.c.uv) * rdx,
            _ => Vector2f::zero(),
        }
    }

    pub fn duvw_dy(&self, rdy: f64) -> Vector2f {
        match &self.y {
            Some(hit) if self.c.is_hit() && hit.is_hit() => (hit.uv - self.c.uv) * rdy,
            _ => Vector2f::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(z: f64) -> Candidate {
        Candidate {
            z,
            p: Point::zero(),
            n: Direction::new(0.0, 0.0, 1.0),
            uv: Vector2f::zero(),
            front_hit: true,
            material_index: None,
        }
    }

    #[test]
    fn monotone_update_keeps_minimum() {
        let mut hit = HitInfo::new();
        assert!(hit.consider(candidate(5.0), SideMask::Both));
        assert_eq!(hit.z, 5.0);
        assert!(!hit.consider(candidate(7.0), SideMask::Both));
        assert_eq!(hit.z, 5.0);
        assert!(hit.consider(candidate(2.0), SideMask::Both));
        assert_eq!(hit.z, 2.0);
    }

    #[test]
    fn negative_candidates_are_rejected() {
        let mut hit = HitInfo::new();
        assert!(!hit.consider(candidate(-1.0), SideMask::Both));
        assert!(!hit.is_hit());
    }

    #[test]
    fn side_mask_filters_candidates() {
        let mut hit = HitInfo::new();
        let mut back = candidate(3.0);
        back.front_hit = false;
        assert!(!hit.consider(back, SideMask::Front));
        assert!(hit.consider(back, SideMask::Back));
    }

    #[test]
    fn sequence_of_candidates_never_increases_z() {
        let mut hit = HitInfo::new();
        let mut z = f64::INFINITY;
        for &t in &[9.0, 3.0, 4.0, 1.5, 100.0, 1.0] {
            hit.consider(candidate(t), SideMask::Both);
            assert!(hit.z <= z);
            z = hit.z;
        }
        assert_eq!(hit.z, 1.0);
    }
}
