use crate::geometry::{Ray, SideMask};
use crate::math::{Color, Direction, Point};
use crate::sampler::{warps, Sampler};
use crate::scene::Scene;

const SOFT_SHADOW_THRESHOLD: f64 = 0.01;
const N_MIN: usize = 16;
const N_MAX: usize = 64;

/// A point light with an optional soft-shadow disk size (`spec.md`
/// §3/§4.H). The only light variant that is also a photon source.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Point,
    pub intensity: Color,
    /// Soft-shadow disk radius; `<= 0.01` renders as a single hard
    /// shadow ray.
    pub size: f64,
    /// Inverse-square falloff cap, preventing a singularity as
    /// `distance -> 0`. `None` disables the cap entirely.
    pub falloff_cap: Option<f64>,
}

impl PointLight {
    pub fn new(position: Point, intensity: Color, size: f64) -> PointLight {
        PointLight { position, intensity, size, falloff_cap: Some(1e4) }
    }

    pub fn without_falloff_cap(mut self) -> PointLight {
        self.falloff_cap = None;
        self
    }

    fn falloff(&self, distance: f64) -> f64 {
        let inv_sq = 1.0 / distance.max(1e-6).powi(2);
        match self.falloff_cap {
            Some(cap) => inv_sq.min(cap),
            None => inv_sq,
        }
    }

    fn shadow_ray_unoccluded(&self, scene: &Scene, p: Point, target: Point) -> bool {
        let delta = target - p;
        let distance = delta.length();
        let dir = delta * (1.0 / distance);
        !scene.root.trace_shadow(scene, &Ray::new(p, dir), SideMask::Both, distance)
    }

    /// Single hard shadow ray plus inverse-square falloff.
    fn illuminate_hard(&self, scene: &Scene, p: Point) -> Color {
        if self.shadow_ray_unoccluded(scene, p, self.position) {
            let distance = (self.position - p).length();
            self.intensity * self.falloff(distance)
        } else {
            Color::black()
        }
    }

    /// Adaptive soft shadow: starts with `N_MIN` samples on the light
    /// disk; if the running visibility·falloff estimate is strictly
    /// between 0 and 1 (a penumbra) after that, extends to `N_MAX`
    /// (`spec.md` §4.H).
    fn illuminate_soft(&self, scene: &Scene, p: Point, sampler: &mut dyn Sampler) -> Color {
        let to_light = (self.position - p).normalize();
        let (tangent, bitangent) = warps::orthonormal_basis(to_light);

        let mut sum = 0.0;
        let mut taken = 0usize;
        for i in 0..N_MAX {
            if i == N_MIN {
                let running_mean = sum / N_MIN as f64;
                if !(running_mean > 0.0 && running_mean < 1.0) {
                    break;
                }
            }
            let (du, dv) = warps::uniform_disk(self.size, sampler);
            let sample_pos = self.position + tangent * du + bitangent * dv;
            let unoccluded = self.shadow_ray_unoccluded(scene, p, sample_pos);
            let distance = (sample_pos - p).length();
            sum += if unoccluded { self.falloff(distance) } else { 0.0 };
            taken += 1;
        }
        self.intensity * (sum / taken as f64)
    }

    pub fn illuminate(&self, scene: &Scene, p: Point, sampler: &mut dyn Sampler) -> Color {
        if self.size <= SOFT_SHADOW_THRESHOLD {
            self.illuminate_hard(scene, p)
        } else {
            self.illuminate_soft(scene, p, sampler)
        }
    }

    /// Samples a photon-emission direction uniformly over the sphere
    /// (`spec.md` §4.H: "point: uniform sphere").
    pub fn random_photon_direction(&self, sampler: &mut dyn Sampler) -> Direction {
        warps::uniform_sphere(sampler)
    }
}
