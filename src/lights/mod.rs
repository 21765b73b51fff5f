pub mod ambient;
pub mod directional;
pub mod point;

use crate::math::{Color, Direction, Point};
use crate::sampler::Sampler;
use crate::scene::Scene;

pub use ambient::AmbientLight;
pub use directional::DirectionalLight;
pub use point::PointLight;

/// Tagged union over the light variants in scope (`spec.md` §3/§4.H).
#[derive(Debug, Clone, Copy)]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Point(PointLight),
}

impl Light {
    pub fn ambient(intensity: Color) -> Light {
        Light::Ambient(AmbientLight::new(intensity))
    }

    pub fn directional(intensity: Color, direction: Direction) -> Light {
        Light::Directional(DirectionalLight::new(intensity, direction))
    }

    pub fn point(position: Point, intensity: Color, size: f64) -> Light {
        Light::Point(PointLight::new(position, intensity, size))
    }

    /// `Illuminate(p, N) -> radiance` (`spec.md` §4.H). `N` is accepted
    /// for interface symmetry with the shader's call site but unused by
    /// any of the three variants' own falloff/shadow math.
    pub fn illuminate(&self, scene: &Scene, p: Point, _n: Direction, sampler: &mut dyn Sampler) -> Color {
        match self {
            Light::Ambient(l) => l.illuminate(),
            Light::Directional(l) => l.illuminate(scene, p),
            Light::Point(l) => l.illuminate(scene, p, sampler),
        }
    }

    pub fn is_photon_source(&self) -> bool {
        matches!(self, Light::Point(_))
    }

    /// Samples an emission direction for photon tracing; only ever
    /// called on photon sources (`spec.md` §4.H/§4.K).
    pub fn random_photon_direction(&self, sampler: &mut dyn Sampler) -> Direction {
        match self {
            Light::Point(l) => l.random_photon_direction(sampler),
            _ => unreachable!("random_photon_direction called on a non-photon-source light"),
        }
    }

    pub fn photon_origin(&self) -> Point {
        match self {
            Light::Point(l) => l.position,
            _ => unreachable!("photon_origin called on a non-photon-source light"),
        }
    }

    pub fn intensity(&self) -> Color {
        match self {
            Light::Ambient(l) => l.intensity,
            Light::Directional(l) => l.intensity,
            Light::Point(l) => l.intensity,
        }
    }
}
