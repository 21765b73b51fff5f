use crate::geometry::{Ray, SideMask};
use crate::math::{Color, Direction, Point};
use crate::scene::Scene;

/// A light whose rays arrive from a fixed direction regardless of the
/// shaded point's position, e.g. sunlight (`spec.md` §4.H). Not a photon
/// source.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub intensity: Color,
    /// The direction the light *travels*; the direction *to* the light
    /// from any surface point is `-direction`.
    pub direction: Direction,
}

impl DirectionalLight {
    pub fn new(intensity: Color, direction: Direction) -> DirectionalLight {
        DirectionalLight { intensity, direction: direction.normalize() }
    }

    pub fn direction_to_light(&self) -> Direction {
        -self.direction
    }

    /// Casts one shadow ray from `p` toward the light, with no distance
    /// bound (the light is infinitely far away).
    pub fn illuminate(&self, scene: &Scene, p: Point) -> Color {
        let to_light = self.direction_to_light();
        let occluded = scene.root.trace_shadow(scene, &Ray::new(p, to_light), SideMask::Both, f64::INFINITY);
        if occluded {
            Color::black()
        } else {
            self.intensity
        }
    }
}
