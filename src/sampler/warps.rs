use std::f64::consts::PI;

use crate::math::Direction;

use super::Sampler;

/// Builds an orthonormal frame with `normal` as its z-axis, picking the
/// helper axis opposite `normal`'s largest-magnitude component so the
/// cross product never degenerates (`spec.md` §4.G). Grounded in
/// `original_source/src/lights/lights.cpp`'s photon-emission frame
/// construction.
pub fn orthonormal_basis(normal: Direction) -> (Direction, Direction) {
    let helper = match normal.dominant_axis() {
        0 => Direction::new(0.0, 1.0, 0.0),
        1 => Direction::new(0.0, 0.0, 1.0),
        _ => Direction::new(1.0, 0.0, 0.0),
    };
    let tangent = helper.cross(normal).normalize();
    let bitangent = normal.cross(tangent);
    (tangent, bitangent)
}

/// Rotates a local-frame vector `v` (z-up) so its z-axis aligns with
/// `normal`, per `spec.md` §4.G `TransformToLocalFrame`.
pub fn transform_to_local_frame(normal: Direction, v: Direction) -> Direction {
    let (tangent, bitangent) = orthonormal_basis(normal);
    tangent * v.x + bitangent * v.y + normal * v.z
}

/// `UniformSphere`: inverse-CDF sampling of the full sphere of directions.
pub fn uniform_sphere(sampler: &mut dyn Sampler) -> Direction {
    let (u1, u2) = sampler.get_f2();
    let z = 1.0 - 2.0 * u1;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u2;
    Direction::new(r * phi.cos(), r * phi.sin(), z)
}

/// `UniformHemisphere`: inverse-CDF sampling of the upper (z >= 0)
/// hemisphere in local frame, uniform over solid angle.
pub fn uniform_hemisphere(sampler: &mut dyn Sampler) -> Direction {
    let (u1, u2) = sampler.get_f2();
    let z = u1;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u2;
    Direction::new(r * phi.cos(), r * phi.sin(), z)
}

/// `CosWeightedHemisphere`: `z = sqrt(u1)`, importance-sampling the
/// Lambertian cosine lobe so its PDF (`z/pi`) cancels the `cos(theta)`
/// factor in the rendering equation.
pub fn cos_weighted_hemisphere(sampler: &mut dyn Sampler) -> Direction {
    let (u1, u2) = sampler.get_f2();
    let z = u1.max(0.0).sqrt();
    let r = (1.0 - u1).max(0.0).sqrt();
    let phi = 2.0 * PI * u2;
    Direction::new(r * phi.cos(), r * phi.sin(), z)
}

/// `UniformDisk(r)`: polar sampling, `(r*sqrt(u1), 2*pi*u2)`, returned as
/// Cartesian `(x, y)` offsets in the disk's own 2-D frame.
pub fn uniform_disk(radius: f64, sampler: &mut dyn Sampler) -> (f64, f64) {
    let (u1, u2) = sampler.get_f2();
    let r = radius * u1.sqrt();
    let theta = 2.0 * PI * u2;
    (r * theta.cos(), r * theta.sin())
}

/// `UniformBall(r)`: rejection sampling in the cube `[-r,r]^3` until the
/// sample falls inside the ball, used for soft-shadow light-disk offsets
/// and fuzzy reflection/refraction directions.
pub fn uniform_ball(radius: f64, sampler: &mut dyn Sampler) -> Direction {
    loop {
        let (u1, u2, u3) = sampler.get_f3();
        let d = Direction::new(
            2.0 * u1 - 1.0,
            2.0 * u2 - 1.0,
            2.0 * u3 - 1.0,
        ) * radius;
        if d.length_squared() <= radius * radius {
            return d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::xorshift::Xorshift128;

    #[test]
    fn uniform_sphere_directions_are_unit_length() {
        let mut s = Xorshift128::seeded(1);
        for _ in 0..1000 {
            let d = uniform_sphere(&mut s);
            assert!((d.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn uniform_hemisphere_stays_on_positive_side() {
        let mut s = Xorshift128::seeded(2);
        for _ in 0..1000 {
            let d = uniform_hemisphere(&mut s);
            assert!(d.z >= 0.0);
        }
    }

    #[test]
    fn cos_weighted_hemisphere_favors_the_pole() {
        let mut s = Xorshift128::seeded(3);
        let mut mean_z = 0.0;
        let n = 20_000;
        for _ in 0..n {
            mean_z += cos_weighted_hemisphere(&mut s).z;
        }
        mean_z /= n as f64;
        // Expected mean z for p(z) ~ z over [0,1] is 2/3.
        assert!((mean_z - 2.0 / 3.0).abs() < 0.02);
    }

    #[test]
    fn uniform_disk_stays_within_radius() {
        let mut s = Xorshift128::seeded(4);
        for _ in 0..1000 {
            let (x, y) = uniform_disk(2.0, &mut s);
            assert!((x * x + y * y).sqrt() <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn uniform_ball_stays_within_radius() {
        let mut s = Xorshift128::seeded(5);
        for _ in 0..1000 {
            let d = uniform_ball(1.5, &mut s);
            assert!(d.length() <= 1.5 + 1e-9);
        }
    }

    #[test]
    fn transform_to_local_frame_maps_z_up_to_normal() {
        let n = Direction::new(0.0, 1.0, 0.0);
        let v = transform_to_local_frame(n, Direction::new(0.0, 0.0, 1.0));
        assert!((v - n).length() < 1e-9);
    }
}
