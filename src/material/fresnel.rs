use crate::math::{Direction, Dot};

/// Schlick's approximation: `F0 + (1-F0)(1-cos)^5`, `F0 = ((eta1-eta2)/
/// (eta1+eta2))^2` (`spec.md` GLOSSARY/§4.I).
pub fn schlick(cos_theta: f64, eta1: f64, eta2: f64) -> f64 {
    let f0 = ((eta1 - eta2) / (eta1 + eta2)).powi(2);
    f0 + (1.0 - f0) * (1.0 - cos_theta).clamp(0.0, 1.0).powi(5)
}

/// The Fresnel reflectance and reflect/refract directions for a
/// dielectric boundary, per `spec.md` §4.I step 2: Schlick with
/// "effective eta = 1/eta on front hit, eta on back hit"; total internal
/// reflection is detected when `eta * sin(theta_i) > 1.001`.
///
/// `n` is the *outward*-facing shading normal as stored on the hit (not
/// re-oriented toward the incident ray); this function re-orients it
/// internally so the returned reflect/refract directions are always
/// physically meaningful regardless of which side was hit.
pub struct DielectricResponse {
    pub kr: f64,
    pub reflect_dir: Direction,
    pub refract_dir: Option<Direction>,
}

pub fn dielectric_response(incident: Direction, n: Direction, front_hit: bool, ior: f64) -> DielectricResponse {
    let n_facing = if front_hit { n } else { -n };
    let view = -incident;
    let cos_i = view.dot(n_facing).max(0.0);

    let eta = if front_hit { 1.0 / ior } else { ior };
    let (eta1, eta2) = if front_hit { (1.0, ior) } else { (ior, 1.0) };

    let reflect_dir = n_facing * (2.0 * cos_i) - view;

    let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();
    let sin_t = eta * sin_i;
    if sin_t > 1.001 {
        return DielectricResponse { kr: 1.0, reflect_dir, refract_dir: None };
    }
    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    let refract_dir = (incident * eta + n_facing * (eta * cos_i - cos_t)).normalize();
    let kr = schlick(cos_i, eta1, eta2);
    DielectricResponse { kr, reflect_dir, refract_dir: Some(refract_dir) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_incidence_reflectance_matches_f0() {
        let r = dielectric_response(Direction::new(0.0, 0.0, -1.0), Direction::new(0.0, 0.0, 1.0), true, 1.5);
        let f0 = ((1.0f64 - 1.5) / (1.0 + 1.5)).powi(2);
        assert!((r.kr - f0).abs() < 1e-9);
        assert!(r.refract_dir.is_some());
    }

    #[test]
    fn grazing_total_internal_reflection_from_inside() {
        // Shallow angle from inside a dense medium (ior 1.5) triggers TIR.
        let incident = Direction::new(0.99, 0.14, 0.0).normalize();
        let r = dielectric_response(incident, Direction::new(0.0, 0.0, 1.0), false, 1.5);
        assert!(r.refract_dir.is_none());
        assert_eq!(r.kr, 1.0);
    }

    #[test]
    fn reflection_direction_mirrors_incidence() {
        let incident = Direction::new(1.0, -1.0, 0.0).normalize();
        let n = Direction::new(0.0, 1.0, 0.0);
        let r = dielectric_response(incident, n, true, 1.5);
        assert!((r.reflect_dir - Direction::new(1.0, 1.0, 0.0).normalize()).length() < 1e-9);
    }
}
