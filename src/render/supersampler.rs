use crate::material::{trace_and_shade, ShadeResult};
use crate::math::Color;
use crate::photon::PhotonMaps;
use crate::sampler::halton::radical_inverse;
use crate::sampler::Sampler;
use crate::scene::Scene;

use super::context::RenderOptions;

/// One pixel's adaptively-supersampled result: the running-mean color,
/// the depth recorded from sample 0 only, how many samples it took
/// (`spec.md` §4.L), and whether sample 0 queried a photon map (`spec.md`
/// §3 `FrameBuffer`'s irradiance-computation mask), mirroring the
/// sample-0-only convention already used for depth.
pub struct PixelSample {
    pub color: Color,
    pub z: f64,
    pub samples: u16,
    pub irradiance_computed: bool,
}

/// Runs the adaptive per-pixel sampling loop of `spec.md` §4.L: keeps
/// drawing jittered primary samples, updating a running mean/variance
/// via Welford's algorithm, until `spp_min` samples have been taken and
/// either `spp_max` is reached or every color channel's estimated
/// standard error has dropped under `options.variance_threshold`.
/// Grounded on `doxxx-raytracer/src/system.rs`'s `color_at_pixel` (the single-sample
/// primary-ray cast) generalized from a fixed sample count to this
/// adaptive stopping rule.
pub fn sample_pixel(scene: &Scene, options: &RenderOptions, photon_maps: Option<&PhotonMaps>, x: u32, y: u32, halton_offset: u64, sampler: &mut dyn Sampler) -> PixelSample {
    let mut mean = Color::black();
    let mut variance = Color::black();
    let mut z = f64::INFINITY;
    let mut irradiance_computed = false;
    let mut s: u16 = 0;

    loop {
        let index = halton_offset + s as u64;
        let jitter_x = radical_inverse(index, 11);
        let jitter_y = radical_inverse(index, 13);

        let px = x as f64 + jitter_x;
        let py = y as f64 + jitter_y;

        let ray = if scene.camera.aperture_radius > 0.0 { scene.camera.dof_diff_ray(px, py, sampler) } else { scene.camera.primary_diff_ray(px, py) };

        let ShadeResult { color: sample_color, z: sample_z, irradiance_computed: sample_irradiance_computed } = trace_and_shade(scene, &ray, sampler, 0, photon_maps, false);
        if s == 0 {
            z = sample_z;
            irradiance_computed = sample_irradiance_computed;
        }

        let n = s as f64 + 1.0;
        let delta = (sample_color - mean) / n;
        mean += delta;
        let prior_variance = if s == 0 { Color::black() } else { variance / s as f64 };
        variance = variance + delta * delta * n - prior_variance;

        s += 1;

        if s >= options.spp_max {
            break;
        }
        if s >= options.spp_min && below_threshold(&variance, s, options.variance_threshold) {
            break;
        }
    }

    PixelSample { color: mean, z, samples: s, irradiance_computed }
}

fn below_threshold(variance: &Color, s: u16, threshold: f64) -> bool {
    let stderr = |v: f64| (v.max(0.0) / s as f64).sqrt();
    stderr(variance.r) <= threshold && stderr(variance.g) <= threshold && stderr(variance.b) <= threshold
}
