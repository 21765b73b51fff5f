pub mod fresnel;

use crate::geometry::{DiffHitInfo, DiffRay, Ray, SideMask};
use crate::lights::Light;
use crate::math::{Color, Direction, Dot, Point, Vector2f};
use crate::photon::PhotonMaps;
use crate::sampler::{warps, Sampler};
use crate::scene::Scene;
use crate::texture::ColorSource;

/// How many stored photons feed one `EstimateIrradiance` query
/// (`spec.md` §4.I/§4.J).
const PHOTON_ESTIMATE_K: usize = 100;
/// Below this L∞-luma a lobe is treated as non-contributing when
/// selecting a photon-emission bounce (`spec.md` §4.K).
const PHOTON_LUMA_EPSILON: f64 = 1e-4;

/// A texture-or-solid-color material input, resolved against a hit's
/// `(u, v)` the same way for every channel (`spec.md` §3/§4.I).
#[derive(Debug, Clone, Copy)]
pub struct MaterialChannel {
    pub color: Color,
    pub texture: Option<usize>,
}

impl MaterialChannel {
    pub fn solid(color: Color) -> MaterialChannel {
        MaterialChannel { color, texture: None }
    }

    pub fn none() -> MaterialChannel {
        MaterialChannel::solid(Color::black())
    }

    pub fn textured(color: Color, texture: usize) -> MaterialChannel {
        MaterialChannel { color, texture: Some(texture) }
    }

    fn sample(&self, scene: &Scene, uv: Vector2f) -> Color {
        match self.texture {
            Some(index) => self.color * scene.textures[index].color_at_uv(uv),
            None => self.color,
        }
    }
}

/// The Blinn-Phong-with-Fresnel material of `spec.md` §3/§4.I: four
/// weighted lobes (diffuse, specular, reflection, refraction) plus
/// emission and Beer-Lambert absorption, grounded on
/// `original_source/src/materials/MtlBlinn_PhotonMap.cpp`.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub diffuse: MaterialChannel,
    pub specular: MaterialChannel,
    pub reflection: MaterialChannel,
    pub refraction: MaterialChannel,
    pub emission: MaterialChannel,
    /// Beer-Lambert absorption coefficient, applied per channel on back
    /// hits as `exp(-sigma_a * z)`.
    pub absorption: Color,
    pub specular_glossiness: f64,
    /// `0.0` is an ideal mirror; values in `(0, 1]` widen the reflection
    /// lobe via a Phong-style exponent `1 / glossiness`.
    pub reflection_glossiness: f64,
    pub refraction_glossiness: f64,
    pub ior: f64,
    /// Russian-roulette termination probability used by the photon
    /// emission pass (`spec.md` §4.K); unused by eye-ray shading.
    pub roulette_kill: f64,
}

impl Material {
    pub fn diffuse(color: Color) -> Material {
        Material {
            diffuse: MaterialChannel::solid(color),
            specular: MaterialChannel::none(),
            reflection: MaterialChannel::none(),
            refraction: MaterialChannel::none(),
            emission: MaterialChannel::none(),
            absorption: Color::black(),
            specular_glossiness: 1.0,
            reflection_glossiness: 1.0,
            refraction_glossiness: 1.0,
            ior: 1.0,
            roulette_kill: 0.1,
        }
    }

    /// A convenience constructor standing in for a metal: since the
    /// shader's Fresnel term is the dielectric Schlick curve, a large
    /// `ior` is used here to approximate a near-constant high
    /// reflectance rather than the low normal-incidence reflectance a
    /// true glass-range `ior` would give.
    pub fn mirror(color: Color) -> Material {
        Material { reflection: MaterialChannel::solid(color), reflection_glossiness: 0.0, ior: 10.0, ..Material::diffuse(Color::black()) }
    }

    pub fn glass(ior: f64, color: Color) -> Material {
        Material {
            reflection: MaterialChannel::solid(color),
            refraction: MaterialChannel::solid(color),
            reflection_glossiness: 0.0,
            refraction_glossiness: 0.0,
            ior,
            ..Material::diffuse(Color::black())
        }
    }

    pub fn with_specular(mut self, color: Color, glossiness: f64) -> Material {
        self.specular = MaterialChannel::solid(color);
        self.specular_glossiness = glossiness;
        self
    }

    pub fn with_emission(mut self, color: Color) -> Material {
        self.emission = MaterialChannel::solid(color);
        self
    }

    /// "Ideal diffuse" in the photon-mapping sense used to route global
    /// photon deposits: no reflection or refraction component at all
    /// (`spec.md` §4.J).
    pub fn is_diffuse_photon_surface(&self) -> bool {
        self.reflection.color.is_black() && self.refraction.color.is_black()
    }

    fn samples(&self, scene: &Scene, uv: Vector2f) -> SampledChannels {
        SampledChannels {
            diffuse: self.diffuse.sample(scene, uv),
            specular: self.specular.sample(scene, uv),
            reflection: self.reflection.sample(scene, uv),
            refraction: self.refraction.sample(scene, uv),
            emission: self.emission.sample(scene, uv),
        }
    }

    /// The full shading evaluation at one hit point: direct lighting via
    /// shadow rays, one stochastic indirect bounce, photon-map gather,
    /// and Beer attenuation on exit. Grounded on
    /// `original_source/src/materials/MtlBlinn_PhotonMap.cpp::Shade`.
    ///
    /// `came_through_specular` is true once the eye-ray path has taken at
    /// least one reflection/refraction/specular lobe; it gates whether
    /// the global photon map substitutes for the Monte-Carlo diffuse
    /// bounce here (`spec.md` §4.I: "if reached via a non-diffuse chain,
    /// gather the global photon map; otherwise propagate via one
    /// Monte-Carlo diffuse bounce only").
    pub fn shade(
        &self,
        scene: &Scene,
        ray: &DiffRay,
        hit: &DiffHitInfo,
        sampler: &mut dyn Sampler,
        bounce: u16,
        photon_maps: Option<&PhotonMaps>,
        came_through_specular: bool,
    ) -> (Color, bool) {
        let c = samples_for(self, scene, hit);
        let irradiance_computed = photon_maps.is_some() && !c.diffuse.is_black();
        let n = hit.c.n;
        let p = hit.c.p;
        let front_hit = hit.c.front_hit;
        let view = -ray.c.direction;

        let fresnel::DielectricResponse { kr, reflect_dir, refract_dir } =
            fresnel::dielectric_response(ray.c.direction, n, front_hit, self.ior);

        let eff_reflection = c.reflection * kr;
        let eff_refraction = match refract_dir {
            Some(_) => c.refraction * (1.0 - kr),
            None => Color::black(),
        };

        let use_photon_global = photon_maps.is_some() && came_through_specular && !c.diffuse.is_black();

        let w_refr = eff_refraction.luma_linf();
        let w_refl = eff_reflection.luma_linf();
        let w_spec = c.specular.luma_linf();
        let w_diff = if use_photon_global { 0.0 } else { c.diffuse.luma_linf() };
        let w_sum = w_refr + w_refl + w_spec + w_diff;
        let (w_refr, w_refl, w_spec, w_diff) = if w_sum > 0.0 {
            (w_refr / w_sum, w_refl / w_sum, w_spec / w_sum, w_diff / w_sum)
        } else {
            (0.0, 0.0, 0.0, 0.0)
        };

        let mut out = c.emission;
        out += self.direct_lighting(scene, &c, p, n, view, sampler);
        out += self.photon_contribution(photon_maps, &c, p, n, use_photon_global);

        if bounce > 0 {
            out += self.indirect_lighting(
                scene, ray, &c, p, n, view, sampler, bounce, photon_maps, came_through_specular,
                w_refr, w_refl, w_spec, w_diff, eff_refraction, eff_reflection, refract_dir, reflect_dir,
            );
        }

        if !front_hit && !self.absorption.is_black() {
            out = out * (self.absorption * -hit.c.z).exp();
        }
        (out, irradiance_computed)
    }

    /// `spec.md` §4.I step 4: `(1/|non-ambient lights|) * L_in * cos(N,L)
    /// * (k_d + k_s (N.H)^ns)`, with ambient lights added unconditionally
    /// and outside the average (`spec.md` §9's flagged divisor bug, fixed
    /// per `DESIGN.md`).
    fn direct_lighting(&self, scene: &Scene, c: &SampledChannels, p: Point, n: Direction, view: Direction, sampler: &mut dyn Sampler) -> Color {
        let mut total = Color::black();
        let divisor = scene.non_ambient_light_count().max(1) as f64;
        for light in &scene.lights {
            if let Light::Ambient(_) = light {
                total += c.diffuse * light.intensity();
                continue;
            }
            let l_dir = match light {
                Light::Directional(d) => d.direction_to_light(),
                Light::Point(pt) => (pt.position - p).normalize(),
                Light::Ambient(_) => unreachable!(),
            };
            let cos_nl = n.dot(l_dir).max(0.0);
            if cos_nl <= 0.0 {
                continue;
            }
            let l_in = light.illuminate(scene, p, n, sampler);
            if l_in.is_black() {
                continue;
            }
            let h = (view + l_dir).normalize();
            let spec_term = c.specular * n.dot(h).max(0.0).powf(self.specular_glossiness);
            total += l_in * cos_nl * (c.diffuse + spec_term) / divisor;
        }
        total
    }

    /// Caustics are always gathered at diffuse surfaces; the global map
    /// is gathered only when it stands in for the Monte-Carlo diffuse
    /// bounce (`use_photon_global`, computed in `shade`).
    fn photon_contribution(&self, photon_maps: Option<&PhotonMaps>, c: &SampledChannels, p: Point, n: Direction, use_photon_global: bool) -> Color {
        let Some(maps) = photon_maps else { return Color::black() };
        if c.diffuse.is_black() {
            return Color::black();
        }
        let mut total = maps.caustics.estimate_irradiance(p, n, PHOTON_ESTIMATE_K, maps.caustics_radius) * c.diffuse;
        if use_photon_global {
            total += maps.global.estimate_irradiance(p, n, PHOTON_ESTIMATE_K, maps.global_radius) * c.diffuse;
        }
        total
    }

    /// Draws one lobe by the normalized luma weights and spawns one
    /// secondary ray for it, dividing by the lobe's own selection
    /// probability (`spec.md` §4.I step 5). `eff_refraction`/
    /// `eff_reflection` already carry the Fresnel split, so they're used
    /// directly as the lobe's throughput color.
    #[allow(clippy::too_many_arguments)]
    fn indirect_lighting(
        &self,
        scene: &Scene,
        ray: &DiffRay,
        c: &SampledChannels,
        p: Point,
        n: Direction,
        view: Direction,
        sampler: &mut dyn Sampler,
        bounce: u16,
        photon_maps: Option<&PhotonMaps>,
        came_through_specular: bool,
        w_refr: f64,
        w_refl: f64,
        w_spec: f64,
        w_diff: f64,
        eff_refraction: Color,
        eff_reflection: Color,
        refract_dir: Option<Direction>,
        reflect_dir: Direction,
    ) -> Color {
        let u = sampler.get_f1();

        let (pdf, scatter_dir, weight, took_specular_lobe) = if u < w_refr {
            let dir = sample_glossy_lobe(refract_dir.expect("refraction lobe selected with no refraction direction"), self.refraction_glossiness, sampler);
            (w_refr, dir, eff_refraction, true)
        } else if u < w_refr + w_refl {
            let dir = sample_glossy_lobe(reflect_dir, self.reflection_glossiness, sampler);
            (w_refl, dir, eff_reflection, true)
        } else if u < w_refr + w_refl + w_spec {
            let dir = warps::transform_to_local_frame(n, warps::cos_weighted_hemisphere(sampler));
            let h = (view + dir).normalize();
            (w_spec, dir, c.specular * n.dot(h).max(0.0).powf(self.specular_glossiness), true)
        } else if u < w_refr + w_refl + w_spec + w_diff {
            let dir = warps::transform_to_local_frame(n, warps::cos_weighted_hemisphere(sampler));
            (w_diff, dir, c.diffuse, false)
        } else {
            return Color::black();
        };

        if pdf <= 0.0 || weight.is_black() {
            return Color::black();
        }

        let secondary = Ray::with_depth(p + scatter_dir * crate::math::BIAS, scatter_dir, ray.c.depth + 1);
        let next_chain_flag = came_through_specular || took_specular_lobe;
        let incoming = trace_and_shade(scene, &DiffRay::degenerate(secondary), sampler, bounce - 1, photon_maps, next_chain_flag).color;
        weight * incoming / pdf
    }

    /// A single photon-emission bounce (`spec.md` §4.K point 2):
    /// importance-samples one lobe (transmit/reflect/diffuse/absorb) by
    /// L∞-luma weight, including the `roulette_kill` probability as a
    /// weighted absorb option, and rescales the carried photon `color`
    /// by `BxDF / (PDF · weight)` in place. Returns `false` when the
    /// photon is absorbed or killed by roulette, terminating the trace.
    /// Grounded on `RandomSelectMtl`/`SampleTransmitBxDF`/
    /// `SampleReflectionBxDF`/`SampleDiffuseBxDF` in
    /// `original_source/src/materials/MtlBlinn_PhotonMap.cpp`.
    pub fn random_photon_bounce(&self, scene: &Scene, ray: &mut DiffRay, color: &mut Color, hit: &DiffHitInfo, sampler: &mut dyn Sampler) -> bool {
        let c = samples_for(self, scene, hit);
        let n = hit.c.n;
        let p = hit.c.p;
        let front_hit = hit.c.front_hit;
        let view = -ray.c.direction;
        let y = if n.dot(view) > 0.0 { n } else { -n };

        let fresnel::DielectricResponse { kr, reflect_dir, refract_dir } =
            fresnel::dielectric_response(ray.c.direction, n, front_hit, self.ior);

        let eff_reflection = c.reflection * kr;
        let eff_refraction = match refract_dir {
            Some(_) => c.refraction * (1.0 - kr),
            None => Color::black(),
        };

        let luma_transmit = eff_refraction.luma_linf();
        let luma_reflect = eff_reflection.luma_linf();
        let luma_diffuse = c.diffuse.luma_linf();

        let coef_transmit = luma_transmit;
        let coef_reflect = coef_transmit + luma_reflect;
        let coef_diffuse = coef_reflect + luma_diffuse;
        let coef_absorb = coef_diffuse + self.roulette_kill;
        let coef_sum = coef_absorb;
        if coef_sum <= 0.0 {
            return false;
        }
        let select = sampler.get_f1() * coef_sum;

        let (scatter_dir, bxdf, pdf, weight) = if select < coef_transmit && luma_transmit > PHOTON_LUMA_EPSILON {
            let ideal = refract_dir.expect("transmit lobe selected with no refraction direction");
            let (dir, bxdf, pdf) = sample_transmit_photon_lobe(ideal, self.refraction_glossiness, n, y, eff_refraction, sampler);
            (dir, bxdf, pdf, luma_transmit / coef_sum)
        } else if select < coef_reflect && luma_reflect > PHOTON_LUMA_EPSILON {
            let (dir, bxdf, pdf) = sample_reflect_photon_lobe(reflect_dir, self.reflection_glossiness, y, eff_reflection, sampler);
            (dir, bxdf, pdf, luma_reflect / coef_sum)
        } else if select < coef_diffuse && luma_diffuse > PHOTON_LUMA_EPSILON {
            if !front_hit {
                return false;
            }
            let dir = warps::transform_to_local_frame(n, warps::uniform_hemisphere(sampler));
            let h = (view + dir).normalize();
            let bxdf = c.diffuse + c.specular * n.dot(h).max(0.0).powf(self.specular_glossiness);
            (dir, bxdf, 0.5, luma_diffuse / coef_sum)
        } else {
            return false;
        };

        if pdf <= 0.0 || weight <= 0.0 || bxdf.is_black() {
            return false;
        }

        *ray = DiffRay::degenerate(Ray::with_depth(p + scatter_dir * crate::math::BIAS, scatter_dir, ray.c.depth + 1));
        *color = *color * bxdf / (pdf * weight);
        if !front_hit && !self.absorption.is_black() {
            *color = *color * (self.absorption * -hit.c.z).exp();
        }
        true
    }
}

/// `SampleTransmitBxDF(..., photonMap=true)`: glossy refraction is a
/// rejection-sampled `UniformBall(glossiness)` perturbation of the ideal
/// transmission direction kept on the transmitted side of `y`; the ideal
/// (`glossiness <= 0`) case passes straight through with `PDF = 1`.
fn sample_transmit_photon_lobe(ideal_dir: Direction, glossiness: f64, n: Direction, y: Direction, color: Color, sampler: &mut dyn Sampler) -> (Direction, Color, f64) {
    if glossiness <= 0.0 {
        return (ideal_dir, color, 1.0);
    }
    let dir = loop {
        let candidate = (ideal_dir.normalize() + warps::uniform_ball(glossiness, sampler)).normalize();
        if candidate.dot(y) <= 0.0 {
            break candidate;
        }
    };
    let cos_nl = n.dot(dir).max(0.0);
    let y0 = (1.0 / (glossiness * glossiness + 1.0)).sqrt();
    let y1 = (1.0 - cos_nl * cos_nl).max(0.0).sqrt();
    let pdf = 0.5 / (1.0 - y0.max(y1));
    (dir, color, pdf)
}

/// `SampleReflectionBxDF(..., photonMap=true)`: same rejection-sampled
/// perturbation, kept on the reflected side of `y`; `PDF = 1` in both
/// the ideal and glossy case (the original leaves the glossy reflection
/// PDF uncorrected for the same reason).
fn sample_reflect_photon_lobe(ideal_dir: Direction, glossiness: f64, y: Direction, color: Color, sampler: &mut dyn Sampler) -> (Direction, Color, f64) {
    if glossiness <= 0.0 {
        return (ideal_dir, color, 1.0);
    }
    let dir = loop {
        let candidate = (ideal_dir.normalize() + warps::uniform_ball(glossiness, sampler)).normalize();
        if candidate.dot(y) >= 0.0 {
            break candidate;
        }
    };
    (dir, color, 1.0)
}

struct SampledChannels {
    diffuse: Color,
    specular: Color,
    reflection: Color,
    refraction: Color,
    emission: Color,
}

fn samples_for(material: &Material, scene: &Scene, hit: &DiffHitInfo) -> SampledChannels {
    material.samples(scene, hit.c.uv)
}

/// Perturbs `center_dir` by a cosine-weighted hemisphere sample and
/// weights it by `(cos angle to center)^(1/glossiness)`; `glossiness ==
/// 0.0` takes the ideal (unperturbed) direction instead (`spec.md`
/// §4.I step 5).
fn sample_glossy_lobe(center_dir: Direction, glossiness: f64, sampler: &mut dyn Sampler) -> Direction {
    if glossiness <= 0.0 {
        return center_dir;
    }
    warps::transform_to_local_frame(center_dir, warps::cos_weighted_hemisphere(sampler))
}

/// The result of tracing one ray all the way to a shaded color, plus the
/// hit distance of its *own* (not any recursive) intersection — the only
/// piece of information the depth/z-buffer auxiliary image needs
/// (`spec.md` §4.L) — and whether shading this hit queried a photon map's
/// `estimate_irradiance`, the event `FrameBuffer`'s irradiance-computation
/// mask records (`spec.md` §3 `FrameBuffer`).
pub struct ShadeResult {
    pub color: Color,
    pub z: f64,
    pub irradiance_computed: bool,
}

/// The renderer's single recursive entry point: trace, look up the hit
/// material, shade. Lives in `material` rather than `render` because the
/// material shader is what spawns the secondary rays that drive the
/// recursion (`spec.md` §4.I/§4.L).
pub fn trace_and_shade(
    scene: &Scene,
    ray: &DiffRay,
    sampler: &mut dyn Sampler,
    bounce: u16,
    photon_maps: Option<&PhotonMaps>,
    came_through_specular: bool,
) -> ShadeResult {
    let mut hit = DiffHitInfo::new();
    let did_hit = scene.root.trace_normal(scene, ray, &mut hit, SideMask::Both);
    if !did_hit {
        return ShadeResult { color: scene.background, z: f64::INFINITY, irradiance_computed: false };
    }
    let (color, irradiance_computed) = match hit.c.material_index.and_then(|i| scene.materials.get(i)) {
        Some(material) => material.shade(scene, ray, &hit, sampler, bounce, photon_maps, came_through_specular),
        None => (Color::black(), false),
    };
    ShadeResult { color, z: hit.c.z, irradiance_computed }
}
