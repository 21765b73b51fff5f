pub mod compose;
pub mod context;
pub mod framebuffer;
pub mod supersampler;
pub mod tile;

pub use context::{PhotonPass, RenderContext, RenderOptions, RenderProgress, SilentProgress};
pub use framebuffer::FrameBuffer;
pub use tile::Rank;

use crate::photon::{caustics_seed, emit_map, PhotonMapParams, PhotonMaps};
use crate::scene::Scene;

/// Builds a `RenderContext` for `scene` under `options`, emitting the
/// photon maps first when `options.use_photon_map` is set (`spec.md`
/// §4.K runs emission to completion before any camera ray is traced).
/// Reports each pass through `progress` so a caller can drive a
/// progress bar across the photon-emission phase, not just rendering.
pub fn prepare<P: RenderProgress>(scene: Scene, options: RenderOptions, seed: u64, progress: &mut P) -> RenderContext {
    let photon_maps = if options.use_photon_map {
        let global_params = PhotonMapParams::new(options.photon_global_count, options.photon_global_radius, options.max_bounce);
        let caustics_params = PhotonMapParams::new(options.photon_caustics_count, options.photon_caustics_radius, options.max_bounce);

        progress.photon_pass_started(PhotonPass::Global, global_params.size);
        let global = emit_map(&scene, seed, global_params, false);
        progress.photon_pass_finished(PhotonPass::Global, global.len());

        progress.photon_pass_started(PhotonPass::Caustics, caustics_params.size);
        let caustics = emit_map(&scene, caustics_seed(seed), caustics_params, true);
        progress.photon_pass_finished(PhotonPass::Caustics, caustics.len());

        Some(PhotonMaps { global, caustics, global_radius: global_params.radius, caustics_radius: caustics_params.radius })
    } else {
        None
    };
    RenderContext::new(options, scene, photon_maps)
}

/// Single-process convenience entry point: renders the whole image as
/// one simulated rank (`Rank::single()`) and reports progress through
/// `progress`. Multi-rank composition (`render::compose::gather`) is
/// exercised directly by callers that want to simulate more than one
/// rank, e.g. for testing the composer.
pub fn render<P: RenderProgress>(context: &RenderContext, seed: u64, progress: &mut P) -> FrameBuffer {
    tile::render_rank(context, Rank::single(), seed, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::math::{Color, Direction, Point};
    use crate::scene::{Camera, Node};
    use crate::shapes::{Shape, Sphere};

    fn small_scene() -> Scene {
        let mut scene = Scene::new(Camera::look_at(
            Point::new(0.0, 0.0, 5.0),
            Point::zero(),
            Direction::new(0.0, 1.0, 0.0),
            40.0,
            5.0,
            0.0,
            8,
            8,
        ));
        let shape = scene.add_shape(Shape::Sphere(Sphere::new()));
        let material_index = scene.add_material(Material::diffuse(Color::white()));
        scene.root = Node::new("root").add_child(Node::new("sphere").with_object(shape, material_index));
        scene.background = Color::black();
        scene.add_light(crate::lights::Light::ambient(Color::gray(0.5)));
        scene.finalize();
        scene
    }

    #[test]
    fn rendering_without_photon_maps_produces_a_full_masked_image() {
        let scene = small_scene();
        let options = RenderOptions { width: 8, height: 8, spp_min: 1, spp_max: 2, ..RenderOptions::default() };
        let context = prepare(scene, options, 1, &mut SilentProgress);
        let mut progress = SilentProgress;
        let buffer = render(&context, 1, &mut progress);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(buffer.mask_at(x, y), 1);
            }
        }
        assert_eq!(buffer.rendered_pixels(), 64);
    }

    #[test]
    fn rendering_two_simulated_ranks_and_gathering_covers_the_whole_image() {
        let scene_a = small_scene();
        let scene_b = small_scene();
        let options = RenderOptions { width: 8, height: 8, spp_min: 1, spp_max: 1, ..RenderOptions::default() };
        let ctx_a = prepare(scene_a, options, 1, &mut SilentProgress);
        let ctx_b = prepare(scene_b, options, 1, &mut SilentProgress);

        let mut progress = SilentProgress;
        let buf_a = tile::render_rank(&ctx_a, Rank { index: 0, count: 2 }, 1, &mut progress);
        let buf_b = tile::render_rank(&ctx_b, Rank { index: 1, count: 2 }, 1, &mut progress);

        let master = compose::gather(8, 8, vec![buf_a, buf_b]);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(master.mask_at(x, y), 1);
            }
        }
    }
}
