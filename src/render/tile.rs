use rayon::prelude::*;

use crate::sampler::xorshift::Xorshift128;

use super::context::{RenderContext, RenderProgress};
use super::framebuffer::FrameBuffer;
use super::supersampler::sample_pixel;

const TILE_SIZE: u32 = 32;

/// A `tileSize × tileSize` (clipped at the image border) region of the
/// frame, enumerated in row-major order (`spec.md` §4.M).
#[derive(Debug, Clone, Copy)]
struct Tile {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

fn enumerate_tiles(width: u32, height: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            tiles.push(Tile { x0: x, y0: y, x1: (x + TILE_SIZE).min(width), y1: (y + TILE_SIZE).min(height) });
            x += TILE_SIZE;
        }
        y += TILE_SIZE;
    }
    tiles
}

/// The simulated-MPI rank this process is standing in for (`spec.md`
/// §4.M/§4.N, `SPEC_FULL.md` §5.O: a `Rank` is an in-process
/// `(rank_index, num_ranks)` pair — this crate has no MPI binding, so
/// ranks are simulated within a single process and their buffers
/// combined by `render::compose::gather` rather than exchanged as
/// network messages).
#[derive(Debug, Clone, Copy)]
pub struct Rank {
    pub index: usize,
    pub count: usize,
}

impl Rank {
    pub fn single() -> Rank {
        Rank { index: 0, count: 1 }
    }

    /// Rank `r` owns tiles `{r, r+S, r+2S, …}` (`spec.md` §4.M).
    fn owns(&self, tile_index: usize) -> bool {
        tile_index % self.count == self.index
    }
}

/// One tile's worth of finished pixel data, computed without touching
/// the shared `FrameBuffer` so tiles can be rendered concurrently
/// without mutable aliasing; `render::compose` (for multi-rank) or the
/// caller (single-rank) writes them back sequentially afterward.
struct TileResult {
    tile: Tile,
    pixels: Vec<(u32, u32, crate::math::Color, f64, u16, bool)>,
}

/// Renders every tile this rank owns into a fresh `FrameBuffer` the size
/// of the full image, leaving pixels owned by other ranks unmasked
/// (`spec.md` §4.M: "a top-level parallel-for over tiles, nested inside
/// a parallel-for over pixels"; grounded on `doxxx-raytracer/src/system.rs`'s
/// `render`, whose single `par_iter_mut` over rows is here
/// generalized to a two-level parallel-for over tiles then pixels, with
/// each pixel's samples computed independently and merged back
/// sequentially instead of written through a shared mutable reference).
pub fn render_rank<P: RenderProgress>(context: &RenderContext, rank: Rank, seed: u64, progress: &mut P) -> FrameBuffer {
    progress.render_started(&context.options);

    let mut buffer = FrameBuffer::new(context.options.width, context.options.height);
    let all_tiles = enumerate_tiles(context.options.width, context.options.height);
    let my_tiles: Vec<(usize, Tile)> = all_tiles.iter().enumerate().filter(|(i, _)| rank.owns(*i)).map(|(i, t)| (i, *t)).collect();
    let total = my_tiles.len();

    let mut tiles_done = 0usize;
    for (tile_index, tile) in my_tiles {
        if context.stop_requested() {
            break;
        }
        let result = render_tile(context, tile, seed.wrapping_add(tile_index as u64));
        for (x, y, color, z, samples, irradiance_computed) in result.pixels {
            buffer.set(x, y, color, z as f32, samples.min(u8::MAX as u16) as u8, context.options.srgb, irradiance_computed);
        }
        buffer.increment_rendered_pixels(((result.tile.x1 - result.tile.x0) * (result.tile.y1 - result.tile.y0)) as usize);
        tiles_done += 1;
        progress.tile_finished(&context.options, tiles_done, total);
    }

    progress.render_finished(&context.options);
    buffer
}

/// Computes every pixel in one tile, via a nested `rayon` parallel-for
/// (`spec.md` §4.M: "within a tile a second parallel-for distributes
/// pixels"). Each pixel gets its own worker-seeded sampler and its own
/// slice of the Halton sequence, offset by its flat pixel index so no
/// two pixels share jitter draws.
fn render_tile(context: &RenderContext, tile: Tile, tile_seed: u64) -> TileResult {
    let width = context.options.width;
    let xs: Vec<(u32, u32)> = (tile.y0..tile.y1).flat_map(|y| (tile.x0..tile.x1).map(move |x| (x, y))).collect();

    let pixels: Vec<(u32, u32, crate::math::Color, f64, u16, bool)> = xs
        .into_par_iter()
        .map(|(x, y)| {
            let flat_index = (y as u64) * width as u64 + x as u64;
            let mut sampler = Xorshift128::seeded(tile_seed.wrapping_add(flat_index).wrapping_mul(0x2545_F491_4F6C_DD1D));
            let halton_offset = flat_index.wrapping_mul(context.options.spp_max as u64 + 1);
            let sample = sample_pixel(&context.scene, &context.options, context.photon_maps.as_ref(), x, y, halton_offset, &mut sampler);
            (x, y, sample.color, sample.z, sample.samples, sample.irradiance_computed)
        })
        .collect();

    TileResult { tile, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_tile_the_whole_image_in_row_major_order() {
        let tiles = enumerate_tiles(70, 40);
        assert_eq!(tiles.len(), 3 * 2);
        assert_eq!((tiles[0].x0, tiles[0].y0), (0, 0));
        assert_eq!((tiles[2].x0, tiles[2].y0), (64, 0));
        assert_eq!((tiles[3].x0, tiles[3].y0), (0, 32));
        assert_eq!(tiles[2].x1, 70);
        assert_eq!(tiles[5].y1, 40);
    }

    #[test]
    fn rank_striping_partitions_tiles_without_overlap() {
        let tiles = enumerate_tiles(128, 128);
        let ranks: Vec<Rank> = (0..3).map(|i| Rank { index: i, count: 3 }).collect();
        let mut owners = vec![None; tiles.len()];
        for rank in &ranks {
            for i in 0..tiles.len() {
                if rank.owns(i) {
                    assert!(owners[i].is_none(), "tile {} claimed by two ranks", i);
                    owners[i] = Some(rank.index);
                }
            }
        }
        assert!(owners.iter().all(Option::is_some));
    }
}
