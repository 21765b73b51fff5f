use std::sync::atomic::{AtomicUsize, Ordering};

use crate::math::Color;

/// Packed per-pixel render output (`spec.md` §3 `FrameBuffer`): RGB8
/// color, `f32` depth, `u8` sample count, `u8` irradiance-computation
/// mask, and a write mask distinguishing pixels this rank actually
/// rendered from the zero-initialized rest, so a sparse gather across
/// ranks (`render::compose`) can tell them apart. Grounded in
/// `doxxx-raytracer/src/system.rs::alloc_render_buf`, generalized from a
/// single `Vec<Vec<Color>>` to the five packed arrays `spec.md` calls for
/// plus the atomic rendered-pixel counter.
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    color: Vec<[u8; 3]>,
    depth: Vec<f32>,
    sample_count: Vec<u8>,
    irradiance_mask: Vec<u8>,
    mask: Vec<u8>,
    rendered_pixels: AtomicUsize,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> FrameBuffer {
        let n = (width as usize) * (height as usize);
        FrameBuffer {
            width,
            height,
            color: vec![[0, 0, 0]; n],
            depth: vec![0.0; n],
            sample_count: vec![0; n],
            irradiance_mask: vec![0; n],
            mask: vec![0; n],
            rendered_pixels: AtomicUsize::new(0),
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    pub fn color_at(&self, x: u32, y: u32) -> [u8; 3] {
        self.color[self.index(x, y)]
    }

    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    pub fn sample_count_at(&self, x: u32, y: u32) -> u8 {
        self.sample_count[self.index(x, y)]
    }

    pub fn mask_at(&self, x: u32, y: u32) -> u8 {
        self.mask[self.index(x, y)]
    }

    /// `1` for pixels whose shading queried a photon map's
    /// `estimate_irradiance` (`spec.md` §3 `FrameBuffer`'s
    /// irradiance-computation mask), `0` otherwise.
    pub fn irradiance_mask_at(&self, x: u32, y: u32) -> u8 {
        self.irradiance_mask[self.index(x, y)]
    }

    pub fn rendered_pixels(&self) -> usize {
        self.rendered_pixels.load(Ordering::Relaxed)
    }

    pub fn increment_rendered_pixels(&self, by: usize) {
        self.rendered_pixels.fetch_add(by, Ordering::Relaxed);
    }

    /// Direct mutable access to one pixel's slot, used by the tile
    /// scheduler which partitions the buffer into disjoint per-tile
    /// slices before handing them to worker threads (`spec.md` §5: "each
    /// pixel index is written by exactly one thread").
    pub fn set(&mut self, x: u32, y: u32, color: Color, depth: f32, samples: u8, srgb: bool, irradiance_computed: bool) {
        let idx = self.index(x, y);
        self.color[idx] = color.to_rgb8(srgb);
        self.depth[idx] = depth as f32;
        self.sample_count[idx] = samples;
        self.irradiance_mask[idx] = irradiance_computed as u8;
        self.mask[idx] = 1;
    }

    /// Like `set`, but takes an already-quantized RGB8 triple instead of
    /// a linear `Color` — used by `render::compose::gather` to copy a
    /// peer rank's pixel through without re-encoding it.
    pub fn set_raw(&mut self, x: u32, y: u32, color: [u8; 3], depth: f32, samples: u8, irradiance_computed: u8) {
        let idx = self.index(x, y);
        self.color[idx] = color;
        self.depth[idx] = depth;
        self.sample_count[idx] = samples;
        self.irradiance_mask[idx] = irradiance_computed;
        self.mask[idx] = 1;
    }

    pub fn color_buffer(&self) -> &[[u8; 3]] {
        &self.color
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth
    }

    pub fn sample_count_buffer(&self) -> &[u8] {
        &self.sample_count
    }

    pub fn mask_buffer(&self) -> &[u8] {
        &self.mask
    }

    pub fn irradiance_mask_buffer(&self) -> &[u8] {
        &self.irradiance_mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_is_zeroed_and_unmasked() {
        let fb = FrameBuffer::new(4, 4);
        assert_eq!(fb.mask_at(1, 1), 0);
        assert_eq!(fb.irradiance_mask_at(1, 1), 0);
        assert_eq!(fb.color_at(1, 1), [0, 0, 0]);
    }

    #[test]
    fn set_marks_the_mask_bit() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.set(1, 0, Color::white(), 3.5, 4, false, true);
        assert_eq!(fb.mask_at(1, 0), 1);
        assert_eq!(fb.irradiance_mask_at(1, 0), 1);
        assert_eq!(fb.color_at(1, 0), [255, 255, 255]);
        assert_eq!(fb.depth_at(1, 0), 3.5);
        assert_eq!(fb.sample_count_at(1, 0), 4);
        assert_eq!(fb.mask_at(0, 0), 0);
        assert_eq!(fb.irradiance_mask_at(0, 0), 0);
    }

    #[test]
    fn rendered_pixel_counter_accumulates_atomically() {
        let fb = FrameBuffer::new(4, 4);
        fb.increment_rendered_pixels(3);
        fb.increment_rendered_pixels(5);
        assert_eq!(fb.rendered_pixels(), 8);
    }
}
