use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ImageBuffer, Luma, Rgb};

use crate::error::RenderError;
use crate::photon::PhotonMap;
use crate::render::FrameBuffer;

fn wrap_io(path: &Path, source: std::io::Error) -> RenderError {
    RenderError::OutputWrite { path: path.to_path_buf(), source }
}

/// Writes the RGB8 color buffer to a PNG, following
/// `doxxx-raytracer/src/main.rs`'s `convert_render_result_to_image`/
/// `write_render_result_to_file` pair, adapted to read an
/// already-quantized `FrameBuffer` instead of re-deriving color from a
/// running sample accumulator (`spec.md` §6, `SPEC_FULL.md` §4.P).
pub fn write_color_png(buffer: &FrameBuffer, path: &Path) -> Result<(), RenderError> {
    let mut image = ImageBuffer::<Rgb<u8>, Vec<u8>>::new(buffer.width, buffer.height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        *pixel = Rgb(buffer.color_at(x, y));
    }
    image.save(path).map_err(|e| wrap_io(path, io_error(e)))
}

/// Writes the per-pixel depth buffer as an 8-bit grayscale PNG, linearly
/// remapped against the finite maximum depth in the buffer so the
/// nearest hit is 255 and the farthest is 0 (`spec.md` §6); missed rays
/// (`f32::INFINITY`, excluded from the normalization pass) render as 0,
/// same as the farthest real hit.
pub fn write_depth_png(buffer: &FrameBuffer, path: &Path) -> Result<(), RenderError> {
    let max_depth = buffer
        .depth_buffer()
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .fold(0.0f32, f32::max)
        .max(1e-6);

    let mut image = ImageBuffer::<Luma<u8>, Vec<u8>>::new(buffer.width, buffer.height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let depth = buffer.depth_at(x, y);
        let normalized = if depth.is_finite() { (1.0 - depth / max_depth).clamp(0.0, 1.0) } else { 0.0 };
        *pixel = Luma([(normalized * 255.0).round() as u8]);
    }
    image.save(path).map_err(|e| wrap_io(path, io_error(e)))
}

/// Writes the per-pixel adaptive-sample-count buffer as an 8-bit
/// grayscale PNG, linearly remapped between the per-pixel minimum and
/// maximum sample count actually present in the buffer (`spec.md` §6) —
/// the visualization `spec.md` §8 scenario F exercises, where the flat
/// region should read as the minimum and the aliased region as the
/// maximum regardless of where `spp_min`/`spp_max` themselves sit.
pub fn write_sample_count_png(buffer: &FrameBuffer, path: &Path) -> Result<(), RenderError> {
    let counts = buffer.sample_count_buffer();
    let min = counts.iter().copied().min().unwrap_or(0) as f64;
    let max = counts.iter().copied().max().unwrap_or(0) as f64;
    let span = (max - min).max(1e-6);

    let mut image = ImageBuffer::<Luma<u8>, Vec<u8>>::new(buffer.width, buffer.height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let samples = buffer.sample_count_at(x, y) as f64;
        let normalized = ((samples - min) / span).clamp(0.0, 1.0);
        *pixel = Luma([(normalized * 255.0).round() as u8]);
    }
    image.save(path).map_err(|e| wrap_io(path, io_error(e)))
}

/// Dumps every photon in `map` as the fixed 28-byte little-endian record
/// of `spec.md` §6, directly via `Photon::to_dump_bytes` with no
/// serialization crate in between — the format is a closed, already
/// fully specified binary layout (`SPEC_FULL.md` §4.P).
pub fn write_photon_dump(map: &PhotonMap, path: &Path) -> Result<(), RenderError> {
    let file = File::create(path).map_err(|e| wrap_io(path, e))?;
    let mut writer = BufWriter::new(file);
    for photon in map.photons() {
        writer.write_all(&photon.to_dump_bytes()).map_err(|e| wrap_io(path, e))?;
    }
    writer.flush().map_err(|e| wrap_io(path, e))
}

fn io_error(e: image::ImageError) -> std::io::Error {
    match e {
        image::ImageError::IoError(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
    }
}
