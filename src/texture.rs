use image::{Pixel, RgbImage};

use crate::math::{Color, Vector2f};

/// Sampling contract every texture implements: map a 2-D texture
/// coordinate to a color. `spec.md` §1/§4.F puts the *implementations*
/// of checker and image textures beyond this contract out of scope
/// (parser/GUI concerns); this trait and the thin `Solid`/`Checkerboard`
/// cases backing `material`'s own tests are what's in scope.
pub trait ColorSource {
    fn color_at_uv(&self, uv: Vector2f) -> Color;
}

/// Tagged union over the texture kinds a (not-yet-existing) scene parser
/// could produce, grounded on `doxxx-raytracer/src/texture.rs`'s
/// `Texture` enum.
#[derive(Debug, Clone)]
pub enum Texture {
    Solid(Color),
    Checkerboard(Color, Color, f64),
    Image(RgbImage),
}

impl ColorSource for Texture {
    fn color_at_uv(&self, uv: Vector2f) -> Color {
        match self {
            Texture::Solid(c) => *c,
            Texture::Checkerboard(a, b, scale) => checkerboard(*a, *b, *scale, uv),
            Texture::Image(image) => sample_image(image, uv),
        }
    }
}

fn checkerboard(a: Color, b: Color, scale: f64, uv: Vector2f) -> Color {
    let u = (uv.0 * scale).rem_euclid(1.0);
    let v = (uv.1 * scale).rem_euclid(1.0);
    let parity = (u >= 0.5) ^ (v >= 0.5);
    if parity {
        a
    } else {
        b
    }
}

fn sample_image(image: &RgbImage, uv: Vector2f) -> Color {
    let u = uv.0.rem_euclid(1.0);
    let v = uv.1.rem_euclid(1.0);
    let x = ((u * image.width() as f64) as u32).min(image.width().saturating_sub(1));
    let y = ((v * image.height() as f64) as u32).min(image.height().saturating_sub(1));
    let channels = image.get_pixel(x, y).channels();
    Color::new(channels[0] as f64 / 255.0, channels[1] as f64 / 255.0, channels[2] as f64 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_ignores_uv() {
        let t = Texture::Solid(Color::new(0.2, 0.4, 0.6));
        assert_eq!(t.color_at_uv(Vector2f::new(0.9, 0.1)), Color::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn checkerboard_alternates_across_a_cell_boundary() {
        let t = Texture::Checkerboard(Color::white(), Color::black(), 1.0);
        assert_eq!(t.color_at_uv(Vector2f::new(0.1, 0.1)), Color::black());
        assert_eq!(t.color_at_uv(Vector2f::new(0.6, 0.1)), Color::white());
    }
}
