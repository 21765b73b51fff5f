use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// Linear RGB radiance/reflectance color, always non-negative in practice
/// (the renderer never clamps until the final 8-bit quantization).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    pub fn black() -> Color {
        Color::new(0.0, 0.0, 0.0)
    }

    pub fn white() -> Color {
        Color::new(1.0, 1.0, 1.0)
    }

    pub fn gray(v: f64) -> Color {
        Color::new(v, v, v)
    }

    /// The L-infinity "luma" `spec.md` calls for when weighting BxDF
    /// lobes: the largest of the three channels, not a perceptual
    /// luminance average.
    pub fn luma_linf(&self) -> f64 {
        self.r.max(self.g).max(self.b)
    }

    pub fn is_black(&self) -> bool {
        self.luma_linf() <= 0.0
    }

    pub fn clamp01(&self) -> Color {
        Color::new(self.r.clamp(0.0, 1.0), self.g.clamp(0.0, 1.0), self.b.clamp(0.0, 1.0))
    }

    fn srgb_channel(c: f64) -> f64 {
        if c <= 0.0031308 {
            12.92 * c
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    }

    pub fn to_srgb(&self) -> Color {
        Color::new(
            Self::srgb_channel(self.r),
            Self::srgb_channel(self.g),
            Self::srgb_channel(self.b),
        )
    }

    /// Quantizes a color already clamped to `[0,1]` to 8-bit RGB,
    /// optionally applying the sRGB encode first.
    pub fn to_rgb8(&self, srgb: bool) -> [u8; 3] {
        let c = if srgb { self.to_srgb() } else { *self };
        let c = c.clamp01();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }

    pub fn exp(&self) -> Color {
        Color::new(self.r.exp(), self.g.exp(), self.b.exp())
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl Sub for Color {
    type Output = Color;
    fn sub(self, rhs: Color) -> Color {
        Color::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Mul for Color {
    type Output = Color;
    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f64> for Color {
    type Output = Color;
    fn mul(self, rhs: f64) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Mul<Color> for f64 {
    type Output = Color;
    fn mul(self, rhs: Color) -> Color {
        rhs * self
    }
}

impl Div<f64> for Color {
    type Output = Color;
    fn div(self, rhs: f64) -> Color {
        Color::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_is_max_channel() {
        assert_eq!(Color::new(0.2, 0.8, 0.5).luma_linf(), 0.8);
    }

    #[test]
    fn add_and_scale() {
        let a = Color::new(0.1, 0.2, 0.3);
        let b = Color::new(0.4, 0.4, 0.4);
        assert_eq!(a + b, Color::new(0.5, 0.6, 0.7));
        assert_eq!(a * 2.0, Color::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn srgb_black_and_white_are_fixed_points() {
        assert_eq!(Color::black().to_srgb(), Color::black());
        let white = Color::white().to_srgb();
        assert!((white.r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn to_rgb8_quantizes() {
        assert_eq!(Color::new(1.0, 0.0, 0.5).to_rgb8(false), [255, 0, 128]);
    }
}
