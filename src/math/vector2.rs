use std::ops::{Add, Mul, Sub};

/// A bare 2-component float pair, used for texture coordinates and their
/// screen-space derivatives.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2f(pub f64, pub f64);

impl Vector2f {
    pub fn zero() -> Vector2f {
        Vector2f(0.0, 0.0)
    }

    pub fn new(u: f64, v: f64) -> Vector2f {
        Vector2f(u, v)
    }
}

impl Add for Vector2f {
    type Output = Vector2f;
    fn add(self, rhs: Vector2f) -> Vector2f {
        Vector2f(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Sub for Vector2f {
    type Output = Vector2f;
    fn sub(self, rhs: Vector2f) -> Vector2f {
        Vector2f(self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl Mul<f64> for Vector2f {
    type Output = Vector2f;
    fn mul(self, rhs: f64) -> Vector2f {
        Vector2f(self.0 * rhs, self.1 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add() {
        assert_eq!(Vector2f(1.0, 2.0) + Vector2f(3.0, 4.0), Vector2f(4.0, 6.0));
    }

    #[test]
    fn scale() {
        assert_eq!(Vector2f(1.0, 2.0) * 2.0, Vector2f(2.0, 4.0));
    }
}
