use crate::math::{Direction, Matrix3, Point};

/// Local-to-world transform for a scene node: a linear part `m`, its
/// cached inverse `m_inv`, and a translation `t` kept separate from the
/// linear part so that direction transforms never pick up a translation
/// component. Grounded on `original_source`'s `Transformation{pos, tm,
/// itm}`, which uses the same 3x3-plus-translation shape rather than a
/// homogeneous 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    m: Matrix3,
    m_inv: Matrix3,
    t: Direction,
}

impl Transformation {
    pub fn identity() -> Transformation {
        Transformation { m: Matrix3::identity(), m_inv: Matrix3::identity(), t: Direction::zero() }
    }

    pub fn transform_from(&self, p: Point) -> Point {
        self.m.apply(p.to_dir()).to_point() + self.t
    }

    pub fn transform_to(&self, p: Point) -> Point {
        self.m_inv.apply((p - self.t).to_dir()).to_point()
    }

    /// `(M^-1)^T * v`: world direction -> local direction.
    pub fn vector_transform_from(&self, v: Direction) -> Direction {
        self.m_inv.transpose_apply(v)
    }

    /// `M^T * v`: local direction -> world direction.
    pub fn vector_transform_to(&self, v: Direction) -> Direction {
        self.m.transpose_apply(v)
    }

    /// Post-multiplies a compound linear transform: `M <- R*M`,
    /// `t <- R*t`, and rebuilds the inverse.
    pub fn compound(&mut self, r: Matrix3) {
        self.m = r * self.m;
        self.t = r.apply(self.t);
        self.m_inv = self.m.inverse();
    }

    pub fn translate(&mut self, d: Direction) {
        self.t += d;
    }

    pub fn rotate(&mut self, axis: Direction, degrees: f64) {
        self.compound(Matrix3::rotation(axis, degrees));
    }

    pub fn scale(&mut self, s: Direction) {
        self.compound(Matrix3::scaling(s));
    }

    pub fn translated(mut self, d: Direction) -> Transformation {
        self.translate(d);
        self
    }

    pub fn rotated(mut self, axis: Direction, degrees: f64) -> Transformation {
        self.rotate(axis, degrees);
        self
    }

    pub fn scaled(mut self, s: Direction) -> Transformation {
        self.scale(s);
        self
    }
}

impl Default for Transformation {
    fn default() -> Transformation {
        Transformation::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq_point(a: Point, b: Point) -> bool {
        (a - b).length() < 1e-4
    }

    fn approx_eq_dir(a: Direction, b: Direction) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn round_trip_points_through_translation_and_rotation() {
        let tx = Transformation::identity()
            .rotated(Direction::new(0.0, 1.0, 0.0), 37.0)
            .translated(Direction::new(1.0, 2.0, 3.0));
        let p = Point::new(0.4, -1.1, 2.7);
        let round_tripped = tx.transform_from(tx.transform_to(p));
        assert!(approx_eq_point(round_tripped, p));
    }

    #[test]
    fn direction_round_trip_ignores_translation() {
        let tx = Transformation::identity()
            .scaled(Direction::new(2.0, 3.0, 0.5))
            .translated(Direction::new(10.0, -4.0, 2.0));
        let v = Direction::new(1.0, -2.0, 0.3);
        let round_tripped = tx.vector_transform_to(tx.vector_transform_from(v));
        assert!(approx_eq_dir(round_tripped, v));
    }

    #[test]
    fn translate_only_changes_translation() {
        let mut tx = Transformation::identity();
        tx.translate(Direction::new(5.0, 0.0, 0.0));
        assert_eq!(tx.m, Matrix3::identity());
        assert_eq!(tx.transform_from(Point::zero()), Point::new(5.0, 0.0, 0.0));
    }
}
