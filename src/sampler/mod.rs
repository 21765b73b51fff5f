pub mod halton;
pub mod warps;
pub mod xorshift;

/// A source of uniform floats in `[0,1)`. Every worker thread owns its own
/// instance (`spec.md` §4.G/§5) so draws never contend or race; a
/// super-sample pixel loop draws sequentially from a single `Sampler`.
pub trait Sampler {
    fn get_f1(&mut self) -> f64;
    fn get_f2(&mut self) -> (f64, f64);
    fn get_f3(&mut self) -> (f64, f64, f64);
}
