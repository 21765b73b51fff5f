use rand::RngCore;

use super::Sampler;

/// Xorshift-128 pseudo-random generator, seeded once per worker thread
/// from the process RNG at first use (`spec.md` §4.G/§5). Cheap enough
/// that every camera/photon sample can afford a fresh draw.
pub struct Xorshift128 {
    state: [u32; 4],
}

impl Xorshift128 {
    pub fn seeded(seed: u64) -> Xorshift128 {
        // Splitmix-style spread of the seed into 4 nonzero lanes; an
        // all-zero state is a fixed point of xorshift and must be avoided.
        let mut x = seed ^ 0x9E3779B97F4A7C15;
        let mut next = || {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x & 0xFFFF_FFFF) as u32 | 1
        };
        Xorshift128 { state: [next(), next(), next(), next()] }
    }

    pub fn from_rng(rng: &mut impl RngCore) -> Xorshift128 {
        Xorshift128::seeded(rng.next_u64())
    }

    fn next_u32(&mut self) -> u32 {
        let mut t = self.state[3];
        let s = self.state[0];
        self.state[3] = self.state[2];
        self.state[2] = self.state[1];
        self.state[1] = s;
        t ^= t << 11;
        t ^= t >> 8;
        self.state[0] = t ^ s ^ (s >> 19);
        self.state[0]
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u32() as f64) / (u32::MAX as f64 + 1.0)
    }
}

impl Sampler for Xorshift128 {
    fn get_f1(&mut self) -> f64 {
        self.next_f64()
    }

    fn get_f2(&mut self) -> (f64, f64) {
        (self.next_f64(), self.next_f64())
    }

    fn get_f3(&mut self) -> (f64, f64, f64) {
        (self.next_f64(), self.next_f64(), self.next_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_unit_interval() {
        let mut s = Xorshift128::seeded(42);
        for _ in 0..10_000 {
            let v = s.get_f1();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let mut a = Xorshift128::seeded(7);
        let mut b = Xorshift128::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.get_f1(), b.get_f1());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Xorshift128::seeded(1);
        let mut b = Xorshift128::seeded(2);
        let sample_a: Vec<f64> = (0..8).map(|_| a.get_f1()).collect();
        let sample_b: Vec<f64> = (0..8).map(|_| b.get_f1()).collect();
        assert_ne!(sample_a, sample_b);
    }
}
