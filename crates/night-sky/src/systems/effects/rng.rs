//! xorshift64 generator plus the distributions the sky draws from.
//!
//! Hosts seed it from an entropy source at mount; tests use fixed seeds.

#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform integer in [0, upper_bound); 0 when the bound is 0.
    pub fn next_int(&mut self, upper_bound: u32) -> u32 {
        if upper_bound == 0 {
            return 0;
        }
        (self.next_u64() % upper_bound as u64) as u32
    }

    /// Uniform float in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        // 24 high bits fill the f32 mantissa exactly.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform float in [min, max).
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Uniform integer in [min, max] (inclusive).
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + self.next_int(max - min + 1)
    }

    /// True with the given probability.
    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    /// -1.0 or 1.0 with equal odds.
    pub fn sign(&mut self) -> f32 {
        if self.next_u64() & 1 == 0 { -1.0 } else { 1.0 }
    }

    /// Approximate standard normal sample (Irwin-Hall, sum of four uniforms).
    pub fn gaussian(&mut self) -> f32 {
        let sum: f32 = (0..4).map(|_| self.next_f32()).sum();
        (sum - 2.0) * 1.732_050_8
    }

    /// Exponential sample with the given mean.
    pub fn exponential(&mut self, mean: f32) -> f32 {
        let u = self.next_f32().max(1e-6);
        -u.ln() * mean
    }

    /// Pick an index according to relative weights.
    pub fn weighted(&mut self, weights: &[f32]) -> usize {
        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return 0;
        }
        let mut roll = self.next_f32() * total;
        for (i, w) in weights.iter().enumerate() {
            if roll < *w {
                return i;
            }
            roll -= w;
        }
        weights.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sky() {
        let mut a = Rng::new(0x5eed);
        let mut b = Rng::new(0x5eed);
        let xs: Vec<f32> = (0..32).map(|_| a.range(-5.0, 5.0)).collect();
        let ys: Vec<f32> = (0..32).map(|_| b.range(-5.0, 5.0)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn zero_seed_still_produces_values() {
        let mut rng = Rng::new(0);
        let first = rng.next_u64();
        assert_ne!(first, 0);
        assert_ne!(rng.next_u64(), first);
        assert_eq!(rng.next_int(0), 0);
    }

    #[test]
    fn next_f32_stays_in_unit_interval() {
        let mut rng = Rng::new(7);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn range_inclusive_hits_both_ends() {
        let mut rng = Rng::new(99);
        let mut seen = [false; 3];
        for _ in 0..500 {
            let v = rng.range_inclusive(4, 6);
            seen[(v - 4) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn weighted_never_picks_zero_weight() {
        let mut rng = Rng::new(3);
        for _ in 0..1000 {
            assert_ne!(rng.weighted(&[1.0, 0.0, 2.0]), 1);
        }
    }

    #[test]
    fn gaussian_is_centered() {
        let mut rng = Rng::new(11);
        let mean: f32 = (0..5000).map(|_| rng.gaussian()).sum::<f32>() / 5000.0;
        assert!(mean.abs() < 0.1, "mean was {}", mean);
    }
}
