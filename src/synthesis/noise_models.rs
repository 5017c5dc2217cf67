//! Slowly wandering background noise
//! Location: src/synthesis/noise_models.rs

use crate::config::constants::synthesis::WHITE_NOISE_HALF_RANGE;
use rand::Rng;

/// First-order low-pass over uniform white noise.
///
/// `level <- alpha * level + (1 - alpha) * white`, output `level * scale`.
/// The level is never reset during a session.
#[derive(Debug, Clone)]
pub struct PinkNoise {
    level: f64,
    alpha: f64,
    scale: f64,
}

impl PinkNoise {
    pub fn new(alpha: f64, scale: f64) -> Self {
        Self {
            level: 0.0,
            alpha,
            scale,
        }
    }

    /// Advance with an explicit white-noise sample
    pub fn step(&mut self, white: f64) -> f64 {
        self.level = self.alpha * self.level + (1.0 - self.alpha) * white;
        self.level * self.scale
    }

    /// Advance with white noise drawn from `U[-0.5, 0.5)`
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let white = rng.gen_range(-WHITE_NOISE_HALF_RANGE..WHITE_NOISE_HALF_RANGE);
        self.step(white)
    }

    pub fn level(&self) -> f64 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_recurrence_with_scripted_input() {
        let mut noise = PinkNoise::new(0.95, 10.0);
        let inputs = [0.5, -0.5, 0.25, 0.0, -0.1];
        let mut expected = 0.0;
        for w in inputs {
            expected = 0.95 * expected + 0.05 * w;
            let out = noise.step(w);
            assert!((noise.level() - expected).abs() < 1e-12);
            assert!((out - expected * 10.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_level_stays_within_white_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut noise = PinkNoise::new(0.95, 10.0);
        for _ in 0..10_000 {
            let out = noise.next(&mut rng);
            assert!(out.abs() <= 5.0);
        }
    }
}
