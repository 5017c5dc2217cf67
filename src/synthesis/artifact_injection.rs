//! Muscle artifact from fast head movement

use rand::Rng;

/// Broadband burst added to the beta bands when the head moves quickly
#[derive(Debug, Clone)]
pub struct MuscleArtifactInjector {
    velocity_threshold: f64,
    max_amplitude: f64,
    last_injection: bool,
}

impl MuscleArtifactInjector {
    pub fn new(velocity_threshold: f64, max_amplitude: f64) -> Self {
        Self {
            velocity_threshold,
            max_amplitude,
            last_injection: false,
        }
    }

    /// One `U[0, max_amplitude)` draw when `head_velocity` exceeds the
    /// threshold, otherwise `None`
    pub fn maybe_inject<R: Rng + ?Sized>(&mut self, head_velocity: f64, rng: &mut R) -> Option<f64> {
        self.last_injection = head_velocity > self.velocity_threshold && self.max_amplitude > 0.0;
        self.last_injection
            .then(|| rng.gen_range(0.0..self.max_amplitude))
    }

    pub fn last_injection_occurred(&self) -> bool {
        self.last_injection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_threshold_is_exclusive() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut injector = MuscleArtifactInjector::new(5.0, 8000.0);
        assert!(injector.maybe_inject(5.0, &mut rng).is_none());
        assert!(!injector.last_injection_occurred());

        let burst = injector.maybe_inject(5.1, &mut rng).unwrap();
        assert!((0.0..8000.0).contains(&burst));
        assert!(injector.last_injection_occurred());
    }
}
