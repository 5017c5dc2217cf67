//! Band-power generation conditioned on attention state
//! Location: src/synthesis/signal_generator.rs

use super::artifact_injection::MuscleArtifactInjector;
use super::noise_models::PinkNoise;
use super::profiles::{BandProfile, ProfileSet};
use super::types::{BandPowers, EegReading};
use crate::attention::AttentionState;
use crate::config::constants::synthesis::BAND_COUNT;
use crate::config::SynthesisConfig;
use crate::utils::time::{SystemTimeProvider, TimeProvider};
use crate::vision::types::FrameMeasurement;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const THETA: usize = 1;
const LOW_BETA: usize = 4;
const HIGH_BETA: usize = 5;

pub struct SignalSynthesizer {
    profiles: ProfileSet,
    pink_noise: PinkNoise,
    muscle: MuscleArtifactInjector,
    track_head_velocity: bool,
    rng: StdRng,
    clock: Arc<dyn TimeProvider>,
}

impl SignalSynthesizer {
    /// Seeded from `config.seed` when set, otherwise from OS entropy
    pub fn new(config: &SynthesisConfig, track_head_velocity: bool) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            profiles: ProfileSet::for_preset(config.preset),
            pink_noise: PinkNoise::new(config.pink_noise_alpha, config.pink_noise_scale),
            muscle: MuscleArtifactInjector::new(config.muscle_velocity_threshold, config.muscle_noise_max),
            track_head_velocity,
            rng,
            clock: Arc::new(SystemTimeProvider),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    /// Eight band powers for one frame.
    ///
    /// Each band is jittered uniformly around its profile base, the pink
    /// noise output is added to theta and low beta, and a muscle burst is
    /// added to both beta bands when the head moved fast enough.
    pub fn generate_bands(&mut self, is_focused: bool, head_velocity: f64) -> BandPowers {
        let profile: BandProfile = *self.profiles.select(is_focused);

        let mut values = [0.0; BAND_COUNT];
        for (value, band) in values.iter_mut().zip(profile.bands.iter()) {
            *value = jitter(&mut self.rng, band.base, band.variance);
        }

        let pink = self.pink_noise.next(&mut self.rng);
        values[THETA] += pink;
        values[LOW_BETA] += pink;

        if self.track_head_velocity {
            if let Some(burst) = self.muscle.maybe_inject(head_velocity, &mut self.rng) {
                values[LOW_BETA] += burst;
                values[HIGH_BETA] += burst;
            }
        }

        BandPowers::from_array(values)
    }

    /// Assemble a complete reading from the current state and measurement
    pub fn synthesize(&mut self, state: &AttentionState, measurement: &FrameMeasurement) -> EegReading {
        let hyperactivity_index = if self.track_head_velocity {
            measurement.head_velocity
        } else {
            0.0
        };
        let bands = self.generate_bands(state.is_focused, hyperactivity_index);

        EegReading {
            timestamp_ms: self.clock.now_millis(),
            bands,
            yaw: measurement.head_yaw,
            gaze: measurement.gaze_offset,
            attention: if state.is_focused { 1.0 } else { 0.0 },
            blink_count: state.blink_count,
            hyperactivity_index,
            focus_ratio: state.focus_ratio(),
        }
    }

    pub fn pink_noise_level(&self) -> f64 {
        self.pink_noise.level()
    }

    pub fn last_muscle_artifact(&self) -> bool {
        self.muscle.last_injection_occurred()
    }
}

/// `base + U[-variance/2, variance/2]`
fn jitter<R: Rng + ?Sized>(rng: &mut R, base: f64, variance: f64) -> f64 {
    if variance <= 0.0 {
        return base;
    }
    base + rng.gen_range(-variance / 2.0..=variance / 2.0)
}
