//! Synthetic band-power generation

pub mod artifact_injection;
pub mod noise_models;
pub mod profiles;
pub mod signal_generator;
pub mod types;

pub use artifact_injection::MuscleArtifactInjector;
pub use noise_models::PinkNoise;
pub use profiles::{BandProfile, BandSpec, ProfilePreset, ProfileSet};
pub use signal_generator::SignalSynthesizer;
pub use types::{BandPowers, EegReading};
