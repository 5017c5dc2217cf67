//! Attention inference from head and eye measurements

pub mod classifier;
pub mod state;

pub use classifier::{AttentionClassifier, AttentionVerdict};
pub use state::AttentionState;
