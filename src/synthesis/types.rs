//! Synthetic reading types

use crate::config::constants::synthesis::{BAND_COUNT, BAND_NAMES};
use serde::{Deserialize, Serialize};

/// The eight band powers, in record order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandPowers {
    pub delta: f64,
    pub theta: f64,
    pub low_alpha: f64,
    pub high_alpha: f64,
    pub low_beta: f64,
    pub high_beta: f64,
    pub low_gamma: f64,
    pub mid_gamma: f64,
}

impl BandPowers {
    pub fn from_array(v: [f64; BAND_COUNT]) -> Self {
        Self {
            delta: v[0],
            theta: v[1],
            low_alpha: v[2],
            high_alpha: v[3],
            low_beta: v[4],
            high_beta: v[5],
            low_gamma: v[6],
            mid_gamma: v[7],
        }
    }

    pub fn to_array(&self) -> [f64; BAND_COUNT] {
        [
            self.delta,
            self.theta,
            self.low_alpha,
            self.high_alpha,
            self.low_beta,
            self.high_beta,
            self.low_gamma,
            self.mid_gamma,
        ]
    }

    /// `(name, value)` pairs in record order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        BAND_NAMES.into_iter().zip(self.to_array())
    }
}

/// One synthesized reading, ready for encoding
#[derive(Debug, Clone, PartialEq)]
pub struct EegReading {
    pub timestamp_ms: i64,
    pub bands: BandPowers,
    pub yaw: f64,
    pub gaze: f64,
    /// 1.0 focused, 0.0 distracted
    pub attention: f64,
    pub blink_count: u32,
    /// Head velocity; always 0 when velocity tracking is off
    pub hyperactivity_index: f64,
    pub focus_ratio: f64,
}
