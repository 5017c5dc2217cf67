//! Focus/distraction decision and blink edge detection
//! Location: src/attention/classifier.rs

use super::state::AttentionState;
use crate::config::AttentionConfig;
use crate::vision::types::FrameMeasurement;
use tracing::trace;

/// Outcome of classifying one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttentionVerdict {
    pub is_focused: bool,
    /// A new blink started on this frame
    pub blink_started: bool,
}

/// Folds per-frame measurements into [`AttentionState`].
///
/// A frame counts as focused when the head is within `yaw_threshold_px` of
/// the frame center and the averaged pupil offset is below
/// `gaze_threshold`. Frames without a face are distracted but do not count
/// toward the focus ratio.
#[derive(Debug, Clone)]
pub struct AttentionClassifier {
    yaw_threshold_px: f64,
    gaze_threshold: f64,
    track_head_velocity: bool,
}

impl AttentionClassifier {
    pub fn new(config: &AttentionConfig) -> Self {
        Self {
            yaw_threshold_px: config.yaw_threshold_px,
            gaze_threshold: config.gaze_threshold,
            track_head_velocity: config.track_head_velocity,
        }
    }

    pub fn gaze_threshold(&self) -> f64 {
        self.gaze_threshold
    }

    pub fn tracks_head_velocity(&self) -> bool {
        self.track_head_velocity
    }

    /// Fill `measurement.head_velocity` from the yaw history in `state`.
    ///
    /// Only face frames move the history. With tracking disabled the
    /// velocity stays 0.
    pub fn apply_head_velocity(&self, measurement: &mut FrameMeasurement, state: &mut AttentionState) {
        measurement.head_velocity = if self.track_head_velocity && measurement.face_found {
            state.record_head_yaw(measurement.head_yaw)
        } else {
            0.0
        };
    }

    /// Update `state` with one frame. Never fails.
    pub fn update(&self, measurement: &FrameMeasurement, state: &mut AttentionState) -> AttentionVerdict {
        if !measurement.face_found {
            state.is_focused = false;
            return AttentionVerdict {
                is_focused: false,
                blink_started: false,
            };
        }

        state.total_frames += 1;

        let is_focused =
            measurement.head_yaw < self.yaw_threshold_px && measurement.gaze_offset < self.gaze_threshold;
        state.is_focused = is_focused;
        if is_focused {
            state.focused_frames += 1;
        }

        let mut blink_started = false;
        if measurement.eyes_found == 0 {
            if !state.eyes_were_closed {
                state.blink_count += 1;
                state.eyes_were_closed = true;
                blink_started = true;
            }
        } else {
            state.eyes_were_closed = false;
        }

        trace!(
            is_focused,
            blink_started,
            total = state.total_frames,
            focused = state.focused_frames,
            "attention updated"
        );

        AttentionVerdict {
            is_focused,
            blink_started,
        }
    }
}
