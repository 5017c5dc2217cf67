//! Per-session attention counters

use crate::vision::types::Rect;
use serde::Serialize;

/// Everything the classifier remembers between frames.
///
/// Owned by the pipeline and passed by `&mut`; counters only grow for the
/// lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttentionState {
    pub is_focused: bool,
    /// Face box held by the stabilizer
    pub stable_face_rect: Option<Rect>,
    /// Frames with a detected face
    pub total_frames: u64,
    pub focused_frames: u64,
    pub blink_count: u32,
    /// Blink latch: set while eyes stay undetected
    pub eyes_were_closed: bool,
    pub last_head_yaw: f64,
}

impl AttentionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `focused_frames / total_frames`, or 0 before the first face frame
    pub fn focus_ratio(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            self.focused_frames as f64 / self.total_frames as f64
        }
    }

    /// Store `yaw` as the latest head position and return the change since
    /// the previous one
    pub fn record_head_yaw(&mut self, yaw: f64) -> f64 {
        let velocity = (yaw - self.last_head_yaw).abs();
        self.last_head_yaw = yaw;
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_ratio_empty_session() {
        assert_eq!(AttentionState::new().focus_ratio(), 0.0);
    }

    #[test]
    fn test_focus_ratio() {
        let state = AttentionState {
            total_frames: 4,
            focused_frames: 3,
            ..Default::default()
        };
        assert_eq!(state.focus_ratio(), 0.75);
    }

    #[test]
    fn test_record_head_yaw() {
        let mut state = AttentionState::new();
        assert_eq!(state.record_head_yaw(12.0), 12.0);
        assert_eq!(state.record_head_yaw(9.0), 3.0);
        assert_eq!(state.last_head_yaw, 9.0);
    }
}
