// tests/attention_properties.rs
//! Property tests for the attention state machine

use focus_eeg_core::attention::{AttentionClassifier, AttentionState};
use focus_eeg_core::config::AttentionConfig;
use focus_eeg_core::vision::{FrameMeasurement, Rect};
use proptest::prelude::*;

fn measurement() -> impl Strategy<Value = FrameMeasurement> {
    prop_oneof![
        1 => Just(FrameMeasurement::no_face()),
        4 => (0.0f64..200.0, 0.0f64..=1.0, 0usize..3).prop_map(|(yaw, gaze, eyes)| FrameMeasurement {
            face_found: true,
            face_rect: Some(Rect::new(100, 100, 120, 120)),
            head_yaw: yaw,
            eyes_found: eyes,
            gaze_offset: if eyes == 0 { 1.0 } else { gaze },
            head_velocity: 0.0,
        }),
    ]
}

fn config() -> impl Strategy<Value = AttentionConfig> {
    prop_oneof![Just(AttentionConfig::default()), Just(AttentionConfig::adhd())]
}

proptest! {
    #[test]
    fn counters_never_decrease(cfg in config(), frames in prop::collection::vec(measurement(), 1..200)) {
        let classifier = AttentionClassifier::new(&cfg);
        let mut state = AttentionState::new();

        for mut m in frames {
            let before = state.clone();
            classifier.apply_head_velocity(&mut m, &mut state);
            classifier.update(&m, &mut state);

            prop_assert!(state.total_frames >= before.total_frames);
            prop_assert!(state.focused_frames >= before.focused_frames);
            prop_assert!(state.blink_count >= before.blink_count);
            prop_assert!(state.focused_frames <= state.total_frames);
            prop_assert!((0.0..=1.0).contains(&state.focus_ratio()));
        }
    }

    #[test]
    fn no_face_frames_leave_counters_alone(cfg in config(), frames in prop::collection::vec(measurement(), 0..50)) {
        let classifier = AttentionClassifier::new(&cfg);
        let mut state = AttentionState::new();
        for mut m in frames {
            classifier.apply_head_velocity(&mut m, &mut state);
            classifier.update(&m, &mut state);
        }

        let before = state.clone();
        let mut empty = FrameMeasurement::no_face();
        classifier.apply_head_velocity(&mut empty, &mut state);
        let verdict = classifier.update(&empty, &mut state);

        prop_assert!(!verdict.is_focused);
        prop_assert!(!verdict.blink_started);
        prop_assert!(!state.is_focused);
        prop_assert_eq!(state.total_frames, before.total_frames);
        prop_assert_eq!(state.focused_frames, before.focused_frames);
        prop_assert_eq!(state.blink_count, before.blink_count);
        prop_assert_eq!(state.last_head_yaw, before.last_head_yaw);
        prop_assert_eq!(empty.head_velocity, 0.0);
    }

    #[test]
    fn closed_run_counts_single_blink(open_before in 0usize..5, closed in 1usize..20, open_after in 1usize..5) {
        let classifier = AttentionClassifier::new(&AttentionConfig::default());
        let mut state = AttentionState::new();
        let face = |eyes: usize| FrameMeasurement {
            face_found: true,
            face_rect: Some(Rect::new(260, 180, 120, 120)),
            head_yaw: 0.0,
            eyes_found: eyes,
            gaze_offset: if eyes == 0 { 1.0 } else { 0.0 },
            head_velocity: 0.0,
        };

        for _ in 0..open_before {
            classifier.update(&face(2), &mut state);
        }
        let mut started = 0;
        for _ in 0..closed {
            if classifier.update(&face(0), &mut state).blink_started {
                started += 1;
            }
        }
        for _ in 0..open_after {
            classifier.update(&face(2), &mut state);
        }

        prop_assert_eq!(started, 1);
        prop_assert_eq!(state.blink_count, 1);
        prop_assert!(!state.eyes_were_closed);
        prop_assert_eq!(state.focused_frames, (open_before + open_after) as u64);
    }

    #[test]
    fn velocity_is_zero_without_tracking(yaws in prop::collection::vec(0.0f64..300.0, 1..30)) {
        let classifier = AttentionClassifier::new(&AttentionConfig::adhd());
        let mut state = AttentionState::new();
        for yaw in yaws {
            let mut m = FrameMeasurement {
                face_found: true,
                face_rect: None,
                head_yaw: yaw,
                eyes_found: 2,
                gaze_offset: 0.0,
                head_velocity: 0.0,
            };
            classifier.apply_head_velocity(&mut m, &mut state);
            prop_assert_eq!(m.head_velocity, 0.0);
        }
    }
}
