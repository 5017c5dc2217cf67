//! Simulated camera subject and scripted detectors
//! Location: src/vision/simulated.rs
//!
//! Stand-ins for the webcam and the cascade models so the full pipeline can
//! run (and be tested) without a camera. The simulated subject renders real
//! pixels, so gaze offsets still come from the pupil search.

use crate::vision::traits::{FrameSource, ObjectDetector};
use crate::vision::types::{Frame, Rect};
use crate::vision::VisionError;
use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Detector that replays one candidate list per call, then finds nothing
#[derive(Debug, Clone, Default)]
pub struct SequenceDetector {
    script: VecDeque<Vec<Rect>>,
}

impl SequenceDetector {
    pub fn new(script: Vec<Vec<Rect>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl ObjectDetector for SequenceDetector {
    fn detect(&mut self, _image: ArrayView2<u8>) -> Vec<Rect> {
        self.script.pop_front().unwrap_or_default()
    }
}

/// Detector that always returns the same candidates
#[derive(Debug, Clone, Default)]
pub struct FixedDetector {
    boxes: Vec<Rect>,
}

impl FixedDetector {
    pub fn new(boxes: Vec<Rect>) -> Self {
        Self { boxes }
    }
}

impl ObjectDetector for FixedDetector {
    fn detect(&mut self, _image: ArrayView2<u8>) -> Vec<Rect> {
        self.boxes.clone()
    }
}

/// Frame source replaying a fixed script; `None` entries are empty reads
#[derive(Debug, Default)]
pub struct ScriptedFrameSource {
    script: VecDeque<Option<Frame>>,
    reopen_count: u32,
}

impl ScriptedFrameSource {
    pub fn new(script: Vec<Option<Frame>>) -> Self {
        Self {
            script: script.into(),
            reopen_count: 0,
        }
    }

    pub fn reopen_count(&self) -> u32 {
        self.reopen_count
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl FrameSource for ScriptedFrameSource {
    fn read_frame(&mut self) -> Option<Frame> {
        self.script.pop_front().flatten()
    }

    fn reopen(&mut self) -> Result<(), VisionError> {
        self.reopen_count += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("scripted ({} frames queued)", self.script.len())
    }
}

/// What the simulated subject is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectBehavior {
    /// Facing the camera, pupils centered
    Attentive,
    /// Facing the camera, pupils at the side of the eye
    LookingAway,
    /// Head turned well off the frame center
    HeadTurned,
    /// Face visible, no eyes detectable
    EyesClosed,
    /// Out of frame
    Absent,
}

impl SubjectBehavior {
    fn pick(rng: &mut StdRng) -> Self {
        match rng.gen_range(0..100) {
            0..=49 => SubjectBehavior::Attentive,
            50..=64 => SubjectBehavior::LookingAway,
            65..=79 => SubjectBehavior::HeadTurned,
            80..=89 => SubjectBehavior::EyesClosed,
            _ => SubjectBehavior::Absent,
        }
    }

    fn dwell_frames(&self, rng: &mut StdRng) -> u32 {
        match self {
            SubjectBehavior::EyesClosed => rng.gen_range(2..=4),
            _ => rng.gen_range(10..=40),
        }
    }
}

/// What the detectors will "see" for the current frame
#[derive(Debug, Default)]
struct SceneState {
    faces: Vec<Rect>,
    /// Face-region coordinates
    eyes: Vec<Rect>,
}

const BACKGROUND: [u8; 3] = [90, 100, 110];
const SKIN: [u8; 3] = [150, 180, 210];
const SCLERA: [u8; 3] = [235, 235, 235];
const PUPIL: [u8; 3] = [25, 20, 20];

/// Camera rendering a synthetic head that changes behavior over time
pub struct SimulatedCamera {
    scene: Rc<RefCell<SceneState>>,
    rng: StdRng,
    rows: usize,
    cols: usize,
    behavior: SubjectBehavior,
    dwell_remaining: u32,
    dropout_probability: f64,
}

impl SimulatedCamera {
    /// Probability of an empty read per frame (exercises reconnects)
    pub fn with_dropout(mut self, probability: f64) -> Self {
        self.dropout_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Force a behavior for the next `frames` frames
    pub fn force_behavior(&mut self, behavior: SubjectBehavior, frames: u32) {
        self.behavior = behavior;
        self.dwell_remaining = frames;
    }

    pub fn behavior(&self) -> SubjectBehavior {
        self.behavior
    }

    fn advance_behavior(&mut self) {
        if self.dwell_remaining == 0 {
            self.behavior = SubjectBehavior::pick(&mut self.rng);
            self.dwell_remaining = self.behavior.dwell_frames(&mut self.rng);
        }
        self.dwell_remaining -= 1;
    }

    fn render(&mut self) -> Frame {
        let mut frame = Frame::filled(self.rows, self.cols, BACKGROUND);
        let mut scene = SceneState::default();

        if self.behavior != SubjectBehavior::Absent {
            let size = (self.rows.min(self.cols) as i32) / 2;
            let jitter_x = self.rng.gen_range(-2..=2);
            let jitter_y = self.rng.gen_range(-2..=2);
            let turn = if self.behavior == SubjectBehavior::HeadTurned {
                self.cols as i32 / 4
            } else {
                0
            };
            let face = Rect::new(
                self.cols as i32 / 2 - size / 2 + turn + jitter_x,
                self.rows as i32 / 2 - size / 2 + jitter_y,
                size,
                size,
            );
            frame.fill_rect(face, SKIN);
            scene.faces.push(face);

            if self.behavior != SubjectBehavior::EyesClosed {
                let eye_size = size / 4;
                let eye_y = size / 5;
                for eye_x in [size / 6, size - size / 6 - eye_size] {
                    let eye = Rect::new(eye_x, eye_y, eye_size, eye_size);
                    let eye_in_frame = eye.translate(face.x, face.y);
                    frame.fill_rect(eye_in_frame, SCLERA);

                    let pupil_size = (eye_size / 5).max(1);
                    let pupil_x = match self.behavior {
                        SubjectBehavior::LookingAway => 0,
                        _ => eye_size / 2 - pupil_size / 2,
                    };
                    let pupil = Rect::new(pupil_x, eye_size * 2 / 3, pupil_size, pupil_size);
                    frame.fill_rect(pupil.translate(eye_in_frame.x, eye_in_frame.y), PUPIL);
                    scene.eyes.push(eye);
                }
            }
        }

        *self.scene.borrow_mut() = scene;
        frame
    }
}

impl FrameSource for SimulatedCamera {
    fn read_frame(&mut self) -> Option<Frame> {
        if self.dropout_probability > 0.0 && self.rng.gen_bool(self.dropout_probability) {
            *self.scene.borrow_mut() = SceneState::default();
            return None;
        }
        self.advance_behavior();
        Some(self.render())
    }

    fn reopen(&mut self) -> Result<(), VisionError> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("simulated subject {}x{}", self.cols, self.rows)
    }
}

/// Which part of the scene a [`SceneDetector`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTarget {
    Face,
    Eyes,
}

/// Detector reading the ground truth of a [`SimulatedCamera`]
pub struct SceneDetector {
    scene: Rc<RefCell<SceneState>>,
    target: SceneTarget,
}

impl ObjectDetector for SceneDetector {
    fn detect(&mut self, _image: ArrayView2<u8>) -> Vec<Rect> {
        let scene = self.scene.borrow();
        match self.target {
            SceneTarget::Face => scene.faces.clone(),
            SceneTarget::Eyes => scene.eyes.clone(),
        }
    }
}

/// Build a simulated camera and the face/eye detectors that watch it
pub fn simulated_subject(seed: u64, rows: usize, cols: usize) -> (SimulatedCamera, SceneDetector, SceneDetector) {
    let scene = Rc::new(RefCell::new(SceneState::default()));
    let camera = SimulatedCamera {
        scene: Rc::clone(&scene),
        rng: StdRng::seed_from_u64(seed),
        rows,
        cols,
        behavior: SubjectBehavior::Attentive,
        dwell_remaining: 0,
        dropout_probability: 0.0,
    };
    let faces = SceneDetector {
        scene: Rc::clone(&scene),
        target: SceneTarget::Face,
    };
    let eyes = SceneDetector {
        scene,
        target: SceneTarget::Eyes,
    };
    (camera, faces, eyes)
}
