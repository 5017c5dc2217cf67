//! Core types for frame analysis
//! Location: src/vision/types.rs

use crate::config::constants::vision::GAZE_UNKNOWN;
use ndarray::{s, Array2, Array3, ArrayView2};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Horizontal center, integer division like the detector boxes
    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    /// Shift by an offset (sub-region box to frame coordinates)
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Intersection with a `cols` x `rows` image; may be empty
    pub fn clamp_to(&self, cols: usize, rows: usize) -> Self {
        let x0 = self.x.clamp(0, cols as i32);
        let y0 = self.y.clamp(0, rows as i32);
        let x1 = (self.x + self.width).clamp(0, cols as i32);
        let y1 = (self.y + self.height).clamp(0, rows as i32);
        Self::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }
}

/// Pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One camera frame, BGR interleaved, shape `(rows, cols, 3)`
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Array3<u8>,
}

impl Frame {
    /// Wrap a BGR buffer. Returns `None` unless the last axis has 3 channels.
    pub fn from_bgr(pixels: Array3<u8>) -> Option<Self> {
        (pixels.shape()[2] == 3).then_some(Self { pixels })
    }

    /// Uniform frame filled with one BGR color
    pub fn filled(rows: usize, cols: usize, bgr: [u8; 3]) -> Self {
        let pixels = Array3::from_shape_fn((rows, cols, 3), |(_, _, c)| bgr[c]);
        Self { pixels }
    }

    pub fn rows(&self) -> usize {
        self.pixels.shape()[0]
    }

    pub fn cols(&self) -> usize {
        self.pixels.shape()[1]
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }

    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    /// Paint a box with one BGR color, clipped to the frame
    pub fn fill_rect(&mut self, rect: Rect, bgr: [u8; 3]) {
        let r = rect.clamp_to(self.cols(), self.rows());
        if r.is_empty() {
            return;
        }
        let mut region = self.pixels.slice_mut(s![
            r.y as usize..(r.y + r.height) as usize,
            r.x as usize..(r.x + r.width) as usize,
            ..
        ]);
        for mut px in region.rows_mut() {
            px[0] = bgr[0];
            px[1] = bgr[1];
            px[2] = bgr[2];
        }
    }

    /// Grayscale copy of the whole frame
    pub fn to_gray(&self) -> Array2<u8> {
        super::image_ops::bgr_to_gray(&self.pixels)
    }
}

/// Borrowed sub-region of a grayscale image, clipped to its bounds
pub fn gray_region<'a>(gray: &'a Array2<u8>, rect: Rect) -> ArrayView2<'a, u8> {
    let (rows, cols) = gray.dim();
    let r = rect.clamp_to(cols, rows);
    gray.slice(s![
        r.y as usize..(r.y + r.height) as usize,
        r.x as usize..(r.x + r.width) as usize
    ])
}

/// Head/eye measurements extracted from one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMeasurement {
    pub face_found: bool,
    /// Stabilized face box in frame coordinates
    pub face_rect: Option<Rect>,
    /// |face center x - frame center x| in pixels
    pub head_yaw: f64,
    /// Accepted eyes (below-the-nose candidates excluded)
    pub eyes_found: usize,
    /// 0 = pupils centered, 1.0 = off-center or unknown
    pub gaze_offset: f64,
    /// Frame-to-frame yaw change, filled by the caller from yaw history
    pub head_velocity: f64,
}

impl FrameMeasurement {
    /// Measurement for a frame with no detectable face
    pub fn no_face() -> Self {
        Self {
            face_found: false,
            face_rect: None,
            head_yaw: 0.0,
            eyes_found: 0,
            gaze_offset: GAZE_UNKNOWN,
            head_velocity: 0.0,
        }
    }
}

/// Overlay colors for the debug view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayColor {
    Green,
    Blue,
    Red,
    Yellow,
}

impl OverlayColor {
    pub fn bgr(&self) -> [u8; 3] {
        match self {
            OverlayColor::Green => [0, 255, 0],
            OverlayColor::Blue => [255, 0, 0],
            OverlayColor::Red => [0, 0, 255],
            OverlayColor::Yellow => [0, 255, 255],
        }
    }
}

/// One debug annotation
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayItem {
    FaceBox(Rect),
    EyeBox(Rect),
    Pupil(Point),
    Label {
        text: String,
        origin: Point,
        color: OverlayColor,
    },
}

impl OverlayItem {
    /// Face boxes draw green, eye boxes blue, pupils red
    pub fn color(&self) -> OverlayColor {
        match self {
            OverlayItem::FaceBox(_) => OverlayColor::Green,
            OverlayItem::EyeBox(_) => OverlayColor::Blue,
            OverlayItem::Pupil(_) => OverlayColor::Red,
            OverlayItem::Label { color, .. } => *color,
        }
    }
}

/// Debug annotations for one frame; never read back by the pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub items: Vec<OverlayItem>,
}

impl Overlay {
    pub fn push(&mut self, item: OverlayItem) {
        self.items.push(item);
    }

    pub fn label(&mut self, text: impl Into<String>, origin: Point, color: OverlayColor) {
        self.items.push(OverlayItem::Label {
            text: text.into(),
            origin,
            color,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
