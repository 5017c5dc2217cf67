// src/vision/traits.rs
//! Seams to the camera, the cascade models and the debug window

use crate::vision::types::{Frame, Overlay, Rect};
use crate::vision::VisionError;
use ndarray::ArrayView2;

/// Source of camera frames
pub trait FrameSource {
    /// Next frame, or `None` when the device returned nothing this tick
    fn read_frame(&mut self) -> Option<Frame>;

    /// Re-open the underlying device after an empty read
    fn reopen(&mut self) -> Result<(), VisionError>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

/// Pre-trained object detector (frontal face or eye cascade)
pub trait ObjectDetector {
    /// Candidate boxes in the coordinates of `image`
    fn detect(&mut self, image: ArrayView2<u8>) -> Vec<Rect>;

    /// Whether a model is actually loaded
    fn is_loaded(&self) -> bool {
        true
    }
}

/// Debug view for annotated frames
pub trait DisplaySink {
    fn show(&mut self, frame: &Frame, overlay: &Overlay);
}

/// Detector used when a model failed to load: never finds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDetector;

impl ObjectDetector for NullDetector {
    fn detect(&mut self, _image: ArrayView2<u8>) -> Vec<Rect> {
        Vec::new()
    }

    fn is_loaded(&self) -> bool {
        false
    }
}

/// Display that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn show(&mut self, _frame: &Frame, _overlay: &Overlay) {}
}

impl<T: ObjectDetector + ?Sized> ObjectDetector for Box<T> {
    fn detect(&mut self, image: ArrayView2<u8>) -> Vec<Rect> {
        (**self).detect(image)
    }

    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }
}
