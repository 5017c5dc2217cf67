// src/vision/opencv_backend.rs
//! OpenCV capture, Haar cascades and the debug window

use crate::vision::traits::{DisplaySink, FrameSource, NullDetector, ObjectDetector};
use crate::vision::types::{Frame, Overlay, OverlayColor, OverlayItem};
use crate::vision::VisionError;
use ndarray::{Array3, ArrayView2};
use opencv::core::{self, Mat, Scalar, Size, Vector, CV_8UC1, CV_8UC3};
use opencv::prelude::*;
use opencv::{highgui, imgproc, objdetect, videoio};
use tracing::{error, info, warn};

fn backend_err(err: opencv::Error) -> VisionError {
    VisionError::Backend(err.to_string())
}

fn bgr_scalar(color: OverlayColor) -> Scalar {
    let [b, g, r] = color.bgr();
    Scalar::new(b as f64, g as f64, r as f64, 0.0)
}

fn gray_to_mat(image: ArrayView2<u8>) -> opencv::Result<Mat> {
    let (rows, cols) = image.dim();
    let mut mat = Mat::new_rows_cols_with_default(rows as i32, cols as i32, CV_8UC1, Scalar::all(0.0))?;
    let bytes = mat.data_bytes_mut()?;
    for (dst, &src) in bytes.iter_mut().zip(image.iter()) {
        *dst = src;
    }
    Ok(mat)
}

fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        frame.rows() as i32,
        frame.cols() as i32,
        CV_8UC3,
        Scalar::all(0.0),
    )?;
    let bytes = mat.data_bytes_mut()?;
    for (dst, &src) in bytes.iter_mut().zip(frame.pixels().iter()) {
        *dst = src;
    }
    Ok(mat)
}

fn mat_to_frame(mat: &Mat) -> Option<Frame> {
    if mat.empty() || mat.channels() != 3 {
        return None;
    }
    let rows = mat.rows() as usize;
    let cols = mat.cols() as usize;
    let data = if mat.is_continuous() {
        mat.data_bytes().ok()?.to_vec()
    } else {
        mat.try_clone().ok()?.data_bytes().ok()?.to_vec()
    };
    Array3::from_shape_vec((rows, cols, 3), data)
        .ok()
        .and_then(Frame::from_bgr)
}

/// Webcam or stream capture. A numeric source selects a device index,
/// anything else is handed to the backend as a URL or file path.
///
/// A device that cannot be opened leaves the camera closed: reads come back
/// empty and the run loop's reconnect backoff keeps calling [`reopen`].
///
/// [`reopen`]: FrameSource::reopen
pub struct OpencvCamera {
    source: String,
    capture: Option<videoio::VideoCapture>,
    buffer: Mat,
}

impl OpencvCamera {
    pub fn open(source: &str) -> Self {
        let capture = match Self::open_capture(source) {
            Ok(capture) => {
                info!(source, "camera opened");
                Some(capture)
            }
            Err(e) => {
                warn!(source, error = %e, "camera unavailable, waiting for reconnect");
                None
            }
        };
        Self {
            source: source.to_string(),
            capture,
            buffer: Mat::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.capture.is_some()
    }

    fn open_capture(source: &str) -> Result<videoio::VideoCapture, VisionError> {
        let capture = match source.trim().parse::<i32>() {
            Ok(index) => videoio::VideoCapture::new(index, videoio::CAP_ANY),
            Err(_) => videoio::VideoCapture::from_file(source, videoio::CAP_ANY),
        }
        .map_err(|e| VisionError::CameraOpen {
            source_name: source.to_string(),
            reason: e.to_string(),
        })?;

        if !capture.is_opened().map_err(backend_err)? {
            return Err(VisionError::CameraOpen {
                source_name: source.to_string(),
                reason: "device did not open".to_string(),
            });
        }
        Ok(capture)
    }
}

impl FrameSource for OpencvCamera {
    fn read_frame(&mut self) -> Option<Frame> {
        let capture = self.capture.as_mut()?;
        match capture.read(&mut self.buffer) {
            Ok(true) => mat_to_frame(&self.buffer),
            Ok(false) => None,
            Err(e) => {
                warn!(source = %self.source, error = %e, "camera read failed");
                None
            }
        }
    }

    fn reopen(&mut self) -> Result<(), VisionError> {
        // Release the old handle before reopening
        if let Some(mut capture) = self.capture.take() {
            let _ = capture.release();
        }
        self.capture = Some(Self::open_capture(&self.source)?);
        info!(source = %self.source, "camera reopened");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("opencv capture '{}'", self.source)
    }
}

/// Haar cascade detector
pub struct CascadeDetector {
    classifier: objdetect::CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
}

impl CascadeDetector {
    pub fn load(model: &str, path: &str, scale_factor: f64, min_neighbors: i32) -> Result<Self, VisionError> {
        let model_err = |reason: String| VisionError::ModelLoad {
            model: model.to_string(),
            path: path.to_string(),
            reason,
        };

        let classifier = objdetect::CascadeClassifier::new(path).map_err(|e| model_err(e.to_string()))?;
        if classifier.empty().map_err(|e| model_err(e.to_string()))? {
            return Err(model_err("cascade file is empty or missing".to_string()));
        }
        Ok(Self {
            classifier,
            scale_factor,
            min_neighbors,
        })
    }
}

impl ObjectDetector for CascadeDetector {
    fn detect(&mut self, image: ArrayView2<u8>) -> Vec<crate::vision::types::Rect> {
        if image.is_empty() {
            return Vec::new();
        }
        let mat = match gray_to_mat(image) {
            Ok(mat) => mat,
            Err(e) => {
                warn!(error = %e, "could not convert image for detection");
                return Vec::new();
            }
        };

        let mut found = Vector::<core::Rect>::new();
        if let Err(e) = self.classifier.detect_multi_scale(
            &mat,
            &mut found,
            self.scale_factor,
            self.min_neighbors,
            0,
            Size::new(0, 0),
            Size::new(0, 0),
        ) {
            warn!(error = %e, "cascade detection failed");
            return Vec::new();
        }

        found
            .iter()
            .map(|r| crate::vision::types::Rect::new(r.x, r.y, r.width, r.height))
            .collect()
    }
}

/// Load a cascade, degrading to a detector that never fires
pub fn load_detector_or_null(model: &str, path: &str, scale_factor: f64, min_neighbors: i32) -> Box<dyn ObjectDetector> {
    match CascadeDetector::load(model, path, scale_factor, min_neighbors) {
        Ok(detector) => Box::new(detector),
        Err(e) => {
            error!(error = %e, "detector unavailable, continuing without it");
            Box::new(NullDetector)
        }
    }
}

/// HighGUI window showing the annotated frame
pub struct OpencvDisplay {
    window: String,
}

impl OpencvDisplay {
    pub fn new(window: &str) -> Self {
        Self {
            window: window.to_string(),
        }
    }

    fn draw(&self, frame: &Frame, overlay: &Overlay) -> opencv::Result<()> {
        let mut mat = frame_to_mat(frame)?;
        for item in &overlay.items {
            match item {
                OverlayItem::FaceBox(r) | OverlayItem::EyeBox(r) => {
                    imgproc::rectangle(
                        &mut mat,
                        core::Rect::new(r.x, r.y, r.width, r.height),
                        bgr_scalar(item.color()),
                        2,
                        imgproc::LINE_8,
                        0,
                    )?;
                }
                OverlayItem::Pupil(p) => {
                    imgproc::circle(
                        &mut mat,
                        core::Point::new(p.x, p.y),
                        3,
                        bgr_scalar(item.color()),
                        -1,
                        imgproc::LINE_8,
                        0,
                    )?;
                }
                OverlayItem::Label { text, origin, .. } => {
                    imgproc::put_text(
                        &mut mat,
                        text,
                        core::Point::new(origin.x, origin.y),
                        imgproc::FONT_HERSHEY_SIMPLEX,
                        0.7,
                        bgr_scalar(item.color()),
                        2,
                        imgproc::LINE_8,
                        false,
                    )?;
                }
            }
        }
        highgui::imshow(&self.window, &mat)?;
        highgui::wait_key(1)?;
        Ok(())
    }
}

impl DisplaySink for OpencvDisplay {
    fn show(&mut self, frame: &Frame, overlay: &Overlay) {
        if let Err(e) = self.draw(frame, overlay) {
            warn!(error = %e, "debug window update failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_stream_leaves_camera_closed() {
        let mut camera = OpencvCamera::open("/nonexistent/focus-eeg-stream.avi");
        assert!(!camera.is_open());
        assert!(camera.read_frame().is_none());
        assert!(camera.reopen().is_err());
        assert!(!camera.is_open());
    }
}
