//! Pupil-offset gaze estimate for a single eye region

use crate::config::constants::vision::GAZE_UNKNOWN;
use crate::vision::image_ops::{equalize_hist, min_loc};
use crate::vision::types::Point;
use ndarray::{s, ArrayView2};

/// Gaze offset for one eye plus the pupil position used to derive it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeGaze {
    /// 0 = pupil centered, 1.0 = at the edge or unknown
    pub offset: f64,
    /// Pupil position in eye-region coordinates, if one was found
    pub pupil: Option<Point>,
}

impl EyeGaze {
    fn unknown() -> Self {
        Self {
            offset: GAZE_UNKNOWN,
            pupil: None,
        }
    }
}

/// Horizontal pupil offset for a grayscale eye region.
///
/// The top `eyebrow_crop_fraction` of the rows is dropped, the remainder is
/// histogram-equalized and the darkest pixel is taken as the pupil.
/// Offset is `|pupil_x - cols/2| / (cols/2)`.
pub fn eye_gaze_offset(eye: ArrayView2<u8>, eyebrow_crop_fraction: f64) -> EyeGaze {
    let (rows, cols) = eye.dim();
    if rows == 0 || cols == 0 {
        return EyeGaze::unknown();
    }

    let y_cutoff = (rows as f64 * eyebrow_crop_fraction) as usize;
    if y_cutoff >= rows {
        return EyeGaze::unknown();
    }

    let cropped = eye.slice(s![y_cutoff.., ..]);
    let equalized = equalize_hist(cropped);

    let Some(((px, py), _)) = min_loc(equalized.view()) else {
        return EyeGaze::unknown();
    };

    let center_x = cols as f64 / 2.0;
    EyeGaze {
        offset: (px as f64 - center_x).abs() / center_x,
        pupil: Some(Point::new(px as i32, (py + y_cutoff) as i32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn eye_with_pupil(rows: usize, cols: usize, pupil: (usize, usize)) -> Array2<u8> {
        let mut eye = Array2::<u8>::from_elem((rows, cols), 180);
        eye[[pupil.1, pupil.0]] = 10;
        eye
    }

    #[test]
    fn test_centered_pupil_has_zero_offset() {
        let eye = eye_with_pupil(20, 20, (10, 12));
        let gaze = eye_gaze_offset(eye.view(), 0.3);
        assert_eq!(gaze.offset, 0.0);
        assert_eq!(gaze.pupil, Some(Point::new(10, 12)));
    }

    #[test]
    fn test_edge_pupil_offset() {
        let eye = eye_with_pupil(20, 20, (0, 15));
        assert_eq!(eye_gaze_offset(eye.view(), 0.3).offset, 1.0);

        let eye = eye_with_pupil(20, 20, (15, 15));
        assert!((eye_gaze_offset(eye.view(), 0.3).offset - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_eyebrow_rows_are_ignored() {
        // Darker "eyebrow" at the far left in the top rows
        let mut eye = eye_with_pupil(20, 20, (10, 14));
        eye[[1, 0]] = 0;
        let gaze = eye_gaze_offset(eye.view(), 0.3);
        assert_eq!(gaze.pupil, Some(Point::new(10, 14)));
        assert_eq!(gaze.offset, 0.0);

        let uncropped = eye_gaze_offset(eye.view(), 0.0);
        assert_eq!(uncropped.offset, 1.0);
    }

    #[test]
    fn test_empty_region_is_unknown() {
        let eye = Array2::<u8>::zeros((0, 0));
        assert_eq!(eye_gaze_offset(eye.view(), 0.3).offset, 1.0);

        // Crop swallows every row
        let eye = Array2::<u8>::zeros((3, 10));
        let gaze = eye_gaze_offset(eye.view(), 1.0);
        assert_eq!(gaze.offset, 1.0);
        assert!(gaze.pupil.is_none());
    }
}
