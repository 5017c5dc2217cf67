//! Grayscale image operations used by the gaze estimate
//! Location: src/vision/image_ops.rs
//!
//! Integer arithmetic matches the usual 8-bit camera pipeline so detector
//! boxes and pupil positions agree with what the cascade models saw.

use ndarray::{Array2, Array3, ArrayView2, Axis};

// Fixed-point BT.601 luma weights, 14 fractional bits
const GRAY_SHIFT: u32 = 14;
const GRAY_B: u32 = 1868;
const GRAY_G: u32 = 9617;
const GRAY_R: u32 = 4899;

/// BGR `(rows, cols, 3)` buffer to 8-bit luma
pub fn bgr_to_gray(bgr: &Array3<u8>) -> Array2<u8> {
    let (rows, cols, _) = bgr.dim();
    let mut gray = Array2::<u8>::zeros((rows, cols));
    for ((r, c), out) in gray.indexed_iter_mut() {
        let b = bgr[[r, c, 0]] as u32;
        let g = bgr[[r, c, 1]] as u32;
        let rr = bgr[[r, c, 2]] as u32;
        let y = (b * GRAY_B + g * GRAY_G + rr * GRAY_R + (1 << (GRAY_SHIFT - 1))) >> GRAY_SHIFT;
        *out = y.min(255) as u8;
    }
    gray
}

/// Histogram equalization over 256 bins.
///
/// The darkest occupied bin maps to 0 and the cumulative distribution above
/// it is stretched to 255. A single-valued image is returned unchanged.
pub fn equalize_hist(src: ArrayView2<u8>) -> Array2<u8> {
    let total = src.len();
    if total == 0 {
        return src.to_owned();
    }

    let mut hist = [0usize; 256];
    for &v in src.iter() {
        hist[v as usize] += 1;
    }

    let first = hist.iter().position(|&count| count > 0).unwrap_or(0);
    if hist[first] == total {
        return src.to_owned();
    }

    let scale = 255.0 / (total - hist[first]) as f64;
    let mut lut = [0u8; 256];
    let mut sum = 0usize;
    for level in (first + 1)..256 {
        sum += hist[level];
        lut[level] = (sum as f64 * scale).round().min(255.0) as u8;
    }

    src.mapv(|v| lut[v as usize])
}

/// Location `(col, row)` and value of the first global minimum in
/// row-major order, or `None` for an empty image
pub fn min_loc(src: ArrayView2<u8>) -> Option<((usize, usize), u8)> {
    let mut best: Option<((usize, usize), u8)> = None;
    for (r, row) in src.axis_iter(Axis(0)).enumerate() {
        for (c, &v) in row.iter().enumerate() {
            match best {
                Some((_, min)) if v >= min => {}
                _ => best = Some(((c, r), v)),
            }
        }
    }
    best
}
