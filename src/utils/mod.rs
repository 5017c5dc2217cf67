//! Common utility functions shared across the pipeline
//!
//! - Wall-clock timestamps behind an injectable provider
//! - Range checks used by configuration validation

pub mod time;

pub use time::{current_timestamp_millis, MockTimeProvider, SystemTimeProvider, TimeProvider};

/// Check that `value` lies in `[min, max]`, recording a message otherwise.
///
/// Used by configuration validation to collect every violation in one pass.
pub fn check_range<T>(errors: &mut Vec<String>, field: &str, value: T, min: T, max: T)
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        errors.push(format!(
            "Field '{}' value '{}' is out of range [{}, {}]",
            field, value, min, max
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_collects_violations() {
        let mut errors = Vec::new();
        check_range(&mut errors, "gaze_threshold", 0.4, 0.0, 1.0);
        assert!(errors.is_empty());

        check_range(&mut errors, "gaze_threshold", 1.5, 0.0, 1.0);
        check_range(&mut errors, "stabilizer_threshold_px", -1, 0, 100);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("gaze_threshold"));
        assert!(errors[1].contains("[0, 100]"));
    }
}
