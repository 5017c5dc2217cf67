//! Band-power profiles for the focused and distracted states
//! Location: src/synthesis/profiles.rs

use crate::config::constants::synthesis::{BAND_COUNT, BAND_NAMES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Centre value and spread for one band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSpec {
    pub base: f64,
    /// Full width of the uniform jitter around `base`
    pub variance: f64,
}

const fn spec(base: f64, variance: f64) -> BandSpec {
    BandSpec { base, variance }
}

/// Eight band specs in record order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandProfile {
    pub bands: [BandSpec; BAND_COUNT],
}

impl BandProfile {
    pub fn band(&self, name: &str) -> Option<BandSpec> {
        BAND_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.bands[i])
    }
}

/// Profiles used for one variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    pub focused: BandProfile,
    pub distracted: BandProfile,
}

impl ProfileSet {
    pub fn for_preset(preset: ProfilePreset) -> Self {
        match preset {
            ProfilePreset::Classic => Self {
                focused: CLASSIC_FOCUSED,
                distracted: CLASSIC_DISTRACTED,
            },
            ProfilePreset::Adhd => Self {
                focused: ADHD_FOCUSED,
                distracted: ADHD_DISTRACTED,
            },
        }
    }

    pub fn select(&self, is_focused: bool) -> &BandProfile {
        if is_focused {
            &self.focused
        } else {
            &self.distracted
        }
    }
}

/// Named profile variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfilePreset {
    #[default]
    Classic,
    /// Lower high-beta when focused, much lower delta when distracted
    Adhd,
}

impl fmt::Display for ProfilePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfilePreset::Classic => write!(f, "classic"),
            ProfilePreset::Adhd => write!(f, "adhd"),
        }
    }
}

impl FromStr for ProfilePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(ProfilePreset::Classic),
            "adhd" => Ok(ProfilePreset::Adhd),
            other => Err(format!("unknown profile preset '{}'", other)),
        }
    }
}

// delta, theta, low_alpha, high_alpha, low_beta, high_beta, low_gamma, mid_gamma
pub const CLASSIC_FOCUSED: BandProfile = BandProfile {
    bands: [
        spec(15000.0, 5000.0),
        spec(10000.0, 3000.0),
        spec(8000.0, 2000.0),
        spec(9000.0, 2000.0),
        spec(25000.0, 5000.0),
        spec(22000.0, 5000.0),
        spec(15000.0, 4000.0),
        spec(12000.0, 3000.0),
    ],
};

pub const CLASSIC_DISTRACTED: BandProfile = BandProfile {
    bands: [
        spec(60000.0, 10000.0),
        spec(45000.0, 8000.0),
        spec(20000.0, 5000.0),
        spec(18000.0, 5000.0),
        spec(9000.0, 2000.0),
        spec(8000.0, 2000.0),
        spec(4000.0, 1000.0),
        spec(3000.0, 1000.0),
    ],
};

pub const ADHD_FOCUSED: BandProfile = BandProfile {
    bands: [
        spec(15000.0, 5000.0),
        spec(10000.0, 3000.0),
        spec(8000.0, 2000.0),
        spec(9000.0, 2000.0),
        spec(25000.0, 5000.0),
        spec(18000.0, 3000.0),
        spec(15000.0, 4000.0),
        spec(12000.0, 3000.0),
    ],
};

pub const ADHD_DISTRACTED: BandProfile = BandProfile {
    bands: [
        spec(20000.0, 5000.0),
        spec(45000.0, 8000.0),
        spec(20000.0, 5000.0),
        spec(18000.0, 5000.0),
        spec(9000.0, 2000.0),
        spec(7000.0, 1500.0),
        spec(4000.0, 1000.0),
        spec(3000.0, 1000.0),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focused_profiles_raise_beta_and_lower_theta() {
        for preset in [ProfilePreset::Classic, ProfilePreset::Adhd] {
            let set = ProfileSet::for_preset(preset);
            for band in ["low_beta", "high_beta"] {
                assert!(set.focused.band(band).unwrap().base > set.distracted.band(band).unwrap().base);
            }
            assert!(set.focused.band("theta").unwrap().base < set.distracted.band("theta").unwrap().base);
        }
    }

    #[test]
    fn test_adhd_differs_in_high_beta_and_delta() {
        assert_eq!(ADHD_FOCUSED.band("high_beta"), Some(spec(18000.0, 3000.0)));
        assert_eq!(ADHD_DISTRACTED.band("delta"), Some(spec(20000.0, 5000.0)));
        assert_eq!(ADHD_FOCUSED.band("delta"), CLASSIC_FOCUSED.band("delta"));
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("ADHD".parse::<ProfilePreset>(), Ok(ProfilePreset::Adhd));
        assert_eq!("classic".parse::<ProfilePreset>(), Ok(ProfilePreset::Classic));
        assert!("calm".parse::<ProfilePreset>().is_err());
        assert_eq!(ProfilePreset::Adhd.to_string(), "adhd");
    }
}
