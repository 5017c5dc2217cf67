//! Fixed-shape JSON record for one reading

use crate::config::constants::telemetry::{BAND_DECIMALS, VISION_DECIMALS};
use crate::synthesis::types::{BandPowers, EegReading};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Serializes readings into the record consumers expect.
///
/// Key order and number formatting are fixed: band powers with no decimals,
/// vision fields with two, `blink_count` and `timestamp` as integers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryEncoder;

impl TelemetryEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, reading: &EegReading) -> String {
        let mut out = String::with_capacity(384);
        let _ = write!(out, "{{\"timestamp\": {}, \"eeg_power\": {{", reading.timestamp_ms);
        for (i, (name, value)) in reading.bands.named().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "\"{}\": {:.*}", name, BAND_DECIMALS, value);
        }
        let _ = write!(
            out,
            "}}, \"vision\": {{\"yaw\": {yaw:.p$}, \"gaze\": {gaze:.p$}, \"attention\": {attention:.p$}, \"blink_count\": {blinks}, \"hyperactivity_index\": {hyper:.p$}, \"focus_ratio\": {ratio:.p$}}}}}",
            yaw = reading.yaw,
            gaze = reading.gaze,
            attention = reading.attention,
            blinks = reading.blink_count,
            hyper = reading.hyperactivity_index,
            ratio = reading.focus_ratio,
            p = VISION_DECIMALS,
        );
        out
    }

    /// Parse a record produced by [`encode`](Self::encode)
    pub fn decode(&self, json: &str) -> Result<TelemetryRecord, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Parsed form of the record, for receivers and tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp: i64,
    pub eeg_power: BandPowers,
    pub vision: VisionFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionFields {
    pub yaw: f64,
    pub gaze: f64,
    pub attention: f64,
    pub blink_count: u32,
    pub hyperactivity_index: f64,
    pub focus_ratio: f64,
}
