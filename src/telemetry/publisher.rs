//! Encode, seal, frame and send one reading

use super::encoder::{TelemetryEncoder, TelemetryRecord};
use super::envelope::{EnvelopeCipher, EnvelopeError};
use super::sink::{SinkError, TelemetrySink};
use crate::synthesis::types::EegReading;
use thiserror::Error;
use tracing::trace;

/// `"<topic> <payload>"`
pub fn frame_message(topic: &str, payload: &str) -> String {
    format!("{} {}", topic, payload)
}

/// Split a framed message into topic and payload
pub fn split_frame(message: &str) -> Option<(&str, &str)> {
    let (topic, payload) = message.trim_end().split_once(' ')?;
    (!topic.is_empty() && !payload.is_empty()).then_some((topic, payload))
}

pub struct TelemetryPublisher {
    topic: String,
    encoder: TelemetryEncoder,
    envelope: Box<dyn EnvelopeCipher>,
    sink: Box<dyn TelemetrySink>,
}

impl TelemetryPublisher {
    pub fn new(topic: impl Into<String>, envelope: Box<dyn EnvelopeCipher>, sink: Box<dyn TelemetrySink>) -> Self {
        Self {
            topic: topic.into(),
            encoder: TelemetryEncoder::new(),
            envelope,
            sink,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn sink_description(&self) -> String {
        self.sink.describe()
    }

    /// Build the framed message for a reading without sending it
    pub fn seal(&self, reading: &EegReading) -> String {
        let json = self.encoder.encode(reading);
        let sealed = self.envelope.seal(json.as_bytes());
        trace!(plain_bytes = json.len(), sealed_bytes = sealed.len(), "record sealed");
        frame_message(&self.topic, &sealed)
    }

    /// Seal and send one reading; returns the framed message size
    pub fn publish(&mut self, reading: &EegReading) -> Result<usize, SinkError> {
        let message = self.seal(reading);
        self.sink.send(&self.topic, &message)?;
        Ok(message.len())
    }
}

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("message is not framed as '<topic> <payload>'")]
    Framing,
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error("payload is not UTF-8")]
    Utf8,
    #[error("payload is not a telemetry record: {0}")]
    Record(#[from] serde_json::Error),
}

/// Receiver side: undo framing and envelope, parse the record.
/// Returns the topic, the raw JSON and the parsed record.
pub fn open_message(
    envelope: &dyn EnvelopeCipher,
    message: &str,
) -> Result<(String, String, TelemetryRecord), OpenError> {
    let (topic, payload) = split_frame(message).ok_or(OpenError::Framing)?;
    let plain = envelope.open(payload)?;
    let json = String::from_utf8(plain).map_err(|_| OpenError::Utf8)?;
    let record = TelemetryEncoder::new().decode(&json)?;
    Ok((topic.to_string(), json, record))
}
