//! Record encoding, envelope and transport
//!
//! A reading becomes a fixed-shape JSON record, the record is sealed with
//! AES-256-CBC and Base64, and the result is framed as `"<topic> <payload>"`
//! before it reaches a [`TelemetrySink`].

pub mod encoder;
pub mod envelope;
pub mod publisher;
pub mod sink;

pub use encoder::{TelemetryEncoder, TelemetryRecord, VisionFields};
pub use envelope::{AesCbcEnvelope, EnvelopeCipher, EnvelopeError};
pub use publisher::{frame_message, open_message, split_frame, OpenError, TelemetryPublisher};
pub use sink::{MemorySink, SinkError, TelemetrySink, WriterSink};

#[cfg(feature = "desktop")]
pub use sink::RedisSink;

#[cfg(feature = "zmq")]
pub use sink::ZmqSink;
