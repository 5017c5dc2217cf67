// tests/telemetry_encoding.rs
//! Record layout, envelope and framing as seen by a receiver

use focus_eeg_core::synthesis::{BandPowers, EegReading};
use focus_eeg_core::telemetry::{
    open_message, split_frame, AesCbcEnvelope, EnvelopeCipher, EnvelopeError, MemorySink, OpenError,
    TelemetryEncoder, TelemetryPublisher, TelemetrySink, WriterSink,
};

const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c2b7e151628aed2a6abf7158809cf4f3c";
const IV: &str = "7649abac8119b246cee98e9b12e9197d";

fn reading(timestamp_ms: i64, focused: bool) -> EegReading {
    EegReading {
        timestamp_ms,
        bands: BandPowers::from_array([15000.4, 9000.5, 8100.0, 9200.0, 21000.0, 18000.9, 6000.0, 4999.7]),
        yaw: 3.456,
        gaze: 0.126,
        attention: if focused { 1.0 } else { 0.0 },
        blink_count: 7,
        hyperactivity_index: 12.0,
        focus_ratio: 2.0 / 3.0,
    }
}

fn publisher(sink: &MemorySink) -> TelemetryPublisher {
    TelemetryPublisher::new(
        "EEG_SECURE",
        Box::new(AesCbcEnvelope::from_hex(KEY, IV).unwrap()),
        Box::new(sink.clone()),
    )
}

#[test]
fn test_receiver_recovers_exact_record() {
    let sink = MemorySink::new();
    let mut publisher = publisher(&sink);
    let expected = TelemetryEncoder::new().encode(&reading(1_000, true));

    publisher.publish(&reading(1_000, true)).unwrap();

    let envelope = AesCbcEnvelope::from_hex(KEY, IV).unwrap();
    let (_, message) = &sink.messages()[0];
    let (topic, json, record) = open_message(&envelope, message).unwrap();

    assert_eq!(topic, "EEG_SECURE");
    assert_eq!(json, expected);
    assert_eq!(record.timestamp, 1_000);
    assert_eq!(record.eeg_power.delta, 15000.0);
    assert_eq!(record.eeg_power.mid_gamma, 5000.0);
    assert_eq!(record.vision.yaw, 3.46);
    assert_eq!(record.vision.gaze, 0.13);
    assert_eq!(record.vision.focus_ratio, 0.67);
    assert_eq!(record.vision.blink_count, 7);
}

#[test]
fn test_fixed_iv_makes_identical_records_identical() {
    let sink = MemorySink::new();
    let publisher = publisher(&sink);
    assert_eq!(publisher.seal(&reading(5, true)), publisher.seal(&reading(5, true)));
    assert_ne!(publisher.seal(&reading(5, true)), publisher.seal(&reading(5, false)));
}

#[test]
fn test_writer_sink_emits_one_line_per_message() {
    let sink = MemorySink::new();
    let publisher = publisher(&sink);
    let mut writer = WriterSink::new(Vec::new(), "buffer");

    for ts in 0..3 {
        writer.send("EEG_SECURE", &publisher.seal(&reading(ts, ts % 2 == 0))).unwrap();
    }

    let output = String::from_utf8(writer.into_inner()).unwrap();
    let envelope = AesCbcEnvelope::from_hex(KEY, IV).unwrap();
    let timestamps: Vec<i64> = output
        .lines()
        .map(|line| open_message(&envelope, line).unwrap().2.timestamp)
        .collect();
    assert_eq!(timestamps, vec![0, 1, 2]);
}

#[test]
fn test_payload_is_single_base64_token() {
    let sink = MemorySink::new();
    let message = publisher(&sink).seal(&reading(1, true));
    let (topic, payload) = split_frame(&message).unwrap();
    assert_eq!(topic, "EEG_SECURE");
    assert!(!payload.contains(' '));
    assert!(payload
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));
}

#[test]
fn test_wrong_key_is_rejected() {
    let sink = MemorySink::new();
    let message = publisher(&sink).seal(&reading(1, true));
    let other = AesCbcEnvelope::from_hex(&KEY.replace('2', "3"), IV).unwrap();

    // A wrong key either breaks the padding or yields garbage that is not a record
    match open_message(&other, &message) {
        Err(OpenError::Envelope(EnvelopeError::Decrypt)) | Err(OpenError::Utf8) | Err(OpenError::Record(_)) => {}
        other => panic!("wrong key accepted: {:?}", other.map(|(t, _, _)| t)),
    }
}

#[test]
fn test_corrupted_payloads() {
    let envelope = AesCbcEnvelope::from_hex(KEY, IV).unwrap();
    assert!(matches!(open_message(&envelope, "EEG_SECURE"), Err(OpenError::Framing)));
    assert!(matches!(
        open_message(&envelope, "EEG_SECURE not*base64"),
        Err(OpenError::Envelope(EnvelopeError::Base64(_)))
    ));
    // Nine bytes is not a whole cipher block
    let short = envelope.seal(b"x");
    let truncated = &short[..12];
    assert!(open_message(&envelope, &format!("EEG_SECURE {}", truncated)).is_err());
}

#[test]
fn test_bad_key_material() {
    assert!(matches!(
        AesCbcEnvelope::from_hex("zz", IV),
        Err(EnvelopeError::InvalidHex { field: "key_hex", .. })
    ));
    assert!(matches!(
        AesCbcEnvelope::from_hex(&KEY[..32], IV),
        Err(EnvelopeError::InvalidKeyLength { expected: 32, actual: 16 })
    ));
    assert!(matches!(
        AesCbcEnvelope::from_hex(KEY, "00"),
        Err(EnvelopeError::InvalidIvLength { expected: 16, actual: 1 })
    ));
}

#[cfg(feature = "zmq")]
#[test]
fn test_zmq_subscriber_receives_sealed_records() {
    use focus_eeg_core::telemetry::ZmqSink;

    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut sink = ZmqSink::bind(&format!("tcp://127.0.0.1:{}", port)).unwrap();

    let context = zmq::Context::new();
    let subscriber = context.socket(zmq::SUB).unwrap();
    subscriber.connect(&format!("tcp://127.0.0.1:{}", port)).unwrap();
    subscriber.set_subscribe(b"EEG_SECURE").unwrap();
    subscriber.set_rcvtimeo(100).unwrap();

    let memory = MemorySink::new();
    let message = publisher(&memory).seal(&reading(77, true));

    // PUB drops messages until the subscription has propagated
    let mut received = None;
    for _ in 0..50 {
        sink.send("EEG_SECURE", &message).unwrap();
        if let Ok(Ok(text)) = subscriber.recv_string(0) {
            received = Some(text);
            break;
        }
    }

    let received = received.expect("subscriber never received a message");
    assert_eq!(received, message);
    let envelope = AesCbcEnvelope::from_hex(KEY, IV).unwrap();
    let (topic, _, record) = open_message(&envelope, &received).unwrap();
    assert_eq!(topic, "EEG_SECURE");
    assert_eq!(record.timestamp, 77);
    assert_eq!(record.vision.attention, 1.0);
}
