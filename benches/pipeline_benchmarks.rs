use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use focus_eeg_core::attention::AttentionState;
use focus_eeg_core::config::{SynthesisConfig, SystemConfig, VisionConfig};
use focus_eeg_core::pipeline::FocusPipeline;
use focus_eeg_core::synthesis::{BandPowers, EegReading, SignalSynthesizer};
use focus_eeg_core::telemetry::{AesCbcEnvelope, MemorySink, TelemetryEncoder, TelemetryPublisher};
use focus_eeg_core::vision::{
    eye_gaze_offset, FixedDetector, Frame, FrameMeasurement, Rect, ScriptedFrameSource, VisionFrameAnalyzer,
};
use ndarray::Array2;

const KEY: &str = "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4";
const IV: &str = "000102030405060708090a0b0c0d0e0f";
const RESOLUTIONS: &[(usize, usize)] = &[(240, 320), (480, 640), (720, 1280)];

fn face_and_eyes(rows: usize, cols: usize) -> (Rect, Vec<Rect>) {
    let size = (rows / 3) as i32;
    let face = Rect::new(cols as i32 / 2 - size / 2, rows as i32 / 4, size, size);
    let eye = size / 3;
    let eyes = vec![Rect::new(size / 10, size / 6, eye, eye), Rect::new(size / 2, size / 6, eye, eye)];
    (face, eyes)
}

fn benchmark_frame_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("vision");

    for &(rows, cols) in RESOLUTIONS {
        group.throughput(Throughput::Elements((rows * cols) as u64));
        let (face, eyes) = face_and_eyes(rows, cols);
        let frame = Frame::filled(rows, cols, [170, 160, 150]);

        group.bench_with_input(
            BenchmarkId::new("analyze", format!("{}x{}", cols, rows)),
            &frame,
            |b, frame| {
                let mut analyzer = VisionFrameAnalyzer::new(
                    Box::new(FixedDetector::new(vec![face])),
                    Box::new(FixedDetector::new(eyes.clone())),
                    &VisionConfig::default(),
                );
                let mut held = None;
                b.iter(|| analyzer.analyze(black_box(frame), &mut held));
            },
        );
    }

    for &size in &[24usize, 48, 96] {
        let eye = Array2::<u8>::from_elem((size, size), 180);
        group.bench_with_input(BenchmarkId::new("eye_gaze_offset", size), &eye, |b, eye| {
            b.iter(|| eye_gaze_offset(black_box(eye.view()), 0.3))
        });
    }

    group.finish();
}

fn benchmark_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis");
    let config = SynthesisConfig {
        seed: Some(1),
        ..SynthesisConfig::default()
    };
    let state = AttentionState::new();
    let still = FrameMeasurement::no_face();
    let moving = FrameMeasurement {
        head_velocity: 40.0,
        ..FrameMeasurement::no_face()
    };

    group.bench_function("synthesize_still", |b| {
        let mut synth = SignalSynthesizer::new(&config, true);
        b.iter(|| synth.synthesize(black_box(&state), black_box(&still)))
    });
    group.bench_function("synthesize_muscle_artifact", |b| {
        let mut synth = SignalSynthesizer::new(&config, true);
        b.iter(|| synth.synthesize(black_box(&state), black_box(&moving)))
    });

    group.finish();
}

fn benchmark_telemetry(c: &mut Criterion) {
    let mut group = c.benchmark_group("telemetry");
    let reading = EegReading {
        timestamp_ms: 1_700_000_000_000,
        bands: BandPowers::from_array([15000.0, 9000.0, 8000.0, 9000.0, 21000.0, 18000.0, 6000.0, 5000.0]),
        yaw: 12.0,
        gaze: 0.2,
        attention: 1.0,
        blink_count: 4,
        hyperactivity_index: 3.0,
        focus_ratio: 0.75,
    };

    let encoder = TelemetryEncoder::new();
    group.bench_function("encode", |b| b.iter(|| encoder.encode(black_box(&reading))));

    let envelope = match AesCbcEnvelope::from_hex(KEY, IV) {
        Ok(envelope) => envelope,
        Err(e) => panic!("benchmark key material rejected: {}", e),
    };
    let publisher = TelemetryPublisher::new("EEG_SECURE", Box::new(envelope), Box::new(MemorySink::new()));
    group.bench_function("encode_and_seal", |b| b.iter(|| publisher.seal(black_box(&reading))));

    group.finish();
}

fn benchmark_process_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for &(rows, cols) in RESOLUTIONS {
        let (face, eyes) = face_and_eyes(rows, cols);
        let frame = Frame::filled(rows, cols, [170, 160, 150]);

        group.bench_with_input(
            BenchmarkId::new("process_frame", format!("{}x{}", cols, rows)),
            &frame,
            |b, frame| {
                let mut config = SystemConfig::classic();
                config.synthesis.seed = Some(3);
                let envelope = match AesCbcEnvelope::from_hex(KEY, IV) {
                    Ok(envelope) => envelope,
                    Err(e) => panic!("benchmark key material rejected: {}", e),
                };
                // Keep the sink from growing across iterations
                let sink = MemorySink::new();
                let publisher = TelemetryPublisher::new("EEG_SECURE", Box::new(envelope), Box::new(sink.clone()));
                let mut pipeline = FocusPipeline::new(
                    &config,
                    Box::new(ScriptedFrameSource::default()),
                    Box::new(FixedDetector::new(vec![face])),
                    Box::new(FixedDetector::new(eyes.clone())),
                    publisher,
                );
                b.iter(|| {
                    let outcome = pipeline.process_frame(black_box(frame));
                    sink.clear();
                    outcome
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_frame_analysis,
    benchmark_synthesis,
    benchmark_telemetry,
    benchmark_process_frame
);
criterion_main!(benches);
