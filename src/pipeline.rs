//! Frame-driven run loop: capture, measure, classify, synthesize, publish
//! Location: src/pipeline.rs

use crate::attention::{AttentionClassifier, AttentionState, AttentionVerdict};
use crate::config::{CameraBackend, SinkKind, SystemConfig};
use crate::error::{FocusErrorBuilder, FocusResult};
use crate::synthesis::{EegReading, SignalSynthesizer};
use crate::telemetry::{AesCbcEnvelope, TelemetryPublisher, TelemetrySink, WriterSink};
use crate::vision::{
    simulated_subject, DisplaySink, Frame, FrameMeasurement, FrameSource, NullDisplay, ObjectDetector, OverlayColor,
    Point, VisionFrameAnalyzer,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const STOP_POLL_SLICE: Duration = Duration::from_millis(10);

/// Cloneable stop flag shared with signal handlers or other threads
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Doubling delay between reconnect attempts, capped at `max`
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl ReconnectBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            attempt: 0,
        }
    }

    /// Delay before the next attempt; advances the attempt counter
    pub fn next_delay(&mut self) -> Duration {
        let factor = 1u32.checked_shl(self.attempt).unwrap_or(u32::MAX);
        let delay = self.base.saturating_mul(factor).min(self.max);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Consecutive failed reads since the last good frame
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// Counters kept by the run loop
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineMetrics {
    pub frames_processed: u64,
    pub empty_frames: u64,
    pub reconnect_attempts: u64,
    pub published_messages: u64,
    pub publish_failures: u64,
    pub average_frame_time_us: f64,
    pub max_frame_time_us: f64,
}

impl PipelineMetrics {
    fn record_frame_time(&mut self, frame_time_us: f64) {
        self.frames_processed += 1;
        let n = self.frames_processed as f64;
        self.average_frame_time_us = (self.average_frame_time_us * (n - 1.0) + frame_time_us) / n;
        if frame_time_us > self.max_frame_time_us {
            self.max_frame_time_us = frame_time_us;
        }
    }
}

/// Why [`FocusPipeline::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    StopRequested,
    FrameLimit,
    /// Reconnect attempts exhausted
    SourceExhausted,
}

/// Final state of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub stop_reason: StopReason,
    pub face_frames: u64,
    pub focused_frames: u64,
    pub blink_count: u32,
    pub focus_ratio: f64,
    pub metrics: PipelineMetrics,
    pub elapsed_ms: u128,
}

/// Everything produced for one frame
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub measurement: FrameMeasurement,
    pub verdict: AttentionVerdict,
    pub reading: EegReading,
    pub published: bool,
}

pub struct FocusPipeline {
    source: Box<dyn FrameSource>,
    analyzer: VisionFrameAnalyzer,
    classifier: AttentionClassifier,
    synthesizer: SignalSynthesizer,
    publisher: TelemetryPublisher,
    display: Box<dyn DisplaySink>,
    state: AttentionState,
    backoff: ReconnectBackoff,
    frame_interval: Duration,
    max_frames: Option<u64>,
    max_reconnect_attempts: Option<u32>,
    metrics: PipelineMetrics,
}

impl FocusPipeline {
    pub fn new(
        config: &SystemConfig,
        source: Box<dyn FrameSource>,
        face_detector: Box<dyn ObjectDetector>,
        eye_detector: Box<dyn ObjectDetector>,
        publisher: TelemetryPublisher,
    ) -> Self {
        let analyzer = VisionFrameAnalyzer::new(face_detector, eye_detector, &config.vision);
        let (face_loaded, eye_loaded) = analyzer.detectors_loaded();
        if !face_loaded || !eye_loaded {
            warn!(face_loaded, eye_loaded, "running with a missing detector model");
        }

        Self {
            source,
            analyzer,
            classifier: AttentionClassifier::new(&config.attention),
            synthesizer: SignalSynthesizer::new(&config.synthesis, config.attention.track_head_velocity),
            publisher,
            display: Box::new(NullDisplay),
            state: AttentionState::new(),
            backoff: ReconnectBackoff::new(
                Duration::from_millis(config.camera.reconnect_base_delay_ms),
                Duration::from_millis(config.camera.reconnect_max_delay_ms),
            ),
            frame_interval: Duration::from_millis(config.run.frame_interval_ms),
            max_frames: config.run.max_frames,
            max_reconnect_attempts: config.run.max_reconnect_attempts,
            metrics: PipelineMetrics::default(),
        }
    }

    /// Assemble a pipeline from configuration alone: camera backend,
    /// detectors, envelope and sink
    pub fn from_config(config: &SystemConfig) -> FocusResult<Self> {
        config
            .validate()
            .map_err(|errors| FocusErrorBuilder::new("config", "validate").configuration(&errors.join("; ")))?;

        let envelope = AesCbcEnvelope::from_hex(&config.telemetry.key_hex, &config.telemetry.iv_hex)?;
        let sink = open_sink(config)?;
        let publisher = TelemetryPublisher::new(config.telemetry.topic.clone(), Box::new(envelope), sink);

        let (source, face, eye, display) = open_camera(config)?;
        Ok(Self::new(config, source, face, eye, publisher).with_display(display))
    }

    pub fn with_display(mut self, display: Box<dyn DisplaySink>) -> Self {
        self.display = display;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: SignalSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn state(&self) -> &AttentionState {
        &self.state
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Run one frame through every stage. A failed publish is logged and
    /// counted; the outcome reports `published = false`.
    pub fn process_frame(&mut self, frame: &Frame) -> FrameOutcome {
        let analysis = self.analyzer.analyze(frame, &mut self.state.stable_face_rect);
        let mut measurement = analysis.measurement;
        let mut overlay = analysis.overlay;

        self.classifier.apply_head_velocity(&mut measurement, &mut self.state);
        let verdict = self.classifier.update(&measurement, &mut self.state);
        let reading = self.synthesizer.synthesize(&self.state, &measurement);

        let published = match self.publisher.publish(&reading) {
            Ok(_) => {
                self.metrics.published_messages += 1;
                true
            }
            Err(e) => {
                self.metrics.publish_failures += 1;
                warn!(error = %e, failures = self.metrics.publish_failures, "publish failed");
                false
            }
        };

        if verdict.blink_started {
            overlay.label("BLINK", Point::new(10, 60), OverlayColor::Yellow);
        }
        let (label, color) = if verdict.is_focused {
            ("STATE: FOCUSED", OverlayColor::Green)
        } else {
            ("STATE: DISTRACTED", OverlayColor::Red)
        };
        overlay.label(label, Point::new(10, 30), color);
        self.display.show(frame, &overlay);

        debug!(
            focused = verdict.is_focused,
            face = measurement.face_found,
            yaw = measurement.head_yaw,
            gaze = measurement.gaze_offset,
            blinks = self.state.blink_count,
            ratio = self.state.focus_ratio(),
            "frame processed"
        );

        FrameOutcome {
            measurement,
            verdict,
            reading,
            published,
        }
    }

    /// Drive the loop until `stop` fires, the frame limit is hit, or
    /// reconnects run out
    pub fn run(&mut self, stop: &StopToken) -> RunSummary {
        info!(
            source = %self.source.describe(),
            sink = %self.publisher.sink_description(),
            topic = self.publisher.topic(),
            "pipeline started"
        );
        let started = Instant::now();

        let stop_reason = loop {
            if stop.is_stopped() {
                break StopReason::StopRequested;
            }
            if self.max_frames.is_some_and(|max| self.metrics.frames_processed >= max) {
                break StopReason::FrameLimit;
            }

            let tick = Instant::now();
            let Some(frame) = self.source.read_frame().filter(|f| !f.is_empty()) else {
                self.metrics.empty_frames += 1;
                if self
                    .max_reconnect_attempts
                    .is_some_and(|max| self.backoff.attempts() >= max)
                {
                    break StopReason::SourceExhausted;
                }
                self.reconnect(stop);
                continue;
            };
            self.backoff.reset();

            self.process_frame(&frame);
            self.metrics.record_frame_time(tick.elapsed().as_secs_f64() * 1e6);

            if let Some(remaining) = self.frame_interval.checked_sub(tick.elapsed()) {
                sleep_unless_stopped(remaining, stop);
            }
        };

        let summary = RunSummary {
            stop_reason,
            face_frames: self.state.total_frames,
            focused_frames: self.state.focused_frames,
            blink_count: self.state.blink_count,
            focus_ratio: self.state.focus_ratio(),
            metrics: self.metrics.clone(),
            elapsed_ms: started.elapsed().as_millis(),
        };
        info!(
            reason = ?summary.stop_reason,
            frames = summary.metrics.frames_processed,
            focus_ratio = summary.focus_ratio,
            blinks = summary.blink_count,
            "pipeline stopped"
        );
        summary
    }

    fn reconnect(&mut self, stop: &StopToken) {
        let delay = self.backoff.next_delay();
        warn!(
            source = %self.source.describe(),
            attempt = self.backoff.attempts(),
            delay_ms = delay.as_millis() as u64,
            "empty frame, reopening camera"
        );
        sleep_unless_stopped(delay, stop);
        self.metrics.reconnect_attempts += 1;
        if let Err(e) = self.source.reopen() {
            warn!(error = %e, "camera reopen failed");
        }
    }
}

fn sleep_unless_stopped(duration: Duration, stop: &StopToken) {
    let deadline = Instant::now() + duration;
    loop {
        if stop.is_stopped() {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep((deadline - now).min(STOP_POLL_SLICE));
    }
}

fn open_sink(config: &SystemConfig) -> FocusResult<Box<dyn TelemetrySink>> {
    match config.telemetry.sink {
        SinkKind::Stdout => Ok(Box::new(WriterSink::stdout())),
        #[cfg(feature = "desktop")]
        SinkKind::Redis => Ok(Box::new(crate::telemetry::RedisSink::open(&config.telemetry.redis_url)?)),
        #[cfg(not(feature = "desktop"))]
        SinkKind::Redis => Err(FocusErrorBuilder::new("telemetry", "open_sink")
            .configuration("redis sink requires the 'desktop' feature")),
        #[cfg(feature = "zmq")]
        SinkKind::Zmq => Ok(Box::new(crate::telemetry::ZmqSink::bind(&config.telemetry.zmq_endpoint)?)),
        #[cfg(not(feature = "zmq"))]
        SinkKind::Zmq => Err(FocusErrorBuilder::new("telemetry", "open_sink")
            .configuration("zmq sink requires the 'zmq' feature")),
    }
}

type CameraParts = (
    Box<dyn FrameSource>,
    Box<dyn ObjectDetector>,
    Box<dyn ObjectDetector>,
    Box<dyn DisplaySink>,
);

fn open_camera(config: &SystemConfig) -> FocusResult<CameraParts> {
    match config.camera.backend {
        CameraBackend::Simulated => {
            let seed = config.synthesis.seed.unwrap_or_else(rand::random);
            let (camera, faces, eyes) =
                simulated_subject(seed, config.camera.frame_height, config.camera.frame_width);
            let camera = camera.with_dropout(config.camera.simulated_dropout);
            Ok((Box::new(camera), Box::new(faces), Box::new(eyes), debug_display(config)))
        }
        #[cfg(feature = "opencv")]
        CameraBackend::Opencv => {
            use crate::vision::opencv_backend::{load_detector_or_null, OpencvCamera};

            // An unavailable device starts closed and is retried by the run loop
            let camera = OpencvCamera::open(&config.camera.source);
            let vision = &config.vision;
            let faces = load_detector_or_null(
                "face",
                &config.camera.face_cascade_path,
                vision.face_scale_factor,
                vision.face_min_neighbors,
            );
            let eyes = load_detector_or_null(
                "eye",
                &config.camera.eye_cascade_path,
                vision.eye_scale_factor,
                vision.eye_min_neighbors,
            );
            Ok((Box::new(camera), faces, eyes, debug_display(config)))
        }
        #[cfg(not(feature = "opencv"))]
        CameraBackend::Opencv => Err(FocusErrorBuilder::new("camera", "open")
            .configuration("opencv camera backend requires the 'opencv' feature")),
    }
}

#[cfg(feature = "opencv")]
fn debug_display(config: &SystemConfig) -> Box<dyn DisplaySink> {
    if config.run.show_debug_window {
        Box::new(crate::vision::opencv_backend::OpencvDisplay::new("focus-eeg"))
    } else {
        Box::new(NullDisplay)
    }
}

#[cfg(not(feature = "opencv"))]
fn debug_display(config: &SystemConfig) -> Box<dyn DisplaySink> {
    if config.run.show_debug_window {
        warn!("debug window requires the 'opencv' feature; continuing without it");
    }
    Box::new(NullDisplay)
}
