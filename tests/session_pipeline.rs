//! End-to-end coverage of the sampling and aggregation path.

use anyhow::anyhow;

use cabinwatch::detect::decoder::RECORD_VALUES;
use cabinwatch::{
    DetectionOrigin, DetectionPipeline, FallbackReason, FileConfig, FileSource,
    InferenceBackend, SessionAggregator, Thresholds,
};

struct FailingBackend;

impl InferenceBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn infer(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> anyhow::Result<Vec<f32>> {
        Err(anyhow!("inference unavailable"))
    }
}

struct SilentBackend;

impl InferenceBackend for SilentBackend {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn infer(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> anyhow::Result<Vec<f32>> {
        // Valid layout, nothing above threshold.
        Ok(vec![0.0; RECORD_VALUES * 4])
    }
}

fn stub_source(duration_ms: u64) -> FileSource {
    FileSource::new(FileConfig {
        path: "stub://integration_cabin".to_string(),
        stub_duration_ms: duration_ms,
        ..FileConfig::default()
    })
    .expect("stub source")
}

#[test]
fn backend_failure_degrades_to_synthetic_detections() {
    let mut source = stub_source(2_000);
    let pipeline =
        DetectionPipeline::new(Thresholds::default()).with_backend(Box::new(FailingBackend));
    let mut aggregator = SessionAggregator::new(pipeline);

    let frame = source.frame_at(500).expect("frame").expect("in range");
    let tick = aggregator.on_tick(500, Some(&frame)).expect("tick ran");

    assert!(!tick.detections.is_empty());
    assert_eq!(
        tick.origin,
        DetectionOrigin::Synthetic(FallbackReason::InferenceFailed)
    );
    assert_eq!(aggregator.summarize().snapshot_count, 1);
}

#[test]
fn missing_frame_skips_the_tick() {
    let mut source = stub_source(1_000);
    let mut aggregator =
        SessionAggregator::new(DetectionPipeline::new(Thresholds::default()));

    // Past the end of the stream: the source has no frame for this tick.
    let frame = source.frame_at(5_000).expect("frame lookup");
    assert!(frame.is_none());
    assert!(aggregator.on_tick(5_000, frame.as_ref()).is_none());
    assert_eq!(aggregator.summarize().snapshot_count, 0);
}

#[test]
fn empty_model_output_records_no_snapshot() {
    let mut source = stub_source(2_000);
    let pipeline =
        DetectionPipeline::new(Thresholds::default()).with_backend(Box::new(SilentBackend));
    let mut aggregator = SessionAggregator::new(pipeline);

    let frame = source.frame_at(100).expect("frame").expect("in range");
    let tick = aggregator.on_tick(100, Some(&frame)).expect("tick ran");

    assert_eq!(tick.origin, DetectionOrigin::Model);
    assert!(tick.detections.is_empty());
    assert_eq!(aggregator.summarize().snapshot_count, 0);
}

#[test]
fn synthetic_session_produces_a_complete_summary() {
    let duration_ms = 12_000;
    let tick_ms = 100;
    let mut source = stub_source(duration_ms);
    let mut aggregator =
        SessionAggregator::new(DetectionPipeline::new(Thresholds::default()));
    aggregator.reset();

    let mut position_ms = 0;
    while position_ms < duration_ms {
        let frame = source.frame_at(position_ms).expect("frame lookup");
        aggregator.on_tick(position_ms, frame.as_ref());
        position_ms += tick_ms;
    }

    let summary = aggregator.summarize();
    // The synthetic detector always finds the driver, so every tick records.
    assert_eq!(summary.snapshot_count, (duration_ms / tick_ms) as usize);
    assert_eq!(summary.distinct_timestamps, summary.snapshot_count);
    // Driver plus front passenger in the early phase of each cycle.
    assert_eq!(summary.peak_occupancy, 2);
    assert!(summary.mean_confidence > 0.6 && summary.mean_confidence < 1.0);
    assert_eq!(summary.timeline.len(), 10);

    // A second session starts clean.
    aggregator.reset();
    let summary = aggregator.summarize();
    assert_eq!(summary.snapshot_count, 0);
    assert_eq!(summary.mean_confidence, 0.0);
}

#[test]
fn snapshots_preserve_tick_order() {
    let duration_ms = 3_000;
    let mut source = stub_source(duration_ms);
    let mut aggregator =
        SessionAggregator::new(DetectionPipeline::new(Thresholds::default()));

    for position_ms in (0..duration_ms).step_by(100) {
        let frame = source.frame_at(position_ms).expect("frame lookup");
        aggregator.on_tick(position_ms, frame.as_ref());
    }

    let snapshots = aggregator.history().snapshots();
    for pair in snapshots.windows(2) {
        assert!(pair[0].timestamp_ms < pair[1].timestamp_ms);
    }
}
