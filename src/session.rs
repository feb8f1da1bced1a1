//! Session history aggregation.
//!
//! The sampling loop drives [`SessionAggregator::on_tick`] once per
//! playback tick. Snapshots are immutable after creation, appended in tick
//! order, and live only for the current session; `reset` clears them when a
//! new session starts. `summarize` is read-only and is called only after
//! sampling has stopped, so it never observes a partially-appended history.

use std::collections::HashSet;

use serde::Serialize;

use crate::detect::{Detection, DetectionPipeline, TickDetections};
use crate::ingest::VideoFrame;

/// Number of snapshots rendered into the summary timeline sample.
const TIMELINE_SAMPLE_LEN: usize = 10;

/// Detections recorded at one playback position. Never mutated after
/// creation.
#[derive(Clone, Debug)]
pub struct DetectionSnapshot {
    pub timestamp_ms: u64,
    pub detections: Vec<Detection>,
    pub position_label: String,
}

impl DetectionSnapshot {
    pub fn new(timestamp_ms: u64, detections: Vec<Detection>) -> Self {
        Self {
            timestamp_ms,
            detections,
            position_label: format_position(timestamp_ms),
        }
    }
}

/// Ordered, growable snapshot history for one playback session.
#[derive(Debug, Default)]
pub struct SessionHistory {
    snapshots: Vec<DetectionSnapshot>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: DetectionSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn reset(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[DetectionSnapshot] {
        &self.snapshots
    }

    /// Compute summary statistics over the recorded history.
    pub fn summarize(&self) -> SessionSummary {
        let mut detection_count = 0usize;
        let mut confidence_sum = 0.0f64;
        let mut peak_occupancy = 0usize;
        let mut timestamps = HashSet::new();

        for snapshot in &self.snapshots {
            timestamps.insert(snapshot.timestamp_ms);
            peak_occupancy = peak_occupancy.max(snapshot.detections.len());
            for detection in &snapshot.detections {
                detection_count += 1;
                confidence_sum += f64::from(detection.confidence);
            }
        }

        // No detections at all: mean is defined as 0.0, not NaN.
        let mean_confidence = if detection_count == 0 {
            0.0
        } else {
            confidence_sum / detection_count as f64
        };

        let timeline = self
            .snapshots
            .iter()
            .take(TIMELINE_SAMPLE_LEN)
            .map(|snapshot| {
                format!(
                    "{}: {} people detected",
                    snapshot.position_label,
                    snapshot.detections.len()
                )
            })
            .collect();

        SessionSummary {
            snapshot_count: self.snapshots.len(),
            distinct_timestamps: timestamps.len(),
            detection_count,
            mean_confidence,
            peak_occupancy,
            timeline,
        }
    }
}

/// Summary statistics for one session, computed from its history.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    /// Snapshots recorded (ticks with at least one detection).
    pub snapshot_count: usize,
    /// Distinct playback positions among the snapshots.
    pub distinct_timestamps: usize,
    /// Total detections across all snapshots.
    pub detection_count: usize,
    /// Mean confidence across all detections; 0.0 when there are none.
    pub mean_confidence: f64,
    /// Maximum simultaneous detections in any snapshot.
    pub peak_occupancy: usize,
    /// First snapshots rendered as "MM:SS: n people detected" lines.
    pub timeline: Vec<String>,
}

/// Drives the detection pipeline on a fixed playback cadence and records
/// the per-session history.
pub struct SessionAggregator {
    pipeline: DetectionPipeline,
    history: SessionHistory,
}

impl SessionAggregator {
    pub fn new(pipeline: DetectionPipeline) -> Self {
        Self {
            pipeline,
            history: SessionHistory::new(),
        }
    }

    /// Process one sampling tick.
    ///
    /// A missing frame (end-of-stream boundary, extraction failure) skips
    /// the tick: nothing is recorded and `None` is returned. Otherwise the
    /// pipeline runs and, when it finds anything, a snapshot copy of the
    /// detections is appended to the history; the detections are returned
    /// for display either way.
    pub fn on_tick(
        &mut self,
        position_ms: u64,
        frame: Option<&VideoFrame>,
    ) -> Option<TickDetections> {
        let frame = frame?;
        let tick = self.pipeline.detect(frame);
        if !tick.detections.is_empty() {
            self.history
                .push(DetectionSnapshot::new(position_ms, tick.detections.clone()));
        }
        Some(tick)
    }

    /// Summarize the session recorded so far. Call only after sampling has
    /// stopped.
    pub fn summarize(&self) -> SessionSummary {
        self.history.summarize()
    }

    /// Clear the history at the start of a new session.
    pub fn reset(&mut self) {
        self.history.reset();
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }
}

/// Format a playback position as "MM:SS".
pub fn format_position(position_ms: u64) -> String {
    let seconds = position_ms / 1000;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{OccupantLabel, Thresholds};
    use crate::geometry::BoundingBox;

    fn detections(count: usize, confidence: f32) -> Vec<Detection> {
        (0..count)
            .map(|i| {
                Detection::new(
                    BoundingBox::new(i as f32 * 100.0, 0.0, i as f32 * 100.0 + 50.0, 50.0),
                    confidence,
                    OccupantLabel::Person,
                )
            })
            .collect()
    }

    #[test]
    fn empty_history_summarizes_to_zeroes() {
        let mut history = SessionHistory::new();
        history.reset();
        let summary = history.summarize();
        assert_eq!(summary.snapshot_count, 0);
        assert_eq!(summary.distinct_timestamps, 0);
        assert_eq!(summary.mean_confidence, 0.0);
        assert_eq!(summary.peak_occupancy, 0);
        assert!(summary.timeline.is_empty());
    }

    #[test]
    fn summary_counts_peak_and_snapshots() {
        let mut history = SessionHistory::new();
        history.push(DetectionSnapshot::new(100, detections(1, 0.8)));
        history.push(DetectionSnapshot::new(200, detections(2, 0.6)));
        history.push(DetectionSnapshot::new(300, detections(0, 0.0)));

        let summary = history.summarize();
        assert_eq!(summary.snapshot_count, 3);
        assert_eq!(summary.distinct_timestamps, 3);
        assert_eq!(summary.peak_occupancy, 2);
        assert_eq!(summary.detection_count, 3);
        // (0.8 + 0.6 + 0.6) / 3
        assert!((summary.mean_confidence - 0.6666).abs() < 1e-3);
    }

    #[test]
    fn timeline_is_truncated_to_ten_lines() {
        let mut history = SessionHistory::new();
        for i in 0..25 {
            history.push(DetectionSnapshot::new(i * 100, detections(1, 0.7)));
        }
        let summary = history.summarize();
        assert_eq!(summary.snapshot_count, 25);
        assert_eq!(summary.timeline.len(), 10);
        assert_eq!(summary.timeline[0], "00:00: 1 people detected");
    }

    #[test]
    fn distinct_timestamps_deduplicates() {
        let mut history = SessionHistory::new();
        history.push(DetectionSnapshot::new(100, detections(1, 0.7)));
        history.push(DetectionSnapshot::new(100, detections(1, 0.7)));
        assert_eq!(history.summarize().distinct_timestamps, 1);
    }

    #[test]
    fn aggregator_skips_missing_frames() {
        let pipeline = DetectionPipeline::new(Thresholds::default());
        let mut aggregator = SessionAggregator::new(pipeline);

        assert!(aggregator.on_tick(500, None).is_none());
        assert_eq!(aggregator.summarize().snapshot_count, 0);
    }

    #[test]
    fn aggregator_records_synthetic_detections() {
        let pipeline = DetectionPipeline::new(Thresholds::default());
        let mut aggregator = SessionAggregator::new(pipeline);
        let frame = VideoFrame {
            pixels: vec![0; 640 * 480 * 3],
            width: 640,
            height: 480,
            position_ms: 1_000,
        };

        let tick = aggregator.on_tick(1_000, Some(&frame)).expect("tick ran");
        assert!(!tick.detections.is_empty());
        assert_eq!(aggregator.summarize().snapshot_count, 1);

        aggregator.reset();
        assert_eq!(aggregator.summarize().snapshot_count, 0);
    }

    #[test]
    fn positions_format_as_minutes_and_seconds() {
        assert_eq!(format_position(0), "00:00");
        assert_eq!(format_position(65_000), "01:05");
        assert_eq!(format_position(600_000), "10:00");
    }
}
