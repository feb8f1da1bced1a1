//! End-of-session reporting.
//!
//! Renders the aggregated session statistics into the text block handed to
//! the summary service, provides the deterministic local fallback report,
//! and submits the finished session record to the results backend.

pub mod results;
pub mod summarizer;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::session::SessionSummary;

pub use results::{DeviceInfo, ResultsClient, SessionRecord};
pub use summarizer::{summarize_with_fallback, CloudSummarizer, SummaryService};

/// Whether a session report came from the cloud summarizer or the local
/// fallback generator. Surfaced to the user alongside the report text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryOrigin {
    Cloud,
    Local,
}

impl SummaryOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryOrigin::Cloud => "cloud",
            SummaryOrigin::Local => "local",
        }
    }
}

/// Render the session statistics block that both summarizers consume.
pub fn session_stats_text(
    summary: &SessionSummary,
    video_duration_ms: u64,
    tick_interval_ms: u64,
    confidence_threshold: f32,
) -> String {
    format!(
        "Video Analysis Data:\n\
         \n\
         Video Duration: {} seconds\n\
         Total Detection Events: {}\n\
         Unique Time Frames Analyzed: {}\n\
         Maximum People Detected Simultaneously: {}\n\
         Average Detection Confidence: {:.1}%\n\
         \n\
         Detection Timeline Sample:\n\
         {}\n\
         \n\
         Technical Details:\n\
         - Detection Model: single-class person detector\n\
         - Processing Frequency: Every {} ms\n\
         - Confidence Threshold: {:.0}%",
        video_duration_ms / 1000,
        summary.snapshot_count,
        summary.distinct_timestamps,
        summary.peak_occupancy,
        summary.mean_confidence * 100.0,
        summary.timeline.join("\n"),
        tick_interval_ms,
        confidence_threshold * 100.0,
    )
}

/// Deterministic local report, substituted when the cloud summarizer is
/// unavailable. Equivalent format and content to the cloud report.
pub fn local_summary(
    summary: &SessionSummary,
    video_duration_ms: u64,
    generated_epoch_s: u64,
) -> String {
    format!(
        "LOCAL ANALYSIS REPORT\n\
         \n\
         Generated at: {} (unix seconds)\n\
         Engine: local analysis (cloud summarizer unavailable)\n\
         \n\
         EXECUTIVE SUMMARY:\n\
         Completed occupant detection analysis on {} seconds of video with {} \
         detection events.\n\
         \n\
         KEY DETECTION INSIGHTS:\n\
         - Total Detection Events: {}\n\
         - Unique Time Frames Analyzed: {}\n\
         - Peak Occupancy: {} people simultaneously\n\
         - Average Confidence: {:.1}%\n\
         \n\
         Note: this report was generated on-device. Cloud-generated reports \
         require summary service connectivity.",
        generated_epoch_s,
        video_duration_ms / 1000,
        summary.snapshot_count,
        summary.snapshot_count,
        summary.distinct_timestamps,
        summary.peak_occupancy,
        summary.mean_confidence * 100.0,
    )
}

/// Derive a stable session identifier from the video source and the session
/// start time.
pub fn session_id(source: &str, started_epoch_s: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(started_epoch_s.to_le_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> SessionSummary {
        SessionSummary {
            snapshot_count: 42,
            distinct_timestamps: 40,
            detection_count: 63,
            mean_confidence: 0.785,
            peak_occupancy: 3,
            timeline: vec![
                "00:00: 2 people detected".to_string(),
                "00:01: 3 people detected".to_string(),
            ],
        }
    }

    #[test]
    fn stats_text_carries_the_session_numbers() {
        let text = session_stats_text(&summary(), 30_000, 100, 0.5);
        assert!(text.contains("Video Duration: 30 seconds"));
        assert!(text.contains("Total Detection Events: 42"));
        assert!(text.contains("Unique Time Frames Analyzed: 40"));
        assert!(text.contains("Maximum People Detected Simultaneously: 3"));
        assert!(text.contains("Average Detection Confidence: 78.5%"));
        assert!(text.contains("00:01: 3 people detected"));
        assert!(text.contains("Every 100 ms"));
        assert!(text.contains("Confidence Threshold: 50%"));
    }

    #[test]
    fn local_summary_reports_the_same_statistics() {
        let text = local_summary(&summary(), 30_000, 1_700_000_000);
        assert!(text.contains("30 seconds"));
        assert!(text.contains("42 detection events"));
        assert!(text.contains("Peak Occupancy: 3 people"));
        assert!(text.contains("78.5%"));
        assert!(text.contains("generated on-device"));
    }

    #[test]
    fn session_ids_are_stable_and_distinct() {
        let a = session_id("stub://cabin", 1_700_000_000);
        let b = session_id("stub://cabin", 1_700_000_000);
        let c = session_id("stub://cabin", 1_700_000_001);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }
}
