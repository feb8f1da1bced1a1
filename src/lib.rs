//! Cabin occupancy analytics kernel.
//!
//! This crate implements the detection and aggregation core for a
//! session-scoped occupant analytics system: frames are sampled from a
//! video source on a playback-driven cadence, person detection runs on each
//! sample, and a per-session history feeds an end-of-session report.
//!
//! # Degradation policy
//!
//! The sampling path never raises an unrecoverable error to its caller:
//!
//! 1. A malformed raw output record is skipped, not fatal.
//! 2. A missing or failing inference backend degrades to the deterministic
//!    synthetic detector, with the reason carried as a typed value.
//! 3. A missing frame skips the tick without recording a snapshot.
//! 4. A failing cloud summarizer is replaced by the local report.
//! 5. A failing results submission is a warning, not a crash.
//!
//! # Module Structure
//!
//! - `geometry`: bounding boxes and IoU
//! - `detect`: raw output decoding, suppression, backends, pipeline
//! - `ingest`: position-addressed frame sources
//! - `session`: snapshot history and summary statistics
//! - `report`: summarizers and the results backend client
//! - `config`: daemon configuration

pub mod config;
pub mod detect;
pub mod geometry;
pub mod ingest;
pub mod report;
pub mod session;

pub use config::CabinwatchConfig;
pub use detect::{
    Detection, DetectionOrigin, DetectionPipeline, FallbackReason, InferenceBackend,
    OccupantLabel, SyntheticDetector, Thresholds, TickDetections,
};
pub use geometry::BoundingBox;
pub use ingest::{FileConfig, FileSource, VideoFrame};
pub use report::{
    local_summary, session_id, session_stats_text, summarize_with_fallback, CloudSummarizer,
    DeviceInfo, ResultsClient, SessionRecord, SummaryOrigin, SummaryService,
};
pub use session::{
    format_position, DetectionSnapshot, SessionAggregator, SessionHistory, SessionSummary,
};
