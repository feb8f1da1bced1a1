//! Detection pipeline: inference, decoding and suppression for one frame.

use crate::detect::backend::InferenceBackend;
use crate::detect::backends::SyntheticDetector;
use crate::detect::decoder::{decode_raw_output, CONFIDENCE_THRESHOLD};
use crate::detect::result::Detection;
use crate::detect::suppress::{non_max_suppression, IOU_THRESHOLD};
use crate::ingest::VideoFrame;

/// Why the pipeline fell back to the synthetic detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// No inference backend is configured.
    NoBackend,
    /// The configured backend returned an error for this frame.
    InferenceFailed,
}

/// Where the detections of one sampling cycle came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionOrigin {
    /// Real model output, decoded and suppressed.
    Model,
    Synthetic(FallbackReason),
}

/// Detections produced for one sampled frame, with their origin.
#[derive(Clone, Debug)]
pub struct TickDetections {
    pub detections: Vec<Detection>,
    pub origin: DetectionOrigin,
}

/// Confidence and IoU thresholds for decode and suppression.
#[derive(Clone, Copy, Debug)]
pub struct Thresholds {
    pub confidence: f32,
    pub iou: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            confidence: CONFIDENCE_THRESHOLD,
            iou: IOU_THRESHOLD,
        }
    }
}

/// Per-frame detection pipeline.
///
/// With a backend: infer, decode, suppress. Without one, or when a backend
/// call fails, the synthetic detector stands in. `detect` is infallible:
/// every failure degrades to a deterministic substitute result and the
/// reason is carried in the returned [`DetectionOrigin`] instead of an
/// error. Backend failures are logged, never surfaced.
pub struct DetectionPipeline {
    backend: Option<Box<dyn InferenceBackend>>,
    thresholds: Thresholds,
    synthetic: SyntheticDetector,
}

impl DetectionPipeline {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            backend: None,
            thresholds,
            synthetic: SyntheticDetector::new(),
        }
    }

    pub fn with_backend(mut self, backend: Box<dyn InferenceBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Run detection on one sampled frame.
    pub fn detect(&mut self, frame: &VideoFrame) -> TickDetections {
        let reason = match self.backend.as_mut() {
            Some(backend) => match backend.infer(&frame.pixels, frame.width, frame.height) {
                Ok(raw) => {
                    let candidates = decode_raw_output(
                        &raw,
                        frame.width,
                        frame.height,
                        self.thresholds.confidence,
                    );
                    let detections = non_max_suppression(candidates, self.thresholds.iou);
                    return TickDetections {
                        detections,
                        origin: DetectionOrigin::Model,
                    };
                }
                Err(err) => {
                    log::warn!(
                        "backend '{}' failed, using synthetic detections: {}",
                        backend.name(),
                        err
                    );
                    FallbackReason::InferenceFailed
                }
            },
            None => FallbackReason::NoBackend,
        };

        let detections = self.synthetic.detect(
            frame.position_ms,
            frame.width as f32,
            frame.height as f32,
        );
        TickDetections {
            detections,
            origin: DetectionOrigin::Synthetic(reason),
        }
    }
}
