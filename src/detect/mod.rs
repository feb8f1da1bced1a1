mod backend;
mod backends;
pub mod decoder;
mod pipeline;
mod result;
pub mod suppress;

pub use backend::InferenceBackend;
pub use backends::{SyntheticDetector, PATTERN_CYCLE_SECS};
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use pipeline::{
    DetectionOrigin, DetectionPipeline, FallbackReason, Thresholds, TickDetections,
};
pub use result::{Detection, OccupantLabel};
