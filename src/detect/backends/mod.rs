pub mod synthetic;

#[cfg(feature = "backend-tract")]
pub mod tract;

pub use synthetic::{SyntheticDetector, PATTERN_CYCLE_SECS};

#[cfg(feature = "backend-tract")]
pub use tract::TractBackend;
