use std::fmt;

use crate::geometry::BoundingBox;

/// Occupant label attached to a detection.
///
/// `Person` comes from the model decoder; the seat-specific labels come from
/// the synthetic fallback detector.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OccupantLabel {
    Person,
    Driver,
    Passenger,
    RearPassenger,
}

impl OccupantLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccupantLabel::Person => "Person",
            OccupantLabel::Driver => "Driver",
            OccupantLabel::Passenger => "Passenger",
            OccupantLabel::RearPassenger => "Passenger (Back)",
        }
    }
}

impl fmt::Display for OccupantLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected occupant. Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Bounding box in pixel coordinates of the sampled frame.
    pub bounds: BoundingBox,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
    pub label: OccupantLabel,
}

impl Detection {
    pub fn new(bounds: BoundingBox, confidence: f32, label: OccupantLabel) -> Self {
        Self {
            bounds,
            confidence,
            label,
        }
    }
}
