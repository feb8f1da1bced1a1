//! Raw model output decoding.
//!
//! The supported detector emits a flat `f32` buffer of `RECORD_COUNT`
//! records, each `RECORD_VALUES` long: 4 box parameters (center-x, center-y,
//! width, height, all as fractions of the frame), an objectness score, then
//! `CLASS_COUNT` per-class scores. Only the person class (index 0) is
//! consulted.

use crate::detect::result::{Detection, OccupantLabel};
use crate::geometry::BoundingBox;

/// Number of candidate records in one raw output buffer.
pub const RECORD_COUNT: usize = 25_200;

/// Values per record: 4 box parameters + objectness + per-class scores.
pub const RECORD_VALUES: usize = 4 + 1 + CLASS_COUNT;

/// Classes scored by the model (COCO).
pub const CLASS_COUNT: usize = 80;

/// Default confidence threshold applied to objectness and final confidence.
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

const OBJECTNESS_OFFSET: usize = 4;
const PERSON_CLASS_OFFSET: usize = 5;

/// Decode a raw output buffer into candidate person detections.
///
/// Per record: the objectness score must exceed `confidence_threshold`;
/// the final confidence is `objectness * person_class_score` and must also
/// exceed it. Surviving boxes are converted from fractional center format to
/// pixel corner format. The input is never mutated; a trailing short record
/// is skipped rather than treated as an error.
pub fn decode_raw_output(
    output: &[f32],
    image_width: u32,
    image_height: u32,
    confidence_threshold: f32,
) -> Vec<Detection> {
    let image_width = image_width as f32;
    let image_height = image_height as f32;
    let mut detections = Vec::new();

    for record in output.chunks_exact(RECORD_VALUES).take(RECORD_COUNT) {
        let objectness = record[OBJECTNESS_OFFSET];
        if objectness <= confidence_threshold {
            continue;
        }

        let person_score = record[PERSON_CLASS_OFFSET];
        let confidence = objectness * person_score;
        if confidence <= confidence_threshold {
            continue;
        }

        let center_x = record[0] * image_width;
        let center_y = record[1] * image_height;
        let box_width = record[2] * image_width;
        let box_height = record[3] * image_height;

        let bounds = BoundingBox::new(
            center_x - box_width / 2.0,
            center_y - box_height / 2.0,
            center_x + box_width / 2.0,
            center_y + box_height / 2.0,
        );

        detections.push(Detection::new(bounds, confidence, OccupantLabel::Person));
    }

    detections
}
