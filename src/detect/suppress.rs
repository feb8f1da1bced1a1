//! Non-maximum suppression of overlapping detections.

use std::cmp::Ordering;

use crate::detect::result::Detection;

/// Default IoU threshold above which two detections count as duplicates.
pub const IOU_THRESHOLD: f32 = 0.45;

/// Remove overlapping duplicate detections.
///
/// Candidates are stable-sorted by confidence, descending (ties keep input
/// order), then kept greedily: a candidate is discarded when its IoU with
/// any already-kept detection exceeds `iou_threshold`. The result is a
/// subset of the input in descending-confidence order. O(n^2) in the number
/// of candidates, which stay small after thresholding.
pub fn non_max_suppression(mut candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in candidates {
        let duplicate = kept
            .iter()
            .any(|existing| candidate.bounds.iou(&existing.bounds) > iou_threshold);
        if !duplicate {
            kept.push(candidate);
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::result::OccupantLabel;
    use crate::geometry::BoundingBox;

    fn det(left: f32, top: f32, right: f32, bottom: f32, confidence: f32) -> Detection {
        Detection::new(
            BoundingBox::new(left, top, right, bottom),
            confidence,
            OccupantLabel::Person,
        )
    }

    #[test]
    fn keeps_highest_confidence_among_identical_boxes() {
        let kept = non_max_suppression(
            vec![
                det(10.0, 10.0, 100.0, 100.0, 0.7),
                det(10.0, 10.0, 100.0, 100.0, 0.9),
            ],
            IOU_THRESHOLD,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence, 0.9);
    }

    #[test]
    fn disjoint_boxes_survive_in_confidence_order() {
        let kept = non_max_suppression(
            vec![
                det(0.0, 0.0, 50.0, 50.0, 0.6),
                det(200.0, 200.0, 250.0, 250.0, 0.8),
            ],
            IOU_THRESHOLD,
        );
        assert_eq!(kept.len(), 2);
        assert!(kept[0].confidence >= kept[1].confidence);
    }

    #[test]
    fn output_is_subset_with_bounded_overlap() {
        let input = vec![
            det(0.0, 0.0, 100.0, 100.0, 0.9),
            det(5.0, 5.0, 105.0, 105.0, 0.85),
            det(300.0, 0.0, 400.0, 100.0, 0.7),
            det(0.0, 300.0, 100.0, 400.0, 0.65),
        ];
        let kept = non_max_suppression(input.clone(), IOU_THRESHOLD);

        for d in &kept {
            assert!(input.contains(d));
        }
        for (i, a) in kept.iter().enumerate() {
            for b in kept.iter().skip(i + 1) {
                assert!(a.bounds.iou(&b.bounds) <= IOU_THRESHOLD);
            }
        }
    }

    #[test]
    fn suppression_is_idempotent() {
        let input = vec![
            det(0.0, 0.0, 100.0, 100.0, 0.9),
            det(10.0, 10.0, 110.0, 110.0, 0.8),
            det(200.0, 200.0, 300.0, 300.0, 0.75),
            det(205.0, 205.0, 305.0, 305.0, 0.7),
        ];
        let once = non_max_suppression(input, IOU_THRESHOLD);
        let twice = non_max_suppression(once.clone(), IOU_THRESHOLD);
        assert_eq!(once, twice);
    }

    #[test]
    fn ties_keep_input_order() {
        let first = det(0.0, 0.0, 50.0, 50.0, 0.8);
        let second = det(200.0, 200.0, 250.0, 250.0, 0.8);
        let kept = non_max_suppression(vec![first.clone(), second.clone()], IOU_THRESHOLD);
        assert_eq!(kept, vec![first, second]);
    }
}
