use crate::trackers::sort::box_tracker::KalmanBoxTracker;
use crate::utils::bbox::{iou, BoundingBox};
use crate::utils::linear_sum_assignment::linear_sum_assignment;
use anyhow::Result;
use log::debug;
use pathfinding::matrix::Matrix;

/// Outcome of matching one frame of detections against the live trackers
///
/// Indices refer to the detection slice and the tracker slice passed to [`associate`].
/// Every detection index appears exactly once across `matches` and
/// `unmatched_detections`, the same holds for trackers.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Association {
    /// `(detection, tracker)` pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_detections: Vec<usize>,
    pub unmatched_trackers: Vec<usize>,
}

/// Matches detections to trackers maximizing the total IoU
///
/// Every tracker is advanced by exactly one prediction. Trackers with fewer than
/// `min_updates` observations are compared by their last observed box, the others by
/// the prediction. Pairs with IoU below `iou_threshold` or without any overlap are
/// rejected and both sides become unmatched.
///
/// # Parameters
/// * `detections` - boxes received from a detector for the current frame
/// * `trackers` - live trackers
/// * `iou_threshold` - minimal IoU of an accepted pair
/// * `min_updates` - observations after which the tracker's prediction is trusted
///
pub fn associate(
    detections: &[BoundingBox],
    trackers: &mut [KalmanBoxTracker],
    iou_threshold: f32,
    min_updates: usize,
) -> Result<Association> {
    let references = trackers
        .iter_mut()
        .map(|t| {
            t.predict_next();
            t.reference_bbox(min_updates)
        })
        .collect::<Vec<_>>();

    if references.is_empty() || detections.is_empty() {
        return Ok(Association {
            matches: Vec::default(),
            unmatched_detections: (0..detections.len()).collect(),
            unmatched_trackers: (0..references.len()).collect(),
        });
    }

    let mut benefit = Matrix::new(detections.len(), references.len(), 0.0_f32);
    for (d, det) in detections.iter().enumerate() {
        for (t, reference) in references.iter().enumerate() {
            benefit[(d, t)] = iou(det, reference);
        }
    }

    let mut matched_detections = vec![false; detections.len()];
    let mut matched_trackers = vec![false; references.len()];
    let mut matches = Vec::default();

    for (d, t) in linear_sum_assignment(&benefit, true)? {
        let score = benefit[(d, t)];
        if score <= 0.0 || score < iou_threshold {
            debug!(
                "Pair (detection={}, tracker={}) rejected, IoU={} is below {}",
                d,
                trackers[t].id(),
                score,
                iou_threshold
            );
            continue;
        }
        matched_detections[d] = true;
        matched_trackers[t] = true;
        matches.push((d, t));
    }

    Ok(Association {
        matches,
        unmatched_detections: unmatched(&matched_detections),
        unmatched_trackers: unmatched(&matched_trackers),
    })
}

fn unmatched(matched: &[bool]) -> Vec<usize> {
    matched
        .iter()
        .enumerate()
        .filter(|(_, m)| !**m)
        .map(|(i, _)| i)
        .collect()
}
