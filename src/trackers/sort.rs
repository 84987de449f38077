use crate::trackers::sort::box_tracker::KalmanBoxTracker;
use crate::utils::bbox::BoundingBox;
use crate::utils::kalman::kalman_box::KalmanBoxOptions;
use crate::Errors;
use anyhow::Result;

/// Kalman filter-based tracker of a single box
pub mod box_tracker;

/// Matching of detections to live trackers with the Hungarian algorithm
pub mod association;

/// SORT implementation with a very tiny interface
pub mod simple_api;

/// Independent SORT sessions for several scenes processed in parallel
pub mod batch_api;

/// Default IoU threshold used by the SORT authors
pub const DEFAULT_SORT_IOU_THRESHOLD: f32 = 0.3;

/// Detections smaller than this never start a track
pub const DEFAULT_MIN_DETECTION_AREA: f32 = 1.0;

pub const DEFAULT_MAX_IDLE_PREDICTIONS: usize = 1;

pub const DEFAULT_MIN_UPDATES_FOR_PREDICTION: usize = 3;

pub const DEFAULT_MIN_HITS: usize = 3;

/// Parameters of a SORT session
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortOptions {
    /// How many frames in a row a track survives without being updated
    pub max_idle_predictions: usize,
    /// Updates a track needs before its prediction is used for matching instead of
    /// the last observed box
    pub min_updates_for_prediction: usize,
    /// Minimal IoU for a detection to be assigned to a track
    pub iou_threshold: f32,
    /// Unmatched detections with a smaller area don't spawn tracks
    pub min_detection_area: f32,
    /// Hit streak required for a track to be reported by `Sort::confirmed_tracks`
    pub min_hits: usize,
    /// Noise model of the per-track Kalman filters
    pub kalman: KalmanBoxOptions,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            max_idle_predictions: DEFAULT_MAX_IDLE_PREDICTIONS,
            min_updates_for_prediction: DEFAULT_MIN_UPDATES_FOR_PREDICTION,
            iou_threshold: DEFAULT_SORT_IOU_THRESHOLD,
            min_detection_area: DEFAULT_MIN_DETECTION_AREA,
            min_hits: DEFAULT_MIN_HITS,
            kalman: KalmanBoxOptions::default(),
        }
    }
}

impl SortOptions {
    /// # Parameters
    /// * `max_idle_predictions` - how many frames a track survives without being updated
    /// * `min_updates_for_prediction` - updates before predictions are used for matching
    /// * `iou_threshold` - how low IoU may be to still assign a detection to a track
    ///
    pub fn new(
        max_idle_predictions: usize,
        min_updates_for_prediction: usize,
        iou_threshold: f32,
    ) -> Self {
        Self {
            max_idle_predictions,
            min_updates_for_prediction,
            iou_threshold,
            ..Default::default()
        }
    }

    pub fn with_min_detection_area(mut self, min_detection_area: f32) -> Self {
        self.min_detection_area = min_detection_area;
        self
    }

    pub fn with_min_hits(mut self, min_hits: usize) -> Self {
        self.min_hits = min_hits;
        self
    }

    pub fn with_kalman_options(mut self, kalman: KalmanBoxOptions) -> Self {
        self.kalman = kalman;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_idle_predictions == 0 {
            return Err(
                Errors::InvalidOptions("max_idle_predictions must be positive".into()).into(),
            );
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(Errors::InvalidOptions(format!(
                "iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            ))
            .into());
        }
        if !self.min_detection_area.is_finite() {
            return Err(Errors::InvalidOptions(format!(
                "min_detection_area must be finite, got {}",
                self.min_detection_area
            ))
            .into());
        }
        self.kalman.validate()
    }
}

/// Online track structure that contains tracking information for the last frame
///
#[derive(Debug, Clone, PartialEq)]
pub struct SortTrack {
    /// id of the track
    ///
    pub id: u64,
    /// the bbox passed by detector during the last update
    ///
    pub observed_bbox: BoundingBox,
    /// the bbox of the last corrected filter state
    ///
    pub current_bbox: BoundingBox,
    /// the bbox predicted by KF for the next frame
    ///
    pub predicted_bbox: BoundingBox,
    /// the number of received detections
    ///
    pub updates: usize,
    /// the number of frames the track went through
    ///
    pub predictions: usize,
    /// frames passed since the last update
    ///
    pub predictions_since_update: usize,
    /// updates in a row without a missed frame
    ///
    pub hit_streak: usize,
}

impl From<&KalmanBoxTracker> for SortTrack {
    fn from(t: &KalmanBoxTracker) -> Self {
        SortTrack {
            id: t.id(),
            observed_bbox: t.last_bbox(),
            current_bbox: t.current_state(),
            predicted_bbox: t.current_prediction(),
            updates: t.updates(),
            predictions: t.predictions(),
            predictions_since_update: t.predictions_since_update(),
            hit_streak: t.hit_streak(),
        }
    }
}
