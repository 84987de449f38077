use crate::trackers::track_id::TrackIdGenerator;
use crate::utils::bbox::{BoundingBox, StateBox};
use crate::utils::kalman::kalman_box::{SortBoxKalmanFilter, DIM_SORT_BOX_STATE};
use crate::utils::kalman::KalmanState;
use anyhow::Result;
use std::sync::Arc;

/// One tracked object: a constant-velocity Kalman filter over its box
///
/// The filter keeps two beliefs. `updated_state` is the last corrected one, `state` is
/// the corrected one advanced by the motion model, i.e. the forecast for the next frame.
/// Right after an update `state` is already one step ahead, so the first `predict_next`
/// call doesn't advance it again; every following call does.
///
#[derive(Debug, Clone)]
pub struct KalmanBoxTracker {
    id: u64,
    updates: usize,
    predictions: usize,
    predictions_since_update: usize,
    hit_streak: usize,
    last_bbox: BoundingBox,
    filter: Arc<SortBoxKalmanFilter>,
    updated_state: KalmanState<DIM_SORT_BOX_STATE>,
    state: KalmanState<DIM_SORT_BOX_STATE>,
}

impl KalmanBoxTracker {
    /// Creates the tracker seeded with the first observation
    ///
    /// The box is validated before an id is drawn from `ids`, so a rejected box doesn't
    /// consume an id.
    ///
    /// # Parameters
    /// * `bbox` - first observation
    /// * `ids` - source of the track id
    /// * `filter` - motion model, usually shared by all trackers of a session
    ///
    pub fn new(
        bbox: BoundingBox,
        ids: &dyn TrackIdGenerator,
        filter: Arc<SortBoxKalmanFilter>,
    ) -> Result<Self> {
        bbox.validate()?;
        let initial = filter.initiate(&StateBox::from(&bbox));
        let mut tracker = Self {
            id: ids.next_id(),
            updates: 0,
            predictions: 0,
            predictions_since_update: 0,
            hit_streak: 0,
            last_bbox: bbox,
            filter,
            updated_state: initial,
            state: initial,
        };
        tracker.update(bbox)?;
        Ok(tracker)
    }

    /// Corrects the filter with a new observation
    ///
    /// On error the tracker is left untouched.
    ///
    pub fn update(&mut self, bbox: BoundingBox) -> Result<()> {
        bbox.validate()?;
        let mut corrected = self.filter.update(&self.state, &StateBox::from(&bbox))?;
        clamp_area_velocity(&mut corrected);

        self.predictions_since_update = 0;
        self.updates += 1;
        self.hit_streak += 1;
        self.last_bbox = bbox;
        self.updated_state = corrected;
        self.state = self.filter.predict(&corrected);
        self.state.dump();
        Ok(())
    }

    /// Advances the motion model by one frame and returns the forecast
    ///
    pub fn predict_next(&mut self) -> BoundingBox {
        self.predictions += 1;
        if self.predictions_since_update > 0 {
            self.hit_streak = 0;
            clamp_area_velocity(&mut self.state);
            self.state = self.filter.predict(&self.state);
        }
        self.predictions_since_update += 1;

        self.current_prediction()
    }

    /// Box of the last corrected state
    ///
    pub fn current_state(&self) -> BoundingBox {
        BoundingBox::from(StateBox::from(&self.updated_state))
    }

    /// Box the filter currently holds, without advancing it
    ///
    pub fn current_prediction(&self) -> BoundingBox {
        BoundingBox::from(StateBox::from(&self.state))
    }

    /// Box to compare detections with: the raw observation until the filter has seen
    /// `min_updates` of them, the prediction afterwards
    ///
    pub fn reference_bbox(&self, min_updates: usize) -> BoundingBox {
        if self.updates < min_updates {
            self.last_bbox
        } else {
            self.current_prediction()
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn last_bbox(&self) -> BoundingBox {
        self.last_bbox
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn predictions(&self) -> usize {
        self.predictions
    }

    pub fn predictions_since_update(&self) -> usize {
        self.predictions_since_update
    }

    pub fn hit_streak(&self) -> usize {
        self.hit_streak
    }

    /// Frames the tracker went through
    ///
    pub fn age(&self) -> usize {
        self.predictions
    }

    /// False when the filter diverged into NaN or infinite values
    ///
    pub fn is_finite(&self) -> bool {
        self.state.is_finite() && self.updated_state.is_finite()
    }
}

/// The area can't go non-positive during the next transition
fn clamp_area_velocity(state: &mut KalmanState<DIM_SORT_BOX_STATE>) {
    if state.mean[2] + state.mean[6] <= 0.0 {
        state.mean[6] = 0.0;
    }
}
