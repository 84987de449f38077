use crate::trackers;
use crate::utils;

pub use trackers::sort::batch_api::BatchSort;
pub use trackers::sort::box_tracker::KalmanBoxTracker;
pub use trackers::sort::simple_api::Sort;
pub use trackers::sort::{SortOptions, SortTrack, DEFAULT_SORT_IOU_THRESHOLD};
pub use trackers::track_id::{SequentialIdGenerator, SharedIdGenerator, TrackIdGenerator};

pub use utils::bbox::{iou, BoundingBox, StateBox};
pub use utils::kalman::kalman_box::KalmanBoxOptions;

pub use crate::{Errors, EstimateClose};
