use std::mem;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, warn};

use crate::trackers::sort::association::associate;
use crate::trackers::sort::box_tracker::KalmanBoxTracker;
use crate::trackers::sort::{SortOptions, SortTrack};
use crate::trackers::track_id::{SequentialIdGenerator, TrackIdGenerator};
use crate::utils::bbox::BoundingBox;
use crate::utils::kalman::kalman_box::SortBoxKalmanFilter;
use crate::Errors;

/// Easy to use SORT tracker implementation
///
/// One instance is one tracking session; `update` must be called for every frame,
/// including frames without detections, so that idle tracks age and get retired.
///
#[derive(Debug)]
pub struct Sort<G: TrackIdGenerator = SequentialIdGenerator> {
    opts: SortOptions,
    filter: Arc<SortBoxKalmanFilter>,
    ids: G,
    trackers: Vec<KalmanBoxTracker>,
    wasted: Vec<SortTrack>,
    frame_count: usize,
}

impl Sort {
    /// Creates new tracker with its own id sequence starting at `1`
    ///
    /// # Parameters
    /// * `opts` - session parameters, see [`SortOptions`]
    ///
    pub fn new(opts: SortOptions) -> Result<Self> {
        Self::with_id_generator(opts, SequentialIdGenerator::new())
    }
}

impl<G: TrackIdGenerator> Sort<G> {
    /// Creates new tracker drawing track ids from `ids`
    ///
    /// Sessions sharing a [`crate::trackers::track_id::SharedIdGenerator`] never issue
    /// the same id.
    ///
    pub fn with_id_generator(opts: SortOptions, ids: G) -> Result<Self> {
        opts.validate()?;
        Ok(Self {
            filter: Arc::new(SortBoxKalmanFilter::new(&opts.kalman)),
            opts,
            ids,
            trackers: Vec::default(),
            wasted: Vec::default(),
            frame_count: 0,
        })
    }

    /// Processes detections of the next frame
    ///
    /// Detections with non-finite coordinates or an area that overflows `f32` fail the
    /// call with [`Errors::InvalidInput`] before the session is touched. Degenerate boxes (zero or
    /// negative extents) are accepted but can't be matched and never start a track.
    ///
    /// # Parameters
    /// * `detections` - bounding boxes received from a detector
    ///
    pub fn update(&mut self, detections: &[BoundingBox]) -> Result<()> {
        if let Some(bad) = detections
            .iter()
            .find(|b| b.as_ltrb().iter().any(|c| !c.is_finite()))
        {
            return Err(
                Errors::InvalidInput(format!("non-finite coordinates in {:?}", bad)).into(),
            );
        }
        if let Some(bad) = detections.iter().find(|b| !b.area().is_finite()) {
            return Err(Errors::InvalidInput(format!("area of {:?} overflows", bad)).into());
        }

        self.frame_count += 1;

        let association = associate(
            detections,
            &mut self.trackers,
            self.opts.iou_threshold,
            self.opts.min_updates_for_prediction,
        )?;

        for (d, t) in &association.matches {
            self.trackers[*t].update(detections[*d])?;
        }

        for d in association.unmatched_detections {
            let bbox = detections[d];
            let area = bbox.area();
            if area <= 0.0 || area < self.opts.min_detection_area {
                debug!(
                    "Frame {}: detection {:?} is too small to start a track",
                    self.frame_count, bbox
                );
                continue;
            }
            let tracker = KalmanBoxTracker::new(bbox, &self.ids, self.filter.clone())?;
            debug!(
                "Frame {}: new track {} for {:?}",
                self.frame_count,
                tracker.id(),
                bbox
            );
            self.trackers.push(tracker);
        }

        let max_idle = self.opts.max_idle_predictions;
        let frame = self.frame_count;
        let wasted = &mut self.wasted;
        self.trackers.retain(|t| {
            if !t.is_finite() {
                warn!(
                    "Frame {}: track {} diverged and is retired, last observation {:?}",
                    frame,
                    t.id(),
                    t.last_bbox()
                );
            } else if t.predictions_since_update() > max_idle {
                debug!(
                    "Frame {}: track {} retired after {} idle frames",
                    frame,
                    t.id(),
                    t.predictions_since_update()
                );
            } else {
                return true;
            }
            wasted.push(SortTrack::from(t));
            false
        });

        Ok(())
    }

    /// Runs `n` frames without detections
    ///
    pub fn skip_frames(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.update(&[])?;
        }
        Ok(())
    }

    /// Live trackers
    ///
    pub fn trackers(&self) -> &[KalmanBoxTracker] {
        &self.trackers
    }

    /// Snapshots of all live tracks
    ///
    pub fn tracks(&self) -> Vec<SortTrack> {
        self.trackers.iter().map(SortTrack::from).collect()
    }

    /// Tracks reported for the current frame: updated in this frame and either
    /// confirmed by `min_hits` consecutive updates or still within the first
    /// `min_hits` frames of the session
    ///
    pub fn confirmed_tracks(&self) -> Vec<SortTrack> {
        let min_hits = self.opts.min_hits;
        let warming_up = self.frame_count <= min_hits;
        self.trackers
            .iter()
            .filter(|t| {
                t.predictions_since_update() == 0 && (t.hit_streak() >= min_hits || warming_up)
            })
            .map(SortTrack::from)
            .collect()
    }

    /// Tracks retired since the previous call
    ///
    pub fn wasted(&mut self) -> Vec<SortTrack> {
        mem::take(&mut self.wasted)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn options(&self) -> &SortOptions {
        &self.opts
    }
}

#[cfg(test)]
mod tests {
    use crate::trackers::sort::simple_api::Sort;
    use crate::trackers::sort::SortOptions;
    use crate::trackers::track_id::{SharedIdGenerator, TrackIdGenerator};
    use crate::utils::bbox::BoundingBox;
    use crate::Errors;
    use itertools::Itertools;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn sort() {
        init_logs();
        let mut t = Sort::new(SortOptions::new(2, 4, 0.3)).unwrap();
        assert_eq!(t.frame_count(), 0);

        t.update(&[BoundingBox::new(1.0, 1.0, 4.0, 4.0)]).unwrap();
        assert_eq!(t.trackers().len(), 1);
        let track_id = t.trackers()[0].id();
        assert_eq!(t.trackers()[0].updates(), 1);

        let bb = BoundingBox::new(1.5, 1.5, 4.5, 4.5);
        t.update(&[bb]).unwrap();
        assert_eq!(t.trackers().len(), 1);
        let trk = &t.trackers()[0];
        assert_eq!(trk.id(), track_id);
        assert_eq!(trk.updates(), 2);
        assert_eq!(trk.last_bbox(), bb);
        assert_eq!(trk.predictions_since_update(), 0);

        t.update(&[]).unwrap();
        assert_eq!(t.trackers()[0].predictions_since_update(), 1);
        t.update(&[]).unwrap();
        assert_eq!(t.trackers()[0].predictions_since_update(), 2);
        assert!(t.wasted().is_empty());

        t.update(&[]).unwrap();
        assert!(t.trackers().is_empty());
        let wasted = t.wasted();
        assert_eq!(wasted.len(), 1);
        assert_eq!(wasted[0].id, track_id);
        assert_eq!(wasted[0].updates, 2);
        assert!(t.wasted().is_empty());
        assert_eq!(t.frame_count(), 5);
    }

    #[test]
    fn low_overlap_starts_new_track() {
        let mut t = Sort::new(SortOptions::new(2, 4, 0.3)).unwrap();
        t.update(&[BoundingBox::new(1.0, 1.0, 4.0, 4.0)]).unwrap();
        // IoU = 4 / 14 < 0.3
        t.update(&[BoundingBox::new(2.0, 2.0, 5.0, 5.0)]).unwrap();
        let tracks = t.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, 1);
        assert_eq!(tracks[0].predictions_since_update, 1);
        assert_eq!(tracks[1].id, 2);
        assert_eq!(tracks[1].updates, 1);
    }

    #[test]
    fn moving_objects_keep_ids() {
        let mut t = Sort::new(SortOptions::default()).unwrap();
        for i in 0..10 {
            let shift = 5.0 * i as f32;
            t.update(&[
                BoundingBox::new_ltwh(shift, 0.0, 20.0, 20.0),
                BoundingBox::new_ltwh(100.0, 100.0 - shift, 20.0, 40.0),
            ])
            .unwrap();
            let ids = t.tracks().iter().map(|t| t.id).collect::<Vec<_>>();
            assert_eq!(ids, vec![1, 2]);
        }
        for track in t.tracks() {
            assert_eq!(track.updates, 10);
            assert_eq!(track.hit_streak, 10);
        }
    }

    #[test]
    fn ids_are_never_reused() {
        let mut t = Sort::new(SortOptions::new(1, 3, 0.3)).unwrap();
        let mut seen = Vec::new();
        for i in 0..6 {
            // every frame the object jumps far away
            let x = 100.0 * i as f32;
            t.update(&[BoundingBox::new_ltwh(x, 0.0, 10.0, 10.0)]).unwrap();
            seen.extend(t.tracks().iter().map(|t| t.id));
        }
        let ids = seen.into_iter().unique().collect::<Vec<_>>();
        assert_eq!(ids, (1..=6).collect::<Vec<u64>>());
    }

    #[test]
    fn small_and_degenerate_detections_are_skipped() {
        let mut t = Sort::new(SortOptions::default().with_min_detection_area(4.0)).unwrap();
        t.update(&[
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            BoundingBox::new(10.0, 10.0, 10.0, 30.0),
            BoundingBox::new(50.0, 50.0, 40.0, 60.0),
            BoundingBox::new(100.0, 100.0, 110.0, 110.0),
        ])
        .unwrap();
        assert_eq!(t.trackers().len(), 1);
        assert_eq!(
            t.trackers()[0].last_bbox(),
            BoundingBox::new(100.0, 100.0, 110.0, 110.0)
        );
    }

    #[test]
    fn non_finite_detection_fails_frame() {
        let mut t = Sort::new(SortOptions::default()).unwrap();
        t.update(&[BoundingBox::new(0.0, 0.0, 10.0, 10.0)]).unwrap();
        let err = t
            .update(&[
                BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                BoundingBox::new(f32::NAN, 0.0, 10.0, 10.0),
            ])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Errors>(),
            Some(Errors::InvalidInput(_))
        ));
        assert_eq!(t.frame_count(), 1);
        assert_eq!(t.trackers()[0].predictions(), 0);
    }

    #[test]
    fn overflowing_detection_fails_frame() {
        let mut t = Sort::new(SortOptions::default()).unwrap();
        t.update(&[BoundingBox::new(0.0, 0.0, 10.0, 10.0)]).unwrap();
        let err = t
            .update(&[
                BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                BoundingBox::new(0.0, 0.0, 1e20, 1e20),
            ])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Errors>(),
            Some(Errors::InvalidInput(_))
        ));
        assert_eq!(t.frame_count(), 1);
        assert_eq!(t.trackers().len(), 1);
        assert_eq!(t.trackers()[0].predictions(), 0);
        assert_eq!(t.trackers()[0].updates(), 1);
    }

    #[test]
    fn invalid_options() {
        let err = Sort::new(SortOptions::new(0, 3, 0.3)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Errors>(),
            Some(Errors::InvalidOptions(_))
        ));
    }

    #[test]
    fn confirmed_tracks() {
        let mut t = Sort::new(SortOptions::default().with_min_hits(3)).unwrap();
        let bb = BoundingBox::new(0.0, 0.0, 10.0, 10.0);

        // warm-up frames report every updated track
        t.update(&[bb]).unwrap();
        assert_eq!(t.confirmed_tracks().len(), 1);

        t.skip_frames(1).unwrap();
        assert!(t.confirmed_tracks().is_empty());
        assert_eq!(t.trackers().len(), 1);

        for _ in 0..3 {
            t.update(&[bb]).unwrap();
        }
        // frame 5, hit streak restarted at frame 3
        assert_eq!(t.frame_count(), 5);
        let confirmed = t.confirmed_tracks();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].hit_streak, 3);

        // a new track is not confirmed after the warm-up
        t.update(&[bb, BoundingBox::new(50.0, 50.0, 60.0, 60.0)]).unwrap();
        assert_eq!(t.trackers().len(), 2);
        let confirmed = t.confirmed_tracks();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, 1);
    }

    #[test]
    fn skip_frames() {
        let mut t = Sort::new(SortOptions::new(2, 3, 0.3)).unwrap();
        t.update(&[BoundingBox::new(0.0, 0.0, 10.0, 20.0)]).unwrap();
        t.skip_frames(2).unwrap();
        assert_eq!(t.trackers().len(), 1);
        t.skip_frames(1).unwrap();
        assert!(t.trackers().is_empty());
        assert_eq!(t.wasted().len(), 1);
        assert_eq!(t.frame_count(), 4);
    }

    #[test]
    fn sessions_share_ids() {
        let ids = SharedIdGenerator::new();
        let mut a = Sort::with_id_generator(SortOptions::default(), ids.clone()).unwrap();
        let mut b = Sort::with_id_generator(SortOptions::default(), ids.clone()).unwrap();
        let bb = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        a.update(&[bb]).unwrap();
        b.update(&[bb]).unwrap();
        a.update(&[bb, BoundingBox::new(50.0, 50.0, 60.0, 60.0)]).unwrap();
        assert_eq!(a.tracks().iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(b.tracks()[0].id, 2);
        assert_eq!(ids.last_id(), 3);
    }
}
