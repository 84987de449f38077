use anyhow::Result;
use iousort::examples::BoxGen2;
use iousort::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut tracker = Sort::new(SortOptions::new(2, 4, DEFAULT_SORT_IOU_THRESHOLD))?;

    let pos_drift = 1.0;
    let box_drift = 0.2;
    let mut b1 = BoxGen2::new_monotonous(100.0, 100.0, 10.0, 15.0, pos_drift, box_drift);
    let mut b2 = BoxGen2::new_monotonous(10.0, 10.0, 12.0, 18.0, pos_drift, box_drift);

    for _ in 0..10 {
        let detections = [b1.next(), b2.next()].into_iter().flatten().collect::<Vec<_>>();
        tracker.update(&detections)?;

        // MOT challenge format: frame, id, left, top, width, height, conf, x, y, z
        for t in tracker.confirmed_tracks() {
            let [l, top, w, h] = t.current_bbox.as_ltwh();
            println!(
                "{},{},{:.2},{:.2},{:.2},{:.2},1,-1,-1,-1",
                tracker.frame_count(),
                t.id,
                l,
                top,
                w,
                h
            );
        }
    }

    tracker.skip_frames(3)?;

    for t in tracker.wasted() {
        eprintln!(
            "Track id: {}, updates: {}, last seen at: {:?}",
            t.id,
            t.updates,
            t.observed_bbox.as_ltrb()
        );
    }
    Ok(())
}
