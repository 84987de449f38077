use anyhow::Result;
use iousort::prelude::*;
use iousort::utils::kalman::kalman_box::SortBoxKalmanFilter;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let ids = SequentialIdGenerator::new();
    let filter = Arc::new(SortBoxKalmanFilter::new(&KalmanBoxOptions::default()));
    let mut tracker = KalmanBoxTracker::new(BoundingBox::new(1.0, 1.0, 3.0, 3.0), &ids, filter)?;

    for step in 2..8 {
        let s = step as f32;
        tracker.predict_next();
        tracker.update(BoundingBox::new(s, s, s + 2.0, s + 2.0))?;
    }

    println!("current={:?}", tracker.current_state().as_ltrb());
    for i in 1..=3 {
        println!("predicted{}={:?}", i, tracker.predict_next().as_ltrb());
    }
    println!(
        "updates={} predictions_since_update={}",
        tracker.updates(),
        tracker.predictions_since_update()
    );
    Ok(())
}
