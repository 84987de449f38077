use anyhow::Result;
use iousort::examples::SceneGen;
use iousort::prelude::*;
use iousort::trackers::sort::batch_api::PredictionBatchRequest;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();

    let scenes = 8;
    let mut tracker = BatchSort::new(num_cpus::get(), SortOptions::default())?;
    let mut generators = (0..scenes)
        .map(|scene| SceneGen::grid(20, 0.05, scene))
        .collect::<Vec<_>>();

    let started = Instant::now();
    for _ in 0..100 {
        let batch = generators
            .iter_mut()
            .enumerate()
            .filter_map(|(scene, g)| g.next().map(|frame| (scene as u64, frame)))
            .collect::<PredictionBatchRequest>();

        let res = tracker.predict(batch)?;
        let live = res.values().map(|tracks| tracks.len()).sum::<usize>();
        log::debug!("Live tracks: {}", live);
    }
    let elapsed = started.elapsed();

    let wasted = tracker.wasted();
    eprintln!(
        "{} scenes, 100 frames in {:?}, {} tracks retired",
        scenes,
        elapsed,
        wasted.values().map(|tracks| tracks.len()).sum::<usize>()
    );
    Ok(())
}
