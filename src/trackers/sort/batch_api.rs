use std::collections::HashMap;

use anyhow::Result;
use log::info;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::trackers::sort::simple_api::Sort;
use crate::trackers::sort::{SortOptions, SortTrack};
use crate::trackers::track_id::SharedIdGenerator;
use crate::utils::bbox::BoundingBox;
use crate::Errors;

/// Detections of one frame for several scenes
pub type PredictionBatchRequest = HashMap<u64, Vec<BoundingBox>>;

/// Live tracks of the scenes present in the request
pub type PredictionBatchResult = HashMap<u64, Vec<SortTrack>>;

/// SORT for many independent scenes (cameras, classes, etc...) processed in parallel
///
/// Every scene gets its own [`Sort`] session created on first use. Sessions share one
/// id generator, so track ids are unique across scenes.
///
pub struct BatchSort {
    opts: SortOptions,
    ids: SharedIdGenerator,
    pool: ThreadPool,
    scenes: HashMap<u64, Sort<SharedIdGenerator>>,
}

impl BatchSort {
    /// Creates new batch tracker
    ///
    /// # Parameters
    /// * `shards` - amount of cpu threads to process the scenes
    /// * `opts` - parameters applied to every scene
    ///
    pub fn new(shards: usize, opts: SortOptions) -> Result<Self> {
        Self::with_id_generator(shards, opts, SharedIdGenerator::new())
    }

    pub fn with_id_generator(
        shards: usize,
        opts: SortOptions,
        ids: SharedIdGenerator,
    ) -> Result<Self> {
        if shards == 0 {
            return Err(Errors::InvalidOptions("at least one shard is required".into()).into());
        }
        opts.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(shards)
            .thread_name(|i| format!("batch-sort-{}", i))
            .build()?;
        info!("Batch SORT started with {} threads", shards);
        Ok(Self {
            opts,
            ids,
            pool,
            scenes: HashMap::default(),
        })
    }

    /// Runs one frame for every scene of the batch and returns their live tracks
    ///
    /// Scenes missing from the batch don't advance. The first failing scene fails the
    /// whole call; the other scenes of the batch may already be advanced.
    ///
    pub fn predict(&mut self, mut batch: PredictionBatchRequest) -> Result<PredictionBatchResult> {
        for scene_id in batch.keys() {
            if !self.scenes.contains_key(scene_id) {
                let sort = Sort::with_id_generator(self.opts, self.ids.clone())?;
                self.scenes.insert(*scene_id, sort);
            }
        }

        let work = self
            .scenes
            .iter_mut()
            .filter_map(|(scene_id, sort)| {
                batch
                    .remove(scene_id)
                    .map(|detections| (*scene_id, sort, detections))
            })
            .collect::<Vec<_>>();

        self.pool.install(|| {
            work.into_par_iter()
                .map(|(scene_id, sort, detections)| -> Result<(u64, Vec<SortTrack>)> {
                    sort.update(&detections)?;
                    Ok((scene_id, sort.tracks()))
                })
                .collect::<Result<PredictionBatchResult>>()
        })
    }

    /// Tracks retired since the previous call, per scene
    ///
    pub fn wasted(&mut self) -> PredictionBatchResult {
        self.scenes
            .iter_mut()
            .map(|(scene_id, sort)| (*scene_id, sort.wasted()))
            .filter(|(_, tracks)| !tracks.is_empty())
            .collect()
    }

    pub fn scene(&self, scene_id: u64) -> Option<&Sort<SharedIdGenerator>> {
        self.scenes.get(&scene_id)
    }

    /// Drops the session of the scene, its live tracks are returned
    ///
    pub fn remove_scene(&mut self, scene_id: u64) -> Option<Vec<SortTrack>> {
        self.scenes.remove(&scene_id).map(|sort| sort.tracks())
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }
}
