use crate::utils::bbox::BoundingBox;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random walk of one object, yields its box every frame
///
pub struct BoxGen2 {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    gen: StdRng,
    dist_pos: Uniform<f32>,
    dist_box: Uniform<f32>,
}

impl BoxGen2 {
    /// The box drifts in any direction
    ///
    /// # Parameters
    /// * `x`, `y`, `width`, `height` - initial box as (left, top, width, height)
    /// * `pos_drift` - maximal shift of the corner per frame
    /// * `box_drift` - maximal change of the sides per frame
    ///
    pub fn new(x: f32, y: f32, width: f32, height: f32, pos_drift: f32, box_drift: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            gen: StdRng::from_entropy(),
            dist_pos: Uniform::new(-pos_drift, pos_drift),
            dist_box: Uniform::new(-box_drift, box_drift),
        }
    }

    /// The box moves only right and down
    ///
    pub fn new_monotonous(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        pos_drift: f32,
        box_drift: f32,
    ) -> Self {
        Self {
            dist_pos: Uniform::new(0.0, pos_drift),
            ..Self::new(x, y, width, height, pos_drift, box_drift)
        }
    }

    /// Makes the walk reproducible
    ///
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.gen = StdRng::seed_from_u64(seed);
        self
    }
}

impl Iterator for BoxGen2 {
    type Item = BoundingBox;

    fn next(&mut self) -> Option<Self::Item> {
        self.x += self.gen.sample(self.dist_pos);
        self.y += self.gen.sample(self.dist_pos);

        self.width += self.gen.sample(self.dist_box);
        self.height += self.gen.sample(self.dist_box);

        if self.width < 1.0 {
            self.width = 1.0;
        }
        if self.height < 1.0 {
            self.height = 1.0;
        }

        Some(BoundingBox::new_ltwh(
            self.x,
            self.y,
            self.width,
            self.height,
        ))
    }
}

/// Several walking objects seen by an unreliable detector
///
/// Every frame each object is missed with probability `miss_rate`; detections are
/// returned in the order of the objects.
///
pub struct SceneGen {
    objects: Vec<BoxGen2>,
    miss_rate: f64,
    gen: StdRng,
}

impl SceneGen {
    pub fn new(objects: Vec<BoxGen2>, miss_rate: f64) -> Self {
        Self {
            objects,
            miss_rate: miss_rate.clamp(0.0, 1.0),
            gen: StdRng::from_entropy(),
        }
    }

    /// `count` objects moving right and down from a grid of starting points
    ///
    pub fn grid(count: usize, miss_rate: f64, seed: u64) -> Self {
        let objects = (0..count)
            .map(|i| {
                let (row, col) = ((i / 10) as f32, (i % 10) as f32);
                BoxGen2::new_monotonous(col * 100.0, row * 150.0, 30.0, 60.0, 2.0, 0.5)
                    .with_seed(seed.wrapping_add(i as u64))
            })
            .collect();
        Self {
            gen: StdRng::seed_from_u64(seed),
            ..Self::new(objects, miss_rate)
        }
    }
}

impl Iterator for SceneGen {
    type Item = Vec<BoundingBox>;

    fn next(&mut self) -> Option<Self::Item> {
        let miss_rate = self.miss_rate;
        let gen = &mut self.gen;
        Some(
            self.objects
                .iter_mut()
                .filter_map(|o| {
                    let bbox = o.next();
                    if gen.gen_bool(miss_rate) {
                        None
                    } else {
                        bbox
                    }
                })
                .collect(),
        )
    }
}
