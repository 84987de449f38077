use once_cell::sync::Lazy;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of track identities. Ids handed out by one generator are unique and strictly
/// increasing, the first one is `1`.
///
pub trait TrackIdGenerator: Send + Sync + Debug {
    fn next_id(&self) -> u64;

    /// The most recently issued id, `0` when nothing was issued yet
    fn last_id(&self) -> u64;
}

/// Per-session counter
///
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    last: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackIdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn last_id(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

/// Counter shared by several sessions, possibly living in different threads. Clones
/// refer to the same counter.
///
#[derive(Debug, Default, Clone)]
pub struct SharedIdGenerator {
    last: Arc<AtomicU64>,
}

static GLOBAL_ID_GENERATOR: Lazy<SharedIdGenerator> = Lazy::new(SharedIdGenerator::default);

impl SharedIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the process-wide counter
    ///
    pub fn global() -> Self {
        GLOBAL_ID_GENERATOR.clone()
    }
}

impl TrackIdGenerator for SharedIdGenerator {
    fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn last_id(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use crate::trackers::track_id::{SequentialIdGenerator, SharedIdGenerator, TrackIdGenerator};
    use itertools::Itertools;
    use std::thread;

    #[test]
    fn sequential() {
        let g = SequentialIdGenerator::new();
        assert_eq!(g.last_id(), 0);
        assert_eq!(g.next_id(), 1);
        assert_eq!(g.next_id(), 2);
        assert_eq!(g.last_id(), 2);

        let other = SequentialIdGenerator::new();
        assert_eq!(other.next_id(), 1);
    }

    #[test]
    fn shared_between_threads() {
        let g = SharedIdGenerator::new();
        let handles = (0..4)
            .map(|_| {
                let g = g.clone();
                thread::spawn(move || (0..100).map(|_| g.next_id()).collect::<Vec<_>>())
            })
            .collect::<Vec<_>>();

        let mut ids = Vec::new();
        for h in handles {
            let local = h.join().unwrap();
            assert!(local.windows(2).all(|w| w[0] < w[1]));
            ids.extend(local);
        }
        assert_eq!(ids.len(), 400);
        assert!(ids.iter().all_unique());
        assert_eq!(g.last_id(), 400);
    }

    #[test]
    fn global_is_shared() {
        let a = SharedIdGenerator::global();
        let b = SharedIdGenerator::global();
        let x = a.next_id();
        let y = b.next_id();
        assert!(y > x);
    }
}
