use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::engine::{RecommendError, Recommender};
use crate::models::{ListenTime, TrackId, UserId};

/// Fallback strategy: recommend one of the catalog's most popular tracks,
/// ignoring session history entirely
pub struct TopPop {
    pool: Vec<TrackId>,
    rng: Mutex<StdRng>,
}

impl TopPop {
    /// Build from the catalog's popularity ranking, keeping the `pool_size`
    /// most popular tracks
    pub fn new(top_tracks: &[TrackId], pool_size: usize) -> Self {
        Self::with_rng(top_tracks, pool_size, StdRng::from_entropy())
    }

    /// Same, with a deterministic random source
    pub fn with_rng(top_tracks: &[TrackId], pool_size: usize, rng: StdRng) -> Self {
        let pool = top_tracks.iter().copied().take(pool_size).collect();
        TopPop {
            pool,
            rng: Mutex::new(rng),
        }
    }
}

impl Recommender for TopPop {
    fn recommend_next(
        &self,
        _user: UserId,
        prev_track: TrackId,
        _prev_track_time: ListenTime,
    ) -> Result<TrackId, RecommendError> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.pool.choose(&mut *rng) {
            Some(track) => Ok(*track),
            // Empty pool: the catalog carried no popularity data, so the
            // track that just played is all we have left to offer
            None => Ok(prev_track),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommends_from_pool() {
        let fallback = TopPop::with_rng(&[1, 2, 3, 4, 5], 100, StdRng::seed_from_u64(11));
        for _ in 0..50 {
            let track = fallback.recommend_next(1, 99, 0.5).unwrap();
            assert!((1..=5).contains(&track));
        }
    }

    #[test]
    fn test_pool_is_truncated_to_size() {
        let top_tracks: Vec<TrackId> = (0..500).collect();
        let fallback = TopPop::with_rng(&top_tracks, 100, StdRng::seed_from_u64(11));
        for _ in 0..200 {
            let track = fallback.recommend_next(1, 999, 0.5).unwrap();
            assert!(track < 100);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = TopPop::with_rng(&[1, 2, 3, 4, 5], 100, StdRng::seed_from_u64(7));
        let b = TopPop::with_rng(&[1, 2, 3, 4, 5], 100, StdRng::seed_from_u64(7));
        for _ in 0..20 {
            assert_eq!(
                a.recommend_next(1, 99, 0.5).unwrap(),
                b.recommend_next(1, 99, 0.5).unwrap()
            );
        }
    }

    #[test]
    fn test_empty_pool_repeats_previous_track() {
        let fallback = TopPop::with_rng(&[], 100, StdRng::seed_from_u64(11));
        assert_eq!(fallback.recommend_next(1, 42, 0.5).unwrap(), 42);
    }
}
