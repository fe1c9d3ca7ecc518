use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use thiserror::Error;

use super::config::RecommenderConfig;
use super::history::HistoryStore;
use super::toppop::TopPop;
use crate::models::{Catalog, ListenTime, TrackId, TrackRecord, UserId};
use crate::store::{StoreError, TrackStore};

/// Errors that can escape a recommendation request.
///
/// Missing catalog data is not among them; an absent record or an empty
/// recommendation list is the normal fallback branch.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("track store lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("malformed record for track {track}: {source}")]
    Decode {
        track: TrackId,
        source: serde_json::Error,
    },
}

/// A next-track recommendation policy
pub trait Recommender: Send + Sync {
    /// Given the track a user just played and the fraction of it they
    /// listened to, return the next track to play
    fn recommend_next(
        &self,
        user: UserId,
        prev_track: TrackId,
        prev_track_time: ListenTime,
    ) -> Result<TrackId, RecommendError>;
}

/// The session-aware recommendation engine.
///
/// Follows the pivot track's precomputed recommendation list, resets the
/// pivot to the user's best recent listen when the last few recommendations
/// were skipped, and hands the request to the fallback policy when the
/// catalog has nothing for the pivot.
pub struct SessionRecommender<S: TrackStore> {
    store: S,
    history: HistoryStore,
    fallback: Box<dyn Recommender>,
    config: RecommenderConfig,
    rng: Mutex<StdRng>,
}

impl<S: TrackStore> SessionRecommender<S> {
    pub fn new(store: S, catalog: &Catalog, config: RecommenderConfig) -> Self {
        Self::with_rng(store, catalog, config, StdRng::from_entropy())
    }

    /// Construct with a deterministic random source; the fallback pool draws
    /// from a generator derived from the same seed, so whole sessions become
    /// reproducible
    pub fn with_rng(store: S, catalog: &Catalog, config: RecommenderConfig, mut rng: StdRng) -> Self {
        let history = HistoryStore::new(config.buffer_limit, config.max_duplicates);
        let fallback = Box::new(TopPop::with_rng(
            &catalog.top_tracks,
            config.fallback_pool_size,
            StdRng::seed_from_u64(rng.next_u64()),
        ));
        SessionRecommender {
            store,
            history,
            fallback,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Replace the fallback policy
    pub fn with_fallback(mut self, fallback: Box<dyn Recommender>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Per-user listen history backing the pivot decisions
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Decide which track's recommendation list to consult for this request
    fn pivot_track(&self, user: UserId, prev_track: TrackId) -> TrackId {
        if self
            .history
            .should_reset_pivot(user, self.config.min_time, self.config.early_stop)
        {
            let pivot = self.history.best_recent(user).unwrap_or(prev_track);
            log::debug!("user {user}: early stop, pivot reset to track {pivot}");
            pivot
        } else {
            prev_track
        }
    }

    /// Fetch and decode the record for a track. `None` means the store holds
    /// no record for this id; decode failures on present bytes are surfaced.
    fn lookup(&self, track: TrackId) -> Result<Option<TrackRecord>, RecommendError> {
        let Some(bytes) = self.store.get(track)? else {
            return Ok(None);
        };
        let record = TrackRecord::from_bytes(&bytes)
            .map_err(|source| RecommendError::Decode { track, source })?;
        Ok(Some(record))
    }
}

impl<S: TrackStore> Recommender for SessionRecommender<S> {
    fn recommend_next(
        &self,
        user: UserId,
        prev_track: TrackId,
        prev_track_time: ListenTime,
    ) -> Result<TrackId, RecommendError> {
        self.history.record(user, prev_track, prev_track_time);

        let pivot = self.pivot_track(user, prev_track);

        let recommendations = match self.lookup(pivot)? {
            Some(record) if !record.recommendations.is_empty() => record.recommendations,
            _ => {
                log::debug!("user {user}: no recommendations for pivot {pivot}, falling back");
                return self.fallback.recommend_next(user, prev_track, prev_track_time);
            }
        };

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = recommendations.choose(&mut *rng).copied().unwrap_or(prev_track);
        Ok(next)
    }
}
