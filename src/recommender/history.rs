use std::collections::VecDeque;

use dashmap::DashMap;

use crate::models::{ListenTime, TrackId, UserId};

/// One playback event: which track, and how much of it was played
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    pub track: TrackId,
    pub time: ListenTime,
}

/// Per-user rolling window of recent playback events.
///
/// The window is an approximate signal of whether the user is enjoying what
/// we recommend: mostly-full listens mean the current direction works, a run
/// of quick skips means it does not.
///
/// Buffers are created lazily on a user's first event and live for the
/// process lifetime. Each update runs under that user's map entry guard, so
/// overlapping requests for one user cannot break the dedup/length
/// invariants, while different users never contend.
pub struct HistoryStore {
    buffers: DashMap<UserId, VecDeque<HistoryEntry>>,
    buffer_limit: usize,
    max_duplicates: usize,
}

impl HistoryStore {
    pub fn new(buffer_limit: usize, max_duplicates: usize) -> Self {
        HistoryStore {
            buffers: DashMap::new(),
            buffer_limit,
            max_duplicates,
        }
    }

    /// Record a playback event for a user.
    ///
    /// After appending, any exact (track, time) pair occurring more than
    /// `max_duplicates` times is purged entirely, wherever its occurrences
    /// sit in the window. The length bound is enforced afterwards, oldest
    /// entries first.
    pub fn record(&self, user: UserId, track: TrackId, time: ListenTime) {
        let mut buffer = self.buffers.entry(user).or_default();
        buffer.push_back(HistoryEntry { track, time });

        let mut over_duplicated: Vec<HistoryEntry> = Vec::new();
        for entry in buffer.iter() {
            let occurrences = buffer.iter().filter(|e| *e == entry).count();
            if occurrences > self.max_duplicates && !over_duplicated.contains(entry) {
                over_duplicated.push(*entry);
            }
        }
        if !over_duplicated.is_empty() {
            buffer.retain(|entry| !over_duplicated.contains(entry));
        }

        while buffer.len() > self.buffer_limit {
            buffer.pop_front();
        }
    }

    /// Track with the highest listen fraction currently buffered for the
    /// user, or `None` when nothing is buffered. Ties go to the
    /// earliest-inserted entry.
    pub fn best_recent(&self, user: UserId) -> Option<TrackId> {
        let buffer = self.buffers.get(&user)?;

        let mut best: Option<HistoryEntry> = None;
        for entry in buffer.iter() {
            match best {
                Some(current) if entry.time <= current.time => {}
                _ => best = Some(*entry),
            }
        }
        best.map(|entry| entry.track)
    }

    /// True when at least `early_stop` buffered events were cut short, i.e.
    /// their listen fraction is strictly below `min_time`. An empty or
    /// absent buffer never triggers.
    pub fn should_reset_pivot(&self, user: UserId, min_time: ListenTime, early_stop: usize) -> bool {
        let Some(buffer) = self.buffers.get(&user) else {
            return false;
        };
        if buffer.is_empty() {
            return false;
        }

        let skips = buffer.iter().filter(|entry| entry.time < min_time).count();
        skips >= early_stop
    }

    /// Number of buffered events for a user
    pub fn len(&self, user: UserId) -> usize {
        self.buffers.get(&user).map_or(0, |buffer| buffer.len())
    }
}
