use std::collections::HashMap;

use thiserror::Error;

use crate::models::{TrackId, TrackRecord};

/// Failure of the track store backend (transport error, backend fault).
///
/// A missing record is not a failure; lookups report it as `Ok(None)`.
#[derive(Debug, Error)]
#[error("track store unavailable: {0}")]
pub struct StoreError(pub String);

/// Byte-level lookup from track id to a serialized track record.
///
/// Implementations may sit in front of a network service, so `get` is treated
/// as blocking I/O with no internal retry.
#[cfg_attr(test, mockall::automock)]
pub trait TrackStore: Send + Sync {
    fn get(&self, track: TrackId) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Track store held entirely in memory, backing offline mode and tests
#[derive(Debug, Default)]
pub struct InMemoryTrackStore {
    records: HashMap<TrackId, Vec<u8>>,
}

impl InMemoryTrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from decoded records, e.g. the tracks of a catalog dump
    pub fn from_records(records: &[TrackRecord]) -> Result<InMemoryTrackStore, serde_json::Error> {
        let mut store = InMemoryTrackStore::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Insert a record, replacing any previous bytes for the same id
    pub fn insert(&mut self, record: &TrackRecord) -> Result<(), serde_json::Error> {
        self.records.insert(record.id, record.to_bytes()?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TrackStore for InMemoryTrackStore {
    fn get(&self, track: TrackId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.records.get(&track).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store_round_trip() {
        let record = TrackRecord {
            id: 3,
            recommendations: vec![1, 2],
        };
        let store = InMemoryTrackStore::from_records(&[record]).unwrap();

        let bytes = store.get(3).unwrap().expect("record should be present");
        let decoded = TrackRecord::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.recommendations, vec![1, 2]);
    }

    #[test]
    fn test_in_memory_store_miss_is_none() {
        let store = InMemoryTrackStore::new();
        assert!(store.get(99).unwrap().is_none());
    }

    #[test]
    fn test_insert_replaces_existing_record() {
        let mut store = InMemoryTrackStore::new();
        store
            .insert(&TrackRecord {
                id: 1,
                recommendations: vec![5],
            })
            .unwrap();
        store
            .insert(&TrackRecord {
                id: 1,
                recommendations: vec![6],
            })
            .unwrap();

        assert_eq!(store.len(), 1);
        let bytes = store.get(1).unwrap().unwrap();
        let decoded = TrackRecord::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.recommendations, vec![6]);
    }
}
