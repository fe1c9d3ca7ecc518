use serde::{Deserialize, Serialize};

/// Opaque track identifier assigned by the catalog service
pub type TrackId = u64;

/// Opaque listener identifier
pub type UserId = u64;

/// Fraction of a track that was actually played (0.0 = skipped immediately, 1.0 = full listen)
pub type ListenTime = f32;

/// A catalog track with its precomputed list of similar tracks
///
/// The recommendation list is produced offline by the catalog pipeline; this
/// service only reads it. The list may be empty for tracks nothing was ever
/// computed for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: TrackId,
    #[serde(default)]
    pub recommendations: Vec<TrackId>,
}

impl TrackRecord {
    /// Decode a record from the raw bytes held by the track store
    pub fn from_bytes(bytes: &[u8]) -> Result<TrackRecord, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode a record to the byte representation the track store holds
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Catalog-wide data: the popularity ranking, and optionally the full track
/// records when the catalog was loaded from a local dump file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Track ids ordered by popularity, most popular first
    #[serde(rename = "topTracks", default)]
    pub top_tracks: Vec<TrackId>,
    /// Full records, present in offline dumps only
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
}

impl Catalog {
    /// Load a catalog dump from a JSON file
    pub fn load_from_file(path: &str) -> Result<Catalog, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        Ok(catalog)
    }
}

/// Response structure for the catalog service's top-tracks endpoint
#[derive(Debug, Deserialize)]
pub struct TopTracksResponse {
    pub status: String,
    #[serde(rename = "topTracks")]
    pub top_tracks: Vec<TrackId>,
}

/// Response structure for the catalog service's ping endpoint
#[derive(Debug, Deserialize)]
pub struct PingResponse {
    pub status: String,
}
