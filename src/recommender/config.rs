use serde::{Deserialize, Serialize};

/// Tunables for the session recommender heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// How many recent playback events are kept per user
    #[serde(default = "default_buffer_limit")]
    pub buffer_limit: usize,
    /// Listen fraction below which a playback counts as a skip
    #[serde(default = "default_min_time")]
    pub min_time: f32,
    /// Number of buffered skips that triggers a pivot reset
    #[serde(default = "default_early_stop")]
    pub early_stop: usize,
    /// Maximum times an identical (track, time) event may repeat in the buffer
    #[serde(default = "default_max_duplicates")]
    pub max_duplicates: usize,
    /// How many of the catalog's top tracks feed the fallback pool
    #[serde(default = "default_fallback_pool_size")]
    pub fallback_pool_size: usize,
}

fn default_buffer_limit() -> usize {
    10
}

fn default_min_time() -> f32 {
    0.25
}

fn default_early_stop() -> usize {
    2
}

fn default_max_duplicates() -> usize {
    2
}

fn default_fallback_pool_size() -> usize {
    100
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            buffer_limit: default_buffer_limit(),
            min_time: default_min_time(),
            early_stop: default_early_stop(),
            max_duplicates: default_max_duplicates(),
            fallback_pool_size: default_fallback_pool_size(),
        }
    }
}

impl RecommenderConfig {
    /// Load tunables from a JSON file
    pub fn load_from_file(path: &str) -> Result<RecommenderConfig, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: RecommenderConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}
