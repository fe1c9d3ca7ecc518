use std::io::Read;

use anyhow::Result;
use ureq::Agent;

use crate::config::Config;
use crate::models::{PingResponse, TopTracksResponse, TrackId};
use crate::store::{StoreError, TrackStore};

/// HTTP client for the catalog service holding track records and the
/// popularity ranking
pub struct CatalogClient {
    agent: Agent,
    base_url: String,
    api_key: Option<String>,
}

impl CatalogClient {
    /// Create a new client with configuration from environment
    pub fn new(config: Config) -> Self {
        let agent = Agent::new();

        CatalogClient {
            agent,
            base_url: config.catalog_url,
            api_key: config.api_key,
        }
    }

    /// Build a GET request for a service path, attaching the API key if configured
    fn request(&self, path: &str) -> ureq::Request {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self.agent.get(&url);
        if let Some(key) = &self.api_key {
            request = request.set("Authorization", &format!("Bearer {key}"));
        }
        request
    }

    /// Test the connection with a simple ping
    pub fn ping(&self) -> Result<()> {
        let response = self
            .request("/api/ping")
            .call()
            .map_err(|e| anyhow::anyhow!("Ping failed: {}", e))?;

        let parsed: PingResponse = response.into_json()?;
        if parsed.status != "ok" {
            return Err(anyhow::anyhow!(
                "Catalog service returned error status: {}",
                parsed.status
            ));
        }
        Ok(())
    }

    /// Fetch the most popular tracks from the catalog, most popular first
    pub fn fetch_top_tracks(&self, count: usize) -> Result<Vec<TrackId>> {
        let response = self
            .request(&format!("/api/catalog/top?count={count}"))
            .call()
            .map_err(|e| anyhow::anyhow!("Top tracks request failed: {}", e))?;

        let parsed: TopTracksResponse = response.into_json()?;
        if parsed.status != "ok" {
            return Err(anyhow::anyhow!(
                "Catalog service returned error status: {}",
                parsed.status
            ));
        }
        Ok(parsed.top_tracks)
    }
}

impl TrackStore for CatalogClient {
    /// Fetch the raw serialized record for a track.
    ///
    /// A 404 from the service means the catalog holds no record for that id;
    /// every other failure is a store failure for the caller to handle.
    fn get(&self, track: TrackId) -> Result<Option<Vec<u8>>, StoreError> {
        let response = match self.request(&format!("/api/tracks/{track}")).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(e) => {
                log::warn!("track store request for {track} failed: {e}");
                return Err(StoreError(e.to_string()));
            }
        };

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| StoreError(e.to_string()))?;
        Ok(Some(bytes))
    }
}
