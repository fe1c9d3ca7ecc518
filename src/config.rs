use anyhow::Result;

/// Service configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub catalog_url: String,
    pub api_key: Option<String>,
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    // Read variables
    let catalog_url = std::env::var("CATALOG_URL")?;
    let api_key = std::env::var("CATALOG_API_KEY").ok();
    Ok(Config {
        catalog_url,
        api_key,
    })
}
