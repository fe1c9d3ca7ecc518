use std::io::BufRead;

use anyhow::Result;
use clap::Parser;

mod client;
mod config;
mod models;
mod recommender;
mod store;


use crate::client::CatalogClient;
use crate::config::load_config;
use crate::models::{Catalog, ListenTime, TrackId, UserId};
use crate::recommender::{Recommender, RecommenderConfig, SessionRecommender};
use crate::store::{InMemoryTrackStore, TrackStore};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser)]
#[command(name = "session-recommender")]
#[command(about = "Session-aware next-track recommender for music streaming")]
#[command(version)]
struct Args {
    /// Path to a recommender tunables JSON file (defaults apply when omitted)
    #[arg(short = 'c', long = "config")]
    config_file: Option<String>,

    /// Run offline against a catalog dump file instead of the catalog service
    #[arg(long = "catalog")]
    catalog_file: Option<String>,

    /// Seed the random source to reproduce selections exactly
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Quiet mode - print only the recommended track ids
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let recommender_config = match &args.config_file {
        Some(path) => {
            if !std::path::Path::new(path).exists() {
                eprintln!("Error: Recommender configuration file '{path}' not found.");
                return Err(anyhow::anyhow!("Configuration file '{}' not found", path));
            }
            match RecommenderConfig::load_from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to load recommender configuration: {e}");
                    return Err(anyhow::anyhow!(
                        "Failed to load recommender configuration: {}",
                        e
                    ));
                }
            }
        }
        None => RecommenderConfig::default(),
    };

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(catalog_file) = &args.catalog_file {
        // Offline mode: the dump file supplies both the track records and
        // the popularity ranking
        if !args.quiet {
            println!("Loading catalog dump from: {catalog_file}");
        }
        let catalog = Catalog::load_from_file(catalog_file)
            .map_err(|e| anyhow::anyhow!("Failed to load catalog dump: {}", e))?;
        let store = InMemoryTrackStore::from_records(&catalog.tracks)?;
        if !args.quiet {
            println!(
                "Loaded {} track records, {} tracks in popularity ranking",
                store.len(),
                catalog.top_tracks.len()
            );
        }

        let engine = SessionRecommender::with_rng(store, &catalog, recommender_config, rng);
        return run_session(&engine, args.quiet);
    }

    // Service mode: configuration from .env, records fetched per request
    let config = load_config()?;
    let client = CatalogClient::new(config);

    if !args.quiet {
        println!("Testing catalog service connection...");
    }
    match client.ping() {
        Ok(_) => {
            if !args.quiet {
                println!("✓ Catalog service connection successful");
            }
        }
        Err(e) => {
            eprintln!("✗ Catalog service connection failed: {e}");
            return Err(e);
        }
    }

    let catalog = Catalog {
        top_tracks: client.fetch_top_tracks(recommender_config.fallback_pool_size)?,
        tracks: vec![],
    };
    if !args.quiet {
        println!(
            "Fetched {} tracks for the fallback pool",
            catalog.top_tracks.len()
        );
    }

    let engine = SessionRecommender::with_rng(client, &catalog, recommender_config, rng);
    run_session(&engine, args.quiet)
}

/// Read playback events from stdin, one `user track listen_fraction` triple
/// per line, and print the recommended next track for each
fn run_session<S: TrackStore>(engine: &SessionRecommender<S>, quiet: bool) -> Result<()> {
    if !quiet {
        println!("\nReading playback events from stdin (user track listen_fraction):");
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (user, track, time) = match parse_event(line) {
            Ok(event) => event,
            Err(e) => {
                eprintln!("Skipping malformed event '{line}': {e}");
                continue;
            }
        };

        let next = engine.recommend_next(user, track, time)?;
        if quiet {
            println!("{next}");
        } else {
            println!("user {user}: played {track} for {time:.2} -> next {next}");
        }
    }

    Ok(())
}

/// Parse one `user track listen_fraction` event line
fn parse_event(line: &str) -> Result<(UserId, TrackId, ListenTime)> {
    let mut parts = line.split_whitespace();
    let user = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing user id"))?
        .parse()?;
    let track = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing track id"))?
        .parse()?;
    let time = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing listen fraction"))?
        .parse()?;
    if parts.next().is_some() {
        return Err(anyhow::anyhow!("expected exactly three fields"));
    }
    Ok((user, track, time))
}
