use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use isochrone_server::cache::{CacheConfig, CachePolicy, IsochroneCache};
use isochrone_server::feed::{Feed, FeedError};
use isochrone_server::isochrone::{IsochroneConfig, IsochroneEngine, Origin};
use isochrone_server::network::{Network, NetworkError, build_network};
use isochrone_server::web::{AppState, IsochroneResponse, create_router};

#[derive(Debug, Parser)]
#[command(name = "isochrone-server", version, about = "Transit isochrones from a GTFS feed")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the station network from a GTFS feed directory.
    Build {
        /// Directory holding stops.txt, stop_times.txt, trips.txt and routes.txt
        #[arg(long)]
        feed_dir: PathBuf,

        /// Where to write the network document
        #[arg(long)]
        out: PathBuf,
    },

    /// Serve isochrones over HTTP.
    Serve {
        /// Network document produced by `build`
        #[arg(long, env = "ISOCHRONE_NETWORK")]
        network: PathBuf,

        /// Address to listen on
        #[arg(long, env = "ISOCHRONE_ADDR", default_value = "127.0.0.1:3000")]
        addr: SocketAddr,

        #[command(flatten)]
        cache: CacheArgs,
    },

    /// Compute one isochrone and print it as GeoJSON.
    Query {
        /// Network document produced by `build`
        #[arg(long, env = "ISOCHRONE_NETWORK")]
        network: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Travel-time budget in minutes
        #[arg(long)]
        minutes: u32,

        /// Walking limit in metres
        #[arg(long)]
        walk_m: Option<f64>,
    },
}

#[derive(Debug, clap::Args)]
struct CacheArgs {
    /// Maximum number of cached isochrones
    #[arg(long, default_value_t = 256)]
    cache_capacity: usize,

    /// Evict least recently used entries instead of oldest inserted
    #[arg(long)]
    cache_lru: bool,
}

impl CacheArgs {
    fn config(&self) -> CacheConfig {
        let policy = if self.cache_lru {
            CachePolicy::Lru
        } else {
            CachePolicy::Fifo
        };
        CacheConfig::default()
            .with_capacity(self.cache_capacity)
            .with_policy(policy)
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build { feed_dir, out } => build(feed_dir, out),
        Command::Serve {
            network,
            addr,
            cache,
        } => serve(network, addr, cache.config()).await,
        Command::Query {
            network,
            lat,
            lon,
            minutes,
            walk_m,
        } => query(network, Origin::new(lat, lon), minutes, walk_m),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Failed");
            ExitCode::FAILURE
        }
    }
}

fn build(feed_dir: PathBuf, out: PathBuf) -> Result<(), CliError> {
    let feed = Feed::read_dir(&feed_dir)?;
    let (network, _) = build_network(&feed);
    network.save(&out)?;
    Ok(())
}

fn load_engine(path: PathBuf, cache: CacheConfig) -> Result<IsochroneEngine, CliError> {
    let network = Network::load(&path)?;
    Ok(IsochroneEngine::new(
        Arc::new(network),
        IsochroneConfig::default(),
        IsochroneCache::new(&cache),
    ))
}

async fn serve(network: PathBuf, addr: SocketAddr, cache: CacheConfig) -> Result<(), CliError> {
    let engine = load_engine(network, cache)?;
    let app = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| CliError::Bind { addr, source })?;
    info!(%addr, "Isochrone server listening");

    axum::serve(listener, app).await.map_err(CliError::Serve)
}

fn query(
    network: PathBuf,
    origin: Origin,
    minutes: u32,
    walk_m: Option<f64>,
) -> Result<(), CliError> {
    let engine = load_engine(network, CacheConfig::default())?;
    let walk_m = walk_m.unwrap_or(engine.config().default_walk_distance_m);

    let outcome = engine.compute_isochrone(origin, minutes.saturating_mul(60), walk_m);
    let body = IsochroneResponse::from_outcome(&outcome, minutes, walk_m);
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
